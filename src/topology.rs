//! Wiring for the home network the visualizer shows by default
//!
//! A single router sits in the middle of the home; every host is connected
//! to it either by cable or wirelessly.

use std::net::Ipv4Addr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::{DeviceId, DeviceIdAllocator, EndpointDevice, NetworkScope, RouterDevice};
use crate::network::{Bandwidth, Latency, Network};
use crate::Error;

/// Bandwidth and latency used for one kind of connection
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkProfile {
    pub bandwidth: Bandwidth,
    pub latency: Latency,
}

impl LinkProfile {
    pub const ETHERNET: Self = Self {
        bandwidth: Bandwidth::from_megabits_per_second(1000),
        latency: Latency::from_millis(1),
    };

    pub const WIFI: Self = Self {
        bandwidth: Bandwidth::from_megabits_per_second(100),
        latency: Latency::from_millis(5),
    };
}

/// What kind of traffic a host generates
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRole {
    /// Browses the web and resolves names
    WebClient,
    /// Streams video
    Television,
    /// Sends periodic telemetry
    Appliance,
    /// Only receives
    Idle,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub name: String,
    pub address: Ipv4Addr,
    pub role: HostRole,
    pub wired: bool,
}

impl HostSpec {
    pub fn new(name: &str, address: Ipv4Addr, role: HostRole, wired: bool) -> Self {
        Self {
            name: name.to_string(),
            address,
            role,
            wired,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyConfig {
    pub router_address: Ipv4Addr,
    pub wired: LinkProfile,
    pub wireless: LinkProfile,
    pub hosts: Vec<HostSpec>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        let lan = |host| Ipv4Addr::new(192, 168, 0, host);

        Self {
            router_address: lan(1),
            wired: LinkProfile::ETHERNET,
            wireless: LinkProfile::WIFI,
            hosts: vec![
                HostSpec::new("family-desktop", lan(10), HostRole::WebClient, true),
                HostSpec::new("personal-laptop", lan(11), HostRole::WebClient, false),
                HostSpec::new("johns-phone", lan(12), HostRole::WebClient, false),
                HostSpec::new("family-tablet", lan(13), HostRole::Idle, false),
                HostSpec::new("family-television", lan(14), HostRole::Television, true),
                HostSpec::new("smart-fridge", lan(20), HostRole::Appliance, false),
            ],
        }
    }
}

/// Identifiers of the devices created by [`HomeTopology::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeTopology {
    pub router: DeviceId,
    /// All hosts, in the order they were declared
    pub hosts: Vec<DeviceId>,
    pub web_clients: Vec<DeviceId>,
    pub televisions: Vec<DeviceId>,
    pub appliances: Vec<DeviceId>,
}

impl HomeTopology {
    /// Register the router and all hosts and connect each host to the router
    pub fn build(network: &mut Network, config: &TopologyConfig) -> Result<Self, Error> {
        let mut ids = DeviceIdAllocator::new();

        let router = network.add_device(Box::new(RouterDevice::new(
            ids.allocate(),
            NetworkScope::Local,
            config.router_address,
        )));

        let mut topology = Self {
            router,
            hosts: vec![],
            web_clients: vec![],
            televisions: vec![],
            appliances: vec![],
        };

        for spec in config.hosts.iter() {
            let id = network.add_device(Box::new(EndpointDevice::new(
                ids.allocate(),
                NetworkScope::Local,
                spec.name.clone(),
                spec.address,
            )));

            let profile = if spec.wired {
                config.wired
            } else {
                config.wireless
            };
            network.add_link(router, id, profile.bandwidth, profile.latency)?;

            topology.hosts.push(id);
            match spec.role {
                HostRole::WebClient => topology.web_clients.push(id),
                HostRole::Television => topology.televisions.push(id),
                HostRole::Appliance => topology.appliances.push(id),
                HostRole::Idle => {}
            }
        }

        log::debug!(
            "Built home network with {} hosts behind router {router}",
            topology.hosts.len()
        );

        Ok(topology)
    }
}
