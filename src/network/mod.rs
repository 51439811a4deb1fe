//! The transit engine
//!
//! There are three important primitives in this module
//!     * Links are point-to-point connections between devices
//!     * Packets are the messages devices exchange
//!     * The Network owns devices and links and moves packets across them

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceId};
use crate::time::Duration;
use crate::Error;

mod packet;
pub use packet::{
    ApplicationProtocol, Header, Packet, PacketId, PacketIdAllocator, TransportProtocol,
    DNS_PORT, HTTPS_PORT,
};

mod link;
pub use link::{
    physical_seconds, serialization_seconds, Link, LinkId, TransitConfig, MINIMUM_TRAVEL_TIME,
};

mod in_flight;
pub use in_flight::InFlightPacket;

mod observer;
pub use observer::{DummyTransitObserver, TransitObserver};

/// Network latency
pub type Latency = Duration;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bandwidth(u64);

impl Bandwidth {
    pub const fn from_bits_per_second(bps: u64) -> Self {
        Self(bps)
    }

    pub const fn from_megabits_per_second(mbps: u64) -> Self {
        Self(mbps * 1_000_000)
    }

    pub fn into_bits_per_second(self) -> u64 {
        self.0
    }

    pub fn as_megabits_per_second_f64(self) -> f64 {
        (self.0 as f64) / 1_000_000.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Owns all devices, links and in-flight packets of a simulation
///
/// Lookups are linear scans; the topologies this is built for hold a
/// handful of devices.
pub struct Network {
    config: TransitConfig,
    devices: Vec<Box<dyn Device>>,
    links: Vec<Link>,
    in_flight: Vec<InFlightPacket>,
    next_link_id: u32,
    observer: Box<dyn TransitObserver>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(TransitConfig::default())
    }
}

impl Network {
    pub fn new(config: TransitConfig) -> Self {
        Self {
            config,
            devices: vec![],
            links: vec![],
            in_flight: vec![],
            next_link_id: 0,
            observer: Box::new(DummyTransitObserver::default()),
        }
    }

    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    /// Replace the transit observer (the default one does nothing)
    pub fn set_observer(&mut self, observer: Box<dyn TransitObserver>) {
        self.observer = observer;
    }

    /// Register a device
    ///
    /// Identifiers are not checked for uniqueness; that is up to the caller.
    pub fn add_device(&mut self, device: Box<dyn Device>) -> DeviceId {
        let id = device.id();
        log::debug!("Adding device {id} ({:?})", device.scope());

        self.devices.push(device);
        id
    }

    /// Connect two devices
    ///
    /// Connecting the same pair twice is allowed, but lookups will only ever
    /// return the first link.
    pub fn add_link(
        &mut self,
        a: DeviceId,
        b: DeviceId,
        bandwidth: Bandwidth,
        latency: Latency,
    ) -> Result<LinkId, Error> {
        if a == b {
            return Err(Error::SelfLink(a));
        }
        if bandwidth.is_zero() {
            return Err(Error::ZeroBandwidth(a, b));
        }

        if let Some(existing) = self.find_link(a, b) {
            log::warn!(
                "Devices {a} and {b} are already connected by {}; the new link will be shadowed",
                existing.id()
            );
        }

        let identifier = LinkId::new(self.next_link_id);
        self.next_link_id += 1;

        log::debug!(
            "Connecting devices {a} and {b} with {identifier} ({} Mbps, {}ms)",
            bandwidth.as_megabits_per_second_f64(),
            latency.as_millis_f64()
        );

        self.links
            .push(Link::new(identifier, a, b, bandwidth, latency));
        Ok(identifier)
    }

    pub fn get_device(&self, id: DeviceId) -> Option<&dyn Device> {
        self.devices
            .iter()
            .find(|device| device.id() == id)
            .map(|device| &**device)
    }

    pub fn get_device_mut(&mut self, id: DeviceId) -> Option<&mut dyn Device> {
        match self.devices.iter_mut().find(|device| device.id() == id) {
            Some(device) => Some(&mut **device),
            None => None,
        }
    }

    /// Get the device with the specified identifier as a concrete device type
    ///
    /// Returns None if the device does not exist or is of a different type.
    pub fn device_as<T: Device>(&self, id: DeviceId) -> Option<&T> {
        self.get_device(id)?.as_any().downcast_ref::<T>()
    }

    pub fn device_as_mut<T: Device>(&mut self, id: DeviceId) -> Option<&mut T> {
        self.get_device_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Returns the first link connecting `a` and `b` (if it exists)
    pub fn find_link(&self, a: DeviceId, b: DeviceId) -> Option<&Link> {
        self.links.iter().find(|link| link.connects(a, b))
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|link| link.id() == id)
    }

    /// Put a packet on the link between `from` and `to`
    ///
    /// Returns false, and drops the packet, if the two devices are not connected.
    pub fn spawn_packet_on_link(&mut self, packet: Packet, from: DeviceId, to: DeviceId) -> bool {
        let Some(link) = self.links.iter_mut().find(|link| link.connects(from, to)) else {
            log::warn!(
                "There exists no network link from device {from} to {to}; dropping {}",
                packet.id()
            );
            return false;
        };

        let travel_time = link.travel_time(&packet, &self.config);
        log::trace!(
            "Spawning {} ({} bytes) on {} from {from} to {to}, travel time {travel_time}",
            packet.id(),
            packet.size(),
            link.id()
        );

        let in_flight = InFlightPacket::new(packet, link.id(), from, to, travel_time);

        if link.packet_entered() {
            self.observer.link_became_active(link);
        }
        self.observer.packet_spawned(link, &in_flight);

        self.in_flight.push(in_flight);
        true
    }

    /// Move every in-flight packet forward by `dt`
    ///
    /// Packets that arrive are handed to their destination device, in the
    /// order they were spawned, and removed. Returns how many arrived.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let in_flight = std::mem::take(&mut self.in_flight);
        let mut delivered = 0;

        for mut entry in in_flight.into_iter() {
            if entry.advance(dt) {
                self.deliver(entry);
                delivered += 1;
            } else {
                self.in_flight.push(entry);
            }
        }

        delivered
    }

    fn deliver(&mut self, entry: InFlightPacket) {
        debug_assert!(entry.has_arrived());

        if let Some(link) = self.links.iter_mut().find(|link| link.id() == entry.link()) {
            self.observer.packet_delivered(link, &entry);

            if link.packet_left() {
                self.observer.link_became_inactive(link);
            }
        }

        let destination = entry.to();
        let packet = entry.into_packet();

        match self.get_device_mut(destination) {
            Some(device) => {
                log::trace!("Delivering {} to device {destination}", packet.id());
                device.on_receive(&packet);
            }
            None => {
                log::warn!(
                    "Destination device {destination} of {} does not exist",
                    packet.id()
                );
            }
        }
    }

    pub fn devices(&self) -> &[Box<dyn Device>] {
        &self.devices
    }

    pub(crate) fn devices_mut(&mut self) -> &mut [Box<dyn Device>] {
        &mut self.devices
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Snapshot of all packets currently in transit, oldest first
    pub fn in_flight(&self) -> &[InFlightPacket] {
        &self.in_flight
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
