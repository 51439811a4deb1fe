//! Devices are the nodes of the simulated network
//!
//! There are two device kinds shipped with the crate
//!     * Endpoints are ordinary hosts that only observe what they receive
//!     * Routers sit at the network edge and buffer requests bound for the wide-area network

use std::any::Any;
use std::net::Ipv4Addr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::network::Packet;
use crate::time::Time;

mod object;
pub use object::{DeviceId, DeviceIdAllocator};

mod endpoint;
pub use endpoint::EndpointDevice;

mod router;
pub use router::{RouterConfig, RouterDevice};

/// Where a device lives; only used for presentation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkScope {
    #[default]
    Local,
    Enterprise,
    Global,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Endpoint,
    Router,
}

/// Read-only snapshot of a device for inspection views
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescription {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub scope: NetworkScope,
    pub name: String,
    pub address: Ipv4Addr,
    pub packets_received: u64,
    pub bytes_received: u64,
    /// Requests buffered and not yet drained (always zero for endpoints)
    pub pending_requests: usize,
}

/// Implement this trait to add a new kind of device to the network
pub trait Device: Any {
    fn id(&self) -> DeviceId;

    fn scope(&self) -> NetworkScope;

    /// Called once per simulation step, before packets move
    fn tick(&mut self, _now: Time) {}

    /// Called exactly once when a packet finishes crossing a link to this device
    fn on_receive(&mut self, packet: &Packet);

    fn describe(&self) -> DeviceDescription;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
