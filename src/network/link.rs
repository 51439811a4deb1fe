#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::DeviceId;
use crate::network::{Bandwidth, Latency, Packet};
use crate::time::Duration;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(u32);

impl LinkId {
    pub(super) fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "link-{}", self.0)
    }
}

/// Lower bound on any travel time, whatever the transit config says
pub const MINIMUM_TRAVEL_TIME: Duration = Duration::from_micros(1);

/// How travel times are stretched so transit is visible on screen
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitConfig {
    /// Multiplier applied to the physical transit time
    pub exaggeration: f64,
    /// No packet crosses a link faster than this
    pub minimum_visible: Duration,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            exaggeration: 50.0,
            minimum_visible: Duration::from_millis(500),
        }
    }
}

/// Time it takes to push `size` bytes onto a link, in seconds
pub fn serialization_seconds(size: u64, bandwidth: Bandwidth) -> f64 {
    // Converts size to bits
    (size as f64 * 8.0) / (bandwidth.into_bits_per_second() as f64)
}

/// Latency plus serialization delay, in seconds
pub fn physical_seconds(size: u64, bandwidth: Bandwidth, latency: Latency) -> f64 {
    latency.as_seconds_f64() + serialization_seconds(size, bandwidth)
}

/// A point-to-point connection between two devices
///
/// Links are undirected; a packet crosses in whichever direction it was spawned.
#[derive(Debug, Clone)]
pub struct Link {
    identifier: LinkId,
    node1: DeviceId,
    node2: DeviceId,
    bandwidth: Bandwidth,
    latency: Latency,

    current_packet_count: u32,
    total_packet_count: u64,
}

impl Link {
    pub(super) fn new(
        identifier: LinkId,
        node1: DeviceId,
        node2: DeviceId,
        bandwidth: Bandwidth,
        latency: Latency,
    ) -> Self {
        Self {
            identifier,
            node1,
            node2,
            bandwidth,
            latency,
            current_packet_count: 0,
            total_packet_count: 0,
        }
    }

    pub fn id(&self) -> LinkId {
        self.identifier
    }

    /// Get the two devices connected by this link, in the order they were declared
    pub fn get_nodes(&self) -> (DeviceId, DeviceId) {
        (self.node1, self.node2)
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    /// Does this link connect `a` and `b` (in either direction)?
    pub fn connects(&self, a: DeviceId, b: DeviceId) -> bool {
        (self.node1 == a && self.node2 == b) || (self.node1 == b && self.node2 == a)
    }

    /// How long `packet` takes to cross this link once exaggerated for display
    pub fn travel_time(&self, packet: &Packet, config: &TransitConfig) -> Duration {
        let physical = physical_seconds(packet.size(), self.bandwidth, self.latency);
        let scaled = Duration::from_seconds_f64(physical * config.exaggeration);

        scaled.max(config.minimum_visible).max(MINIMUM_TRAVEL_TIME)
    }

    /// Does the link currently have any packets in transit?
    pub fn is_active(&self) -> bool {
        self.current_packet_count > 0
    }

    /// Number of packets currently crossing this link
    pub fn num_current_packets(&self) -> u32 {
        self.current_packet_count
    }

    /// Get the number of all packets ever sent through this link
    pub fn num_total_packets(&self) -> u64 {
        self.total_packet_count
    }

    /// Returns true if the link was idle before
    pub(super) fn packet_entered(&mut self) -> bool {
        self.total_packet_count += 1;
        self.current_packet_count += 1;
        self.current_packet_count == 1
    }

    /// Returns true if the link became idle
    pub(super) fn packet_left(&mut self) -> bool {
        assert!(self.current_packet_count > 0);
        self.current_packet_count -= 1;
        self.current_packet_count == 0
    }
}
