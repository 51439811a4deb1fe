use crate::device::DeviceId;
use crate::network::{LinkId, Packet};
use crate::time::Duration;

/// A packet that is currently crossing a link
///
/// Progress runs from 0.0 (at `from`) to 1.0 (at `to`); renderers use it to
/// interpolate the packet's position along the link.
#[derive(Debug, Clone)]
pub struct InFlightPacket {
    packet: Packet,
    link: LinkId,
    from: DeviceId,
    to: DeviceId,
    elapsed: Duration,
    travel_time: Duration,
}

impl InFlightPacket {
    pub(super) fn new(
        packet: Packet,
        link: LinkId,
        from: DeviceId,
        to: DeviceId,
        travel_time: Duration,
    ) -> Self {
        Self {
            packet,
            link,
            from,
            to,
            elapsed: Duration::ZERO,
            travel_time,
        }
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn from(&self) -> DeviceId {
        self.from
    }

    pub fn to(&self) -> DeviceId {
        self.to
    }

    /// Fraction of the link crossed so far, capped at 1.0
    pub fn progress(&self) -> f64 {
        self.elapsed.fraction_of(self.travel_time).min(1.0)
    }

    /// Simulated time spent on the link so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total time this traversal takes; fixed when the packet was spawned
    pub fn travel_time(&self) -> Duration {
        self.travel_time
    }

    /// Move the packet along its link; returns true once it has arrived
    pub(super) fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        self.has_arrived()
    }

    pub(super) fn has_arrived(&self) -> bool {
        self.elapsed >= self.travel_time
    }

    pub(super) fn into_packet(self) -> Packet {
        self.packet
    }
}
