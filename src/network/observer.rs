use crate::network::{InFlightPacket, Link};

/// Hooks into packet transit, e.g. to collect telemetry
///
/// All functions default to doing nothing.
pub trait TransitObserver {
    fn packet_spawned(&self, _link: &Link, _packet: &InFlightPacket) {}
    fn packet_delivered(&self, _link: &Link, _packet: &InFlightPacket) {}
    fn link_became_active(&self, _link: &Link) {}
    fn link_became_inactive(&self, _link: &Link) {}
}

#[derive(Default)]
pub struct DummyTransitObserver {}

impl TransitObserver for DummyTransitObserver {}
