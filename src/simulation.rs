use crate::network::Network;
use crate::time::{Duration, Time, START_TIME};

/// Advances simulated time and sequences the work done in each step
pub struct Simulation {
    network: Network,
    current_time: Time,
    steps: u64,
}

impl Simulation {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            current_time: START_TIME,
            steps: 0,
        }
    }

    /// Current simulation time
    pub fn now(&self) -> Time {
        self.current_time
    }

    /// Number of steps performed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Advance the clock by `dt`, tick every device, then move packets
    ///
    /// Devices are ticked in registration order and never see packets that
    /// arrive during the same step. `dt` is not clamped here.
    /// Returns the number of packets delivered in this step.
    pub fn step(&mut self, dt: Duration) -> usize {
        self.current_time += dt;
        self.steps += 1;

        let now = self.current_time;
        for device in self.network.devices_mut() {
            device.tick(now);
        }

        let delivered = self.network.advance(dt);
        if delivered > 0 {
            log::trace!("Delivered {delivered} packet(s) at {now}");
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::RefCell;
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::rc::Rc;

    use crate::device::{Device, DeviceDescription, DeviceId, DeviceKind, NetworkScope};
    use crate::network::{
        ApplicationProtocol, Bandwidth, Header, Latency, Packet, PacketIdAllocator,
        TransitConfig, TransportProtocol,
    };

    use super::*;

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Writes every tick and arrival into a shared journal
    struct Journaling {
        id: DeviceId,
        journal: Journal,
    }

    impl Device for Journaling {
        fn id(&self) -> DeviceId {
            self.id
        }

        fn scope(&self) -> NetworkScope {
            NetworkScope::Enterprise
        }

        fn tick(&mut self, now: Time) {
            self.journal
                .borrow_mut()
                .push(format!("tick {} @{}", self.id, now.as_micros()));
        }

        fn on_receive(&mut self, packet: &Packet) {
            self.journal
                .borrow_mut()
                .push(format!("recv {} {}", self.id, packet.id()));
        }

        fn describe(&self) -> DeviceDescription {
            DeviceDescription {
                id: self.id,
                kind: DeviceKind::Endpoint,
                scope: NetworkScope::Enterprise,
                name: "journal".to_string(),
                address: Ipv4Addr::LOCALHOST,
                packets_received: 0,
                bytes_received: 0,
                pending_requests: 0,
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn packet(ids: &mut PacketIdAllocator, from: DeviceId, to: DeviceId) -> Packet {
        let header = Header::new(
            SocketAddrV4::new(Ipv4Addr::LOCALHOST, 1000),
            SocketAddrV4::new(Ipv4Addr::LOCALHOST, 2000),
            TransportProtocol::Udp,
            ApplicationProtocol::Other,
        );

        Packet::new(ids.allocate(), from, to, 100, Time::default(), header).unwrap()
    }

    fn setup() -> (Simulation, Journal) {
        let journal = Journal::default();

        let mut network = Network::new(TransitConfig {
            exaggeration: 1.0,
            minimum_visible: Duration::from_seconds(1),
        });

        for id in 0..2 {
            network.add_device(Box::new(Journaling {
                id: DeviceId::new(id),
                journal: journal.clone(),
            }));
        }

        network
            .add_link(
                DeviceId::new(0),
                DeviceId::new(1),
                Bandwidth::from_megabits_per_second(100),
                Latency::ZERO,
            )
            .unwrap();

        (Simulation::new(network), journal)
    }

    #[test]
    fn clock_advances() {
        let (mut sim, _) = setup();
        assert_eq!(START_TIME, sim.now());

        sim.step(Duration::from_millis(16));
        sim.step(Duration::from_millis(16));
        sim.step(Duration::ZERO);

        assert_eq!(Time::from_millis(32), sim.now());
        assert_eq!(3, sim.steps());
    }

    #[test]
    fn ticks_before_delivery() {
        let (mut sim, journal) = setup();
        let mut ids = PacketIdAllocator::new();

        let (a, b) = (DeviceId::new(0), DeviceId::new(1));
        assert!(sim.network_mut().spawn_packet_on_link(packet(&mut ids, a, b), a, b));

        assert_eq!(0, sim.step(Duration::from_millis(500)));
        assert_eq!(1, sim.network().in_flight_count());
        assert_eq!(0.5, sim.network().in_flight()[0].progress());

        assert_eq!(1, sim.step(Duration::from_millis(500)));
        assert_eq!(0, sim.network().in_flight_count());

        let expected = vec![
            "tick #0 @500000",
            "tick #1 @500000",
            "tick #0 @1000000",
            "tick #1 @1000000",
            "recv #1 pkt-1",
        ];
        assert_eq!(expected, *journal.borrow());
    }

    #[test]
    fn deterministic_runs() {
        let run = || {
            let (mut sim, journal) = setup();
            let mut ids = PacketIdAllocator::new();
            let (a, b) = (DeviceId::new(0), DeviceId::new(1));

            for step in 0..40 {
                if step % 3 == 0 {
                    sim.network_mut()
                        .spawn_packet_on_link(packet(&mut ids, a, b), a, b);
                }
                if step % 5 == 0 {
                    sim.network_mut()
                        .spawn_packet_on_link(packet(&mut ids, b, a), b, a);
                }
                sim.step(Duration::from_millis(70));
            }

            let log = journal.borrow().clone();
            log
        };

        assert_eq!(run(), run());
    }
}
