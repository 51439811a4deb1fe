//! Synthetic traffic for the home network
//!
//! The driver lives outside the transit engine. It injects requests from
//! hosts, drains the router's pending queues and answers each request after
//! a fixed delay, as if the answer had come back from the wide-area network.
//! All randomness comes from the RNG passed in by the caller.

use std::net::{Ipv4Addr, SocketAddrV4};

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::{DeviceId, RouterDevice};
use crate::network::{
    ApplicationProtocol, Header, Network, Packet, PacketIdAllocator, TransportProtocol,
    DNS_PORT, HTTPS_PORT,
};
use crate::time::{Duration, Time, START_TIME};
use crate::topology::HomeTopology;
use crate::Error;

mod schedule;
pub use schedule::{ResponseScheduler, ScheduledPacket};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficConfig {
    pub dns_interval: Duration,
    pub web_burst_interval: Duration,
    /// Number of requests in one web burst
    pub web_burst_len: u16,
    pub video_interval: Duration,
    pub telemetry_interval: Duration,
    /// How long the wide-area network takes to answer a request
    pub response_delay: Duration,
    /// Longest step a frame driver may take, to avoid jumps after stalls
    pub max_step: Duration,

    pub web_server: Ipv4Addr,
    pub video_server: Ipv4Addr,

    pub dns_query_size: u64,
    pub dns_answer_size: u64,
    pub web_request_size: u64,
    pub web_response_size: u64,
    pub video_request_size: u64,
    pub video_chunk_size: u64,
    pub telemetry_size: u64,
    pub telemetry_ack_size: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            dns_interval: Duration::from_seconds(3),
            web_burst_interval: Duration::from_seconds(5),
            web_burst_len: 5,
            video_interval: Duration::from_millis(400),
            telemetry_interval: Duration::from_seconds(10),
            response_delay: Duration::from_millis(250),
            max_step: Duration::from_millis(100),
            web_server: Ipv4Addr::new(93, 184, 216, 34),
            video_server: Ipv4Addr::new(142, 250, 0, 0),
            dns_query_size: 80,
            dns_answer_size: 120,
            web_request_size: 900,
            web_response_size: 1500,
            video_request_size: 4000,
            video_chunk_size: 50_000,
            telemetry_size: 200,
            telemetry_ack_size: 64,
        }
    }
}

impl TrafficConfig {
    /// Limit a measured frame time to `max_step`
    pub fn clamp_step(&self, dt: Duration) -> Duration {
        dt.min(self.max_step)
    }
}

const DNS_CLIENT_PORT_BASE: u16 = 40_000;
const WEB_CLIENT_PORT_BASE: u16 = 50_000;
const TELEMETRY_CLIENT_PORT: u16 = 55_000;
const VIDEO_CLIENT_PORT: u16 = 60_000;

/// What happened during one call to [`TrafficDriver::drive`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriveReport {
    /// Requests put on the network
    pub injected: usize,
    /// Packets that could not be spawned because no link existed
    pub dropped: usize,
    /// Router requests turned into delayed responses
    pub responses_scheduled: usize,
    /// Delayed responses put on the network
    pub responses_sent: usize,
}

/// Next firing time of each traffic source
#[derive(Debug, Clone, Copy)]
struct Timers {
    dns: Time,
    web_burst: Time,
    video: Time,
    telemetry: Time,
}

impl Default for Timers {
    fn default() -> Self {
        Self {
            dns: START_TIME,
            web_burst: START_TIME,
            video: START_TIME,
            telemetry: START_TIME,
        }
    }
}

pub struct TrafficDriver<R: Rng> {
    topology: HomeTopology,
    config: TrafficConfig,
    rng: R,
    packet_ids: PacketIdAllocator,
    timers: Timers,
    responses: ResponseScheduler,
}

impl<R: Rng> TrafficDriver<R> {
    pub fn new(topology: HomeTopology, config: TrafficConfig, rng: R) -> Self {
        Self {
            topology,
            config,
            rng,
            packet_ids: PacketIdAllocator::new(),
            timers: Timers::default(),
            responses: ResponseScheduler::new(),
        }
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// Responses that are waiting for their delay to pass
    pub fn responses(&self) -> &ResponseScheduler {
        &self.responses
    }

    /// Run one driver cycle at simulated time `now`
    ///
    /// Call this once per simulation step, after stepping.
    pub fn drive(&mut self, network: &mut Network, now: Time) -> Result<DriveReport, Error> {
        let mut report = DriveReport::default();

        self.generate_requests(network, now, &mut report)?;
        self.drain_router(network, now, &mut report)?;

        for response in self.responses.collect_due(now) {
            let (from, to) = (response.source(), response.destination());

            if network.spawn_packet_on_link(response, from, to) {
                report.responses_sent += 1;
            } else {
                report.dropped += 1;
            }
        }

        Ok(report)
    }

    fn generate_requests(
        &mut self,
        network: &mut Network,
        now: Time,
        report: &mut DriveReport,
    ) -> Result<(), Error> {
        let router = self.topology.router;
        let router_addr = address_of(network, router)?;

        if now >= self.timers.dns && !self.topology.web_clients.is_empty() {
            let (index, client) = self.pick_web_client();
            let header = Header::new(
                SocketAddrV4::new(address_of(network, client)?, client_port(DNS_CLIENT_PORT_BASE, index)),
                SocketAddrV4::new(router_addr, DNS_PORT),
                TransportProtocol::Udp,
                ApplicationProtocol::Dns,
            );

            let size = self.config.dns_query_size;
            self.send(network, client, router, size, now, header, report)?;
            self.timers.dns = now + self.config.dns_interval;
        }

        if now >= self.timers.web_burst && !self.topology.web_clients.is_empty() {
            let (_, client) = self.pick_web_client();
            let client_addr = address_of(network, client)?;

            for offset in 0..usize::from(self.config.web_burst_len) {
                let header = Header::new(
                    SocketAddrV4::new(client_addr, client_port(WEB_CLIENT_PORT_BASE, offset)),
                    SocketAddrV4::new(self.config.web_server, HTTPS_PORT),
                    TransportProtocol::Tcp,
                    ApplicationProtocol::Https,
                );

                let size = self.config.web_request_size;
                self.send(network, client, router, size, now, header, report)?;
            }

            self.timers.web_burst = now + self.config.web_burst_interval;
        }

        if now >= self.timers.video {
            for tv in self.topology.televisions.clone() {
                let header = Header::new(
                    SocketAddrV4::new(address_of(network, tv)?, VIDEO_CLIENT_PORT),
                    SocketAddrV4::new(self.config.video_server, HTTPS_PORT),
                    TransportProtocol::Tcp,
                    ApplicationProtocol::Https,
                );

                let size = self.config.video_request_size;
                self.send(network, tv, router, size, now, header, report)?;
            }

            self.timers.video = now + self.config.video_interval;
        }

        if now >= self.timers.telemetry {
            for appliance in self.topology.appliances.clone() {
                let header = Header::new(
                    SocketAddrV4::new(address_of(network, appliance)?, TELEMETRY_CLIENT_PORT),
                    SocketAddrV4::new(router_addr, HTTPS_PORT),
                    TransportProtocol::Tcp,
                    ApplicationProtocol::Https,
                );

                let size = self.config.telemetry_size;
                self.send(network, appliance, router, size, now, header, report)?;
            }

            self.timers.telemetry = now + self.config.telemetry_interval;
        }

        Ok(())
    }

    /// Turn every request buffered at the router into a delayed response
    fn drain_router(
        &mut self,
        network: &mut Network,
        now: Time,
        report: &mut DriveReport,
    ) -> Result<(), Error> {
        let router_id = self.topology.router;
        let router = network
            .device_as_mut::<RouterDevice>(router_id)
            .ok_or(Error::UnknownDevice(router_id))?;
        let router_addr = router.address();

        let due = now + self.config.response_delay;

        for request in router.drain_pending() {
            let size = self.response_size(&request, router_addr);
            let response = Packet::new(
                self.packet_ids.allocate(),
                router_id,
                request.source(),
                size,
                now,
                request.header().reversed(),
            )?;

            log::trace!(
                "Answering {} with {} ({size} bytes) at {due}",
                request.id(),
                response.id()
            );
            self.responses.schedule(response, due);
            report.responses_scheduled += 1;
        }

        Ok(())
    }

    fn response_size(&self, request: &Packet, router_addr: Ipv4Addr) -> u64 {
        let destination = *request.destination_addr().ip();

        match request.application() {
            ApplicationProtocol::Dns => self.config.dns_answer_size,
            _ if destination == self.config.video_server => self.config.video_chunk_size,
            _ if destination == router_addr => self.config.telemetry_ack_size,
            _ => self.config.web_response_size,
        }
    }

    fn pick_web_client(&mut self) -> (usize, DeviceId) {
        let clients = &self.topology.web_clients;
        let index = self.rng.random_range(0..clients.len());
        (index, clients[index])
    }

    #[allow(clippy::too_many_arguments)]
    fn send(
        &mut self,
        network: &mut Network,
        from: DeviceId,
        to: DeviceId,
        size: u64,
        now: Time,
        header: Header,
        report: &mut DriveReport,
    ) -> Result<(), Error> {
        let packet = Packet::new(self.packet_ids.allocate(), from, to, size, now, header)?;

        if network.spawn_packet_on_link(packet, from, to) {
            report.injected += 1;
        } else {
            report.dropped += 1;
        }

        Ok(())
    }
}

/// Source port `base + offset`, wrapping around within `base..=u16::MAX`
fn client_port(base: u16, offset: usize) -> u16 {
    let span = usize::from(u16::MAX - base) + 1;
    let wrapped = u16::try_from(offset % span).unwrap_or_default();

    base.saturating_add(wrapped)
}

fn address_of(network: &Network, id: DeviceId) -> Result<Ipv4Addr, Error> {
    network
        .get_device(id)
        .map(|device| device.describe().address)
        .ok_or(Error::UnknownDevice(id))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::topology::TopologyConfig;

    use super::*;

    fn setup(config: TrafficConfig) -> (Network, TrafficDriver<StdRng>) {
        let mut network = Network::default();
        let home = HomeTopology::build(&mut network, &TopologyConfig::default()).unwrap();
        let driver = TrafficDriver::new(home, config, StdRng::seed_from_u64(7));

        (network, driver)
    }

    #[test]
    fn first_cycle_fires_every_source() {
        let (mut network, mut driver) = setup(TrafficConfig::default());

        let report = driver.drive(&mut network, START_TIME).unwrap();

        // 1 dns query + 5 web requests + 1 video request + 1 telemetry ping
        assert_eq!(8, report.injected);
        assert_eq!(0, report.dropped);
        assert_eq!(0, report.responses_scheduled);
        assert_eq!(8, network.in_flight_count());

        // Nothing is due again right away
        let report = driver.drive(&mut network, Time::from_millis(100)).unwrap();
        assert_eq!(0, report.injected);
    }

    #[test]
    fn video_repeats() {
        let (mut network, mut driver) = setup(TrafficConfig::default());

        driver.drive(&mut network, START_TIME).unwrap();
        let report = driver.drive(&mut network, Time::from_millis(400)).unwrap();

        assert_eq!(1, report.injected);
    }

    #[test]
    fn answers_after_delay() {
        let (mut network, mut driver) = setup(TrafficConfig::default());
        let tv = driver.topology.televisions[0];

        driver.drive(&mut network, START_TIME).unwrap();

        // Every request needs 0.5s to reach the router
        network.advance(Duration::from_millis(500));
        let report = driver.drive(&mut network, Time::from_millis(100)).unwrap();
        assert_eq!(8, report.responses_scheduled);
        assert_eq!(0, report.responses_sent);
        assert_eq!(8, driver.responses().len());

        let report = driver.drive(&mut network, Time::from_millis(350)).unwrap();
        assert_eq!(8, report.responses_sent);
        assert!(driver.responses().is_empty());

        let chunk = network
            .in_flight()
            .iter()
            .find(|entry| entry.to() == tv)
            .unwrap();
        assert_eq!(driver.config().video_chunk_size, chunk.packet().size());
        assert_eq!(HTTPS_PORT, chunk.packet().source_addr().port());
        assert_eq!(VIDEO_CLIENT_PORT, chunk.packet().destination_addr().port());
    }

    #[test]
    fn missing_router() {
        let mut network = Network::default();
        let topology = HomeTopology {
            router: DeviceId::new(99),
            hosts: vec![],
            web_clients: vec![],
            televisions: vec![],
            appliances: vec![],
        };
        let mut driver =
            TrafficDriver::new(topology, TrafficConfig::default(), StdRng::seed_from_u64(1));

        assert_eq!(
            Err(Error::UnknownDevice(DeviceId::new(99))),
            driver.drive(&mut network, START_TIME)
        );
    }

    #[test]
    fn clamps_long_frames() {
        let config = TrafficConfig::default();

        assert_eq!(Duration::from_millis(100), config.clamp_step(Duration::from_seconds(2)));
        assert_eq!(Duration::from_millis(16), config.clamp_step(Duration::from_millis(16)));
    }

    #[test]
    fn client_ports_stay_in_range() {
        assert_eq!(40_000, client_port(DNS_CLIENT_PORT_BASE, 0));
        assert_eq!(40_005, client_port(DNS_CLIENT_PORT_BASE, 5));
        assert_eq!(u16::MAX, client_port(DNS_CLIENT_PORT_BASE, 25_535));
        assert_eq!(40_000, client_port(DNS_CLIENT_PORT_BASE, 25_536));
        assert_eq!(50_001, client_port(WEB_CLIENT_PORT_BASE, 15_537));

        for offset in [70_000, usize::MAX] {
            assert!(client_port(DNS_CLIENT_PORT_BASE, offset) >= DNS_CLIENT_PORT_BASE);
        }
    }
}
