use std::any::Any;
use std::net::Ipv4Addr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceDescription, DeviceId, DeviceKind, NetworkScope};
use crate::network::{ApplicationProtocol, Packet, DNS_PORT, HTTPS_PORT};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum number of requests held per queue; `None` means unbounded
    ///
    /// When a queue is full, the newest request is dropped.
    pub queue_capacity: Option<usize>,
}

/// The request classes a router buffers for the wide-area network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestClass {
    NameResolution,
    SecureWeb,
}

impl RequestClass {
    fn of(packet: &Packet) -> Option<Self> {
        match (packet.destination_port(), packet.application()) {
            (DNS_PORT, ApplicationProtocol::Dns) => Some(Self::NameResolution),
            (HTTPS_PORT, ApplicationProtocol::Https) => Some(Self::SecureWeb),
            _ => None,
        }
    }
}

/// Edge device between the local network and the outside world
///
/// Inbound name-resolution and secure-web requests are kept in pending
/// queues. Draining them (and deciding how to answer) is up to the traffic
/// driver, so ticking does nothing.
#[derive(Debug, Clone)]
pub struct RouterDevice {
    id: DeviceId,
    scope: NetworkScope,
    address: Ipv4Addr,
    config: RouterConfig,

    name_resolution: Vec<Packet>,
    secure_web: Vec<Packet>,

    packets_received: u64,
    bytes_received: u64,
    dropped_requests: u64,
}

impl RouterDevice {
    pub fn new(id: DeviceId, scope: NetworkScope, address: Ipv4Addr) -> Self {
        Self::with_config(id, scope, address, RouterConfig::default())
    }

    pub fn with_config(
        id: DeviceId,
        scope: NetworkScope,
        address: Ipv4Addr,
        config: RouterConfig,
    ) -> Self {
        Self {
            id,
            scope,
            address,
            config,
            name_resolution: vec![],
            secure_web: vec![],
            packets_received: 0,
            bytes_received: 0,
            dropped_requests: 0,
        }
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Requests waiting for a name-resolution answer
    pub fn pending_name_resolution(&self) -> &[Packet] {
        &self.name_resolution
    }

    /// Requests waiting for a secure-web answer
    pub fn pending_secure_web(&self) -> &[Packet] {
        &self.secure_web
    }

    pub fn pending_len(&self) -> usize {
        self.name_resolution.len() + self.secure_web.len()
    }

    /// Number of requests dropped because a bounded queue was full
    pub fn dropped_requests(&self) -> u64 {
        self.dropped_requests
    }

    /// Take all buffered name-resolution requests, leaving the queue empty
    pub fn drain_name_resolution(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.name_resolution)
    }

    /// Take all buffered secure-web requests, leaving the queue empty
    pub fn drain_secure_web(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.secure_web)
    }

    /// Take both queues; name-resolution requests come first
    pub fn drain_pending(&mut self) -> Vec<Packet> {
        let mut pending = self.drain_name_resolution();
        pending.append(&mut self.secure_web);
        pending
    }

    fn enqueue(&mut self, class: RequestClass, packet: &Packet) {
        let queue = match class {
            RequestClass::NameResolution => &mut self.name_resolution,
            RequestClass::SecureWeb => &mut self.secure_web,
        };

        if let Some(capacity) = self.config.queue_capacity {
            if queue.len() >= capacity {
                self.dropped_requests += 1;
                log::warn!(
                    "Router {} dropped {} from {}: {class:?} queue is full ({capacity} requests)",
                    self.id,
                    packet.id(),
                    packet.source()
                );
                return;
            }
        }

        queue.push(packet.clone());
    }
}

impl Device for RouterDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn scope(&self) -> NetworkScope {
        self.scope
    }

    fn on_receive(&mut self, packet: &Packet) {
        self.packets_received += 1;
        self.bytes_received += packet.size();

        match RequestClass::of(packet) {
            Some(class) => {
                log::trace!("Router {} queued {} as {class:?}", self.id, packet.id());
                self.enqueue(class, packet);
            }
            None => {
                log::trace!(
                    "Router {} ignored {} (dst port {})",
                    self.id,
                    packet.id(),
                    packet.destination_port()
                );
            }
        }
    }

    fn describe(&self) -> DeviceDescription {
        DeviceDescription {
            id: self.id,
            kind: DeviceKind::Router,
            scope: self.scope,
            name: format!("router {}", self.address),
            address: self.address,
            packets_received: self.packets_received,
            bytes_received: self.bytes_received,
            pending_requests: self.pending_len(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use crate::network::{Header, PacketIdAllocator, TransportProtocol};
    use crate::time::Time;

    use super::*;

    const ROUTER_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 1);

    fn request(
        ids: &mut PacketIdAllocator,
        port: u16,
        application: ApplicationProtocol,
    ) -> Packet {
        let header = Header::new(
            SocketAddrV4::new(Ipv4Addr::new(192, 168, 0, 10), 40_000),
            SocketAddrV4::new(ROUTER_ADDR, port),
            TransportProtocol::Tcp,
            application,
        );

        Packet::new(
            ids.allocate(),
            DeviceId::new(1),
            DeviceId::new(0),
            80,
            Time::default(),
            header,
        )
        .unwrap()
    }

    fn router() -> RouterDevice {
        RouterDevice::new(DeviceId::new(0), NetworkScope::Local, ROUTER_ADDR)
    }

    #[test]
    fn classifies_name_resolution() {
        let mut ids = PacketIdAllocator::new();
        let mut router = router();

        router.on_receive(&request(&mut ids, DNS_PORT, ApplicationProtocol::Dns));

        assert_eq!(1, router.pending_name_resolution().len());
        assert!(router.pending_secure_web().is_empty());
    }

    #[test]
    fn classifies_secure_web() {
        let mut ids = PacketIdAllocator::new();
        let mut router = router();

        router.on_receive(&request(&mut ids, HTTPS_PORT, ApplicationProtocol::Https));

        assert_eq!(1, router.pending_secure_web().len());
        assert!(router.pending_name_resolution().is_empty());
    }

    #[test]
    fn ignores_unclassified() {
        let mut ids = PacketIdAllocator::new();
        let mut router = router();

        // Port and application have to agree
        router.on_receive(&request(&mut ids, DNS_PORT, ApplicationProtocol::Https));
        router.on_receive(&request(&mut ids, HTTPS_PORT, ApplicationProtocol::Dns));
        router.on_receive(&request(&mut ids, 80, ApplicationProtocol::Http));

        assert_eq!(0, router.pending_len());
        assert_eq!(3, router.describe().packets_received);
    }

    #[test]
    fn drain_clears_queues() {
        let mut ids = PacketIdAllocator::new();
        let mut router = router();

        let dns = request(&mut ids, DNS_PORT, ApplicationProtocol::Dns);
        let web = request(&mut ids, HTTPS_PORT, ApplicationProtocol::Https);
        router.on_receive(&web);
        router.on_receive(&dns);

        assert_eq!(2, router.describe().pending_requests);

        let drained = router.drain_pending();
        assert_eq!(vec![dns, web], drained);
        assert_eq!(0, router.pending_len());
        assert!(router.drain_pending().is_empty());
    }

    #[test]
    fn bounded_queue_drops_newest() {
        let mut ids = PacketIdAllocator::new();
        let mut router = RouterDevice::with_config(
            DeviceId::new(0),
            NetworkScope::Local,
            ROUTER_ADDR,
            RouterConfig {
                queue_capacity: Some(2),
            },
        );

        let first = request(&mut ids, DNS_PORT, ApplicationProtocol::Dns);
        let second = request(&mut ids, DNS_PORT, ApplicationProtocol::Dns);
        router.on_receive(&first);
        router.on_receive(&second);
        router.on_receive(&request(&mut ids, DNS_PORT, ApplicationProtocol::Dns));

        // The secure-web queue has its own budget
        router.on_receive(&request(&mut ids, HTTPS_PORT, ApplicationProtocol::Https));

        assert_eq!(1, router.dropped_requests());
        assert_eq!(vec![first, second], router.drain_name_resolution());
        assert_eq!(1, router.drain_secure_web().len());
    }
}
