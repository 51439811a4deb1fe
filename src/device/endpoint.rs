use std::any::Any;
use std::net::Ipv4Addr;

use crate::device::{Device, DeviceDescription, DeviceId, DeviceKind, NetworkScope};
use crate::network::Packet;

/// A generic host such as a laptop, phone or smart appliance
///
/// All of its traffic is injected by an external driver, so ticking does nothing.
#[derive(Debug, Clone)]
pub struct EndpointDevice {
    id: DeviceId,
    scope: NetworkScope,
    name: String,
    address: Ipv4Addr,
    packets_received: u64,
    bytes_received: u64,
}

impl EndpointDevice {
    pub fn new(id: DeviceId, scope: NetworkScope, name: impl Into<String>, address: Ipv4Addr) -> Self {
        Self {
            id,
            scope,
            name: name.into(),
            address,
            packets_received: 0,
            bytes_received: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }
}

impl Device for EndpointDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn scope(&self) -> NetworkScope {
        self.scope
    }

    fn on_receive(&mut self, packet: &Packet) {
        log::trace!(
            "[{}] received {} from {} (dst port {})",
            self.name,
            packet.id(),
            packet.source(),
            packet.destination_port()
        );

        self.packets_received += 1;
        self.bytes_received += packet.size();
    }

    fn describe(&self) -> DeviceDescription {
        DeviceDescription {
            id: self.id,
            kind: DeviceKind::Endpoint,
            scope: self.scope,
            name: self.name.clone(),
            address: self.address,
            packets_received: self.packets_received,
            bytes_received: self.bytes_received,
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

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use crate::network::{ApplicationProtocol, Header, Packet, PacketIdAllocator, TransportProtocol};
    use crate::time::Time;

    use super::*;

    #[test]
    fn counts_received_traffic() {
        let mut laptop = EndpointDevice::new(
            DeviceId::new(2),
            NetworkScope::Local,
            "personal-laptop",
            Ipv4Addr::new(192, 168, 0, 11),
        );

        let header = Header::new(
            SocketAddrV4::new(Ipv4Addr::new(192, 168, 0, 1), 443),
            SocketAddrV4::new(laptop.address(), 50_000),
            TransportProtocol::Tcp,
            ApplicationProtocol::Https,
        );
        let packet = Packet::new(
            PacketIdAllocator::new().allocate(),
            DeviceId::new(0),
            laptop.id(),
            1500,
            Time::default(),
            header,
        )
        .unwrap();

        laptop.tick(Time::from_seconds(1));
        laptop.on_receive(&packet);

        let description = laptop.describe();
        assert_eq!(DeviceKind::Endpoint, description.kind);
        assert_eq!("personal-laptop", description.name);
        assert_eq!(1, description.packets_received);
        assert_eq!(1500, description.bytes_received);
        assert_eq!(0, description.pending_requests);
    }
}
