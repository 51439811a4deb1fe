use std::net::SocketAddrV4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::device::DeviceId;
use crate::time::Time;
use crate::Error;

/// Well-known destination port for name resolution
pub const DNS_PORT: u16 = 53;

/// Well-known destination port for secure web traffic
pub const HTTPS_PORT: u16 = 443;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(u64);

impl PacketId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "pkt-{}", self.0)
    }
}

/// Hands out strictly increasing packet identifiers for one run
///
/// The first identifier is 1.
#[derive(Debug)]
pub struct PacketIdAllocator {
    next: u64,
}

impl Default for PacketIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl PacketIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> PacketId {
        let id = PacketId(self.next);
        self.next += 1;
        id
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    #[default]
    Tcp,
    Udp,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationProtocol {
    Https,
    Http,
    Dns,
    #[default]
    Other,
}

/// Addressing information carried by a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
    pub transport: TransportProtocol,
    pub application: ApplicationProtocol,
}

impl Header {
    pub fn new(
        source: SocketAddrV4,
        destination: SocketAddrV4,
        transport: TransportProtocol,
        application: ApplicationProtocol,
    ) -> Self {
        Self {
            source,
            destination,
            transport,
            application,
        }
    }

    /// The header of a reply: addresses and ports swapped
    pub fn reversed(&self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            transport: self.transport,
            application: self.application,
        }
    }
}

/// One logical network message
///
/// Packets cannot be changed once they are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: PacketId,
    source: DeviceId,
    destination: DeviceId,
    size: u64,
    created_at: Time,
    header: Header,
}

impl Packet {
    /// Create a new packet
    ///
    /// * size: The payload size in bytes, must not be zero
    /// * created_at: The simulated time at which the packet was built
    pub fn new(
        id: PacketId,
        source: DeviceId,
        destination: DeviceId,
        size: u64,
        created_at: Time,
        header: Header,
    ) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::EmptyPacket(source, destination));
        }

        Ok(Self {
            id,
            source,
            destination,
            size,
            created_at,
            header,
        })
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn source(&self) -> DeviceId {
        self.source
    }

    pub fn destination(&self) -> DeviceId {
        self.destination
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn created_at(&self) -> Time {
        self.created_at
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn source_addr(&self) -> SocketAddrV4 {
        self.header.source
    }

    pub fn destination_addr(&self) -> SocketAddrV4 {
        self.header.destination
    }

    pub fn destination_port(&self) -> u16 {
        self.header.destination.port()
    }

    pub fn transport(&self) -> TransportProtocol {
        self.header.transport
    }

    pub fn application(&self) -> ApplicationProtocol {
        self.header.application
    }
}
