#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies a device for the lifetime of a simulation run
///
/// Identifiers are handed out by whoever builds the topology; the network
/// does not check them for uniqueness.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(u32);

impl DeviceId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "#{}", self.0)
    }
}

/// Hands out sequential device identifiers, starting at zero
#[derive(Debug, Default)]
pub struct DeviceIdAllocator {
    next: u32,
}

impl DeviceIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> DeviceId {
        let id = DeviceId(self.next);
        self.next += 1;
        id
    }
}
