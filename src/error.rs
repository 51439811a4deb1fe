use thiserror::Error;

use crate::device::DeviceId;

/// Configuration errors raised while wiring a topology or building packets
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("link between {0} and {1} has zero bandwidth")]
    ZeroBandwidth(DeviceId, DeviceId),
    #[error("cannot link device {0} to itself")]
    SelfLink(DeviceId),
    #[error("packet from {0} to {1} has no payload")]
    EmptyPacket(DeviceId, DeviceId),
    #[error("no device registered with id {0}")]
    UnknownDevice(DeviceId),
}
