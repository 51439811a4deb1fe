//! lansim simulates packets travelling across a small local-area network
//!
//! It is built for visualization: time advances in discrete steps chosen by
//! the caller, every packet crossing a link carries a progress fraction that
//! a renderer can interpolate, and travel times are stretched so transit is
//! visible on screen. The engine itself is single-threaded and deterministic.

pub mod device;

pub mod network;

pub mod time;

pub mod simulation;
pub use simulation::Simulation;

pub mod topology;

#[cfg(feature = "traffic")]
pub mod traffic;

mod error;
pub use error::Error;
