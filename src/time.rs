//! Simulated time, similar to std::time, but driven by the simulation stepper

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The time at which the simulation started
pub const START_TIME: Time = Time(0);

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Elapsed simulated time in microseconds
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct Time(u64);

/// A span of simulated time in microseconds
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct Duration(u64);

impl Time {
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self::from_micros(millis * 1000)
    }

    pub const fn from_seconds(seconds: u64) -> Self {
        Self::from_millis(seconds * 1000)
    }

    /// Get elapsed seconds (rounded down)
    pub fn to_seconds(&self) -> u64 {
        self.0 / 1_000_000
    }

    pub fn to_millis(&self) -> u64 {
        self.0 / 1_000
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis_f64(&self) -> f64 {
        (self.0 as f64) / 1_000.0
    }

    pub fn as_seconds_f64(&self) -> f64 {
        (self.0 as f64) / MICROS_PER_SECOND
    }
}

impl Duration {
    pub const ZERO: Self = Self(0);

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self::from_micros(millis * 1000)
    }

    pub const fn from_seconds(seconds: u64) -> Self {
        Self::from_millis(seconds * 1000)
    }

    /// Converts fractional seconds, rounding up to the next whole microsecond
    ///
    /// Negative and NaN inputs map to zero.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        if seconds.is_nan() || seconds <= 0.0 {
            return Self::ZERO;
        }

        Self((seconds * MICROS_PER_SECOND).ceil() as u64)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Get duration in seconds (rounded down)
    pub fn to_seconds(self) -> u64 {
        self.0 / 1_000_000
    }

    pub fn to_millis(self) -> u64 {
        self.0 / 1_000
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis_f64(&self) -> f64 {
        (self.0 as f64) / 1_000.0
    }

    pub fn as_seconds_f64(&self) -> f64 {
        (self.0 as f64) / MICROS_PER_SECOND
    }

    /// The ratio `self / other`; used to turn elapsed transit time into link progress
    pub fn fraction_of(self, other: Duration) -> f64 {
        (self.0 as f64) / (other.0 as f64)
    }
}

impl std::ops::Add<Duration> for Time {
    type Output = Self;

    fn add(self, other: Duration) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::ops::AddAssign<Duration> for Time {
    fn add_assign(&mut self, other: Duration) {
        self.0 += other.0
    }
}

impl std::ops::AddAssign<Duration> for Duration {
    fn add_assign(&mut self, other: Duration) {
        self.0 += other.0
    }
}

impl std::ops::Add for Duration {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(w, "{}μs", self.0)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let minutes = self.to_seconds() / 60;
        let secs = self.to_seconds() - minutes * 60;
        let millis = self.as_millis_f64() % 1000.0;

        if minutes > 0 {
            write!(w, "{minutes:02}min ")?;
        }

        write!(w, "{secs:02}s {millis:.3}ms")
    }
}
