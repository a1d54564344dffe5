//! Core types shared by the packer and unpacker.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ticks-per-second scale used to convert fractional time to a tick count.
///
/// The fractional-time word on the wire is 32 bits wide, so the rate is
/// capped at 2^32; anything larger could produce tick values that do not fit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TickRate(f64);

impl TickRate {
    /// Largest accepted rate.
    pub const MAX: f64 = 4_294_967_296.0;

    pub fn new(hz: f64) -> Result<Self> {
        if hz.is_finite() && hz > 0.0 && hz <= Self::MAX {
            Ok(Self(hz))
        } else {
            Err(Error::InvalidTickRate(hz))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for TickRate {
    type Error = Error;

    fn try_from(hz: f64) -> Result<Self> {
        Self::new(hz)
    }
}

impl fmt::Display for TickRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Timestamp split into whole seconds and a fractional part.
///
/// `frac_secs` is kept in `[0, 1)`; constructors fold any excess into `secs`.
/// `secs` has the width of the integer-time word and wraps on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSpec {
    /// Whole seconds.
    pub secs: u32,
    /// Fractional seconds in `[0, 1)`.
    pub frac_secs: f64,
}

impl TimeSpec {
    /// Create a time spec, normalizing the fractional part.
    pub fn new(secs: u32, frac_secs: f64) -> Self {
        let whole = frac_secs.floor();
        let secs = (i64::from(secs) + whole as i64) as u32;
        // Tiny negative fractions can leave exactly 1.0 after subtraction.
        let frac_secs = (frac_secs - whole).max(0.0);
        if frac_secs >= 1.0 {
            Self {
                secs: secs.wrapping_add(1),
                frac_secs: 0.0,
            }
        } else {
            Self { secs, frac_secs }
        }
    }

    /// Create a time spec from whole seconds plus a tick count.
    pub fn from_ticks(secs: u32, ticks: u32, tick_rate: TickRate) -> Self {
        Self::new(secs, f64::from(ticks) / tick_rate.get())
    }

    /// Fractional part expressed in ticks, rounded to the nearest tick.
    ///
    /// A fraction within half a tick of the next second rounds to
    /// `tick_rate` itself; use [`TimeSpec::to_ticks`] for wire values.
    pub fn get_ticks(&self, tick_rate: TickRate) -> u32 {
        (self.frac_secs * tick_rate.get()).round() as u32
    }

    /// Whole seconds and ticks as carried on the wire.
    ///
    /// Ticks are always below `tick_rate`; a rounded-up fraction carries
    /// into the seconds.
    pub fn to_ticks(&self, tick_rate: TickRate) -> (u32, u32) {
        carry_ticks(self.secs, (self.frac_secs * tick_rate.get()).round(), tick_rate)
    }

    /// Replace the fractional part with `ticks / tick_rate`.
    pub fn set_ticks(&mut self, ticks: u32, tick_rate: TickRate) {
        *self = Self::from_ticks(self.secs, ticks, tick_rate);
    }

    /// Time as real seconds.
    pub fn to_real_secs(&self) -> f64 {
        f64::from(self.secs) + self.frac_secs
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}s", self.to_real_secs())
    }
}

/// Convert whole seconds plus ticks to real seconds.
pub fn ticks_to_seconds(secs: u32, ticks: u32, tick_rate: TickRate) -> f64 {
    f64::from(secs) + f64::from(ticks) / tick_rate.get()
}

/// Split real seconds into whole seconds and ticks.
///
/// Inverse of [`ticks_to_seconds`] whenever `secs * tick_rate` stays well
/// inside the 52-bit mantissa of an `f64`. At 200 MHz that holds for `secs`
/// below 2^20; epoch-scale seconds lose ticks to rounding, so keep them
/// split as a [`TimeSpec`].
pub fn seconds_to_ticks(real_secs: f64, tick_rate: TickRate) -> (u32, u32) {
    let whole = real_secs.floor();
    carry_ticks(
        whole as u32,
        ((real_secs - whole) * tick_rate.get()).round(),
        tick_rate,
    )
}

fn carry_ticks(secs: u32, ticks: f64, tick_rate: TickRate) -> (u32, u32) {
    if ticks >= tick_rate.get() {
        (secs.wrapping_add(1), (ticks - tick_rate.get()) as u32)
    } else {
        (secs, ticks as u32)
    }
}

/// 4-bit packet sequence counter carried in header word 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PacketCount(u8);

impl PacketCount {
    pub const ZERO: Self = Self(0);

    /// Build a counter, keeping only the low 4 bits of `value`.
    pub fn new(value: u32) -> Self {
        Self((value & 0xF) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Self {
        Self((self.0 + 1) & 0xF)
    }
}

impl From<u8> for PacketCount {
    fn from(v: u8) -> Self {
        Self::new(u32::from(v))
    }
}

impl fmt::Display for PacketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata attached to an outgoing packet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TxMetadata {
    pub has_stream_id: bool,
    pub stream_id: u32,
    pub has_time_spec: bool,
    pub time_spec: TimeSpec,
    pub start_of_burst: bool,
    pub end_of_burst: bool,
}

impl TxMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream_id(mut self, stream_id: u32) -> Self {
        self.has_stream_id = true;
        self.stream_id = stream_id;
        self
    }

    pub fn with_time_spec(mut self, time_spec: TimeSpec) -> Self {
        self.has_time_spec = true;
        self.time_spec = time_spec;
        self
    }

    pub fn start_of_burst(mut self) -> Self {
        self.start_of_burst = true;
        self
    }

    pub fn end_of_burst(mut self) -> Self {
        self.end_of_burst = true;
        self
    }
}

/// Metadata recovered from an incoming packet header.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RxMetadata {
    pub has_stream_id: bool,
    pub stream_id: u32,
    pub has_time_spec: bool,
    pub time_spec: TimeSpec,
}

impl RxMetadata {
    /// Stream id, if the header carried one.
    pub fn stream_id(&self) -> Option<u32> {
        self.has_stream_id.then_some(self.stream_id)
    }

    /// Timestamp, if the header carried one.
    pub fn time_spec(&self) -> Option<TimeSpec> {
        self.has_time_spec.then_some(self.time_spec)
    }
}
