//! Output sinks for finished readings.
//!
//! | Sink | Output | Feature |
//! |------|--------|---------|
//! | [`TextSink`] | `" 72dB\n"` over a byte stream (UART) | `serial` |
//! | [`LedBarSink`] | one of ten indicators, pulsed per reading | `led` |
//!
//! Both implement [`Sink`] and are interchangeable in
//! [`Meter`](crate::meter::Meter).

use crate::calibration::{display_value, Calibration};

#[cfg(feature = "led")]
mod led;
#[cfg(feature = "serial")]
mod text;

#[cfg(feature = "led")]
pub use led::{LedBarSink, Polarity};
#[cfg(feature = "serial")]
pub use text::TextSink;

/// Upper-exclusive dB bounds of indicator levels 0..=8; above the last is level 9.
pub const LEVEL_THRESHOLDS: [u16; 9] = [45, 55, 65, 75, 82, 87, 92, 97, 102];

/// Number of indicator levels.
pub const LEVELS: usize = LEVEL_THRESHOLDS.len() + 1;

/// Indicator level for a display value.
pub fn indicator_level(display: u16) -> usize {
    LEVEL_THRESHOLDS.partition_point(|&bound| bound <= display)
}

/// One finished measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Unclamped level.
    pub db: f32,
    /// Level clamped to `0..=999`.
    pub display: u16,
    in_range: bool,
}

impl Reading {
    pub fn new(db: f32, calibration: &Calibration) -> Self {
        Reading {
            db,
            display: display_value(db),
            in_range: db >= calibration.noise_db() && db < calibration.overload_db(),
        }
    }

    /// Whether the level lies between the microphone's noise floor and its
    /// acoustic overload point.
    pub fn in_range(&self) -> bool {
        self.in_range
    }

    /// Indicator level `0..LEVELS`.
    pub fn level(&self) -> usize {
        indicator_level(self.display)
    }
}

/// Destination for readings.
pub trait Sink {
    /// Error type of the underlying device.
    type Error: core::fmt::Debug;

    /// Called once before the first reading.
    fn start(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Deliver one reading.
    fn dispatch(&mut self, reading: &Reading) -> Result<(), Self::Error>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    type Error = S::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        (**self).start()
    }

    fn dispatch(&mut self, reading: &Reading) -> Result<(), Self::Error> {
        (**self).dispatch(reading)
    }
}
