//! Ten-step LED level indicator.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::{Reading, Sink, LEVELS};

/// Electrical level that lights an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// LED between supply and pin: driving low lights it.
    #[default]
    ActiveLow,
    ActiveHigh,
}

/// Lights the indicator for the reading's level (see
/// [`LEVEL_THRESHOLDS`](super::LEVEL_THRESHOLDS)).
///
/// The current level stays lit between readings. Each new reading turns the
/// previous indicator off and pulses the new one (off, hold, on) so a steady
/// level still shows a fresh measurement.
pub struct LedBarSink<P, D> {
    leds: [P; LEVELS],
    delay: D,
    polarity: Polarity,
    hold_ms: u32,
    lit: Option<usize>,
}

impl<P: OutputPin, D: DelayNs> LedBarSink<P, D> {
    /// `leds[0]` is the quietest level.
    pub fn new(leds: [P; LEVELS], delay: D, polarity: Polarity, hold_ms: u32) -> Self {
        LedBarSink {
            leds,
            delay,
            polarity,
            hold_ms,
            lit: None,
        }
    }

    pub fn free(self) -> ([P; LEVELS], D) {
        (self.leds, self.delay)
    }

    /// Level currently lit, if any.
    pub fn lit(&self) -> Option<usize> {
        self.lit
    }

    fn set(&mut self, index: usize, on: bool) -> Result<(), P::Error> {
        let pin = &mut self.leds[index];
        match (self.polarity, on) {
            (Polarity::ActiveLow, true) | (Polarity::ActiveHigh, false) => pin.set_low(),
            (Polarity::ActiveLow, false) | (Polarity::ActiveHigh, true) => pin.set_high(),
        }
    }
}

impl<P: OutputPin, D: DelayNs> Sink for LedBarSink<P, D> {
    type Error = P::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        for i in 0..LEVELS {
            self.set(i, false)?;
        }
        self.lit = None;
        Ok(())
    }

    fn dispatch(&mut self, reading: &Reading) -> Result<(), Self::Error> {
        let level = reading.level();
        if let Some(prev) = self.lit.filter(|&prev| prev != level) {
            self.set(prev, false)?;
        }
        self.set(level, false)?;
        self.delay.delay_ms(self.hold_ms);
        self.set(level, true)?;
        self.lit = Some(level);
        Ok(())
    }
}
