//! Timing probe around the interrupt pipeline.
//!
//! Drive a spare GPIO high for the duration of each block so the ISR's
//! duty cycle can be read off a scope or logic analyzer.

#[cfg(feature = "led")]
use embedded_hal::digital::OutputPin;

/// Brackets a section of work.
pub trait Probe {
    fn time<R>(&mut self, f: impl FnOnce() -> R) -> R;
}

/// Probe that does nothing.
impl Probe for () {
    #[inline(always)]
    fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// Holds a pin high while the section runs.
#[cfg(feature = "led")]
///
/// Pin errors are ignored; a probe must never affect the measurement.
pub struct PinProbe<P> {
    pin: P,
}

#[cfg(feature = "led")]
impl<P: OutputPin> PinProbe<P> {
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        PinProbe { pin }
    }

    pub fn free(self) -> P {
        self.pin
    }
}

#[cfg(feature = "led")]
impl<P: OutputPin> Probe for PinProbe<P> {
    #[inline]
    fn time<R>(&mut self, f: impl FnOnce() -> R) -> R {
        let _ = self.pin.set_high();
        let r = f();
        let _ = self.pin.set_low();
        r
    }
}


#[cfg(all(test, feature = "led"))]
mod pin_tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;

    struct TracePin<'a> {
        high: &'a Cell<bool>,
        edges: &'a Cell<u32>,
    }

    impl embedded_hal::digital::ErrorType for TracePin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for TracePin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high.set(false);
            self.edges.set(self.edges.get() + 1);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high.set(true);
            self.edges.set(self.edges.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn pin_is_high_only_inside() {
        let high = Cell::new(true);
        let edges = Cell::new(0);
        let mut probe = PinProbe::new(TracePin {
            high: &high,
            edges: &edges,
        });
        assert!(!high.get());

        let seen = probe.time(|| high.get());
        assert!(seen, "pin low during the timed section");
        assert!(!high.get());
        assert_eq!(edges.get(), 3);
    }
}
