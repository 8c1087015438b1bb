//! Idle policies for the foreground wait.
//!
//! The consumer never busy-polls on hardware: it sleeps until an interrupt
//! arrives and rechecks the readiness flag. Which sleep primitive is used is
//! a policy chosen at startup.
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | [`SpinIdle`] | spin-loop hint, for hosts and tests |
//! | [`WaitForInterrupt`] | `WFI` between checks (feature `cortex-m`) |
//! | [`SleepOnExit`] | `WFI` with SLEEPONEXIT: interrupts return straight to sleep until the window closes (feature `cortex-m`) |

/// A way to pass time until a condition becomes true.
pub trait Idle {
    /// Sleep until something may have changed.
    fn idle(&mut self);

    /// Idle until `done()` returns `true`.
    fn wait_until<F: FnMut() -> bool>(&mut self, mut done: F) {
        while !done() {
            self.idle();
        }
    }
}

/// Spin with a processor hint between checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinIdle;

impl Idle for SpinIdle {
    #[inline]
    fn idle(&mut self) {
        core::hint::spin_loop();
    }
}

#[cfg(feature = "cortex-m")]
pub use self::cortex::{wake_from_isr, SleepOnExit, WaitForInterrupt};

#[cfg(feature = "cortex-m")]
mod cortex {
    use cortex_m::peripheral::SCB;

    use super::Idle;

    /// SLEEPONEXIT bit of the System Control Register.
    const SCR_SLEEPONEXIT: u32 = 1 << 1;

    /// Sleep with `WFI` until the next interrupt, then recheck.
    ///
    /// A window that closes between the check and `WFI` is noticed after the
    /// following interrupt, one DMA half-period later at most.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WaitForInterrupt;

    impl Idle for WaitForInterrupt {
        #[inline]
        fn idle(&mut self) {
            cortex_m::asm::wfi();
        }
    }

    /// Sleep-on-exit: after an interrupt the core goes back to sleep without
    /// resuming thread mode, until [`wake_from_isr`] clears the bit.
    ///
    /// The interrupt that closes a window must call [`wake_from_isr`].
    pub struct SleepOnExit {
        scb: SCB,
    }

    impl SleepOnExit {
        pub fn new(scb: SCB) -> Self {
            SleepOnExit { scb }
        }

        pub fn free(self) -> SCB {
            self.scb
        }
    }

    impl Idle for SleepOnExit {
        fn idle(&mut self) {
            cortex_m::asm::wfi();
        }

        fn wait_until<F: FnMut() -> bool>(&mut self, mut done: F) {
            loop {
                // Arm before checking: a wake between the check and WFI then
                // leaves the bit clear and WFI returns after one interrupt.
                self.scb.set_sleeponexit();
                if done() {
                    self.scb.clear_sleeponexit();
                    return;
                }
                cortex_m::asm::wfi();
            }
        }
    }

    /// Let the core return to thread mode after the current interrupt.
    ///
    /// Call from the interrupt that closed a window.
    #[inline]
    pub fn wake_from_isr() {
        // SAFETY: single read-modify-write of SCR from interrupt context. The
        // thread-mode writer (`SleepOnExit`) cannot run while we do.
        unsafe {
            (*SCB::PTR).scr.modify(|scr| scr & !SCR_SLEEPONEXIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingIdle(u32);

    impl Idle for CountingIdle {
        fn idle(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn wait_until_idles_between_checks() {
        let mut idle = CountingIdle(0);
        let mut polls = 0;
        idle.wait_until(|| {
            polls += 1;
            polls == 4
        });
        assert_eq!(polls, 4);
        assert_eq!(idle.0, 3);
    }

    #[test]
    fn wait_until_done_does_not_idle() {
        let mut idle = CountingIdle(0);
        idle.wait_until(|| true);
        assert_eq!(idle.0, 0);
    }

    #[test]
    fn spin_idle_returns() {
        let mut n = 0;
        SpinIdle.wait_until(|| {
            n += 1;
            n > 10
        });
        assert_eq!(n, 11);
    }
}
