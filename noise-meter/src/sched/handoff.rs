//! Interrupt-to-thread handoff of the energy accumulator.
//!
//! One [`Handoff`] holds the running `Σ y²` and sample count of the open
//! measurement window plus a single readiness flag. It is split into a
//! [`Producer`] (the DMA interrupt) and a [`Consumer`] (the foreground loop).
//!
//! ## Protocol
//!
//! ```text
//!            producer: count >= window          consumer: guard released
//! Accumulating ─────────────────────────► Ready ─────────────────────────► Accumulating
//!   producer owns the accumulator          consumer owns the accumulator
//! ```
//!
//! - Only the producer sets the flag, only the consumer clears it.
//! - While the flag is set the producer discards its blocks and never touches
//!   the accumulator, so the consumer reads a complete, stable window.
//! - The consumer zeroes the accumulator exactly once, immediately before it
//!   clears the flag.
//!
//! Only atomic loads and stores are used, so the protocol also runs on cores
//! without compare-and-swap (ARMv6-M).

use core::cell::UnsafeCell;
use core::num::NonZeroU32;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::power::Idle;

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum_sqr: f32,
    samples: u32,
}

/// Shared state between the interrupt and the foreground loop.
pub struct Handoff {
    acc: UnsafeCell<Accumulator>,
    /// `true` while a closed window waits to be drained.
    ready: AtomicBool,
    /// Blocks discarded while `ready` was set. Written by the producer only.
    overruns: AtomicU32,
}

// SAFETY: `acc` is only accessed by the side that currently owns it according
// to `ready` (producer while clear, consumer while set). Ownership changes
// through Release stores paired with Acquire loads, which orders every
// accumulator access before the next owner's first access. `split()` hands out
// exactly one producer and one consumer.
unsafe impl Sync for Handoff {}

impl Handoff {
    /// An empty handoff in the Accumulating state.
    pub const fn new() -> Self {
        Handoff {
            acc: UnsafeCell::new(Accumulator {
                sum_sqr: 0.0,
                samples: 0,
            }),
            ready: AtomicBool::new(false),
            overruns: AtomicU32::new(0),
        }
    }

    /// Split into the two endpoints.
    ///
    /// `window` is the number of samples after which the producer closes the
    /// window; it is validated by [`MeterConfig`](crate::config::MeterConfig).
    pub fn split(&mut self, window: NonZeroU32) -> (Producer<'_>, Consumer<'_>) {
        let this = &*self;
        (
            Producer {
                handoff: this,
                window: window.get(),
            },
            Consumer { handoff: this },
        )
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`Producer::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    /// Added to the open window.
    Accumulating,
    /// Added, and the window reached its target: the consumer must be woken.
    WindowClosed,
    /// The previous window has not been drained yet; the block was dropped.
    Discarded,
}

/// Interrupt-side endpoint.
pub struct Producer<'a> {
    handoff: &'a Handoff,
    window: u32,
}

impl Producer<'_> {
    /// Add one block's `Σ y²` and sample count to the open window.
    ///
    /// Never blocks. While a closed window is pending the block is discarded
    /// and counted as an overrun.
    pub fn append(&mut self, sum_sqr: f32, samples: u32) -> Append {
        let h = self.handoff;
        if h.ready.load(Ordering::Acquire) {
            // Single writer: load/store is enough, no RMW needed.
            let n = h.overruns.load(Ordering::Relaxed);
            h.overruns.store(n.wrapping_add(1), Ordering::Relaxed);
            return Append::Discarded;
        }

        // SAFETY: `ready` is clear, so the consumer does not access `acc`
        // until we set it below.
        let acc = unsafe { &mut *h.acc.get() };
        acc.sum_sqr += sum_sqr;
        acc.samples = acc.samples.saturating_add(samples);

        if acc.samples >= self.window {
            h.ready.store(true, Ordering::Release);
            Append::WindowClosed
        } else {
            Append::Accumulating
        }
    }

    /// Target sample count per window.
    pub fn window(&self) -> u32 {
        self.window
    }
}

/// A drained measurement window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub sum_sqr: f32,
    pub samples: NonZeroU32,
}

impl Window {
    /// `Σ y² / n`.
    pub fn mean_square(&self) -> f32 {
        self.sum_sqr / self.samples.get() as f32
    }
}

/// Foreground-side endpoint.
pub struct Consumer<'a> {
    handoff: &'a Handoff,
}

impl<'a> Consumer<'a> {
    /// Take the closed window if there is one, without blocking.
    pub fn try_take(&mut self) -> Option<WindowGuard<'_, 'a>> {
        if !self.handoff.ready.load(Ordering::Acquire) {
            return None;
        }
        Some(self.guard())
    }

    /// Block until a window closes, idling through `idle` meanwhile.
    pub fn wait<I: Idle>(&mut self, idle: &mut I) -> WindowGuard<'_, 'a> {
        let handoff = self.handoff;
        idle.wait_until(|| handoff.ready.load(Ordering::Acquire));
        self.guard()
    }

    /// Whether a closed window is waiting to be taken.
    pub fn is_ready(&self) -> bool {
        self.handoff.ready.load(Ordering::Acquire)
    }

    /// Blocks discarded so far because the consumer had not drained in time.
    pub fn overruns(&self) -> u32 {
        self.handoff.overruns.load(Ordering::Relaxed)
    }

    fn guard(&mut self) -> WindowGuard<'_, 'a> {
        // SAFETY: `ready` is set (checked with Acquire by the caller), so the
        // producer does not access `acc` until the guard clears it.
        let acc = unsafe { *self.handoff.acc.get() };
        let Some(samples) = NonZeroU32::new(acc.samples) else {
            unreachable!("window closed without samples");
        };
        WindowGuard {
            consumer: self,
            window: Window {
                sum_sqr: acc.sum_sqr,
                samples,
            },
        }
    }
}

/// Exclusive access to a closed window.
///
/// Dropping the guard (or calling [`release`](Self::release)) zeroes the
/// accumulator and reopens the window for the producer.
pub struct WindowGuard<'c, 'a> {
    consumer: &'c mut Consumer<'a>,
    window: Window,
}

impl WindowGuard<'_, '_> {
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// See [`Consumer::overruns`].
    pub fn overruns(&self) -> u32 {
        self.consumer.overruns()
    }

    /// Reopen the window. Same as dropping the guard.
    pub fn release(self) {}
}

impl Drop for WindowGuard<'_, '_> {
    fn drop(&mut self) {
        let h = self.consumer.handoff;
        // SAFETY: `ready` is still set; we are the only side touching `acc`.
        unsafe {
            *h.acc.get() = Accumulator::default();
        }
        h.ready.store(false, Ordering::Release);
    }
}
