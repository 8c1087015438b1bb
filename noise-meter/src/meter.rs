//! Foreground measurement loop.
//!
//! Waits for the interrupt to close a window, turns the drained energy into a
//! [`Reading`] and hands it to a [`Sink`]. Logging and output happen here and
//! never in the interrupt.

use crate::calibration::Calibration;
use crate::sched::{Consumer, Idle, WindowGuard};
use crate::sink::{Reading, Sink};

/// Consumer side of the meter.
pub struct Meter<'a, S> {
    consumer: Consumer<'a>,
    calibration: Calibration,
    sink: S,
    stats: Stats,
}

#[derive(Debug, Default)]
struct Stats {
    readings: u32,
    last_overruns: u32,
}

impl<'a, S: Sink> Meter<'a, S> {
    pub fn new(consumer: Consumer<'a>, calibration: Calibration, sink: S) -> Self {
        Meter {
            consumer,
            calibration,
            sink,
            stats: Stats::default(),
        }
    }

    /// Announce the meter on the sink. Call once before the first reading.
    pub fn start(&mut self) -> Result<(), S::Error> {
        log::info!(
            "meter: reference amplitude {}, limits {}..{} dB",
            self.calibration.reference_amplitude(),
            self.calibration.noise_db(),
            self.calibration.overload_db(),
        );
        self.sink.start()
    }

    /// Dispatch the pending window if one has closed.
    pub fn poll(&mut self) -> Result<Option<Reading>, S::Error> {
        match self.consumer.try_take() {
            Some(guard) => {
                dispatch(guard, &self.calibration, &mut self.sink, &mut self.stats).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Block until the next window closes, then dispatch it.
    pub fn wait_and_dispatch<I: Idle>(&mut self, idle: &mut I) -> Result<Reading, S::Error> {
        let guard = self.consumer.wait(idle);
        dispatch(guard, &self.calibration, &mut self.sink, &mut self.stats)
    }

    /// Measure forever. Sink errors are logged and the loop carries on.
    pub fn run<I: Idle>(&mut self, idle: &mut I) -> ! {
        loop {
            if let Err(e) = self.wait_and_dispatch(idle) {
                log::warn!("meter: sink error: {:?}", e);
            }
        }
    }

    /// Readings produced so far.
    pub fn readings(&self) -> u32 {
        self.stats.readings
    }

    /// Blocks the producer discarded because a window was still pending.
    pub fn overruns(&self) -> u32 {
        self.consumer.overruns()
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn sink(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn free(self) -> (Consumer<'a>, S) {
        (self.consumer, self.sink)
    }
}

/// Convert, report and deliver one window. The window reopens when `guard`
/// is released before the sink runs, so blocks completing during a slow
/// dispatch still count toward the next window.
fn dispatch<S: Sink>(
    guard: WindowGuard<'_, '_>,
    calibration: &Calibration,
    sink: &mut S,
    stats: &mut Stats,
) -> Result<Reading, S::Error> {
    let reading = Reading::new(calibration.leq(guard.window()), calibration);
    stats.readings = stats.readings.wrapping_add(1);

    let overruns = guard.overruns();
    if overruns != stats.last_overruns {
        log::warn!(
            "meter: {} blocks discarded, consumer is falling behind",
            overruns.wrapping_sub(stats.last_overruns)
        );
        stats.last_overruns = overruns;
    }
    log::debug!(
        "reading {}: {} dB (display {}, level {}{})",
        stats.readings,
        reading.db,
        reading.display,
        reading.level(),
        if reading.in_range() { "" } else { ", out of range" },
    );

    guard.release();
    sink.dispatch(&reading)?;
    Ok(reading)
}
