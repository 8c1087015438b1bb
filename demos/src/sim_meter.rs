//! Sound level meter on the host.
//!
//! A "DMA" thread synthesizes a 1 kHz tone whose level sweeps between two
//! values, writes it into a circular I²S buffer one half at a time and calls
//! the pipeline exactly like the receive interrupt would. The main thread runs
//! the meter and prints each reading to stdout.
//!
//! ```text
//!   tone thread:  sweep ─► [u32; 1024] ─► Pipeline::on_transfer_complete ─┐
//!                                                                         │ Handoff
//!   main thread:  Meter::wait_and_dispatch ◄──────────────────────────────┘
//!                   └─► TextSink ─► stdout
//! ```
//!
//! Run with `RUST_LOG=debug` to see each reading logged as well.

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use noise_meter::config::{Equalizer, Weighting};
use noise_meter::io::{DmaHalf, SampleFormat};
use noise_meter::sched::{Handoff, Idle};
use noise_meter::sink::TextSink;
use noise_meter::{Meter, MeterConfig, Pipeline};

const BUFFER_WORDS: usize = noise_meter::constants::I2S_BUFFER_WORDS;
const SCRATCH: usize = BUFFER_WORDS / 2;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Curve {
    A,
    C,
    Z,
}

impl From<Curve> for Weighting {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::A => Weighting::A,
            Curve::C => Weighting::C,
            Curve::Z => Weighting::Z,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sim_meter")]
#[command(about = "Simulated I2S sound level meter", long_about = None)]
struct Opts {
    /// Level of the first reading in dB SPL
    #[arg(long, default_value_t = 40.0)]
    start_db: f64,

    /// Level of the last reading in dB SPL
    #[arg(long, default_value_t = 105.0)]
    end_db: f64,

    /// Tone frequency in Hz
    #[arg(long, default_value_t = 1000.0)]
    freq: f64,

    /// Number of readings to print
    #[arg(short, long, default_value_t = 14)]
    readings: u32,

    /// Frequency weighting
    #[arg(short, long, value_enum, default_value_t = Curve::A)]
    weighting: Curve,

    /// Skip the microphone response correction
    #[arg(long)]
    flat: bool,

    /// Milliseconds per reading
    #[arg(short, long, default_value_t = 500)]
    interval_ms: u32,

    /// Simulation speed relative to real time
    #[arg(long, default_value_t = 10.0)]
    speed: f32,
}

/// Standard output as an `embedded-io` byte sink.
struct Stdout(std::io::Stdout);

impl embedded_io::ErrorType for Stdout {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for Stdout {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf).map_err(|_| embedded_io::ErrorKind::Other)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush().map_err(|_| embedded_io::ErrorKind::Other)
    }
}

/// Yield the thread between checks; the host stand-in for `WFI`.
struct YieldIdle;

impl Idle for YieldIdle {
    fn idle(&mut self) {
        thread::yield_now();
    }
}

/// Tone whose level moves linearly from `start_db` to `end_db`.
struct Sweep {
    format: SampleFormat,
    stride: usize,
    channel: usize,
    rate: f64,
    freq: f64,
    reference_rms: f64,
    start_db: f64,
    slope_db: f64,
    n: u64,
}

impl Sweep {
    /// Level in dB SPL at the current sample.
    fn level(&self) -> f64 {
        self.start_db + self.slope_db * self.n as f64
    }

    fn fill(&mut self, half: &mut [u32]) {
        let full_scale = self.format.full_scale() as f64;
        for frame in half.chunks_exact_mut(self.stride) {
            let rms = self.reference_rms * 10f64.powf((self.level() - 94.0) / 20.0);
            let phase = std::f64::consts::TAU * (self.freq * self.n as f64 / self.rate).fract();
            let x = (rms * std::f64::consts::SQRT_2 * phase.sin()).clamp(-full_scale, full_scale);
            frame.fill(self.format.pack(0));
            frame[self.channel] = self.format.pack(x as i32);
            self.n += 1;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = MeterConfig {
        weighting: opts.weighting.into(),
        equalizer: if opts.flat {
            Equalizer::Flat
        } else {
            Equalizer::Sph0645
        },
        ..MeterConfig::default()
    }
    .with_update_interval(opts.interval_ms);
    config.validate().context("invalid meter configuration")?;

    let calibration = config.calibration()?;
    let total_samples = opts.readings.max(1) as f64 * config.window_samples as f64;
    let mut sweep = Sweep {
        format: config.sample_format()?,
        stride: config.stride,
        channel: config.channel,
        rate: config.decimated_rate_hz() as f64,
        freq: opts.freq,
        reference_rms: calibration.reference_amplitude() as f64,
        start_db: opts.start_db,
        slope_db: (opts.end_db - opts.start_db) / total_samples,
        n: 0,
    };

    let half_period = Duration::from_secs_f32(
        config.samples_per_transfer() as f32 / config.decimated_rate() / opts.speed.max(0.01),
    );

    tracing::info!(
        "simulating {} readings, {:.1} -> {:.1} dB at {} Hz, {:?} weighting",
        opts.readings,
        opts.start_db,
        opts.end_db,
        opts.freq,
        config.weighting,
    );

    let mut handoff = Handoff::new();
    let (producer, consumer) = handoff.split(config.window()?);
    let mut meter = Meter::new(consumer, calibration, TextSink::new(Stdout(std::io::stdout())));
    let mut pipeline = Pipeline::<SCRATCH>::new(&config, producer)?;
    let stop = AtomicBool::new(false);

    thread::scope(|s| -> anyhow::Result<()> {
        let stop = &stop;
        s.spawn(move || {
            let mut buffer = [0u32; BUFFER_WORDS];
            let mut half = DmaHalf::First;
            while !stop.load(Ordering::Relaxed) {
                let (first, second) = buffer.split_at_mut(BUFFER_WORDS / 2);
                match half {
                    DmaHalf::First => sweep.fill(first),
                    DmaHalf::Second => sweep.fill(second),
                }
                pipeline.on_transfer_complete(&buffer, half);
                half = half.other();
                thread::sleep(half_period);
            }
        });

        let result = (|| -> anyhow::Result<()> {
            meter.start().map_err(|e| anyhow!("stdout: {e:?}"))?;
            for _ in 0..opts.readings {
                meter
                    .wait_and_dispatch(&mut YieldIdle)
                    .map_err(|e| anyhow!("stdout: {e:?}"))?;
            }
            Ok(())
        })();
        stop.store(true, Ordering::Relaxed);
        result
    })?;

    tracing::info!(
        "done: {} readings, {} blocks discarded",
        meter.readings(),
        meter.overruns()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise_meter::io::WordFormat;

    #[test]
    fn tone_stays_exact_after_long_runs() {
        let format = SampleFormat::new(18, WordFormat::HalfWordSwapped).unwrap();
        // past 2^24 frames, on a whole number of 1 kHz periods
        let start = 48 * (1u64 << 21);
        let mut sweep = Sweep {
            format,
            stride: 2,
            channel: 0,
            rate: 48_000.0,
            freq: 1000.0,
            reference_rms: 1000.0,
            start_db: 94.0,
            slope_db: 0.0,
            n: start,
        };
        let mut half = [0u32; 64];
        sweep.fill(&mut half);

        let left: Vec<i32> = half.iter().step_by(2).map(|&w| format.extract(w)).collect();
        assert_eq!(left[0], 0);
        // quarter period later: the positive peak
        assert_eq!(left[12], 1414);
        assert_eq!(left[24], 0);
        assert_eq!(left[36], -1414);
        assert!(half.iter().skip(1).step_by(2).all(|&w| format.extract(w) == 0));
        assert_eq!(sweep.n, start + 32);
    }
}
