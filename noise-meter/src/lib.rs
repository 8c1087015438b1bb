//! # noise-meter
//!
//! A `no_std`, allocation-free sound level meter for I²S MEMS microphones on
//! Cortex-M microcontrollers. Samples are equalized, frequency weighted and
//! integrated inside the DMA interrupt; the foreground loop sleeps until a
//! measurement window closes and then reports the equivalent continuous level
//! (Leq) in dB SPL.
//!
//! ## Architecture
//!
//! | Stage | Module | Context |
//! |-------|--------|---------|
//! | Configuration | [`config`] / [`constants`] | startup |
//! | Ingestion | [`io`] | interrupt |
//! | Filtering | [`dsp`] | interrupt |
//! | Integration | [`pipeline`] | interrupt |
//! | Handoff / idle | [`sched`] | both |
//! | dB conversion | [`calibration`] | foreground |
//! | Output | [`sink`] / [`meter`] | foreground |
//!
//! ## Quick start
//!
//! ```ignore
//! use noise_meter::sched::{Handoff, SpinIdle};
//! use noise_meter::sink::TextSink;
//! use noise_meter::{Meter, MeterConfig, Pipeline};
//!
//! let config = MeterConfig::default().with_update_interval(500);
//! let mut handoff = Handoff::new();
//! let (producer, consumer) = handoff.split(config.window()?);
//!
//! // calibration, then filters, then the peripheral
//! let mut meter = Meter::new(consumer, config.calibration()?, TextSink::new(uart));
//! let mut pipeline = Pipeline::<256>::new(&config, producer)?;
//!
//! // DMA ISR: pipeline.on_transfer_complete(&rx_buffer, half);
//! meter.start()?;
//! meter.run(&mut SpinIdle);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `led` | yes | [`sink::LedBarSink`] and [`io::PinProbe`] (requires `embedded-hal`) |
//! | `serial` | yes | [`sink::TextSink`] (requires `embedded-io`) |
//! | `cortex-m` | no | `WFI` and sleep-on-exit idle policies |
//!
//! ## Audio parameters
//!
//! - **Sample rate:** 48 kHz ([`constants::SAMPLE_RATE`])
//! - **Sample format:** 18-bit, half-word swapped in a `u32` ([`constants::MIC_BITS`])
//! - **Window:** 1 s by default ([`MeterConfig::with_update_interval`])

#![no_std]

pub mod calibration;
pub mod config;
pub mod constants;
pub mod dsp;
pub mod error;
pub mod io;
pub mod meter;
pub mod pipeline;
pub mod sched;
pub mod sink;

pub use config::MeterConfig;
pub use error::ConfigError;
pub use meter::Meter;
pub use pipeline::Pipeline;
