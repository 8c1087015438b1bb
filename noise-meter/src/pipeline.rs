//! Interrupt-context measurement pipeline.
//!
//! One call per completed DMA half:
//!
//! ```text
//! DMA half ──ingest──► scratch ──equalizer──► scratch ──weighting + Σ(y·g)²──► Producer::append
//! ```
//!
//! Everything here runs inside the DMA interrupt: fixed-size buffers, no
//! allocation, no blocking and no logging.
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! // init: build in dependency order
//! let config = MeterConfig::default();
//! let (producer, consumer) = HANDOFF.split(config.window()?);
//! let pipeline = Pipeline::<256>::new(&config, producer)?;
//! // ... then start the I2S/DMA transfer
//!
//! // DMA half/complete ISR:
//! let half = DmaHalf::from_buffer_complete(dma.is_complete());
//! let closed = pipeline.on_transfer_complete_timed(&DMA_RX_BUFFER, half, &mut probe);
//! if closed == Append::WindowClosed {
//!     noise_meter::sched::power::wake_from_isr();
//! }
//! ```

use crate::config::MeterConfig;
use crate::dsp::designs::DESIGN_RATE;
use crate::dsp::{SosDesign, SosFilter};
use crate::error::ConfigError;
use crate::io::ingest::{Decimator, DmaHalf};
use crate::io::probe::Probe;
use crate::sched::{Append, Producer};

/// The producer side of the meter.
///
/// `SCRATCH` is the capacity of the sample scratch region and must hold at
/// least one half-transfer's worth of decimated samples. `EQ` and `WT` are the
/// section counts of the equalizer and weighting cascades.
pub struct Pipeline<'a, const SCRATCH: usize, const EQ: usize = 2, const WT: usize = 3> {
    decimator: Decimator,
    equalizer: SosFilter<EQ>,
    weighting: SosFilter<WT>,
    scratch: [f32; SCRATCH],
    producer: Producer<'a>,
}

impl<'a, const SCRATCH: usize> Pipeline<'a, SCRATCH> {
    /// Build the pipeline with the curves selected in `config`.
    ///
    /// The built-in curves are only valid at [`DESIGN_RATE`], so the decimated
    /// rate must match it exactly.
    pub fn new(config: &MeterConfig, producer: Producer<'a>) -> Result<Self, ConfigError> {
        config.validate()?;
        let rate = config.decimated_rate_hz();
        if rate != DESIGN_RATE {
            return Err(ConfigError::RateMismatch {
                rate,
                design: DESIGN_RATE,
            });
        }
        Self::with_designs(
            config,
            config.equalizer.design(),
            config.weighting.design(),
            producer,
        )
    }
}

impl<'a, const SCRATCH: usize, const EQ: usize, const WT: usize> Pipeline<'a, SCRATCH, EQ, WT> {
    /// Build the pipeline with custom equalizer and weighting cascades.
    pub fn with_designs(
        config: &MeterConfig,
        equalizer: &SosDesign<EQ>,
        weighting: &SosDesign<WT>,
        producer: Producer<'a>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let needed = config.samples_per_transfer();
        if needed > SCRATCH {
            return Err(ConfigError::ScratchTooSmall {
                needed,
                capacity: SCRATCH,
            });
        }

        let pipeline = Pipeline {
            decimator: config.decimator()?,
            equalizer: SosFilter::from_design(equalizer)?,
            weighting: SosFilter::from_design(weighting)?,
            scratch: [0.0; SCRATCH],
            producer,
        };

        log::info!(
            "pipeline: {} samples/transfer at {} Hz, window {} samples, {}+{} sections",
            needed,
            config.decimated_rate(),
            pipeline.producer.window(),
            EQ,
            WT,
        );

        Ok(pipeline)
    }

    /// Process the half of `buffer` the hardware has just completed.
    ///
    /// `buffer` is the whole circular DMA buffer; the sample count comes from
    /// the length of its half, capped at `SCRATCH`. The block is always run
    /// through both cascades so filter state stays continuous, even when the
    /// energy is discarded because the previous window is still pending.
    pub fn on_transfer_complete(&mut self, buffer: &[u32], half: DmaHalf) -> Append {
        let src = half.of(buffer);
        let n = self.decimator.ingest(src, &mut self.scratch);
        let samples = &mut self.scratch[..n];

        self.equalizer.filter(samples);
        let sum_sqr = self.weighting.filter_sum_sqr(samples);

        self.producer.append(sum_sqr, n as u32)
    }

    /// [`on_transfer_complete`](Self::on_transfer_complete) bracketed by a
    /// timing probe.
    pub fn on_transfer_complete_timed<P: Probe>(
        &mut self,
        buffer: &[u32],
        half: DmaHalf,
        probe: &mut P,
    ) -> Append {
        probe.time(|| self.on_transfer_complete(buffer, half))
    }

    /// Zero the state of both cascades.
    pub fn reset_filters(&mut self) {
        self.equalizer.reset();
        self.weighting.reset();
    }

    pub fn equalizer(&self) -> &SosFilter<EQ> {
        &self.equalizer
    }

    pub fn weighting(&self) -> &SosFilter<WT> {
        &self.weighting
    }
}
