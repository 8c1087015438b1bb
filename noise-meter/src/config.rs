//! Meter parameter set.
//!
//! Sample rate, decimation, window length and curves are a tunable family
//! rather than fixed constants. Everything is checked by
//! [`MeterConfig::validate`] before the DMA transfer starts; nothing is
//! reconfigured at runtime.

use core::num::NonZeroU32;

use crate::calibration::Calibration;
use crate::constants::*;
use crate::dsp::designs::{
    A_WEIGHTING, C_WEIGHTING, FLAT_EQUALIZER, SPH0645LM4H_B, Z_WEIGHTING,
};
use crate::dsp::SosDesign;
use crate::error::ConfigError;
use crate::io::ingest::{Decimator, SampleFormat, WordFormat};

/// Frequency weighting curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    #[default]
    A,
    C,
    /// Unweighted.
    Z,
}

impl Weighting {
    pub fn design(self) -> &'static SosDesign<3> {
        match self {
            Weighting::A => &A_WEIGHTING,
            Weighting::C => &C_WEIGHTING,
            Weighting::Z => &Z_WEIGHTING,
        }
    }
}

/// Microphone response correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Equalizer {
    #[default]
    Sph0645,
    Flat,
}

impl Equalizer {
    pub fn design(self) -> &'static SosDesign<2> {
        match self {
            Equalizer::Sph0645 => &SPH0645LM4H_B,
            Equalizer::Flat => &FLAT_EQUALIZER,
        }
    }
}

/// Complete build-time parameter set of the meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterConfig {
    /// I2S frame rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel slots per frame.
    pub channels: u8,
    /// DMA buffer length in words, both halves.
    pub buffer_words: usize,
    /// Words per decimated sample.
    pub stride: usize,
    /// Word offset of the microphone slot inside each stride.
    pub channel: usize,
    /// Significant microphone bits.
    pub bits: u8,
    pub word_format: WordFormat,
    /// Decimated samples per measurement window.
    pub window_samples: u32,
    pub sensitivity_dbfs: f32,
    pub reference_db: f32,
    pub offset_db: f32,
    pub equalizer: Equalizer,
    pub weighting: Weighting,
}

impl Default for MeterConfig {
    fn default() -> Self {
        let config = MeterConfig {
            sample_rate: SAMPLE_RATE,
            channels: I2S_CHANNELS,
            buffer_words: I2S_BUFFER_WORDS,
            stride: I2S_STRIDE,
            channel: 0,
            bits: MIC_BITS,
            word_format: WordFormat::HalfWordSwapped,
            window_samples: 0,
            sensitivity_dbfs: MIC_SENSITIVITY,
            reference_db: MIC_REF_DB,
            offset_db: MIC_OFFSET_DB,
            equalizer: Equalizer::default(),
            weighting: Weighting::default(),
        };
        config.with_update_interval(1000)
    }
}

impl MeterConfig {
    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.buffer_words == 0 || self.buffer_words % 2 != 0 {
            return Err(ConfigError::OddBufferLength(self.buffer_words));
        }
        if self.stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if self.half_len() % self.stride != 0 {
            return Err(ConfigError::StrideNotDivisor {
                stride: self.stride,
                half_len: self.half_len(),
            });
        }
        self.window()?;
        self.decimator()?;
        self.calibration()?;
        Ok(())
    }

    /// Words per DMA half.
    pub fn half_len(&self) -> usize {
        self.buffer_words / 2
    }

    /// Decimated samples produced per half-transfer.
    pub fn samples_per_transfer(&self) -> usize {
        match self.stride {
            0 => 0,
            stride => self.half_len() / stride,
        }
    }

    /// Effective rate in Hz after decimation.
    pub fn decimated_rate(&self) -> f32 {
        if self.stride == 0 {
            return 0.0;
        }
        self.sample_rate as f32 * self.channels as f32 / self.stride as f32
    }

    /// [`decimated_rate`](Self::decimated_rate) in whole Hz.
    pub fn decimated_rate_hz(&self) -> u32 {
        if self.stride == 0 {
            return 0;
        }
        let words_per_sec = self.sample_rate as u64 * self.channels as u64;
        (words_per_sec / self.stride as u64).min(u32::MAX as u64) as u32
    }

    /// Window length that yields one reading every `millis` milliseconds.
    pub fn window_for_millis(&self, millis: u32) -> u32 {
        if self.stride == 0 {
            return 0;
        }
        let words_per_sec = self.sample_rate as u64 * self.channels as u64;
        let samples = words_per_sec * millis as u64 / (self.stride as u64 * 1000);
        samples.min(u32::MAX as u64) as u32
    }

    /// Set the window for one reading every `millis` milliseconds.
    pub fn with_update_interval(mut self, millis: u32) -> Self {
        self.window_samples = self.window_for_millis(millis);
        self
    }

    pub fn window(&self) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(self.window_samples).ok_or(ConfigError::ZeroWindow)
    }

    pub fn sample_format(&self) -> Result<SampleFormat, ConfigError> {
        SampleFormat::new(self.bits, self.word_format)
    }

    pub fn decimator(&self) -> Result<Decimator, ConfigError> {
        Decimator::new(self.stride, self.channel, self.sample_format()?)
    }

    pub fn calibration(&self) -> Result<Calibration, ConfigError> {
        Calibration::new(
            self.sensitivity_dbfs,
            self.reference_db,
            self.offset_db,
            &self.sample_format()?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = MeterConfig::default();
        config.validate().unwrap();
        assert_eq!(config.half_len(), 512);
        assert_eq!(config.samples_per_transfer(), 256);
        assert_eq!(config.decimated_rate(), 48_000.0);
        assert_eq!(config.decimated_rate_hz(), 48_000);
        assert_eq!(config.window_samples, 48_000);
    }

    #[test]
    fn update_interval_scales_window() {
        let config = MeterConfig::default().with_update_interval(500);
        assert_eq!(config.window_samples, 24_000);

        let config = MeterConfig {
            stride: 16,
            ..MeterConfig::default()
        }
        .with_update_interval(1000);
        assert_eq!(config.window_samples, 6_000);
        assert_eq!(config.samples_per_transfer(), 32);
        assert_eq!(config.decimated_rate_hz(), 6_000);
    }

    #[test]
    fn zero_window_rejected() {
        let config = MeterConfig {
            window_samples: 0,
            ..MeterConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindow));

        let config = MeterConfig::default().with_update_interval(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn buffer_and_stride_checked() {
        let base = MeterConfig::default();

        let odd = MeterConfig {
            buffer_words: 1023,
            ..base
        };
        assert_eq!(odd.validate(), Err(ConfigError::OddBufferLength(1023)));

        let empty = MeterConfig {
            buffer_words: 0,
            ..base
        };
        assert_eq!(empty.validate(), Err(ConfigError::OddBufferLength(0)));

        let zero = MeterConfig { stride: 0, ..base };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroStride));
        assert_eq!(zero.samples_per_transfer(), 0);

        let uneven = MeterConfig { stride: 3, ..base };
        assert_eq!(
            uneven.validate(),
            Err(ConfigError::StrideNotDivisor {
                stride: 3,
                half_len: 512
            })
        );

        let slot = MeterConfig { channel: 2, ..base };
        assert_eq!(
            slot.validate(),
            Err(ConfigError::ChannelOutOfRange {
                channel: 2,
                stride: 2
            })
        );
    }

    #[test]
    fn bits_and_calibration_checked() {
        let base = MeterConfig::default();
        assert_eq!(
            MeterConfig { bits: 40, ..base }.validate(),
            Err(ConfigError::InvalidBitDepth(40))
        );
        assert_eq!(
            MeterConfig {
                sensitivity_dbfs: f32::NAN,
                ..base
            }
            .validate(),
            Err(ConfigError::NonFiniteCalibration)
        );
        assert_eq!(
            MeterConfig {
                sample_rate: 0,
                ..base
            }
            .validate(),
            Err(ConfigError::ZeroSampleRate)
        );
    }

    #[test]
    fn curves_select_designs() {
        assert_eq!(Weighting::A.design(), &A_WEIGHTING);
        assert_eq!(Weighting::Z.design().gain, 1.0);
        assert_eq!(Equalizer::Flat.design(), &FLAT_EQUALIZER);
        assert_eq!(Equalizer::default(), Equalizer::Sph0645);
    }
}
