//! Startup configuration errors.
//!
//! Every parameter is checked once, before the DMA transfer is started. There
//! are no runtime errors in the measurement path itself.

use thiserror::Error;

/// A rejected configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The measurement window must contain at least one sample.
    #[error("measurement window length is zero")]
    ZeroWindow,

    /// A filter cascade needs at least one section.
    #[error("filter cascade has no sections")]
    EmptyCascade,

    /// A gain or section coefficient is NaN or infinite.
    #[error("filter coefficient is not finite")]
    NonFiniteCoefficient,

    /// The decimation stride must be at least one word.
    #[error("decimation stride is zero")]
    ZeroStride,

    /// The stride must divide the half-buffer length.
    #[error("stride {stride} does not divide half-buffer length {half_len}")]
    StrideNotDivisor {
        /// Configured stride.
        stride: usize,
        /// Words per DMA half.
        half_len: usize,
    },

    /// The channel slot offset must be smaller than the stride.
    #[error("channel offset {channel} is not below stride {stride}")]
    ChannelOutOfRange {
        /// Configured word offset.
        channel: usize,
        /// Configured stride.
        stride: usize,
    },

    /// Microphone bit depth outside `2..=32`.
    #[error("microphone bit depth {0} is out of range")]
    InvalidBitDepth(u8),

    /// The DMA buffer must split into two equal non-empty halves.
    #[error("DMA buffer length {0} cannot be split into two halves")]
    OddBufferLength(usize),

    /// The scratch region cannot hold one transfer's samples.
    #[error("scratch holds {capacity} samples, transfer yields {needed}")]
    ScratchTooSmall {
        /// Samples produced per half-transfer.
        needed: usize,
        /// Scratch capacity.
        capacity: usize,
    },

    /// Sensitivity, reference level or offset is NaN or infinite.
    #[error("calibration constant is not finite")]
    NonFiniteCalibration,

    /// The decimated stream does not run at the rate the built-in curves
    /// were designed for.
    #[error("decimated rate {rate} Hz does not match the {design} Hz filter designs")]
    RateMismatch {
        /// Configured rate after decimation.
        rate: u32,
        /// Design rate of the curves.
        design: u32,
    },

    /// The sample rate must be non-zero.
    #[error("sample rate is zero")]
    ZeroSampleRate,
}
