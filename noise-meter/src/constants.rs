/// I2S sample rate in Hz (word-select frequency).
pub const SAMPLE_RATE: u32 = 48_000;

/// Interleaved channel slots per I2S frame.
pub const I2S_CHANNELS: u8 = 2;

/// Length of the circular DMA receive buffer in `u32` words (both halves).
pub const I2S_BUFFER_WORDS: usize = 1024;

/// Words taken per decimated sample. Stride 2 keeps the left slot at the full rate.
pub const I2S_STRIDE: usize = 2;

/// Significant bits delivered by the microphone.
pub const MIC_BITS: u8 = 18;

/// Sensitivity in dBFS at [`MIC_REF_DB`].
pub const MIC_SENSITIVITY: f32 = -26.0;

/// Sound pressure level (dB SPL) at which the sensitivity is specified.
pub const MIC_REF_DB: f32 = 94.0;

/// Linear trim added to every reading.
pub const MIC_OFFSET_DB: f32 = 0.0;

/// Acoustic overload point.
pub const MIC_OVERLOAD_DB: f32 = 120.0;

/// Self-noise floor.
pub const MIC_NOISE_DB: f32 = 29.0;

/// Largest value the display can show.
pub const DISPLAY_MAX: u16 = 999;
