//! Raw I2S word extraction and stride decimation.
//!
//! The DMA engine fills a circular buffer of `u32` words and interrupts each
//! time one half is complete. The completed half is read here while the
//! hardware fills the other one:
//!
//! ```text
//! DMA buffer                         scratch (f32)
//! ┌──────────┬──────────┐            ┌───────────────┐
//! │  First   │  Second  │──stride──► │ half / stride │
//! └──────────┴──────────┘            └───────────────┘
//!   ▲ hardware writes one half, the ISR reads the other
//! ```
//!
//! Samples are written into a separate scratch region owned by the
//! [`Pipeline`](crate::pipeline::Pipeline); the DMA memory is never reused.

use crate::error::ConfigError;

/// Which half of the circular DMA buffer has just been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaHalf {
    First,
    Second,
}

impl DmaHalf {
    /// Map the driver's "buffer complete" flag (as opposed to half-complete).
    pub fn from_buffer_complete(complete: bool) -> Self {
        if complete {
            DmaHalf::Second
        } else {
            DmaHalf::First
        }
    }

    /// The completed half of `buffer`.
    ///
    /// `buffer` must have an even length; the odd trailing word, if any, is
    /// never returned.
    pub fn of(self, buffer: &[u32]) -> &[u32] {
        let half_len = buffer.len() / 2;
        match self {
            DmaHalf::First => &buffer[..half_len],
            DmaHalf::Second => &buffer[half_len..2 * half_len],
        }
    }

    /// The other half.
    pub fn other(self) -> Self {
        match self {
            DmaHalf::First => DmaHalf::Second,
            DmaHalf::Second => DmaHalf::First,
        }
    }
}

/// How a sample sits in its 32-bit container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormat {
    /// MSB-aligned sample with the two 16-bit halves swapped, as delivered by
    /// a 16-bit-wide SPI/I2S data register into 32-bit memory.
    HalfWordSwapped,
    /// MSB-aligned sample in native order.
    MsbAligned,
}

/// Sample bit depth plus container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    bits: u8,
    word: WordFormat,
}

impl SampleFormat {
    /// `bits` significant bits (2..=32) in a `word` container.
    pub const fn new(bits: u8, word: WordFormat) -> Result<Self, ConfigError> {
        if bits < 2 || bits > 32 {
            return Err(ConfigError::InvalidBitDepth(bits));
        }
        Ok(SampleFormat { bits, word })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn word(&self) -> WordFormat {
        self.word
    }

    /// Largest positive sample value, `2^(bits-1) - 1`.
    pub fn full_scale(&self) -> i32 {
        ((1u32 << (self.bits - 1)) - 1) as i32
    }

    /// Sign-extended sample held in `word`.
    #[inline(always)]
    pub fn extract(&self, word: u32) -> i32 {
        let aligned = match self.word {
            WordFormat::HalfWordSwapped => word.rotate_left(16),
            WordFormat::MsbAligned => word,
        };
        (aligned as i32) >> (32 - self.bits as u32)
    }

    /// Container word for `sample`; inverse of [`extract`](Self::extract).
    ///
    /// Bits below the sample width are zero. Values outside the bit depth
    /// wrap.
    pub fn pack(&self, sample: i32) -> u32 {
        let aligned = (sample as u32) << (32 - self.bits as u32);
        match self.word {
            WordFormat::HalfWordSwapped => aligned.rotate_left(16),
            WordFormat::MsbAligned => aligned,
        }
    }
}

/// Picks every `stride`-th word, starting at slot `channel`, and converts it
/// to `f32`.
#[derive(Debug, Clone, Copy)]
pub struct Decimator {
    stride: usize,
    channel: usize,
    format: SampleFormat,
}

impl Decimator {
    pub fn new(stride: usize, channel: usize, format: SampleFormat) -> Result<Self, ConfigError> {
        if stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if channel >= stride {
            return Err(ConfigError::ChannelOutOfRange { channel, stride });
        }
        Ok(Decimator {
            stride,
            channel,
            format,
        })
    }

    pub fn format(&self) -> &SampleFormat {
        &self.format
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Samples produced from a half of `half_len` words.
    pub fn output_len(&self, half_len: usize) -> usize {
        half_len / self.stride
    }

    /// Convert the completed half `src` into `dst`.
    ///
    /// Returns the number of samples written, at most `dst.len()`. Runs in
    /// interrupt context: no allocation, one pass over `src`.
    pub fn ingest(&self, src: &[u32], dst: &mut [f32]) -> usize {
        let n = self.output_len(src.len()).min(dst.len());
        let words = src.iter().skip(self.channel).step_by(self.stride);
        for (out, &word) in dst[..n].iter_mut().zip(words) {
            *out = self.format.extract(word) as f32;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mic18() -> SampleFormat {
        SampleFormat::new(18, WordFormat::HalfWordSwapped).unwrap()
    }

    #[test]
    fn swapped_word_sign_extends() {
        let f = mic18();
        // +1 at 18 bits is 0x0000_4000 MSB-aligned, halves swapped
        assert_eq!(f.extract(0x4000_0000), 1);
        // -1: all ones in the top 18 bits
        assert_eq!(f.extract(0xC000_FFFF), -1);
        // Full scale
        assert_eq!(f.extract(0xC000_7FFF), 131_071);
        assert_eq!(f.extract(0x0000_8000), -131_072);
    }

    #[test]
    fn low_bits_are_discarded() {
        let f = mic18();
        // Padding bits below the 18-bit sample are ignored.
        assert_eq!(f.extract(0x7FFF_0000), 1);
    }

    #[test]
    fn native_msb_aligned() {
        let f = SampleFormat::new(16, WordFormat::MsbAligned).unwrap();
        assert_eq!(f.extract(0x7FFF_0000), 32_767);
        assert_eq!(f.extract(0x8000_0000), -32_768);
        assert_eq!(f.extract(0xFFFF_1234), -1);
    }

    #[test]
    fn pack_inverts_extract() {
        for format in [mic18(), SampleFormat::new(24, WordFormat::MsbAligned).unwrap()] {
            let fs = format.full_scale();
            for v in [-fs - 1, -fs, -12345, -1, 0, 1, 777, fs] {
                assert_eq!(format.extract(format.pack(v)), v, "{format:?} {v}");
            }
        }
    }

    #[test]
    fn bit_depth_validated() {
        assert_eq!(
            SampleFormat::new(1, WordFormat::MsbAligned).unwrap_err(),
            ConfigError::InvalidBitDepth(1)
        );
        assert!(SampleFormat::new(33, WordFormat::MsbAligned).is_err());
        assert_eq!(SampleFormat::new(32, WordFormat::MsbAligned).unwrap().full_scale(), i32::MAX);
    }

    #[test]
    fn decimator_selects_channel_slot() {
        let f = SampleFormat::new(16, WordFormat::MsbAligned).unwrap();
        let dec = Decimator::new(2, 0, f).unwrap();
        // Interleaved L/R: left = i, right = -i
        let src: [u32; 8] = core::array::from_fn(|i| {
            let frame = (i / 2) as i32;
            f.pack(if i % 2 == 0 { frame } else { -frame })
        });
        let mut dst = [0.0f32; 4];
        assert_eq!(dec.ingest(&src, &mut dst), 4);
        assert_eq!(dst, [0.0, 1.0, 2.0, 3.0]);

        let right = Decimator::new(2, 1, f).unwrap();
        assert_eq!(right.ingest(&src, &mut dst), 4);
        assert_eq!(dst, [0.0, -1.0, -2.0, -3.0]);
    }

    #[test]
    fn decimator_output_count() {
        let f = mic18();
        let dec = Decimator::new(16, 0, f).unwrap();
        let src = [f.pack(5); 512];
        let mut dst = [0.0f32; 64];
        assert_eq!(dec.output_len(src.len()), 32);
        assert_eq!(dec.ingest(&src, &mut dst), 32);
        assert!(dst[..32].iter().all(|&s| s == 5.0));
        assert!(dst[32..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn decimator_never_overruns_scratch() {
        let f = mic18();
        let dec = Decimator::new(1, 0, f).unwrap();
        let src = [f.pack(-3); 16];
        let mut dst = [0.0f32; 4];
        assert_eq!(dec.ingest(&src, &mut dst), 4);
    }

    #[test]
    fn decimator_rejects_bad_parameters() {
        let f = mic18();
        assert_eq!(Decimator::new(0, 0, f).unwrap_err(), ConfigError::ZeroStride);
        assert_eq!(
            Decimator::new(2, 2, f).unwrap_err(),
            ConfigError::ChannelOutOfRange {
                channel: 2,
                stride: 2
            }
        );
    }

    #[test]
    fn dma_half_selection() {
        let buf: [u32; 8] = core::array::from_fn(|i| i as u32);
        assert_eq!(DmaHalf::First.of(&buf), &[0, 1, 2, 3]);
        assert_eq!(DmaHalf::Second.of(&buf), &[4, 5, 6, 7]);
        assert_eq!(DmaHalf::from_buffer_complete(true), DmaHalf::Second);
        assert_eq!(DmaHalf::from_buffer_complete(false), DmaHalf::First);
        assert_eq!(DmaHalf::First.other(), DmaHalf::Second);
    }
}
