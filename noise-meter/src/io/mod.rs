//! Sample input from the I²S receive DMA.
//!
//! ## Components
//!
//! | Item | Description |
//! |------|-------------|
//! | [`DmaHalf`] | which half of the circular buffer the hardware just finished |
//! | [`SampleFormat`] | bit depth and word layout of one microphone sample |
//! | [`Decimator`] | stride/channel selection into the `f32` scratch region |
//! | [`PinProbe`] | GPIO timing probe (feature `led`) |
//!
//! ## DMA buffer layout
//!
//! The receive DMA runs over a circular `[u32; N]` buffer:
//! - one word per channel slot, channels interleaved (`L R L R ...`)
//! - the buffer is split into two halves; the hardware interrupts when either
//!   half is complete
//! - the ISR reads the finished half while DMA fills the other

pub mod ingest;
pub mod probe;

pub use ingest::{Decimator, DmaHalf, SampleFormat, WordFormat};
pub use probe::Probe;

#[cfg(feature = "led")]
pub use probe::PinProbe;
