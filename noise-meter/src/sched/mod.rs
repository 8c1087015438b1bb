//! Producer/consumer scheduling.
//!
//! Exactly two contexts exist: the DMA interrupt (producer, runs to
//! completion) and one foreground loop (consumer, sleeps between readings).
//!
//! - [`handoff`] — readiness flag and accumulator ownership protocol
//! - [`power`] — how the consumer sleeps while a window is open

pub mod handoff;
pub mod power;

pub use handoff::{Append, Consumer, Handoff, Producer, Window, WindowGuard};
pub use power::{Idle, SpinIdle};
