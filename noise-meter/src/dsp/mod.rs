//! Floating-point filter engine.
//!
//! All arithmetic is single precision. On cores without an FPU the compiler
//! lowers it to the soft-float runtime; transcendental functions come from
//! [`libm`].

pub mod designs;
pub mod sos;

pub use sos::{SosCoefficients, SosDesign, SosFilter, SosState};
