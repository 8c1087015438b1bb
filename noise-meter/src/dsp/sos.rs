//! Second-order-section (biquad) IIR cascade.
//!
//! Each section is a transposed direct-form II biquad with `b0 = a0 = 1.0`.
//! The overall numerator scale is carried separately as the cascade gain and
//! is only applied by [`SosFilter::filter_sum_sqr`], where it folds into the
//! energy sum.
//!
//! ## Coefficient convention
//!
//! The feedback coefficients are stored **negated**, so a design with
//! denominator `[1, a1, a2]` is written `{ a1: -a1, a2: -a2 }`. The per-sample
//! recurrence then only adds:
//!
//! ```text
//! f  = x + a1·w0 + a2·w1
//! y  = f + b1·w0 + b2·w1
//! w1 = w0, w0 = f
//! ```
//!
//! The accumulation order above is kept exactly; calibrated designs were
//! verified against it.

use crate::error::ConfigError;

/// Coefficients of one section, feedback terms negated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosCoefficients {
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl SosCoefficients {
    /// A section that passes samples through unchanged.
    pub const PASSTHROUGH: Self = SosCoefficients {
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn is_finite(&self) -> bool {
        self.b1.is_finite() && self.b2.is_finite() && self.a1.is_finite() && self.a2.is_finite()
    }
}

/// Delay line of one section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SosState {
    pub w0: f32,
    pub w1: f32,
}

/// An immutable filter design: cascade gain plus `N` sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosDesign<const N: usize> {
    pub gain: f32,
    pub sections: [SosCoefficients; N],
}

/// A cascade of `N` biquad sections with persistent state.
///
/// The state belongs to exactly one filter instance and survives across calls,
/// so consecutive blocks are filtered as one continuous signal.
#[derive(Debug, Clone)]
pub struct SosFilter<const N: usize> {
    gain: f32,
    sos: [SosCoefficients; N],
    w: [SosState; N],
}

impl<const N: usize> SosFilter<N> {
    /// Build a filter with zeroed state from `design`.
    ///
    /// Rejects an empty cascade and any non-finite coefficient.
    pub fn from_design(design: &SosDesign<N>) -> Result<Self, ConfigError> {
        if N == 0 {
            return Err(ConfigError::EmptyCascade);
        }
        if !design.gain.is_finite() || !design.sections.iter().all(SosCoefficients::is_finite) {
            return Err(ConfigError::NonFiniteCoefficient);
        }
        Ok(SosFilter {
            gain: design.gain,
            sos: design.sections,
            w: [SosState::default(); N],
        })
    }

    /// Cascade gain applied in [`filter_sum_sqr`](Self::filter_sum_sqr).
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Current delay state, one entry per section.
    pub fn state(&self) -> &[SosState; N] {
        &self.w
    }

    /// Zero all delay state.
    pub fn reset(&mut self) {
        self.w = [SosState::default(); N];
    }

    /// Run `samples` through every section, in place.
    pub fn filter(&mut self, samples: &mut [f32]) {
        self.filter_sections(samples, N);
    }

    /// Run `samples` through the cascade and return `Σ (y·gain)²` of the output.
    ///
    /// The last section is fused with the energy sum so the block is only
    /// walked once for it. Filtered samples are still written back.
    pub fn filter_sum_sqr(&mut self, samples: &mut [f32]) -> f32 {
        let gain = self.gain;
        let mut sum_sqr = 0.0f32;

        self.filter_sections(samples, N - 1);

        let coeffs = self.sos[N - 1];
        let ww = &mut self.w[N - 1];
        for s in samples.iter_mut() {
            let f = *s + coeffs.a1 * ww.w0 + coeffs.a2 * ww.w1;
            *s = f + coeffs.b1 * ww.w0 + coeffs.b2 * ww.w1;
            ww.w1 = ww.w0;
            ww.w0 = f;
            sum_sqr += *s * gain * *s * gain;
        }

        sum_sqr
    }

    fn filter_sections(&mut self, samples: &mut [f32], n: usize) {
        for (coeffs, ww) in self.sos.iter().zip(self.w.iter_mut()).take(n) {
            for s in samples.iter_mut() {
                let f = *s + coeffs.a1 * ww.w0 + coeffs.a2 * ww.w1;
                *s = f + coeffs.b1 * ww.w0 + coeffs.b2 * ww.w1;
                ww.w1 = ww.w0;
                ww.w0 = f;
            }
        }
    }
}
