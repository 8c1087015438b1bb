//! Energy-to-decibel conversion.
//!
//! ```text
//! rms = sqrt(Σy² / n)
//! dB  = offset + reference_dB + 20·log10(rms / reference_amplitude)
//! reference_amplitude = 10^(sensitivity/20) · (2^(bits-1) - 1)
//! ```
//!
//! The reference amplitude is the RMS sample value the microphone produces at
//! the reference sound pressure level.

use crate::constants::{DISPLAY_MAX, MIC_NOISE_DB, MIC_OVERLOAD_DB};
use crate::error::ConfigError;
use crate::io::ingest::SampleFormat;
use crate::sched::Window;

/// Read-only calibration constants, computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    offset_db: f32,
    reference_db: f32,
    sensitivity_dbfs: f32,
    reference_amplitude: f32,
    overload_db: f32,
    noise_db: f32,
}

impl Calibration {
    /// Derive the constants for a microphone with `sensitivity_dbfs` at
    /// `reference_db`, delivering samples in `format`.
    pub fn new(
        sensitivity_dbfs: f32,
        reference_db: f32,
        offset_db: f32,
        format: &SampleFormat,
    ) -> Result<Self, ConfigError> {
        if !(sensitivity_dbfs.is_finite() && reference_db.is_finite() && offset_db.is_finite()) {
            return Err(ConfigError::NonFiniteCalibration);
        }
        let reference_amplitude =
            libm::powf(10.0, sensitivity_dbfs / 20.0) * format.full_scale() as f32;
        Ok(Calibration {
            offset_db,
            reference_db,
            sensitivity_dbfs,
            reference_amplitude,
            overload_db: MIC_OVERLOAD_DB,
            noise_db: MIC_NOISE_DB,
        })
    }

    /// Override the datasheet overload point and noise floor.
    pub fn with_limits(mut self, noise_db: f32, overload_db: f32) -> Self {
        self.noise_db = noise_db;
        self.overload_db = overload_db;
        self
    }

    pub fn reference_amplitude(&self) -> f32 {
        self.reference_amplitude
    }

    pub fn sensitivity_dbfs(&self) -> f32 {
        self.sensitivity_dbfs
    }

    pub fn reference_db(&self) -> f32 {
        self.reference_db
    }

    pub fn offset_db(&self) -> f32 {
        self.offset_db
    }

    pub fn noise_db(&self) -> f32 {
        self.noise_db
    }

    pub fn overload_db(&self) -> f32 {
        self.overload_db
    }

    /// Level in dB for an RMS sample amplitude. `0.0` maps to `-inf`.
    pub fn level_from_rms(&self, rms: f32) -> f32 {
        self.offset_db + self.reference_db + 20.0 * libm::log10f(rms / self.reference_amplitude)
    }

    /// Equivalent continuous level of a closed window.
    pub fn leq(&self, window: &Window) -> f32 {
        self.level_from_rms(libm::sqrtf(window.mean_square()))
    }
}

/// Clamp a level to the integer display range `0..=999`.
///
/// Values in range are truncated; anything below zero (including `-inf` and
/// NaN) reads 0.
pub fn display_value(db: f32) -> u16 {
    if db.is_nan() || db < 0.0 {
        0
    } else if db >= DISPLAY_MAX as f32 {
        DISPLAY_MAX
    } else {
        db as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::WordFormat;
    use core::num::NonZeroU32;

    fn mic18() -> Calibration {
        let format = SampleFormat::new(18, WordFormat::HalfWordSwapped).unwrap();
        Calibration::new(-26.0, 94.0, 0.0, &format).unwrap()
    }

    #[test]
    fn reference_amplitude_for_18_bit_mic() {
        let cal = mic18();
        // 10^(-26/20) · 131071
        let expected = 0.050_118_72 * 131_071.0;
        assert!(
            (cal.reference_amplitude() - expected).abs() < 0.01,
            "got {}",
            cal.reference_amplitude()
        );
    }

    #[test]
    fn reference_amplitude_reads_reference_level() {
        let cal = mic18();
        let db = cal.level_from_rms(cal.reference_amplitude());
        assert!((db - 94.0).abs() < 1e-4, "got {db}");
    }

    #[test]
    fn twenty_db_per_decade() {
        let cal = mic18();
        let r = cal.reference_amplitude();
        assert!((cal.level_from_rms(r * 10.0) - 114.0).abs() < 1e-3);
        assert!((cal.level_from_rms(r / 10.0) - 74.0).abs() < 1e-3);
    }

    #[test]
    fn offset_is_added() {
        let format = SampleFormat::new(18, WordFormat::HalfWordSwapped).unwrap();
        let cal = Calibration::new(-26.0, 94.0, 1.5, &format).unwrap();
        let db = cal.level_from_rms(cal.reference_amplitude());
        assert!((db - 95.5).abs() < 1e-4);
    }

    #[test]
    fn level_is_strictly_monotonic() {
        let cal = mic18();
        let mut last = f32::NEG_INFINITY;
        let mut rms = 0.5f32;
        while rms < 200_000.0 {
            let db = cal.level_from_rms(rms);
            assert!(db > last, "not increasing at rms {rms}: {db} <= {last}");
            last = db;
            rms *= 1.37;
        }
    }

    #[test]
    fn leq_uses_mean_square() {
        let cal = mic18();
        let r = cal.reference_amplitude();
        let window = Window {
            sum_sqr: r * r * 100.0,
            samples: NonZeroU32::new(100).unwrap(),
        };
        assert!((cal.leq(&window) - 94.0).abs() < 1e-3);
    }

    #[test]
    fn silence_floors_to_zero() {
        let cal = mic18();
        let db = cal.level_from_rms(0.0);
        assert_eq!(db, f32::NEG_INFINITY);
        assert_eq!(display_value(db), 0);
    }

    #[test]
    fn non_finite_calibration_rejected() {
        let format = SampleFormat::new(16, WordFormat::MsbAligned).unwrap();
        assert_eq!(
            Calibration::new(f32::NAN, 94.0, 0.0, &format).unwrap_err(),
            ConfigError::NonFiniteCalibration
        );
        assert!(Calibration::new(-26.0, f32::INFINITY, 0.0, &format).is_err());
    }

    #[test]
    fn display_clamping() {
        assert_eq!(display_value(-0.5), 0);
        assert_eq!(display_value(-120.0), 0);
        assert_eq!(display_value(f32::NAN), 0);
        assert_eq!(display_value(0.0), 0);
        assert_eq!(display_value(0.99), 0);
        assert_eq!(display_value(45.7), 45);
        assert_eq!(display_value(998.9), 998);
        assert_eq!(display_value(999.5), 999);
        assert_eq!(display_value(1000.0), 999);
        assert_eq!(display_value(f32::INFINITY), 999);
    }

    #[test]
    fn limits_can_be_overridden() {
        let cal = mic18().with_limits(20.0, 130.0);
        assert_eq!(cal.noise_db(), 20.0);
        assert_eq!(cal.overload_db(), 130.0);
    }
}
