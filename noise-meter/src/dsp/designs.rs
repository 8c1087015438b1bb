//! Filter designs for a 48 kHz sample rate.
//!
//! Feedback coefficients are stored negated, see [`sos`](super::sos).

use super::sos::{SosCoefficients, SosDesign};

/// Sample rate in Hz every design in this module was computed for.
pub const DESIGN_RATE: u32 = 48_000;

/// Knowles SPH0645LM4H-B rev. B frequency-response correction.
///
/// `B ≈ [1.001234, -1.991352, 0.990149]`, `A ≈ [1.0, -1.993853, 0.993863]`,
/// preceded by a DC blocker (`a1 = -0.9992`).
pub const SPH0645LM4H_B: SosDesign<2> = SosDesign {
    gain: 1.001_233_8,
    sections: [
        SosCoefficients {
            b1: -1.0,
            b2: 0.0,
            a1: 0.9992,
            a2: 0.0,
        },
        SosCoefficients {
            b1: -1.988_897_7,
            b2: 0.988_928_5,
            a1: 1.993_853_4,
            a2: -0.993_862_8,
        },
    ],
};

/// No microphone correction.
pub const FLAT_EQUALIZER: SosDesign<2> = SosDesign {
    gain: 1.0,
    sections: [SosCoefficients::PASSTHROUGH; 2],
};

/// A-weighting (IEC 61672), normalized to 0 dB at 1 kHz.
///
/// `B = [0.16999, 0.28042, -1.12057, 0.13156, 0.97415, -0.28274, -0.15281]`,
/// `A = [1.0, -2.12979, 0.42996, 1.62133, -0.96670, 0.00121, 0.04400]`.
pub const A_WEIGHTING: SosDesign<3> = SosDesign {
    gain: 0.169_994_95,
    sections: [
        SosCoefficients {
            b1: -2.000_270,
            b2: 1.000_270_6,
            a1: -1.060_868_4,
            a2: -0.163_987_45,
        },
        SosCoefficients {
            b1: 4.359_124,
            b2: 3.091_202_7,
            a1: 1.208_419_9,
            a2: -0.273_167,
        },
        SosCoefficients {
            b1: -0.709_303,
            b2: -0.290_718_68,
            a1: 1.982_242_2,
            a2: -0.982_298_6,
        },
    ],
};

/// C-weighting, fitted with `invfreqz` against the IEC 61672 curve.
pub const C_WEIGHTING: SosDesign<3> = SosDesign {
    gain: -0.491_647_17,
    sections: [
        SosCoefficients {
            b1: 1.460_438_6,
            b2: 0.527_507,
            a1: 1.994_614_5,
            a2: -0.994_621_7,
        },
        SosCoefficients {
            b1: 0.237_622_24,
            b2: 0.014_041_121,
            a1: -1.339_658_6,
            a2: -0.442_145_78,
        },
        SosCoefficients {
            b1: -2.0,
            b2: 1.0,
            a1: 0.377_580_02,
            a2: -0.035_636_576,
        },
    ],
};

/// Flat (unweighted) response with the same section count as A/C.
pub const Z_WEIGHTING: SosDesign<3> = SosDesign {
    gain: 1.0,
    sections: [SosCoefficients::PASSTHROUGH; 3],
};
