//! Tilt-driven stability tier evaluation

use crate::types::{OperatingMode, StabilityAssessment, StabilityStatus};

/// Confidence above which the last-stable heading reference is refreshed
pub const STABLE_CONFIDENCE: f32 = 0.7;

/// Map current tilt and operating mode to a stability tier
///
/// Pure and table-driven: the same tilt always yields the same tier for
/// a given mode. Compass mode freezes the heading entirely near vertical
/// because the dial must not spin while the device is being raised; AR
/// mode keeps updating at reduced confidence because the camera overlay
/// is unusable with a frozen heading.
///
/// # Arguments
/// * `pitch` - Pitch-like angle in degrees; only its magnitude matters
/// * `mode` - Current operating mode
///
/// # Example
/// ```
/// use heading_fusion::{evaluate_stability, OperatingMode, StabilityStatus};
///
/// let tier = evaluate_stability(50.0, OperatingMode::Compass);
/// assert_eq!(tier.status, StabilityStatus::Stable);
/// assert!(tier.can_update);
/// ```
pub fn evaluate_stability(pitch: f32, mode: OperatingMode) -> StabilityAssessment {
    let tilt = pitch.abs();
    match mode {
        OperatingMode::Compass => evaluate_compass(tilt),
        OperatingMode::Ar => evaluate_ar(tilt),
    }
}

fn evaluate_compass(tilt: f32) -> StabilityAssessment {
    if tilt < 60.0 {
        StabilityAssessment {
            can_update: true,
            can_correct: true,
            confidence: 1.0,
            smoothing_factor: 0.08,
            status: StabilityStatus::Stable,
        }
    } else if tilt < 75.0 {
        StabilityAssessment {
            can_update: true,
            can_correct: true,
            confidence: 0.7,
            smoothing_factor: 0.05,
            status: StabilityStatus::SemiStable,
        }
    } else if tilt < 90.0 {
        StabilityAssessment {
            can_update: true,
            can_correct: false,
            confidence: 0.3,
            smoothing_factor: 0.02,
            status: StabilityStatus::Unstable,
        }
    } else {
        StabilityAssessment {
            can_update: false,
            can_correct: false,
            confidence: 0.1,
            smoothing_factor: 0.0,
            status: StabilityStatus::Frozen,
        }
    }
}

fn evaluate_ar(tilt: f32) -> StabilityAssessment {
    if tilt < 60.0 {
        StabilityAssessment {
            can_update: true,
            can_correct: true,
            confidence: 1.0,
            smoothing_factor: 0.05,
            status: StabilityStatus::Stable,
        }
    } else if tilt < 110.0 {
        StabilityAssessment {
            can_update: true,
            can_correct: false,
            confidence: 0.7,
            smoothing_factor: 0.01,
            status: StabilityStatus::Vertical,
        }
    } else {
        StabilityAssessment {
            can_update: true,
            can_correct: false,
            confidence: 0.5,
            smoothing_factor: 0.01,
            status: StabilityStatus::Overhead,
        }
    }
}
