//! Dead-reckoning gyro heading integration for AR mode

use crate::math::{RAD_TO_DEG, normalize_heading, shortest_angle_diff};
use crate::types::{EngineSettings, RateUnit};

/// Magnitude above which the legacy heuristic assumes degrees per second
const LEGACY_UNIT_THRESHOLD: f32 = 10.0;

/// Integrates angular-rate samples into a heading estimate
///
/// Active only while the engine is in AR mode. The estimate is anchored
/// by seeding it from a compass-derived heading, then advanced by yaw
/// rate integration, and slowly pulled back toward the compass whenever
/// the stability tier permits drift correction. The pull is proportional
/// rather than a snap so corrections never cause visible jumps.
#[derive(Debug, Clone, Copy)]
pub struct GyroIntegrator {
    /// Dead-reckoned heading in degrees, [0°, 360°)
    heading: f32,
    /// Whether the heading has been seeded from a compass heading
    calibrated: bool,
    /// Timestamp of the last integrated sample, in milliseconds
    last_timestamp_ms: Option<f64>,
    /// Proportional drift pull per correction step
    drift_correction_rate: f32,
    /// Upper bound on a single integration step, in seconds
    max_step_seconds: f32,
    /// Declared unit of the rate stream
    rate_unit: RateUnit,
}

impl GyroIntegrator {
    /// Create an integrator from engine settings
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            heading: 0.0,
            calibrated: false,
            last_timestamp_ms: None,
            drift_correction_rate: settings.drift_correction_rate,
            max_step_seconds: settings.max_rate_step_seconds,
            rate_unit: settings.rate_unit,
        }
    }

    /// Anchor the heading estimate to a compass-derived heading
    pub fn seed(&mut self, heading: f32) {
        self.heading = normalize_heading(heading);
        self.calibrated = true;
        log::debug!("gyro heading seeded at {:.1}°", self.heading);
    }

    /// Advance the heading by one rate sample
    ///
    /// `yaw_rate` must already carry the platform sign convention. The
    /// first sample only records its timestamp; a non-positive timestamp
    /// delta skips the step; a delta above the configured bound is
    /// clamped so one sample after a long gap cannot spin the heading.
    pub fn integrate(&mut self, yaw_rate: f32, timestamp_ms: f64) {
        let Some(last) = self.last_timestamp_ms.replace(timestamp_ms) else {
            return;
        };

        let dt = (((timestamp_ms - last) / 1000.0) as f32).min(self.max_step_seconds);
        if dt <= 0.0 {
            return;
        }

        let delta = self.rate_in_degrees(yaw_rate);
        self.heading = normalize_heading(self.heading + delta * dt);
    }

    /// One proportional drift-correction step toward a compass heading
    ///
    /// Moves the estimate by `drift_correction_rate` of the shortest
    /// angular difference, which bounds long-term drift without visible
    /// snapping.
    pub fn correct(&mut self, compass_heading: f32) {
        let drift = shortest_angle_diff(compass_heading, self.heading);
        self.heading = normalize_heading(self.heading + drift * self.drift_correction_rate);
    }

    /// Current dead-reckoned heading in degrees
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Whether the heading has been seeded
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Timestamp of the last integrated sample
    pub fn last_timestamp_ms(&self) -> Option<f64> {
        self.last_timestamp_ms
    }

    /// Drop calibration and timing state
    ///
    /// Called on operating-mode changes. The heading value is left in
    /// place; it is not trusted again until the next [`seed`](Self::seed).
    pub fn reset(&mut self) {
        self.calibrated = false;
        self.last_timestamp_ms = None;
    }

    fn rate_in_degrees(&self, yaw_rate: f32) -> f32 {
        match self.rate_unit {
            RateUnit::DegreesPerSecond => yaw_rate,
            RateUnit::RadiansPerSecond => yaw_rate * RAD_TO_DEG,
            // Historical magnitude guess: anything above 10 cannot be a
            // plausible rad/s hand rotation, so it is taken as °/s
            RateUnit::Legacy => {
                if yaw_rate.abs() > LEGACY_UNIT_THRESHOLD {
                    yaw_rate
                } else {
                    yaw_rate * RAD_TO_DEG
                }
            }
        }
    }
}
