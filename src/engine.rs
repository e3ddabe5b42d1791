//! Fusion engine coordinating detection, smoothing, and publication

use log::{debug, trace};
use nalgebra::UnitQuaternion;

use crate::gyro::GyroIntegrator;
use crate::instability::InstabilityDetector;
use crate::math::{AttitudeExt, guarded_slerp, normalize_heading, smooth_heading};
use crate::platform::{CapabilityGate, PlatformCapabilities, PlatformProfile};
use crate::publisher::{HeadingPublisher, SubscriptionId};
use crate::stability::{STABLE_CONFIDENCE, evaluate_stability};
use crate::types::{
    CalibrationOutcome, DebugSnapshot, EngineSettings, EulerSample, HeadingSnapshot,
    OperatingMode, OrientationSample, PermissionOutcome, PermissionState, RateSample,
    Representation, StabilityStatus,
};

/// Confidence ceiling while the quaternion representation is active
///
/// Quaternion smoothing trades precision for stability near vertical, so
/// its output is never reported at full confidence.
const QUATERNION_CONFIDENCE_CAP: f32 = 0.8;

/// Pitch band, in degrees, that forces the quaternion representation
const QUATERNION_PITCH_MIN: f32 = 70.0;
const QUATERNION_PITCH_MAX: f32 = 110.0;

/// Orientation fusion and stability engine
///
/// Consumes two unsynchronized sensor streams (orientation samples and
/// angular-rate samples) and maintains a single confidence-scored
/// compass heading. Internally it switches between plain Euler smoothing
/// and quaternion interpolation to ride out gimbal-lock instability near
/// vertical tilt, and in AR mode dead-reckons from the gyro with slow
/// drift correction toward the compass.
///
/// All state lives in the engine instance; processing is synchronous and
/// reactive, with no internal timers. A multi-threaded host must
/// serialize access to the instance since the two streams may arrive on
/// different callback contexts.
///
/// # Example
/// ```
/// use heading_fusion::{HeadingEngine, OrientationSample};
///
/// let mut engine = HeadingEngine::new();
/// engine.handle_orientation(OrientationSample {
///     alpha: Some(90.0),
///     beta: Some(10.0),
///     gamma: Some(0.0),
///     compass_heading: None,
///     timestamp_ms: 0.0,
/// });
/// assert_eq!(engine.heading(), 270.0);
/// ```
pub struct HeadingEngine {
    settings: EngineSettings,
    profile: PlatformProfile,
    detector: InstabilityDetector,
    gyro: GyroIntegrator,
    publisher: HeadingPublisher,

    /// Published heading state
    smoothed_heading: f32,
    last_stable_heading: f32,
    raw_heading: f32,
    confidence: f32,
    operating_mode: OperatingMode,
    representation: Representation,
    latest_status: StabilityStatus,
    latest_pitch: f32,
    has_heading: bool,

    /// Rotation-space smoothing state
    current_attitude: UnitQuaternion<f32>,
    last_stable_attitude: UnitQuaternion<f32>,

    permission: PermissionState,
    calibration_offset: f32,
    calibrated: bool,
    gyro_available: bool,
}

impl HeadingEngine {
    /// Create an engine with default settings on the generic platform
    pub fn new() -> Self {
        Self::with_platform(EngineSettings::default(), PlatformCapabilities::default())
    }

    /// Create an engine with specified settings on the generic platform
    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::with_platform(settings, PlatformCapabilities::default())
    }

    /// Create an engine for a described platform
    pub fn with_platform(settings: EngineSettings, capabilities: PlatformCapabilities) -> Self {
        let profile = PlatformProfile::resolve(capabilities);
        let permission = if profile.permission_gated() {
            PermissionState::Pending
        } else {
            PermissionState::Unsupported
        };

        Self {
            settings,
            profile,
            detector: InstabilityDetector::new(settings.instability_velocity_threshold),
            gyro: GyroIntegrator::new(&settings),
            publisher: HeadingPublisher::new(),
            smoothed_heading: 0.0,
            last_stable_heading: 0.0,
            raw_heading: 0.0,
            confidence: 0.0,
            operating_mode: OperatingMode::default(),
            representation: Representation::default(),
            latest_status: StabilityStatus::Stable,
            latest_pitch: 0.0,
            has_heading: false,
            current_attitude: UnitQuaternion::identity(),
            last_stable_attitude: UnitQuaternion::identity(),
            permission,
            calibration_offset: 0.0,
            calibrated: false,
            gyro_available: false,
        }
    }

    /// Current engine settings
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Resolved platform profile
    pub fn platform(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Resolve the platform permission gate, then accept samples
    ///
    /// Awaits the host's one-shot capability request and records the
    /// outcome. Safe to call again after a denial if the user asks to
    /// re-prompt; a granted or unsupported gate is not re-requested.
    pub async fn request_access<G: CapabilityGate>(&mut self, gate: &mut G) -> PermissionState {
        if self.ready() {
            return self.permission;
        }
        let outcome = gate.request().await;
        self.apply_permission(outcome)
    }

    /// Record a permission outcome resolved by the host itself
    pub fn apply_permission(&mut self, outcome: PermissionOutcome) -> PermissionState {
        self.permission = match outcome {
            PermissionOutcome::Granted => PermissionState::Granted,
            PermissionOutcome::Denied => PermissionState::Denied,
            // No permission concept on this platform: proceed as granted
            PermissionOutcome::Unsupported => PermissionState::Unsupported,
        };
        debug!("permission gate resolved: {:?}", self.permission);
        self.permission
    }

    /// Whether a permission request is still required before samples flow
    pub fn needs_permission(&self) -> bool {
        matches!(
            self.permission,
            PermissionState::Pending | PermissionState::Denied
        )
    }

    /// Process one orientation sample
    ///
    /// Malformed samples (missing or non-finite angles) are dropped
    /// without mutating any state or notifying subscribers. Every
    /// processed sample produces exactly one snapshot.
    pub fn handle_orientation(&mut self, sample: OrientationSample) {
        if !self.ready() {
            trace!("orientation sample ignored: permission gate unresolved");
            return;
        }
        let Some(euler) = sample.validated() else {
            trace!("orientation sample dropped: malformed");
            return;
        };

        let instability = self.detector.observe(euler);
        self.latest_pitch = euler.beta;

        let raw = self.apply_calibration(
            self.profile.raw_heading(euler.alpha, sample.compass_heading),
        );
        self.raw_heading = raw;

        self.update_representation(&euler, instability);

        let assessment = evaluate_stability(euler.beta, self.operating_mode);
        self.latest_status = assessment.status;

        if !self.has_heading {
            // First sample: adopt the raw heading outright
            self.smoothed_heading = raw;
            self.last_stable_heading = raw;
            self.has_heading = true;
        }

        match self.representation {
            Representation::Euler => {
                if assessment.can_update {
                    self.smoothed_heading =
                        smooth_heading(self.smoothed_heading, raw, assessment.smoothing_factor);
                } else {
                    // Freeze, never extrapolate
                    self.smoothed_heading = self.last_stable_heading;
                }
                self.confidence = assessment.confidence;
            }
            Representation::Quaternion => {
                let target =
                    UnitQuaternion::from_device_euler(euler.alpha, euler.beta, euler.gamma);
                self.current_attitude =
                    guarded_slerp(self.current_attitude, target, self.settings.slerp_gain);

                let (smoothed_alpha, _, _) = self.current_attitude.to_device_euler();
                let heading = self.apply_calibration(self.profile.heading_from_yaw(smoothed_alpha));

                if assessment.can_update {
                    self.smoothed_heading = heading;
                } else {
                    self.smoothed_heading = self.last_stable_heading;
                }
                self.confidence = assessment.confidence.min(QUATERNION_CONFIDENCE_CAP);
            }
        }

        if assessment.confidence > STABLE_CONFIDENCE {
            self.last_stable_heading = self.smoothed_heading;
        }
        if assessment.status == StabilityStatus::Stable {
            self.last_stable_attitude = self.current_attitude;
        }

        if self.operating_mode == OperatingMode::Ar && self.gyro_available {
            if !self.gyro.is_calibrated() {
                // First compass-derived heading since entering AR mode
                self.gyro.seed(self.smoothed_heading);
            } else if assessment.can_correct {
                self.gyro.correct(self.smoothed_heading);
            }
        }

        self.publish_snapshot();
    }

    /// Process one angular-rate sample
    ///
    /// Rate samples are consumed only in AR mode; outside it they only
    /// record that a gyro exists. Malformed samples are dropped.
    pub fn handle_rotation_rate(&mut self, sample: RateSample) {
        if !self.ready() {
            trace!("rate sample ignored: permission gate unresolved");
            return;
        }
        let Some(yaw_rate) = sample.validated_yaw_rate() else {
            trace!("rate sample dropped: malformed");
            return;
        };

        if !self.gyro_available {
            self.gyro_available = true;
            debug!("angular-rate stream detected");
        }

        if self.operating_mode != OperatingMode::Ar {
            return;
        }

        let signed = self.profile.apply_rate_sign(yaw_rate);
        self.gyro.integrate(signed, sample.timestamp_ms);

        self.publish_snapshot();
    }

    /// Select the operating mode
    ///
    /// Setting the current mode again is a no-op. An actual change
    /// resets gyro calibration and timing, because the two modes use
    /// different dead-reckoning policies.
    pub fn set_operating_mode(&mut self, mode: OperatingMode) {
        if mode == self.operating_mode {
            return;
        }
        debug!("operating mode {:?} -> {:?}", self.operating_mode, mode);
        self.operating_mode = mode;
        self.gyro.reset();
    }

    /// Current operating mode
    pub fn operating_mode(&self) -> OperatingMode {
        self.operating_mode
    }

    /// Define the current heading as the new zero reference
    ///
    /// Only meaningful on platforms without a vendor-supplied absolute
    /// heading; elsewhere it reports [`CalibrationOutcome::NotApplicable`]
    /// and changes nothing.
    pub fn calibrate(&mut self) -> CalibrationOutcome {
        if self.profile.supplies_absolute_heading() {
            return CalibrationOutcome::NotApplicable;
        }

        let underlying = if self.calibrated {
            normalize_heading(self.raw_heading + self.calibration_offset)
        } else {
            self.raw_heading
        };
        self.calibration_offset = underlying;
        self.calibrated = true;

        // The reference point itself reads as north from here on
        self.raw_heading = 0.0;
        self.smoothed_heading = 0.0;
        self.last_stable_heading = 0.0;
        debug!("calibrated: offset {:.1}°", self.calibration_offset);

        CalibrationOutcome::Applied
    }

    /// Drop the manual zero reference
    pub fn clear_calibration(&mut self) {
        self.calibration_offset = 0.0;
        self.calibrated = false;
    }

    /// Whether this platform needs a manual reference before headings
    /// are absolute
    pub fn needs_calibration(&self) -> bool {
        !self.profile.supplies_absolute_heading() && !self.calibrated
    }

    /// Current fused heading in degrees, [0°, 360°)
    pub fn heading(&self) -> f32 {
        self.published_heading()
    }

    /// Current smoothing attitude
    pub fn attitude(&self) -> UnitQuaternion<f32> {
        self.current_attitude
    }

    /// Attitude snapshot from the last time tilt was in the stable band
    pub fn last_stable_attitude(&self) -> UnitQuaternion<f32> {
        self.last_stable_attitude
    }

    /// Register a snapshot consumer
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&HeadingSnapshot) + 'static,
    {
        self.publisher.subscribe(subscriber)
    }

    /// Remove a snapshot consumer
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.publisher.unsubscribe(id)
    }

    /// Read-only view of all internal tiers and counters
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            smoothed_heading: self.smoothed_heading,
            last_stable_heading: self.last_stable_heading,
            raw_heading: self.raw_heading,
            confidence: self.confidence,
            operating_mode: self.operating_mode,
            representation: self.representation,
            window_len: self.detector.len(),
            consecutive_unstable: self.detector.consecutive_unstable(),
            angular_velocity: self.detector.last_velocity(),
            gyro_heading: self.gyro.heading(),
            gyro_calibrated: self.gyro.is_calibrated(),
            gyro_available: self.gyro_available,
            permission: self.permission,
            calibration_offset: self.calibration_offset,
            calibrated: self.calibrated,
        }
    }

    fn ready(&self) -> bool {
        matches!(
            self.permission,
            PermissionState::Granted | PermissionState::Unsupported
        )
    }

    fn apply_calibration(&self, heading: f32) -> f32 {
        if self.calibrated {
            normalize_heading(heading - self.calibration_offset)
        } else {
            heading
        }
    }

    fn update_representation(&mut self, sample: &EulerSample, consecutive_unstable: u32) {
        let tilt = sample.beta.abs();
        let pitch_extreme = tilt > QUATERNION_PITCH_MIN && tilt < QUATERNION_PITCH_MAX;
        let unstable =
            consecutive_unstable >= self.settings.instability_entry_samples || pitch_extreme;

        match self.representation {
            Representation::Euler if unstable => {
                // Seed from the latest sample so the heading doesn't jump
                self.current_attitude =
                    UnitQuaternion::from_device_euler(sample.alpha, sample.beta, sample.gamma);
                self.representation = Representation::Quaternion;
                debug!(
                    "representation -> quaternion (streak {}, pitch {:.0}°)",
                    consecutive_unstable, sample.beta
                );
            }
            Representation::Quaternion if !unstable => {
                // Euler smoothing resumes from the smoothed heading as-is
                self.representation = Representation::Euler;
                debug!("representation -> euler");
            }
            _ => {}
        }
    }

    fn published_heading(&self) -> f32 {
        if self.operating_mode == OperatingMode::Ar
            && self.gyro_available
            && self.gyro.is_calibrated()
        {
            self.gyro.heading()
        } else {
            self.smoothed_heading
        }
    }

    fn publish_snapshot(&mut self) {
        let snapshot = HeadingSnapshot {
            heading: self.published_heading(),
            raw_heading: self.raw_heading,
            confidence: self.confidence,
            status: self.latest_status,
            operating_mode: self.operating_mode,
            representation: self.representation,
            platform_name: self.profile.name(),
            gyro_available: self.gyro_available,
            pitch: self.latest_pitch,
            instability_level: self.detector.consecutive_unstable(),
            quaternion_active: self.representation == Representation::Quaternion,
        };
        self.publisher.publish(&snapshot);
    }
}

impl Default for HeadingEngine {
    fn default() -> Self {
        Self::new()
    }
}
