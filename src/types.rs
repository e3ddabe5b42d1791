//! Core types and configuration for the heading fusion engine

/// Primary operating mode of the engine
///
/// Selected externally by the presentation layer. `Compass` drives the
/// dial and radar surfaces from smoothed orientation samples alone; `Ar`
/// additionally dead-reckons from angular-rate samples so the camera
/// overlay stays responsive while the device is held up.
///
/// # Example
/// ```
/// use heading_fusion::{HeadingEngine, OperatingMode};
///
/// let mut engine = HeadingEngine::new();
/// engine.set_operating_mode(OperatingMode::Ar);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// Map/dial use case: orientation smoothing only
    #[default]
    Compass,
    /// Camera overlay use case: gyro dead reckoning with compass correction
    Ar,
}

/// Internal mathematical representation of the smoothed heading
///
/// Driven by the instability detector, never set externally. `Euler` is
/// the cheap steady-state path; `Quaternion` takes over near vertical
/// tilt where Euler smoothing suffers gimbal-lock instability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    /// Exponential smoothing on the yaw angle directly
    #[default]
    Euler,
    /// Spherical interpolation in rotation space
    Quaternion,
}

/// Discrete stability tier derived from current tilt and operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityStatus {
    /// Device near horizontal, full confidence
    Stable,
    /// Moderate tilt, reduced confidence
    SemiStable,
    /// Strong tilt, heading updates but no drift correction
    Unstable,
    /// Near-vertical in compass mode, heading frozen at last stable value
    Frozen,
    /// Device held up in AR mode
    Vertical,
    /// Device pointed above the horizon in AR mode
    Overhead,
}

impl StabilityStatus {
    /// Short lowercase label for logs and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityStatus::Stable => "stable",
            StabilityStatus::SemiStable => "semi-stable",
            StabilityStatus::Unstable => "unstable",
            StabilityStatus::Frozen => "frozen",
            StabilityStatus::Vertical => "vertical",
            StabilityStatus::Overhead => "overhead",
        }
    }
}

/// Declared unit of the angular-rate stream
///
/// The engine never inspects sample magnitudes to guess units unless
/// `Legacy` is selected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateUnit {
    /// Rates arrive in degrees per second
    #[default]
    DegreesPerSecond,
    /// Rates arrive in radians per second and are converted on ingest
    RadiansPerSecond,
    /// Per-sample magnitude guess inherited from older hosts: a yaw rate
    /// with absolute value above 10 is taken to be degrees per second,
    /// anything smaller radians per second. Only for bug-compatible
    /// replays of recordings whose unit is unknown.
    Legacy,
}

/// Engine settings
///
/// Configuration parameters for the fusion engine. Defaults match the
/// tuning the presentation surfaces were calibrated against; they are
/// exposed for hosts with unusual sensor cadences.
///
/// # Example
/// ```
/// use heading_fusion::{EngineSettings, RateUnit};
///
/// let settings = EngineSettings {
///     rate_unit: RateUnit::RadiansPerSecond, // SI rate stream
///     slerp_gain: 0.15,                      // snappier near-vertical tracking
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Angular velocity above which a sample counts as unstable, in °/s
    pub instability_velocity_threshold: f32,
    /// Consecutive unstable samples required to enter the quaternion
    /// representation
    pub instability_entry_samples: u32,
    /// Fixed interpolation gain of the quaternion low-pass filter
    pub slerp_gain: f32,
    /// Proportional pull of the gyro heading toward the compass heading
    /// per update while drift correction is allowed
    pub drift_correction_rate: f32,
    /// Upper bound on a single gyro integration step, in seconds
    ///
    /// Bounds the drift contributed by one sample after a timestamp gap
    /// (backgrounded app, suspended sensor).
    pub max_rate_step_seconds: f32,
    /// Declared unit of the angular-rate stream
    pub rate_unit: RateUnit,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            instability_velocity_threshold: 30.0,
            instability_entry_samples: 3,
            slerp_gain: 0.1,
            drift_correction_rate: 0.005,
            max_rate_step_seconds: 0.1,
            rate_unit: RateUnit::default(),
        }
    }
}

/// Raw orientation sample as delivered by the host sensor stream
///
/// Component values are optional because hosts deliver partial events
/// while sensors warm up. A sample with any missing or non-finite
/// required angle is dropped without touching engine state.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationSample {
    /// Yaw-like angle in degrees
    pub alpha: Option<f32>,
    /// Pitch-like angle in degrees
    pub beta: Option<f32>,
    /// Roll-like angle in degrees
    pub gamma: Option<f32>,
    /// Vendor-supplied absolute compass heading in degrees, when the
    /// platform provides one
    pub compass_heading: Option<f32>,
    /// Sample timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl OrientationSample {
    /// Validate into an [`EulerSample`], or `None` if malformed
    pub fn validated(&self) -> Option<EulerSample> {
        let alpha = self.alpha.filter(|v| v.is_finite())?;
        let beta = self.beta.filter(|v| v.is_finite())?;
        let gamma = self.gamma.filter(|v| v.is_finite())?;
        if !self.timestamp_ms.is_finite() {
            return None;
        }
        Some(EulerSample {
            alpha,
            beta,
            gamma,
            timestamp_ms: self.timestamp_ms,
        })
    }
}

/// Validated orientation sample held in the instability window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerSample {
    /// Yaw-like angle in degrees
    pub alpha: f32,
    /// Pitch-like angle in degrees
    pub beta: f32,
    /// Roll-like angle in degrees
    pub gamma: f32,
    /// Sample timestamp in milliseconds
    pub timestamp_ms: f64,
}

/// Raw angular-rate sample as delivered by the host sensor stream
///
/// All three components are part of the stream contract; a sample with
/// any missing or non-finite component is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateSample {
    /// Rotation rate about the vertical axis
    pub yaw_rate: Option<f32>,
    /// Rotation rate about the lateral axis
    pub pitch_rate: Option<f32>,
    /// Rotation rate about the longitudinal axis
    pub roll_rate: Option<f32>,
    /// Sample timestamp in milliseconds
    pub timestamp_ms: f64,
}

impl RateSample {
    /// Validated yaw rate, or `None` if any component is malformed
    pub fn validated_yaw_rate(&self) -> Option<f32> {
        let yaw = self.yaw_rate.filter(|v| v.is_finite())?;
        self.pitch_rate.filter(|v| v.is_finite())?;
        self.roll_rate.filter(|v| v.is_finite())?;
        if !self.timestamp_ms.is_finite() {
            return None;
        }
        Some(yaw)
    }
}

/// Stability tier output, recomputed for every processed sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityAssessment {
    /// Whether the published heading may move this tick
    pub can_update: bool,
    /// Whether gyro drift correction may be applied this tick
    pub can_correct: bool,
    /// Confidence in the published heading, 0.0 to 1.0
    pub confidence: f32,
    /// Exponential smoothing factor for the Euler path, 0.0 to 1.0
    pub smoothing_factor: f32,
    /// Discrete tier label
    pub status: StabilityStatus,
}

/// Permission gate lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Gate has not been resolved yet; samples are ignored
    #[default]
    Pending,
    /// Access granted, engine is live
    Granted,
    /// Access denied; the caller decides whether to re-prompt
    Denied,
    /// Platform has no permission concept; treated as granted
    Unsupported,
}

/// Result of a one-shot capability request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// User granted sensor access
    Granted,
    /// User denied sensor access
    Denied,
    /// Platform has no such permission concept
    Unsupported,
}

/// Result of a manual calibration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// Current heading stored as the new zero reference
    Applied,
    /// Platform already supplies an absolute heading; nothing to do
    NotApplicable,
}

/// Immutable fused-heading snapshot delivered to subscribers
///
/// One snapshot is published per processed input sample, synchronously
/// and in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSnapshot {
    /// Fused heading in degrees, [0°, 360°)
    pub heading: f32,
    /// Unsmoothed heading derived from the latest sample, in degrees
    pub raw_heading: f32,
    /// Confidence in the fused heading, 0.0 to 1.0
    pub confidence: f32,
    /// Current stability tier
    pub status: StabilityStatus,
    /// Externally selected operating mode
    pub operating_mode: OperatingMode,
    /// Internal smoothing representation in effect
    pub representation: Representation,
    /// Display name of the resolved platform profile
    pub platform_name: &'static str,
    /// Whether an angular-rate stream has been observed
    pub gyro_available: bool,
    /// Pitch-like angle of the latest sample, in degrees
    pub pitch: f32,
    /// Consecutive unstable sample count
    pub instability_level: u32,
    /// True while the quaternion representation is active
    pub quaternion_active: bool,
}

/// Read-only diagnostic view of the engine internals
///
/// Intended for debug overlays and test assertions; everything here is
/// also observable over time through published snapshots.
#[derive(Debug, Clone, Copy)]
pub struct DebugSnapshot {
    /// Smoothed heading in degrees
    pub smoothed_heading: f32,
    /// Last heading captured while confidence was above the stable band
    pub last_stable_heading: f32,
    /// Heading derived from the latest raw sample
    pub raw_heading: f32,
    /// Current confidence
    pub confidence: f32,
    /// Operating mode
    pub operating_mode: OperatingMode,
    /// Smoothing representation
    pub representation: Representation,
    /// Samples currently held in the instability window
    pub window_len: usize,
    /// Consecutive unstable sample count
    pub consecutive_unstable: u32,
    /// Most recent inter-sample angular velocity, in °/s
    pub angular_velocity: f32,
    /// Dead-reckoned gyro heading in degrees
    pub gyro_heading: f32,
    /// Whether the gyro heading has been seeded from a compass heading
    pub gyro_calibrated: bool,
    /// Whether a well-formed rate sample has ever been observed
    pub gyro_available: bool,
    /// Permission gate state
    pub permission: PermissionState,
    /// Manual zero-reference offset in degrees
    pub calibration_offset: f32,
    /// Whether a manual calibration reference is active
    pub calibrated: bool,
}
