//! Platform profiles for heading extraction and sign conventions
//!
//! Hosts differ in where the absolute heading lives (some deliver a
//! vendor compass field alongside the Euler angles, others only a raw
//! yaw that must be converted) and in the sign of the angular-rate
//! stream. The engine never probes its environment: the host describes
//! itself once with [`PlatformCapabilities`] and the engine resolves a
//! [`PlatformProfile`] from it at construction.

use crate::math::normalize_heading;
use crate::types::PermissionOutcome;

/// Capability descriptor supplied by the host at engine construction
///
/// # Example
/// ```
/// use heading_fusion::{PlatformCapabilities, PlatformProfile};
///
/// let profile = PlatformProfile::resolve(PlatformCapabilities::IOS_SAFARI);
/// assert!(profile.supplies_absolute_heading());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Display name used in snapshots and logs
    pub name: &'static str,
    /// Orientation events carry a vendor-supplied absolute compass field
    pub vendor_compass: bool,
    /// Angular-rate yaw component arrives with inverted sign
    pub flipped_rate_sign: bool,
    /// Sensor access sits behind an explicit permission request
    pub permission_gated: bool,
}

impl PlatformCapabilities {
    /// Safari on iOS: vendor compass field, permission-gated sensors
    pub const IOS_SAFARI: Self = Self {
        name: "ios-safari",
        vendor_compass: true,
        flipped_rate_sign: false,
        permission_gated: true,
    };

    /// Chrome on Android: yaw-derived heading, inverted rate sign
    pub const ANDROID_CHROME: Self = Self {
        name: "android-chrome",
        vendor_compass: false,
        flipped_rate_sign: true,
        permission_gated: false,
    };

    /// Fallback for hosts with no special conventions
    pub const GENERIC: Self = Self {
        name: "generic",
        vendor_compass: false,
        flipped_rate_sign: false,
        permission_gated: false,
    };
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::GENERIC
    }
}

/// Which input field supplies the absolute heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingSource {
    /// Vendor compass field on the orientation event
    VendorCompass,
    /// `(360 - yaw) mod 360` conversion from the raw yaw angle
    DerivedYaw,
}

/// Resolved platform conventions consumed by the engine
#[derive(Debug, Clone, Copy)]
pub struct PlatformProfile {
    name: &'static str,
    heading_source: HeadingSource,
    rate_sign: f32,
    permission_gated: bool,
}

impl PlatformProfile {
    /// Resolve a profile from a capability descriptor
    pub fn resolve(capabilities: PlatformCapabilities) -> Self {
        Self {
            name: capabilities.name,
            heading_source: if capabilities.vendor_compass {
                HeadingSource::VendorCompass
            } else {
                HeadingSource::DerivedYaw
            },
            rate_sign: if capabilities.flipped_rate_sign {
                -1.0
            } else {
                1.0
            },
            permission_gated: capabilities.permission_gated,
        }
    }

    /// Display name of the platform
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolved heading source
    pub fn heading_source(&self) -> HeadingSource {
        self.heading_source
    }

    /// Whether the platform delivers an absolute heading by itself
    ///
    /// Manual calibration is not applicable on such platforms.
    pub fn supplies_absolute_heading(&self) -> bool {
        self.heading_source == HeadingSource::VendorCompass
    }

    /// Whether sensor access requires a permission request first
    pub fn permission_gated(&self) -> bool {
        self.permission_gated
    }

    /// Absolute heading of one sample, in [0°, 360°)
    ///
    /// On vendor-compass platforms a sample may still arrive without the
    /// vendor field (sensor warm-up); the yaw conversion covers the gap.
    pub fn raw_heading(&self, alpha: f32, compass_heading: Option<f32>) -> f32 {
        let derived = self.heading_from_yaw(alpha);
        match self.heading_source {
            HeadingSource::VendorCompass => compass_heading
                .filter(|value| value.is_finite())
                .map(normalize_heading)
                .unwrap_or(derived),
            HeadingSource::DerivedYaw => derived,
        }
    }

    /// Sign-convention mapping from a raw yaw angle to a heading
    ///
    /// Yaw increases counter-clockwise while headings increase
    /// clockwise, hence `(360 - yaw) mod 360`. The quaternion path uses
    /// this on the smoothed yaw it extracts.
    pub fn heading_from_yaw(&self, alpha: f32) -> f32 {
        normalize_heading(360.0 - alpha)
    }

    /// Apply the platform's rate sign convention to a yaw rate
    pub fn apply_rate_sign(&self, yaw_rate: f32) -> f32 {
        yaw_rate * self.rate_sign
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::resolve(PlatformCapabilities::default())
    }
}

/// One-shot platform permission gate
///
/// Implemented by the host; awaited exactly once before sample
/// subscription begins. The gate has no timeout of its own and is never
/// retried automatically: on [`PermissionOutcome::Denied`] the caller
/// decides whether to re-prompt the user.
#[allow(async_fn_in_trait)]
pub trait CapabilityGate {
    /// Request sensor access from the platform
    async fn request(&mut self) -> PermissionOutcome;
}
