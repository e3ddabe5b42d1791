//! Heading arithmetic and nalgebra extensions for the heading fusion engine

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

/// Dot-product threshold above which slerp degrades to linear interpolation
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Normalize a heading angle to the range [0°, 360°)
///
/// # Example
/// ```
/// use heading_fusion::normalize_heading;
///
/// assert_eq!(normalize_heading(370.0), 10.0);
/// assert_eq!(normalize_heading(-90.0), 270.0);
/// ```
pub fn normalize_heading(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest angular difference `to - from`, in the range (-180°, 180°]
///
/// The result is the smallest rotation that carries `from` onto `to`;
/// positive is clockwise.
///
/// # Example
/// ```
/// use heading_fusion::shortest_angle_diff;
///
/// assert_eq!(shortest_angle_diff(10.0, 350.0), 20.0);
/// assert_eq!(shortest_angle_diff(350.0, 10.0), -20.0);
/// ```
pub fn shortest_angle_diff(to: f32, from: f32) -> f32 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// One exponential smoothing step from `current` toward `target`
///
/// Moves along the shortest arc by `factor` of the remaining difference,
/// so a jump from 10° to 350° passes through 0° rather than 180°.
/// The result is normalized to [0°, 360°).
pub fn smooth_heading(current: f32, target: f32, factor: f32) -> f32 {
    normalize_heading(current + shortest_angle_diff(target, current) * factor)
}

/// Extension trait mapping device orientation angles to and from quaternions
///
/// The device orientation convention is intrinsic Z-X'-Y'': yaw (`alpha`)
/// about the vertical axis, then tilt (`beta`) about the display's
/// horizontal axis, then roll (`gamma`) about its remaining axis. All
/// angles are in degrees.
pub trait AttitudeExt {
    /// Build a unit quaternion from device orientation angles in degrees
    fn from_device_euler(alpha: f32, beta: f32, gamma: f32) -> UnitQuaternion<f32>;

    /// Extract device orientation angles `(alpha, beta, gamma)` in degrees
    ///
    /// `alpha` is normalized to [0°, 360°); `beta` is limited to
    /// [-90°, 90°] by the arcsine extraction, with the argument clamped
    /// to [-1, 1] so the poles never produce NaN.
    fn to_device_euler(&self) -> (f32, f32, f32);
}

impl AttitudeExt for UnitQuaternion<f32> {
    fn from_device_euler(alpha: f32, beta: f32, gamma: f32) -> UnitQuaternion<f32> {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), alpha * DEG_TO_RAD);
        let tilt = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), beta * DEG_TO_RAD);
        let roll = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), gamma * DEG_TO_RAD);
        yaw * tilt * roll
    }

    fn to_device_euler(&self) -> (f32, f32, f32) {
        let m = self.to_rotation_matrix().into_inner();

        // For R = Rz(alpha) * Rx(beta) * Ry(gamma):
        //   m21 = sin(beta)
        //   m01 = -sin(alpha) cos(beta),  m11 = cos(alpha) cos(beta)
        //   m20 = -cos(beta) sin(gamma),  m22 = cos(beta) cos(gamma)
        let sin_beta = m[(2, 1)].clamp(-1.0, 1.0);
        let beta = sin_beta.asin();
        let alpha = (-m[(0, 1)]).atan2(m[(1, 1)]);
        let gamma = (-m[(2, 0)]).atan2(m[(2, 2)]);

        (
            normalize_heading(alpha * RAD_TO_DEG),
            beta * RAD_TO_DEG,
            gamma * RAD_TO_DEG,
        )
    }
}

/// Spherical linear interpolation with shortest-arc and near-identity guards
///
/// When the quaternion dot product is negative one operand is negated so
/// interpolation takes the shortest arc. When the dot product exceeds
/// 0.9995 the orientations are nearly identical and plain linear
/// interpolation followed by renormalization is numerically safer than
/// dividing by a vanishing `sin`.
///
/// # Example
/// ```
/// use heading_fusion::{guarded_slerp, AttitudeExt};
/// use nalgebra::UnitQuaternion;
///
/// let a = UnitQuaternion::from_device_euler(10.0, 0.0, 0.0);
/// let b = UnitQuaternion::from_device_euler(90.0, 0.0, 0.0);
/// let mid = guarded_slerp(a, b, 0.5);
/// assert!((mid.to_device_euler().0 - 50.0).abs() < 1e-3);
/// ```
pub fn guarded_slerp(
    from: UnitQuaternion<f32>,
    to: UnitQuaternion<f32>,
    t: f32,
) -> UnitQuaternion<f32> {
    let a: Quaternion<f32> = *from.quaternion();
    let mut b: Quaternion<f32> = *to.quaternion();

    let mut dot = a.coords.dot(&b.coords);
    if dot < 0.0 {
        b = -b;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        // Nearly identical orientations: lerp and renormalize
        let blended = a * (1.0 - t) + b * t;
        return UnitQuaternion::from_quaternion(blended);
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let sin_theta_0 = theta_0.sin();
    let weight_from = ((1.0 - t) * theta_0).sin() / sin_theta_0;
    let weight_to = (t * theta_0).sin() / sin_theta_0;

    UnitQuaternion::from_quaternion(a * weight_from + b * weight_to)
}
