//! Heading Fusion - an orientation fusion and stability engine for field
//! navigation aids
//!
//! This library turns noisy, irregularly-sampled, platform-inconsistent
//! device orientation and angular-rate streams into a single,
//! continuously-updated, confidence-scored compass heading. It switches
//! internally between Euler-angle smoothing and quaternion interpolation
//! to ride out the gimbal-lock instability that appears when a handheld
//! device is tilted toward vertical.
//!
//! # Features
//!
//! - Sliding-window instability detection with asymmetric hysteresis
//!   into and out of the quaternion representation
//! - Tilt-driven stability tiers controlling confidence, smoothing
//!   strength, and heading freezing per operating mode
//! - AR mode with gyro dead reckoning and slow compass drift correction
//! - Injected platform profiles instead of runtime environment sniffing
//! - Synchronous, ordered snapshot publication to any number of
//!   presentation surfaces
//!
//! # Quick Start
//!
//! ```rust
//! use heading_fusion::{HeadingEngine, OrientationSample};
//!
//! let mut engine = HeadingEngine::new();
//!
//! // Subscribe a presentation surface
//! engine.subscribe(|snapshot| {
//!     let _ = (snapshot.heading, snapshot.confidence);
//! });
//!
//! // Feed orientation samples as the host delivers them
//! engine.handle_orientation(OrientationSample {
//!     alpha: Some(45.0),
//!     beta: Some(10.0),
//!     gamma: Some(0.0),
//!     compass_heading: None,
//!     timestamp_ms: 16.0,
//! });
//!
//! assert_eq!(engine.heading(), 315.0);
//! ```

mod engine;
pub mod geo;
mod gyro;
mod instability;
mod math;
mod platform;
mod publisher;
mod stability;
mod types;

// Re-export all public types and functions
pub use engine::HeadingEngine;
pub use gyro::GyroIntegrator;
pub use instability::{InstabilityDetector, WINDOW_CAPACITY};
pub use math::{
    AttitudeExt, DEG_TO_RAD, RAD_TO_DEG, guarded_slerp, normalize_heading, shortest_angle_diff,
    smooth_heading,
};
pub use platform::{CapabilityGate, HeadingSource, PlatformCapabilities, PlatformProfile};
pub use publisher::{HeadingPublisher, SubscriptionId};
pub use stability::{STABLE_CONFIDENCE, evaluate_stability};
pub use types::*;
