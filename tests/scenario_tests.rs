//! Multi-phase scenarios driving the engine the way the presentation
//! surfaces do

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use heading_fusion::{
    CapabilityGate, EngineSettings, HeadingEngine, OperatingMode, OrientationSample,
    PermissionOutcome, PermissionState, PlatformCapabilities, RateSample, Representation,
    StabilityStatus,
};

fn orientation(alpha: f32, beta: f32, timestamp_ms: f64) -> OrientationSample {
    OrientationSample {
        alpha: Some(alpha),
        beta: Some(beta),
        gamma: Some(0.0),
        compass_heading: None,
        timestamp_ms,
    }
}

fn rate(yaw_rate: f32, timestamp_ms: f64) -> RateSample {
    RateSample {
        yaw_rate: Some(yaw_rate),
        pitch_rate: Some(0.0),
        roll_rate: Some(0.0),
        timestamp_ms,
    }
}

/// Gate that resolves immediately with a fixed outcome
struct FixedGate(PermissionOutcome);

impl CapabilityGate for FixedGate {
    async fn request(&mut self) -> PermissionOutcome {
        self.0
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

/// Raising the device to vertical and lowering it again must not kick
/// the heading, only degrade its confidence
#[test]
fn test_tilt_up_episode_keeps_heading_continuous() {
    let mut engine = HeadingEngine::new();
    let mut timestamp = 0.0;

    // Walk facing 45° (alpha 315) at level pitch
    for _ in 0..20 {
        engine.handle_orientation(orientation(315.0, 5.0, timestamp));
        timestamp += 100.0;
    }
    assert!((engine.heading() - 45.0).abs() < 0.5);

    let mut entered_quaternion = false;

    // Raise to vertical and back down, yaw steady
    for step in 0..40 {
        let pitch = if step < 20 {
            5.0 + step as f32 * 4.0 // up to 81°
        } else {
            81.0 - (step - 20) as f32 * 4.0
        };
        engine.handle_orientation(orientation(315.0, pitch, timestamp));
        timestamp += 100.0;

        let debug = engine.debug_snapshot();
        if debug.representation == Representation::Quaternion {
            entered_quaternion = true;
        }
        assert!(
            (engine.heading() - 45.0).abs() < 5.0,
            "heading kicked to {} at pitch {}",
            engine.heading(),
            pitch
        );
    }

    assert!(entered_quaternion, "vertical hold never left Euler smoothing");
    assert_eq!(engine.debug_snapshot().representation, Representation::Euler);
}

/// AR mode: gyro seeds from the first compass heading, dead-reckons,
/// and gets pulled back by drift correction
#[test]
fn test_ar_gyro_dead_reckoning() {
    let mut engine = HeadingEngine::new();
    engine.set_operating_mode(OperatingMode::Ar);

    // Rate stream appears first: availability noted, nothing to anchor to
    engine.handle_rotation_rate(rate(0.0, 0.0));
    let debug = engine.debug_snapshot();
    assert!(debug.gyro_available);
    assert!(!debug.gyro_calibrated);

    // First compass heading seeds the gyro
    engine.handle_orientation(orientation(270.0, 10.0, 10.0));
    assert!(engine.debug_snapshot().gyro_calibrated);
    assert_eq!(engine.heading(), 90.0);

    // 10°/s for one second of rate samples
    for i in 1..=10 {
        engine.handle_rotation_rate(rate(10.0, i as f64 * 100.0));
    }
    assert!((engine.heading() - 100.0).abs() < 1e-3);

    // Stable compass sample at 90° pulls the estimate back by 0.005 of
    // the 10° drift
    engine.handle_orientation(orientation(270.0, 10.0, 1100.0));
    assert!((engine.heading() - 99.95).abs() < 1e-3);
}

/// Leaving AR mode drops the gyro anchor; compass smoothing takes over
#[test]
fn test_mode_change_resets_gyro() {
    let mut engine = HeadingEngine::new();
    engine.set_operating_mode(OperatingMode::Ar);

    engine.handle_rotation_rate(rate(0.0, 0.0));
    engine.handle_orientation(orientation(270.0, 10.0, 10.0));
    for i in 1..=10 {
        engine.handle_rotation_rate(rate(10.0, i as f64 * 100.0));
    }
    assert!((engine.heading() - 100.0).abs() < 1e-3);

    engine.set_operating_mode(OperatingMode::Compass);
    let debug = engine.debug_snapshot();
    assert!(!debug.gyro_calibrated);
    // Published heading falls back to the smoothed compass value
    assert!((engine.heading() - 90.0).abs() < 1.0);

    // Back into AR: a fresh seed is required before dead reckoning
    engine.set_operating_mode(OperatingMode::Ar);
    assert!(!engine.debug_snapshot().gyro_calibrated);
    engine.handle_orientation(orientation(270.0, 10.0, 2000.0));
    assert!(engine.debug_snapshot().gyro_calibrated);
}

/// Without any gyro hardware, AR mode behaves like compass smoothing
/// and never freezes at vertical
#[test]
fn test_ar_without_gyro_falls_back_to_smoothing() {
    let mut engine = HeadingEngine::new();
    engine.set_operating_mode(OperatingMode::Ar);

    engine.handle_orientation(orientation(270.0, 90.0, 0.0));
    let debug = engine.debug_snapshot();
    assert!(!debug.gyro_available);
    assert_eq!(debug.confidence, 0.7);

    // Heading keeps tracking at vertical in AR mode
    engine.handle_orientation(orientation(270.0, 90.0, 100.0));
    assert!(engine.heading().is_finite());
    assert_eq!(engine.debug_snapshot().operating_mode, OperatingMode::Ar);
}

/// The permission gate must resolve before any sample is accepted
#[test]
fn test_permission_gate_flow() {
    let mut engine = HeadingEngine::with_platform(
        EngineSettings::default(),
        PlatformCapabilities::IOS_SAFARI,
    );
    assert!(engine.needs_permission());

    // Denied: engine stays uninitialized, no automatic retry
    let state = block_on(engine.request_access(&mut FixedGate(PermissionOutcome::Denied)));
    assert_eq!(state, PermissionState::Denied);
    engine.handle_orientation(orientation(90.0, 0.0, 0.0));
    assert_eq!(engine.debug_snapshot().window_len, 0);

    // User re-prompts, grant goes through
    let state = block_on(engine.request_access(&mut FixedGate(PermissionOutcome::Granted)));
    assert_eq!(state, PermissionState::Granted);
    assert!(!engine.needs_permission());
    engine.handle_orientation(orientation(90.0, 0.0, 100.0));
    assert_eq!(engine.debug_snapshot().window_len, 1);
}

/// Platforms without a permission concept proceed as implicitly granted
#[test]
fn test_unsupported_gate_proceeds() {
    let mut engine = HeadingEngine::with_platform(
        EngineSettings::default(),
        PlatformCapabilities::GENERIC,
    );
    assert!(!engine.needs_permission());

    // An explicit unsupported outcome is equally fine
    let state = block_on(engine.request_access(&mut FixedGate(PermissionOutcome::Unsupported)));
    assert_eq!(state, PermissionState::Unsupported);
    engine.handle_orientation(orientation(90.0, 0.0, 0.0));
    assert_eq!(engine.debug_snapshot().window_len, 1);
}

/// Compass status tiers ride the pitch profile through a full raise
#[test]
fn test_status_progression_through_raise() {
    let mut engine = HeadingEngine::new();
    let statuses = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&statuses);
    engine.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.status));

    for (i, pitch) in [10.0f32, 65.0, 80.0, 95.0, 10.0].iter().enumerate() {
        engine.handle_orientation(orientation(0.0, *pitch, i as f64 * 1000.0));
    }

    assert_eq!(
        *statuses.borrow(),
        vec![
            StabilityStatus::Stable,
            StabilityStatus::SemiStable,
            StabilityStatus::Unstable,
            StabilityStatus::Frozen,
            StabilityStatus::Stable,
        ]
    );
}
