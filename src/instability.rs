//! Sliding-window instability detection over orientation samples

use crate::math::shortest_angle_diff;
use crate::types::EulerSample;

/// Capacity of the sample window
pub const WINDOW_CAPACITY: usize = 10;

/// Near-vertical pitch band, in degrees
const NEAR_VERTICAL_MIN: f32 = 75.0;
const NEAR_VERTICAL_MAX: f32 = 105.0;

/// Detects rotational instability from consecutive orientation samples
///
/// Maintains a fixed-capacity FIFO of recent samples and derives the
/// inter-sample angular velocity of the yaw angle. A sample counts as
/// unstable when that velocity exceeds the configured threshold or when
/// the pitch angle sits in the near-vertical band where yaw readings
/// degrade. The consecutive-unstable counter feeds the representation
/// switch; it resets to zero on any stable sample.
#[derive(Debug, Clone, Copy)]
pub struct InstabilityDetector {
    /// Ring buffer of recent samples, oldest evicted on overflow
    window: [Option<EulerSample>; WINDOW_CAPACITY],
    /// Next write position in the ring
    head: usize,
    /// Number of occupied slots
    len: usize,
    /// Angular velocity above which a sample is unstable, in °/s
    velocity_threshold: f32,
    /// Consecutive unstable sample count
    consecutive_unstable: u32,
    /// Most recently computed angular velocity, in °/s
    last_velocity: f32,
}

impl InstabilityDetector {
    /// Create a detector with the given velocity threshold in °/s
    pub fn new(velocity_threshold: f32) -> Self {
        Self {
            window: [None; WINDOW_CAPACITY],
            head: 0,
            len: 0,
            velocity_threshold,
            consecutive_unstable: 0,
            last_velocity: 0.0,
        }
    }

    /// Observe one validated sample and return the consecutive-unstable count
    ///
    /// A non-positive timestamp delta (stale or duplicate sample) skips
    /// the velocity computation for this sample; the pitch-band test
    /// still applies.
    pub fn observe(&mut self, sample: EulerSample) -> u32 {
        let velocity = match self.latest() {
            Some(prev) => {
                let dt = ((sample.timestamp_ms - prev.timestamp_ms) / 1000.0) as f32;
                if dt > 0.0 {
                    let velocity = shortest_angle_diff(sample.alpha, prev.alpha).abs() / dt;
                    self.last_velocity = velocity;
                    velocity
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        self.push(sample);

        let unstable = velocity > self.velocity_threshold || Self::near_vertical(sample.beta);
        if unstable {
            self.consecutive_unstable += 1;
        } else {
            self.consecutive_unstable = 0;
        }

        self.consecutive_unstable
    }

    /// Consecutive unstable sample count
    pub fn consecutive_unstable(&self) -> u32 {
        self.consecutive_unstable
    }

    /// Most recently computed angular velocity in °/s
    pub fn last_velocity(&self) -> f32 {
        self.last_velocity
    }

    /// Number of samples currently held in the window
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window holds no samples yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clear the window and counters
    pub fn reset(&mut self) {
        self.window = [None; WINDOW_CAPACITY];
        self.head = 0;
        self.len = 0;
        self.consecutive_unstable = 0;
        self.last_velocity = 0.0;
    }

    fn push(&mut self, sample: EulerSample) {
        self.window[self.head] = Some(sample);
        self.head = (self.head + 1) % WINDOW_CAPACITY;
        if self.len < WINDOW_CAPACITY {
            self.len += 1;
        }
    }

    fn latest(&self) -> Option<EulerSample> {
        if self.len == 0 {
            return None;
        }
        self.window[(self.head + WINDOW_CAPACITY - 1) % WINDOW_CAPACITY]
    }

    fn near_vertical(beta: f32) -> bool {
        (NEAR_VERTICAL_MIN..=NEAR_VERTICAL_MAX).contains(&beta.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(alpha: f32, beta: f32, timestamp_ms: f64) -> EulerSample {
        EulerSample {
            alpha,
            beta,
            gamma: 0.0,
            timestamp_ms,
        }
    }

    #[test]
    fn test_first_sample_is_stable() {
        let mut detector = InstabilityDetector::new(30.0);
        assert_eq!(detector.observe(sample(0.0, 0.0, 0.0)), 0);
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn test_velocity_threshold() {
        let mut detector = InstabilityDetector::new(30.0);

        // 2° over 100ms = 20°/s, below threshold
        detector.observe(sample(0.0, 0.0, 0.0));
        assert_eq!(detector.observe(sample(2.0, 0.0, 100.0)), 0);
        assert!((detector.last_velocity() - 20.0).abs() < 1e-3);

        // 5° over 100ms = 50°/s, above threshold
        assert_eq!(detector.observe(sample(7.0, 0.0, 200.0)), 1);
        assert!((detector.last_velocity() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_velocity_uses_shortest_path() {
        let mut detector = InstabilityDetector::new(30.0);

        // 359° -> 1° is a 2° step, not 358°
        detector.observe(sample(359.0, 0.0, 0.0));
        assert_eq!(detector.observe(sample(1.0, 0.0, 100.0)), 0);
        assert!((detector.last_velocity() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_stale_timestamp_skips_velocity() {
        let mut detector = InstabilityDetector::new(30.0);

        detector.observe(sample(0.0, 0.0, 1000.0));
        // Same timestamp with a huge angle jump: no division, no instability
        assert_eq!(detector.observe(sample(180.0, 0.0, 1000.0)), 0);
        // Timestamp going backwards is equally ignored
        assert_eq!(detector.observe(sample(0.0, 0.0, 500.0)), 0);
    }

    #[test]
    fn test_near_vertical_band() {
        let mut detector = InstabilityDetector::new(30.0);

        detector.observe(sample(0.0, 74.9, 0.0));
        assert_eq!(detector.consecutive_unstable(), 0);

        assert_eq!(detector.observe(sample(0.0, 75.0, 100.0)), 1);
        assert_eq!(detector.observe(sample(0.0, 105.0, 200.0)), 2);
        assert_eq!(detector.observe(sample(0.0, -90.0, 300.0)), 3);
        assert_eq!(detector.observe(sample(0.0, 105.1, 400.0)), 0);
    }

    #[test]
    fn test_counter_resets_on_stable_sample() {
        let mut detector = InstabilityDetector::new(30.0);

        detector.observe(sample(0.0, 0.0, 0.0));
        detector.observe(sample(10.0, 0.0, 100.0)); // 100°/s
        detector.observe(sample(20.0, 0.0, 200.0)); // 100°/s
        assert_eq!(detector.consecutive_unstable(), 2);

        // One slow sample resets the streak entirely, no decay
        detector.observe(sample(20.5, 0.0, 300.0)); // 5°/s
        assert_eq!(detector.consecutive_unstable(), 0);
    }

    #[test]
    fn test_window_eviction() {
        let mut detector = InstabilityDetector::new(30.0);

        for i in 0..25 {
            detector.observe(sample(0.0, 0.0, i as f64 * 100.0));
        }
        assert_eq!(detector.len(), WINDOW_CAPACITY);
    }

    #[test]
    fn test_reset() {
        let mut detector = InstabilityDetector::new(30.0);

        detector.observe(sample(0.0, 80.0, 0.0));
        detector.observe(sample(0.0, 80.0, 100.0));
        assert_eq!(detector.consecutive_unstable(), 2);

        detector.reset();
        assert!(detector.is_empty());
        assert_eq!(detector.consecutive_unstable(), 0);
        assert_eq!(detector.last_velocity(), 0.0);
    }
}
