use criterion::{Criterion, black_box, criterion_group, criterion_main};
use heading_fusion::{HeadingEngine, OperatingMode, OrientationSample, RateSample};
use rand::prelude::*;
use rand_pcg::Pcg64;

// Pre-generated sensor data to eliminate RNG overhead during benchmarks
struct PreGeneratedData {
    samples: Vec<OrientationSample>,
    index: usize,
}

impl PreGeneratedData {
    fn new(count: usize, seed: u64, base_pitch: f32) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut samples = Vec::with_capacity(count);

        for i in 0..count {
            // Slow turn with sensor noise at a 50Hz cadence
            let yaw = (i as f32 * 0.5 + rng.random_range(-1.0..1.0)).rem_euclid(360.0);

            samples.push(OrientationSample {
                alpha: Some(yaw),
                beta: Some(base_pitch + rng.random_range(-2.0..2.0)),
                gamma: Some(rng.random_range(-5.0..5.0)),
                compass_heading: None,
                timestamp_ms: i as f64 * 20.0,
            });
        }

        Self { samples, index: 0 }
    }

    fn next(&mut self) -> OrientationSample {
        let sample = self.samples[self.index];
        self.index = (self.index + 1) % self.samples.len();
        sample
    }
}

/// Benchmark the orientation path at a level carry (Euler smoothing)
fn bench_orientation_level(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    let mut data = PreGeneratedData::new(4096, 7, 10.0);

    c.bench_function("orientation_level", |b| {
        b.iter(|| engine.handle_orientation(black_box(data.next())))
    });
}

/// Benchmark the orientation path at near-vertical pitch, which keeps
/// the quaternion representation active
fn bench_orientation_vertical(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    let mut data = PreGeneratedData::new(4096, 11, 85.0);

    c.bench_function("orientation_vertical", |b| {
        b.iter(|| engine.handle_orientation(black_box(data.next())))
    });
}

/// Benchmark the angular-rate path with an anchored gyro in AR mode
fn bench_rotation_rate_ar(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    engine.set_operating_mode(OperatingMode::Ar);

    // Anchor the gyro so integration and publication both run
    engine.handle_rotation_rate(RateSample {
        yaw_rate: Some(0.0),
        pitch_rate: Some(0.0),
        roll_rate: Some(0.0),
        timestamp_ms: 0.0,
    });
    engine.handle_orientation(OrientationSample {
        alpha: Some(90.0),
        beta: Some(10.0),
        gamma: Some(0.0),
        compass_heading: None,
        timestamp_ms: 1.0,
    });

    let mut timestamp = 2.0;
    c.bench_function("rotation_rate_ar", |b| {
        b.iter(|| {
            timestamp += 20.0;
            engine.handle_rotation_rate(black_box(RateSample {
                yaw_rate: Some(3.0),
                pitch_rate: Some(0.1),
                roll_rate: Some(-0.2),
                timestamp_ms: timestamp,
            }))
        })
    });
}

/// Benchmark snapshot fan-out to several presentation surfaces
fn bench_snapshot_fanout(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    for _ in 0..4 {
        engine.subscribe(|snapshot| {
            black_box(snapshot.heading);
        });
    }
    let mut data = PreGeneratedData::new(4096, 13, 10.0);

    c.bench_function("snapshot_fanout_4", |b| {
        b.iter(|| engine.handle_orientation(black_box(data.next())))
    });
}

/// Benchmark engine creation
fn bench_engine_creation(c: &mut Criterion) {
    c.bench_function("engine_new", |b| b.iter(|| black_box(HeadingEngine::new())));
}

/// Benchmark the diagnostic view
fn bench_debug_snapshot(c: &mut Criterion) {
    let mut engine = HeadingEngine::new();
    let mut data = PreGeneratedData::new(64, 17, 10.0);
    for _ in 0..64 {
        engine.handle_orientation(data.next());
    }

    c.bench_function("debug_snapshot", |b| {
        b.iter(|| black_box(engine.debug_snapshot()))
    });
}

criterion_group!(
    benches,
    bench_orientation_level,
    bench_orientation_vertical,
    bench_rotation_rate_ar,
    bench_snapshot_fanout,
    bench_engine_creation,
    bench_debug_snapshot
);

criterion_main!(benches);
