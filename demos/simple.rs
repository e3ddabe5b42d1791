use heading_fusion::{HeadingEngine, OrientationSample};

const SAMPLE_PERIOD_MS: f64 = 20.0; // 50 Hz orientation stream

fn main() {
    let mut engine = HeadingEngine::new();

    for i in 0..10 {
        // this loop should repeat each time new orientation data is available
        let sample = OrientationSample {
            alpha: Some(315.0), // replace this with actual yaw data in degrees
            beta: Some(10.0),   // replace this with actual pitch data in degrees
            gamma: Some(0.0),   // replace this with actual roll data in degrees
            compass_heading: None,
            timestamp_ms: i as f64 * SAMPLE_PERIOD_MS,
        };

        engine.handle_orientation(sample);

        let debug = engine.debug_snapshot();
        println!(
            "Heading: {:.1}°  Raw: {:.1}°  Confidence: {:.2}",
            engine.heading(),
            debug.raw_heading,
            debug.confidence
        );
    }
}
