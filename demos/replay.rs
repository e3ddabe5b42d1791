//! Recorded-walk replay demonstration
//!
//! Replays a logged handheld walk (including a tilt-up episode around
//! the 12 second mark) through the fusion engine and plots the fused
//! heading against the raw heading, together with pitch, confidence,
//! and the active smoothing representation.
//!
//! The first 20 seconds run in compass mode; the remainder switches to
//! AR mode so the gyro dead-reckoning path is exercised too.
//!
//! Run with: `cargo run --example replay`

use heading_fusion::{HeadingEngine, OperatingMode, OrientationSample, RateSample};
use plotters::prelude::*;
use serde::Deserialize;
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

#[derive(Debug, Deserialize)]
struct LogRecord {
    #[serde(rename = "Time (s)")]
    time: f32,
    #[serde(rename = "Alpha (deg)")]
    alpha: f32,
    #[serde(rename = "Beta (deg)")]
    beta: f32,
    #[serde(rename = "Gamma (deg)")]
    gamma: f32,
    #[serde(rename = "Yaw Rate (deg/s)")]
    yaw_rate: f32,
}

/// Per-sample trace collected from published snapshots
#[derive(Debug, Clone, Copy)]
struct TracePoint {
    time: f32,
    heading: f32,
    raw_heading: f32,
    pitch: f32,
    confidence: f32,
    quaternion_active: f32,
}

const AR_SWITCH_TIME: f32 = 20.0; // seconds

fn main() -> Result<(), Box<dyn Error>> {
    println!("Replay example - fused vs raw heading over a recorded walk");

    // Load the recorded walk from CSV
    let mut reader = csv::Reader::from_path("testdata/orientation_log.csv")?;
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let record: LogRecord = result?;
        records.push(record);
    }

    println!("Processing {} recorded samples...", records.len());

    let mut engine = HeadingEngine::new();

    // Collect every published snapshot for plotting
    let trace: Rc<RefCell<Vec<TracePoint>>> = Rc::new(RefCell::new(Vec::new()));
    let current_time = Rc::new(RefCell::new(0.0f32));
    let sink = Rc::clone(&trace);
    let clock = Rc::clone(&current_time);
    engine.subscribe(move |snapshot| {
        sink.borrow_mut().push(TracePoint {
            time: *clock.borrow(),
            heading: snapshot.heading,
            raw_heading: snapshot.raw_heading,
            pitch: snapshot.pitch,
            confidence: snapshot.confidence,
            quaternion_active: if snapshot.quaternion_active { 1.0 } else { 0.0 },
        });
    });

    let mut switched_to_ar = false;

    for (i, record) in records.iter().enumerate() {
        *current_time.borrow_mut() = record.time;

        if !switched_to_ar && record.time >= AR_SWITCH_TIME {
            engine.set_operating_mode(OperatingMode::Ar);
            switched_to_ar = true;
            println!("Switched to AR mode at {:.1}s", record.time);
        }

        engine.handle_orientation(OrientationSample {
            alpha: Some(record.alpha),
            beta: Some(record.beta),
            gamma: Some(record.gamma),
            compass_heading: None,
            timestamp_ms: record.time as f64 * 1000.0,
        });
        engine.handle_rotation_rate(RateSample {
            yaw_rate: Some(record.yaw_rate),
            pitch_rate: Some(0.0),
            roll_rate: Some(0.0),
            timestamp_ms: record.time as f64 * 1000.0,
        });

        if i % 100 == 0 {
            let debug = engine.debug_snapshot();
            println!(
                "Sample {}: heading={:.1}° raw={:.1}° confidence={:.2} representation={:?} streak={}",
                i,
                engine.heading(),
                debug.raw_heading,
                debug.confidence,
                debug.representation,
                debug.consecutive_unstable
            );
        }
    }

    let trace = trace.borrow();
    let quaternion_samples = trace
        .iter()
        .filter(|point| point.quaternion_active > 0.5)
        .count();
    println!(
        "Quaternion representation active for {} of {} snapshots",
        quaternion_samples,
        trace.len()
    );

    println!("Generating replay plots...");
    create_replay_plots(&trace)?;

    println!("✓ Plots saved to heading_replay.png");
    println!("✓ The upper panel shows how the fused heading rides through the tilt-up episode.");
    Ok(())
}

/// Create the replay plot: headings, pitch, confidence, and the active
/// representation over time
fn create_replay_plots(trace: &[TracePoint]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("heading_replay.png", (1000, 1000)).into_drawing_area();
    root.fill(&WHITE)?;

    let height_ratios = [4u32, 2, 1, 1];
    let total_height: u32 = height_ratios.iter().sum();
    let mut y_offset = 0;
    let mut areas = Vec::new();

    for &ratio in &height_ratios {
        let height = (ratio * 1000) / total_height;
        let area = root.margin(10, 10, y_offset, 1000 - y_offset - height);
        areas.push(area);
        y_offset += height;
    }

    let time_range = trace[0].time..trace.last().unwrap().time;

    // 1. Raw vs fused heading
    let mut heading_chart = ChartBuilder::on(&areas[0])
        .caption("Fused Heading Replay", ("sans-serif", 20))
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range.clone(), 0f32..360f32)?;

    heading_chart.configure_mesh().y_desc("Degrees").draw()?;

    heading_chart
        .draw_series(LineSeries::new(
            trace.iter().map(|p| (p.time, p.raw_heading)),
            &RED,
        ))?
        .label("Raw heading")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], RED));

    heading_chart
        .draw_series(LineSeries::new(
            trace.iter().map(|p| (p.time, p.heading)),
            &BLUE,
        ))?
        .label("Fused heading")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], BLUE));

    heading_chart.configure_series_labels().draw()?;

    // 2. Pitch profile
    let mut pitch_chart = ChartBuilder::on(&areas[1])
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range.clone(), -10f32..120f32)?;

    pitch_chart.configure_mesh().y_desc("Pitch (°)").draw()?;

    pitch_chart
        .draw_series(LineSeries::new(
            trace.iter().map(|p| (p.time, p.pitch)),
            &GREEN,
        ))?
        .label("Pitch")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], GREEN));

    pitch_chart.configure_series_labels().draw()?;

    // 3. Confidence
    let mut confidence_chart = ChartBuilder::on(&areas[2])
        .margin(5)
        .x_label_area_size(0)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range.clone(), 0f32..1.1f32)?;

    confidence_chart
        .configure_mesh()
        .y_desc("Confidence")
        .draw()?;

    confidence_chart.draw_series(LineSeries::new(
        trace.iter().map(|p| (p.time, p.confidence)),
        &RGBColor(255, 165, 0), // orange
    ))?;

    // 4. Quaternion representation active
    let mut representation_chart = ChartBuilder::on(&areas[3])
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range, -0.1f32..1.1f32)?;

    representation_chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_label_formatter(&|y| {
            if *y < 0.5 {
                "Euler".to_string()
            } else {
                "Quat".to_string()
            }
        })
        .draw()?;

    representation_chart
        .draw_series(LineSeries::new(
            trace.iter().map(|p| (p.time, p.quaternion_active)),
            &CYAN,
        ))?
        .label("Quaternion active")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], CYAN));

    representation_chart.configure_series_labels().draw()?;

    root.present()?;
    Ok(())
}
