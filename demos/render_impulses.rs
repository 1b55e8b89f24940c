//! Renders a synthetic set of ray arrivals for a listener walking past a
//! wall and writes the binaural result to `render_impulses.wav`.
//!
//! Pass a scene file as the first argument to render every recorder it
//! contains instead.

use anyhow::Context;
use earshot::config::DEFAULT_SPEED_OF_SOUND;
use earshot::scene::load_scene_file;
use earshot::*;
use std::env;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RecorderConfig::default();
    let mut recorders = match env::args().nth(1) {
        Some(path) => load_scene_file(&path, config)
            .with_context(|| format!("Failed to load scene file {}", path))?,
        None => vec![walking_listener(config)?],
    };

    let arrivals = synthetic_arrivals(4000);
    let renderer = ParallelRenderer::default();
    log::info!(
        "Rendering {} arrivals on {} workers",
        arrivals.len(),
        renderer.workers()
    );

    for recorder in &mut recorders {
        renderer.render(recorder, &arrivals);
        let [left, right] = recorder.channels();
        log::info!(
            "{}: left peak {:.4}, right peak {:.4}",
            recorder.file_name(),
            left.peak(),
            right.peak()
        );
        recorder
            .save_as(recorder.file_name(), true, 0.9)
            .with_context(|| format!("Failed to save {}", recorder.file_name()))?;
    }

    Ok(())
}

fn walking_listener(config: RecorderConfig) -> anyhow::Result<BinauralRecorder> {
    let path = KeyframeTrack::new(vec![
        Keyframe::new(0.0, Point3::new(-2.0, 1.7, 0.0)),
        Keyframe::new(1.0, Point3::new(0.0, 1.7, 0.0)),
        Keyframe::new(2.0, Point3::new(2.0, 1.7, 0.0)),
    ])?;
    // Head turned slightly toward the wall while walking.
    let pose = Pose::new(Point3::new(0.0, 1.7, 0.0), Quat::from_rotation_y(0.3));
    let desc = RecorderDesc {
        file_name: "render_impulses.wav".into(),
        location: Animatable::animated(Arc::new(path), pose.position),
        head_size: 0.18,
        head_absorption: [0.1, 0.4, 0.8],
        ..RecorderDesc::from_pose(pose)
    };
    Ok(BinauralRecorder::new(desc, config)?)
}

/// A decaying cloud of reflections arriving from all around the listener.
fn synthetic_arrivals(count: usize) -> Vec<RayArrival> {
    (0..count)
        .map(|i| {
            let azimuth = i as f32 * 2.399_963;
            let elevation = ((i % 17) as f32 / 17.0 - 0.5) * std::f32::consts::PI;
            let direction = Vec3::new(
                elevation.cos() * azimuth.cos(),
                elevation.sin(),
                elevation.cos() * azimuth.sin(),
            );
            let time = 0.005 + i as f32 * 2.5e-4;
            let distance = time * DEFAULT_SPEED_OF_SOUND;
            let amplitude = (-3.0 * time).exp();
            let band = Band::ALL[i % Band::COUNT];
            RayArrival::new(direction, amplitude, time, distance, band).with_keyframe((i % 3) as i32)
        })
        .collect()
}
