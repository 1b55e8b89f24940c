use approx::assert_relative_eq;
use earshot::scene::{SceneWriter, load_scene_file};
use earshot::*;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn transparent_head() -> BinauralRecorder {
    let desc = RecorderDesc {
        file_name: "scenario.wav".into(),
        ear_axis: Animatable::Static(Vec3::X),
        head_size: 0.2,
        head_absorption: [0.0; 3],
        ..Default::default()
    };
    BinauralRecorder::new(desc, RecorderConfig::default()).unwrap()
}

#[test]
fn ray_from_the_right_lands_early_on_the_right_ear() {
    let mut recorder = transparent_head();
    recorder.record(Vec3::X, 1.0, 0.0, 4.0, Band::Low, -1);

    let time_difference = 0.2f32 / 343.0;
    let expected_left = ((time_difference as f64) * 44100.0).floor() as usize;
    assert_eq!(expected_left, 25);

    // The right ear offset falls before time zero and is discarded.
    assert!(recorder.channel(Ear::Right).is_empty());

    let left = recorder.channel(Ear::Left);
    assert_eq!(left.len(), expected_left + 2);
    assert_relative_eq!(left.read(25), 1.0);
    assert_relative_eq!(left.read(26), 0.5);
}

#[test]
fn perpendicular_ray_reaches_both_ears_together() {
    let mut recorder = transparent_head();
    recorder.record(Vec3::Z, 0.8, 0.25, 16.0, Band::High, -1);

    let left = recorder.channel(Ear::Left);
    let right = recorder.channel(Ear::Right);
    assert_eq!(left, right);
    assert_eq!(left.len(), 11025 + 4);
}

#[test]
fn early_rays_leave_buffers_untouched() {
    let mut recorder = transparent_head();
    recorder.record(Vec3::NEG_X, 1.0, 0.0, 1.0, Band::Low, -1);
    // The left ear offset is negative, only the right ear is written.
    assert!(recorder.channel(Ear::Left).is_empty());
    assert_eq!(recorder.channel(Ear::Right).len(), 26);

    let mut silent = transparent_head();
    silent.record(Vec3::X, 1.0, -1.0, 9.0, Band::Mid, -1);
    assert!(silent.channel(Ear::Left).is_empty());
    assert!(silent.channel(Ear::Right).is_empty());
    assert!(!silent.has_samples());
}

#[test]
fn blank_copies_share_animation_and_merge_back() {
    let track = Arc::new(
        KeyframeTrack::new(vec![
            Keyframe::new(0.0, Point3::ZERO),
            Keyframe::new(2.0, Point3::new(0.0, 0.0, -10.0)),
        ])
        .unwrap(),
    );
    let desc = RecorderDesc {
        location: Animatable::animated(track.clone(), Point3::ZERO),
        ..Default::default()
    };
    let mut recorder = BinauralRecorder::new(desc, RecorderConfig::default()).unwrap();
    let mut copy = recorder.make_blank_copy();

    assert!(Arc::ptr_eq(copy.location_source().track().unwrap(), &track));
    assert_eq!(copy.location(1), Point3::new(0.0, 0.0, -10.0));
    assert_eq!(copy.segment_length(0), Some(2.0));

    copy.record(Vec3::Y, 1.0, 0.1, 4.0, Band::Low, 0);
    assert!(!recorder.has_samples());
    recorder.merge(&copy);
    assert!(recorder.has_samples());
    assert_eq!(recorder.channels(), copy.channels());
}

#[test]
fn saved_wav_contains_both_channels() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");

    let mut recorder = transparent_head();
    recorder.record(Vec3::NEG_X, 0.25, 0.01, 1.0, Band::Low, -1);
    recorder.save_as(&path, false, 1.0).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);

    let left_len = recorder.channel(Ear::Left).len();
    let right_len = recorder.channel(Ear::Right).len();
    assert_eq!(reader.duration() as usize, left_len.max(right_len));

    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert!(samples.iter().any(|&s| s != 0));
}

#[test]
fn processed_channels_are_saved_when_selected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed.wav");

    let mut recorder = transparent_head();
    recorder.record(Vec3::Z, 1.0, 0.0, 1.0, Band::Low, -1);
    recorder.set_processed_channels(vec![0.5, 0.25, 0.0], vec![-0.5, 0.0, 0.125]);
    recorder.set_save_processed(true);
    recorder
        .save_with(
            &WavCodec::new(BitDepth::Float32),
            &path,
            &SaveOptions::default(),
        )
        .unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![0.5, -0.5, 0.25, 0.0, 0.0, 0.125]);
}

#[test]
fn scene_file_round_trip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.bin");

    let turning = KeyframeTrack::new(vec![
        Keyframe::new(0.0, Vec3::X),
        Keyframe::new(0.5, Vec3::NEG_Z),
        Keyframe::new(1.0, Vec3::NEG_X),
    ])
    .unwrap();
    let descs = [
        RecorderDesc {
            file_name: dir.path().join("a.wav").to_string_lossy().into_owned(),
            head_absorption: [1.0, 1.0, 1.0],
            ..Default::default()
        },
        RecorderDesc {
            file_name: dir.path().join("b.wav").to_string_lossy().into_owned(),
            ear_axis: Animatable::animated(Arc::new(turning), Vec3::X),
            head_size: 0.15,
            head_absorption: [0.0, 0.25, 0.5],
            ..Default::default()
        },
    ];

    {
        let mut writer = SceneWriter::new(BufWriter::new(File::create(&path).unwrap()));
        for desc in &descs {
            writer.write_recorder(desc, 0.0).unwrap();
        }
        use std::io::Write;
        writer.into_inner().flush().unwrap();
    }

    let mut recorders = load_scene_file(&path, RecorderConfig::default()).unwrap();
    assert_eq!(recorders.len(), 2);
    assert_eq!(recorders[0].head_absorption(), [0.0, 0.0, 0.0]);
    assert_eq!(recorders[1].head_size(), 0.15);
    assert_eq!(recorders[1].ear_axis(2), Vec3::NEG_X);
    assert_eq!(recorders[1].ear_axis(-1), Vec3::X);

    let renderer = ParallelRenderer::new(2).unwrap();
    let arrivals: Vec<RayArrival> = (0..16)
        .map(|i| RayArrival::new(Vec3::X, 0.1, 0.001 * i as f32, 2.0, Band::Mid).with_keyframe(i % 3))
        .collect();
    for recorder in &mut recorders {
        renderer.render(recorder, &arrivals);
        recorder.save().unwrap();
    }
    assert!(dir.path().join("a.wav").exists());
    assert!(dir.path().join("b.wav").exists());
}
