//! # earshot
//!
//! Binaural impulse accumulation for ray-traced room acoustics.
//!
//! An external ray tracer reports every ray that reaches a listener: its
//! direction, energy, arrival time, travelled distance, frequency band and
//! animation keyframe. earshot turns that stream of arrivals into a left and
//! a right ear signal, modelling the interaural time difference, the
//! interaural level difference and frequency dependent head shadowing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use earshot::*;
//!
//! // Describe the listener: position, right ear direction, head geometry
//! let desc = RecorderDesc {
//!     file_name: "listener.wav".into(),
//!     location: Animatable::Static(Point3::new(0.0, 1.7, 0.0)),
//!     ear_axis: Animatable::Static(Vec3::X),
//!     head_size: 0.2,
//!     head_absorption: [0.2, 0.5, 0.8],
//! };
//! let mut recorder = BinauralRecorder::new(desc, RecorderConfig::default())?;
//!
//! // Feed arrivals reported by the ray tracer
//! recorder.record(Vec3::new(0.6, 0.0, -0.8), 1.0, 0.012, 4.1, Band::Mid, -1);
//!
//! // Write the result as a stereo WAV file
//! recorder.save()?;
//! # Ok::<(), EarshotError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`BinauralRecorder`]**: Maps ray arrivals to two additive sample buffers
//! - **[`SampleAccumulator`]**: Lazily grown, additively written channel buffer
//! - **[`KeyframeTrack`]** / **[`Animatable`]**: Moving listeners and turning heads
//! - **[`ParallelRenderer`]**: Records large arrival sets on several threads
//! - **[`scene`]**: Loads recorders from persisted scene streams
//! - **[`WaveformCodec`]**: Trait for writing finished recordings ([`WavCodec`] built in)
//!
//! ## Threading
//!
//! Recording needs `&mut` access, so one recorder is written by one thread at
//! a time. For parallel work, give every worker a
//! [`make_blank_copy`](BinauralRecorder::make_blank_copy) and merge the
//! copies afterwards; [`ParallelRenderer`] does exactly that. Animation
//! tracks are immutable and shared between copies.

pub mod accumulator;
pub mod animation;
pub mod arrival;
pub mod config;
pub mod error;
pub mod math;
pub mod recorder;
pub mod render;
pub mod scene;
pub mod wave;

pub use accumulator::SampleAccumulator;
pub use animation::{Animatable, Keyframe, KeyframeTrack};
pub use arrival::{Band, RayArrival};
pub use config::RecorderConfig;
pub use error::{EarshotError, Result};
pub use math::{Point3, Pose, Quat, Vec3};
pub use recorder::{BinauralRecorder, Ear, RecorderDesc, TRACK_COUNT};
pub use render::ParallelRenderer;
pub use wave::{BitDepth, SaveOptions, WavCodec, WaveformCodec};
