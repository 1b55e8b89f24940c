//! Binaural recorder that turns ray arrivals into left/right ear signals.
//!
//! Each arrival is written to both channels with an interaural time
//! difference derived from the angle between the ray and the ear axis, and
//! the ear facing away from the ray is attenuated by a per-band head shadow.
//! Instead of a single impulse, a ray's energy is spread over a short linear
//! ramp whose width grows with the square root of the travelled distance.

use crate::accumulator::SampleAccumulator;
use crate::animation::Animatable;
use crate::arrival::{Band, RayArrival};
use crate::config::RecorderConfig;
use crate::error::Result;
use crate::math::{Point3, Pose, Vec3};
use crate::wave::{SaveOptions, WavCodec, WaveformCodec};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Number of output channels of a binaural recorder.
pub const TRACK_COUNT: usize = 2;

/// Output channel of a binaural recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ear {
    Left = 0,
    Right = 1,
}

/// Converts raw absorption coefficients into per-band head transmission.
///
/// Each coefficient is clamped to `[0, 1]` and mapped through `(1 - a)^4`, so
/// coefficients near 1 let almost nothing through.
pub fn head_transmission(raw_absorption: [f32; Band::COUNT]) -> [f32; Band::COUNT] {
    raw_absorption.map(|a| (1.0 - a.clamp(0.0, 1.0)).powi(4).max(0.0))
}

/// Static description of a binaural recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderDesc {
    /// Output file the recorder saves to
    pub file_name: String,
    pub location: Animatable<Point3>,
    /// Vector from the head centre toward the right ear
    pub ear_axis: Animatable<Vec3>,
    /// Interaural distance in meters
    pub head_size: f32,
    /// Raw head absorption per band, before conversion to transmission
    pub head_absorption: [f32; Band::COUNT],
}

impl Default for RecorderDesc {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            location: Animatable::Static(Point3::ZERO),
            ear_axis: Animatable::Static(Vec3::X),
            head_size: 0.2,
            head_absorption: [0.0; Band::COUNT],
        }
    }
}

impl RecorderDesc {
    /// Static recorder at the position and orientation of `pose`.
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            location: Animatable::Static(pose.position),
            ear_axis: Animatable::Static(pose.right()),
            ..Default::default()
        }
    }
}

/// Two-channel recorder accumulating ray arrivals into ear signals.
#[derive(Debug, Clone)]
pub struct BinauralRecorder {
    config: RecorderConfig,
    file_name: String,
    location: Animatable<Point3>,
    ear_axis: Animatable<Vec3>,
    head_size: f32,
    head_absorption: [f32; Band::COUNT],
    channels: [SampleAccumulator; TRACK_COUNT],
    processed_channels: Option<[SampleAccumulator; TRACK_COUNT]>,
    has_samples: bool,
    is_truncated: bool,
    is_processed: bool,
    save_processed: bool,
}

impl BinauralRecorder {
    /// Creates a recorder from a description.
    ///
    /// # Errors
    ///
    /// Returns [`EarshotError::Configuration`](crate::EarshotError::Configuration)
    /// if `config` is invalid.
    pub fn new(desc: RecorderDesc, config: RecorderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            file_name: desc.file_name,
            location: desc.location,
            ear_axis: desc.ear_axis,
            head_size: desc.head_size,
            head_absorption: head_transmission(desc.head_absorption),
            channels: Default::default(),
            processed_channels: None,
            has_samples: false,
            is_truncated: false,
            is_processed: false,
            save_processed: false,
        })
    }

    /// Returns a recorder with the same geometry and fresh, empty channels.
    ///
    /// Animation tracks are shared with `self`, not duplicated. Use this to
    /// give each worker its own buffers and [`merge`](Self::merge) them later.
    pub fn make_blank_copy(&self) -> Self {
        log::debug!("Creating blank copy of recorder '{}'", self.file_name);
        Self {
            config: self.config,
            file_name: self.file_name.clone(),
            location: self.location.clone(),
            ear_axis: self.ear_axis.clone(),
            head_size: self.head_size,
            head_absorption: self.head_absorption,
            channels: Default::default(),
            processed_channels: None,
            has_samples: false,
            is_truncated: false,
            is_processed: false,
            save_processed: self.save_processed,
        }
    }

    /// Records one ray arrival.
    ///
    /// # Arguments
    /// * `direction` - Unit direction of the incoming ray
    /// * `amplitude` - Energy carried by the ray
    /// * `time` - Arrival time in seconds
    /// * `distance` - Path length in meters, controls the spread width
    /// * `band` - Frequency band selecting the head transmission
    /// * `keyframe` - Animation keyframe, negative for static scenes
    ///
    /// Degenerate input never fails: samples before time zero or past the
    /// configured maximum duration are dropped and a zero or negative
    /// distance writes nothing.
    pub fn record(
        &mut self,
        direction: Vec3,
        amplitude: f32,
        time: f32,
        distance: f32,
        band: Band,
        keyframe: i32,
    ) {
        let dot = direction.dot(self.ear_axis.resolve(keyframe));
        let time_difference = self.head_size / self.config.speed_of_sound;
        let sample_rate = self.config.sample_rate as f64;

        let right_offset = ((time - dot * time_difference) as f64 * sample_rate).floor();
        let left_offset = ((time + dot * time_difference) as f64 * sample_rate).floor();
        if !right_offset.is_finite() || !left_offset.is_finite() {
            return;
        }
        // Nothing at or past the end of the recording window is written.
        let limit = self.config.max_samples() as f64;
        if right_offset >= limit && left_offset >= limit {
            return;
        }
        let sample_right = right_offset.min(limit) as i64;
        let sample_left = left_offset.min(limit) as i64;
        let limit = limit as i64;

        let width = distance.sqrt();
        let amplitude = 2.0 * amplitude / width;
        let mut amplitude_left = amplitude;
        let mut amplitude_right = amplitude;

        // Higher bands are shadowed more strongly by the head.
        let factor = self.head_absorption[band.index()].powf(dot.abs() * self.head_size);
        if dot < 0.0 {
            amplitude_right *= factor * factor;
        } else {
            amplitude_left *= factor * factor;
        }

        // NaN widths saturate to zero and write nothing.
        let steps = width.ceil() as i64;
        if steps <= 0 {
            return;
        }
        let step_left = amplitude_left / steps as f32;
        let step_right = amplitude_right / steps as f32;

        let [left, right] = &mut self.channels;
        for i in 0..steps.min(limit) {
            let (index_left, index_right) = (sample_left + i, sample_right + i);
            if index_left >= limit && index_right >= limit {
                break;
            }
            if index_left < limit {
                left.add(index_left, amplitude_left);
            }
            amplitude_left -= step_left;
            if index_right < limit {
                right.add(index_right, amplitude_right);
            }
            amplitude_right -= step_right;
        }
        self.has_samples = left.has_samples() || right.has_samples();
    }

    /// Records an arrival given as a [`RayArrival`].
    #[inline]
    pub fn record_arrival(&mut self, arrival: &RayArrival) {
        self.record(
            arrival.direction,
            arrival.amplitude,
            arrival.time,
            arrival.distance,
            arrival.band,
            arrival.keyframe,
        );
    }

    /// Adds the raw channels of `other` into this recorder.
    pub fn merge(&mut self, other: &BinauralRecorder) {
        log::debug!(
            "Merging {} + {} samples into recorder '{}'",
            other.channels[0].len(),
            other.channels[1].len(),
            self.file_name
        );
        for (dst, src) in self.channels.iter_mut().zip(&other.channels) {
            dst.merge(src);
        }
        self.has_samples |= other.has_samples;
    }

    /// Cuts both raw channels to at most `duration` of audio.
    pub fn truncate(&mut self, duration: Duration) {
        let len = (duration.as_secs_f64() * self.config.sample_rate as f64).ceil() as usize;
        for channel in &mut self.channels {
            channel.truncate(len);
        }
        self.is_truncated = true;
    }

    /// Installs the output of an external post-processing stage.
    pub fn set_processed_channels(&mut self, left: Vec<f32>, right: Vec<f32>) {
        self.processed_channels = Some([
            SampleAccumulator::from_samples(left),
            SampleAccumulator::from_samples(right),
        ]);
        self.is_processed = true;
    }

    /// Channels selected for output.
    ///
    /// Processed channels are used when [`save_processed`](Self::save_processed)
    /// is set and present; otherwise the raw channels.
    pub fn output_channels(&self) -> &[SampleAccumulator; TRACK_COUNT] {
        if self.save_processed {
            match &self.processed_channels {
                Some(processed) => return processed,
                None => log::warn!(
                    "Recorder '{}' has no processed channels, saving raw channels",
                    self.file_name
                ),
            }
        }
        &self.channels
    }

    /// Saves to the recorder's own file name without normalization.
    pub fn save(&self) -> Result<()> {
        self.save_as(&self.file_name, false, 1.0)
    }

    /// Saves to `path` as a WAV file.
    pub fn save_as(&self, path: impl AsRef<Path>, normalize: bool, normalize_max: f32) -> Result<()> {
        let options = SaveOptions {
            normalize,
            normalize_max,
        };
        self.save_with(&WavCodec::default(), path, &options)
    }

    /// Saves through a custom codec.
    pub fn save_with<C: WaveformCodec + ?Sized>(
        &self,
        codec: &C,
        path: impl AsRef<Path>,
        options: &SaveOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let [left, right] = self.output_channels();
        log::info!(
            "Saving recorder '{}' to {} ({} / {} samples, processed: {})",
            self.file_name,
            path.display(),
            left.len(),
            right.len(),
            self.save_processed && self.processed_channels.is_some()
        );
        codec.write_stereo(
            path,
            left.as_slice(),
            right.as_slice(),
            self.config.sample_rate,
            options,
        )
    }

    /// Recorder position at `keyframe`.
    pub fn location(&self, keyframe: i32) -> Point3 {
        self.location.resolve(keyframe)
    }

    /// Ear axis at `keyframe`.
    pub fn ear_axis(&self, keyframe: i32) -> Vec3 {
        self.ear_axis.resolve(keyframe)
    }

    /// Sets the static location, keeping any location animation.
    pub fn set_location(&mut self, location: Point3) {
        self.location.set_rest(location);
    }

    /// Location as stored, static or animated.
    pub fn location_source(&self) -> &Animatable<Point3> {
        &self.location
    }

    /// Ear axis as stored, static or animated.
    pub fn ear_axis_source(&self) -> &Animatable<Vec3> {
        &self.ear_axis
    }

    /// Whether the location follows a keyframe track.
    pub fn is_animated(&self) -> bool {
        self.location.is_animated()
    }

    /// Length in seconds of location animation segment `index`.
    pub fn segment_length(&self, index: usize) -> Option<f32> {
        self.location.track()?.segment_length(index)
    }

    /// Number of output channels, always two.
    pub fn track_count(&self) -> usize {
        TRACK_COUNT
    }

    /// Raw accumulated channel for `ear`.
    pub fn channel(&self, ear: Ear) -> &SampleAccumulator {
        &self.channels[ear as usize]
    }

    /// Raw accumulated channels, left first.
    pub fn channels(&self) -> &[SampleAccumulator; TRACK_COUNT] {
        &self.channels
    }

    /// Output of the external post-processing stage, if installed.
    pub fn processed_channels(&self) -> Option<&[SampleAccumulator; TRACK_COUNT]> {
        self.processed_channels.as_ref()
    }

    /// Constants this recorder maps arrivals with.
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// File the recorder saves to.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Interaural distance in meters.
    pub fn head_size(&self) -> f32 {
        self.head_size
    }

    /// Per-band transmission through the head, each in `[0, 1]`.
    pub fn head_absorption(&self) -> [f32; Band::COUNT] {
        self.head_absorption
    }

    /// Whether any arrival has been written.
    pub fn has_samples(&self) -> bool {
        self.has_samples
    }

    /// Whether [`truncate`](Self::truncate) has been applied.
    pub fn is_truncated(&self) -> bool {
        self.is_truncated
    }

    /// Whether processed channels have been installed.
    pub fn is_processed(&self) -> bool {
        self.is_processed
    }

    /// Whether saving prefers the processed channels.
    pub fn save_processed(&self) -> bool {
        self.save_processed
    }

    /// Selects processed or raw channels for saving.
    pub fn set_save_processed(&mut self, save_processed: bool) {
        self.save_processed = save_processed;
    }
}

impl fmt::Display for BinauralRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recorder")?;
        writeln!(f, " +- stereo")?;
        writeln!(f, " +- location: {}", self.location)?;
        writeln!(f, " +- right: {}", self.ear_axis)?;
        writeln!(f, " +- head size: {:.6}", self.head_size)?;
        let [low, mid, high] = self.head_absorption;
        writeln!(f, " +- head absorption: [{:.6}, {:.6}, {:.6}]", low, mid, high)
    }
}
