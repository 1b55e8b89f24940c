//! Waveform output for finished recorders.
//!
//! Recorders hand their two channels to a [`WaveformCodec`]. [`WavCodec`] is
//! the built-in implementation and writes stereo WAV files through `hound`.

use crate::error::{EarshotError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Seek, Write};
use std::path::Path;

/// Level controls applied while encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveOptions {
    /// Scale the output so its peak equals `normalize_max`
    pub normalize: bool,
    /// Target peak when normalizing (linear, 1.0 = full scale)
    pub normalize_max: f32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            normalize_max: 1.0,
        }
    }
}

impl SaveOptions {
    pub fn normalized(normalize_max: f32) -> Self {
        Self {
            normalize: true,
            normalize_max,
        }
    }
}

/// Sample encoding of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    #[default]
    Int16,
    Int24,
    Float32,
}

impl BitDepth {
    pub fn bits(self) -> u16 {
        match self {
            Self::Int16 => 16,
            Self::Int24 => 24,
            Self::Float32 => 32,
        }
    }
}

/// Encoder that turns two float channels into an audio file.
///
/// Implement this to route recorder output into a custom format or sink.
pub trait WaveformCodec {
    /// Writes `left` and `right` to `path`.
    ///
    /// The channels may differ in length; the shorter one is padded with
    /// silence.
    fn write_stereo(
        &self,
        path: &Path,
        left: &[f32],
        right: &[f32],
        sample_rate: u32,
        options: &SaveOptions,
    ) -> Result<()>;
}

/// Stereo WAV encoder backed by `hound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec {
    pub bit_depth: BitDepth,
}

impl WavCodec {
    pub fn new(bit_depth: BitDepth) -> Self {
        Self { bit_depth }
    }

    /// Encodes into any seekable writer, e.g. an in-memory cursor.
    pub fn encode<W: Write + Seek>(
        &self,
        writer: W,
        left: &[f32],
        right: &[f32],
        sample_rate: u32,
        options: &SaveOptions,
    ) -> Result<()> {
        let spec = self.spec(sample_rate);
        let mut writer = WavWriter::new(writer, spec).map_err(codec_error)?;
        self.write_frames(&mut writer, left, right, options)?;
        writer.finalize().map_err(codec_error)
    }

    fn spec(&self, sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: self.bit_depth.bits(),
            sample_format: match self.bit_depth {
                BitDepth::Float32 => SampleFormat::Float,
                _ => SampleFormat::Int,
            },
        }
    }

    fn write_frames<W: Write + Seek>(
        &self,
        writer: &mut WavWriter<W>,
        left: &[f32],
        right: &[f32],
        options: &SaveOptions,
    ) -> Result<()> {
        let gain = output_gain(left, right, options);
        let frames = left.len().max(right.len());

        for i in 0..frames {
            for channel in [left, right] {
                let sample = channel.get(i).copied().unwrap_or(0.0) * gain;
                match self.bit_depth {
                    BitDepth::Int16 => {
                        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                        writer.write_sample(value).map_err(codec_error)?;
                    }
                    BitDepth::Int24 => {
                        let value = (sample.clamp(-1.0, 1.0) * 8_388_607.0) as i32;
                        writer.write_sample(value).map_err(codec_error)?;
                    }
                    BitDepth::Float32 => {
                        writer.write_sample(sample).map_err(codec_error)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl WaveformCodec for WavCodec {
    fn write_stereo(
        &self,
        path: &Path,
        left: &[f32],
        right: &[f32],
        sample_rate: u32,
        options: &SaveOptions,
    ) -> Result<()> {
        let spec = self.spec(sample_rate);
        let mut writer = WavWriter::create(path, spec).map_err(codec_error)?;
        self.write_frames(&mut writer, left, right, options)?;
        writer.finalize().map_err(codec_error)?;

        log::info!(
            "Wrote {} frames ({} bit) to {}",
            left.len().max(right.len()),
            self.bit_depth.bits(),
            path.display()
        );
        Ok(())
    }
}

/// Gain that brings the joint peak of both channels to `normalize_max`.
///
/// Silent input and disabled normalization leave the level unchanged.
pub fn output_gain(left: &[f32], right: &[f32], options: &SaveOptions) -> f32 {
    if !options.normalize {
        return 1.0;
    }
    let peak = left
        .iter()
        .chain(right)
        .fold(0.0f32, |peak, s| peak.max(s.abs()));
    if peak > 0.0 && peak.is_finite() {
        options.normalize_max / peak
    } else {
        1.0
    }
}

fn codec_error(e: hound::Error) -> EarshotError {
    match e {
        hound::Error::IoError(io) => EarshotError::Io(io),
        other => EarshotError::Codec(other.to_string()),
    }
}
