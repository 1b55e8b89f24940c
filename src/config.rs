//! Configuration for earshot recorders

use crate::error::{EarshotError, Result};

/// Sample rate the recorder renders at unless configured otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Speed of sound in air, in m/s.
pub const DEFAULT_SPEED_OF_SOUND: f32 = 343.0;

/// Longest recording a recorder accepts writes for, in seconds.
pub const DEFAULT_MAX_DURATION: f32 = 3600.0;

/// Physical constants a recorder maps ray arrivals with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecorderConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Speed of sound in m/s, used to derive the interaural time difference
    pub speed_of_sound: f32,
    /// Writes landing past this many seconds are dropped
    pub max_duration: f32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            speed_of_sound: DEFAULT_SPEED_OF_SOUND,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }
}

impl RecorderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn speed_of_sound(mut self, speed: f32) -> Self {
        self.speed_of_sound = speed;
        self
    }

    pub fn max_duration(mut self, seconds: f32) -> Self {
        self.max_duration = seconds;
        self
    }

    /// First sample index past the maximum duration.
    pub fn max_samples(&self) -> u64 {
        (self.max_duration as f64 * self.sample_rate as f64).ceil() as u64
    }

    /// Checks that all constants are usable for sample offset computation.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(EarshotError::Configuration(
                "Sample rate must be greater than zero".into(),
            ));
        }
        if !self.speed_of_sound.is_finite() || self.speed_of_sound <= 0.0 {
            return Err(EarshotError::Configuration(format!(
                "Speed of sound must be positive and finite, got {}",
                self.speed_of_sound
            )));
        }
        if !self.max_duration.is_finite() || self.max_duration <= 0.0 {
            return Err(EarshotError::Configuration(format!(
                "Maximum duration must be positive and finite, got {}",
                self.max_duration
            )));
        }
        Ok(())
    }
}
