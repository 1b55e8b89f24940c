//! Ray arrival events delivered by an external ray tracer.

use crate::math::Vec3;

/// Coarse frequency band of a ray's energy.
///
/// Matches the three bands acoustic materials are specified in
/// (roughly 400 Hz, 2.5 kHz and 15 kHz).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Low = 0,
    Mid = 1,
    High = 2,
}

impl Band {
    pub const COUNT: usize = 3;
    pub const ALL: [Band; Band::COUNT] = [Band::Low, Band::Mid, Band::High];

    /// Maps a tracer band index to a band, `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Band {
    type Error = usize;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(index)
    }
}

/// One ray reaching a recorder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayArrival {
    /// Unit direction the ray travels in when it reaches the recorder
    pub direction: Vec3,
    /// Energy carried by the ray
    pub amplitude: f32,
    /// Arrival time in seconds since emission
    pub time: f32,
    /// Total path length travelled, in meters
    pub distance: f32,
    pub band: Band,
    /// Animation keyframe the ray was traced in, negative when the scene is static
    pub keyframe: i32,
}

impl RayArrival {
    /// Creates an arrival for a static scene
    pub fn new(direction: Vec3, amplitude: f32, time: f32, distance: f32, band: Band) -> Self {
        Self {
            direction,
            amplitude,
            time,
            distance,
            band,
            keyframe: -1,
        }
    }

    pub fn with_keyframe(mut self, keyframe: i32) -> Self {
        self.keyframe = keyframe;
        self
    }
}
