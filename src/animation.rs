//! Keyframed animation of recorder attributes.
//!
//! A recorder's position and ear orientation are either fixed or follow a
//! [`KeyframeTrack`]. Tracks are immutable once built and are shared through
//! [`Arc`] between a recorder and its blank copies.

use crate::error::{EarshotError, Result};
use crate::math::Interpolate;
use std::fmt;
use std::sync::Arc;

/// A single animation sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    /// Time of the keyframe in seconds
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Ordered keyframes evaluated in keyframe index space.
///
/// Position `2.5` lies halfway between keyframes 2 and 3. Positions past the
/// last keyframe hold its value.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Builds a track from keyframes sorted by time.
    ///
    /// # Errors
    ///
    /// Returns [`EarshotError::Animation`] if the list is empty, or a time is
    /// not finite or earlier than its predecessor.
    pub fn new(keyframes: Vec<Keyframe<T>>) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(EarshotError::Animation(
                "Track needs at least one keyframe".into(),
            ));
        }
        for (i, pair) in keyframes.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(EarshotError::Animation(format!(
                    "Keyframe {} at {}s precedes keyframe {} at {}s",
                    i + 1,
                    pair[1].time,
                    i,
                    pair[0].time
                )));
            }
        }
        if let Some(bad) = keyframes.iter().position(|k| !k.time.is_finite()) {
            return Err(EarshotError::Animation(format!(
                "Keyframe {} has a non-finite time",
                bad
            )));
        }
        Ok(Self { keyframes })
    }

    /// Value at keyframe `position`, `None` for negative or non-finite positions.
    pub fn evaluate(&self, position: f32) -> Option<T> {
        if !position.is_finite() || position < 0.0 {
            return None;
        }
        let last = self.keyframes.len() - 1;
        let base = position.floor();
        let index = base as usize;
        if index >= last {
            return Some(self.keyframes[last].value);
        }
        let t = position - base;
        let from = self.keyframes[index].value;
        if t == 0.0 {
            return Some(from);
        }
        Some(from.interpolate(self.keyframes[index + 1].value, t))
    }
}

impl<T> KeyframeTrack<T> {
    /// Duration in seconds between keyframe `index` and the next one.
    pub fn segment_length(&self, index: usize) -> Option<f32> {
        let from = self.keyframes.get(index)?;
        let to = self.keyframes.get(index + 1)?;
        Some(to.time - from.time)
    }

    /// Time span from the first to the last keyframe.
    pub fn duration(&self) -> f32 {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

impl<T> fmt::Display for KeyframeTrack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "animation ({} keyframes over {:.3}s)",
            self.keyframes.len(),
            self.duration()
        )
    }
}

/// An attribute that is either fixed or driven by a shared keyframe track.
#[derive(Debug, Clone, PartialEq)]
pub enum Animatable<T> {
    Static(T),
    /// `rest` is kept for readers that ignore animation.
    Animated {
        track: Arc<KeyframeTrack<T>>,
        rest: T,
    },
}

impl<T: Interpolate> Animatable<T> {
    /// Resolves the attribute for `keyframe`.
    ///
    /// The track is consulted only for non-negative keyframes; otherwise the
    /// static value is returned.
    #[inline]
    pub fn resolve(&self, keyframe: i32) -> T {
        match self {
            Self::Static(value) => *value,
            Self::Animated { track, rest } => {
                if keyframe >= 0 {
                    track.evaluate(keyframe as f32).unwrap_or(*rest)
                } else {
                    *rest
                }
            }
        }
    }
}

impl<T> Animatable<T> {
    pub fn animated(track: Arc<KeyframeTrack<T>>, rest: T) -> Self {
        Self::Animated { track, rest }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated { .. })
    }

    pub fn track(&self) -> Option<&Arc<KeyframeTrack<T>>> {
        match self {
            Self::Animated { track, .. } => Some(track),
            Self::Static(_) => None,
        }
    }

    /// The value used when no keyframe applies.
    pub fn rest(&self) -> &T {
        match self {
            Self::Static(value) => value,
            Self::Animated { rest, .. } => rest,
        }
    }

    /// Replaces the stored static value without touching an attached track.
    pub fn set_rest(&mut self, value: T) {
        match self {
            Self::Static(v) => *v = value,
            Self::Animated { rest, .. } => *rest = value,
        }
    }
}

impl<T: Default> Default for Animatable<T> {
    fn default() -> Self {
        Self::Static(T::default())
    }
}

impl<T: fmt::Display> fmt::Display for Animatable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => write!(f, "{}", value),
            Self::Animated { track, .. } => write!(f, "{}", track),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn line_track() -> KeyframeTrack<Vec3> {
        KeyframeTrack::new(vec![
            Keyframe::new(0.0, Vec3::new(0.0, 0.0, 0.0)),
            Keyframe::new(0.5, Vec3::new(1.0, 0.0, 0.0)),
            Keyframe::new(2.0, Vec3::new(1.0, 2.0, 0.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_evaluate_on_keyframes() {
        let track = line_track();
        assert_eq!(track.evaluate(0.0), Some(Vec3::ZERO));
        assert_eq!(track.evaluate(1.0), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(track.evaluate(2.0), Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_evaluate_interpolates_fractional_positions() {
        let track = line_track();
        assert_eq!(track.evaluate(0.5), Some(Vec3::new(0.5, 0.0, 0.0)));
        assert_eq!(track.evaluate(1.25), Some(Vec3::new(1.0, 0.5, 0.0)));
    }

    #[test]
    fn test_evaluate_holds_last_value() {
        let track = line_track();
        assert_eq!(track.evaluate(7.0), Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_evaluate_rejects_negative_positions() {
        let track = line_track();
        assert_eq!(track.evaluate(-0.5), None);
        assert_eq!(track.evaluate(f32::NAN), None);
    }

    #[test]
    fn test_segment_length() {
        let track = line_track();
        assert_eq!(track.segment_length(0), Some(0.5));
        assert_eq!(track.segment_length(1), Some(1.5));
        assert_eq!(track.segment_length(2), None);
        assert_eq!(track.duration(), 2.0);
    }

    #[test]
    fn test_invalid_tracks() {
        assert!(KeyframeTrack::<f32>::new(Vec::new()).is_err());
        assert!(
            KeyframeTrack::new(vec![Keyframe::new(1.0, 0.0f32), Keyframe::new(0.5, 1.0)]).is_err()
        );
        assert!(KeyframeTrack::new(vec![Keyframe::new(f32::INFINITY, 0.0f32)]).is_err());
    }

    #[test]
    fn test_animatable_resolution() {
        let track = Arc::new(line_track());
        let rest = Vec3::new(9.0, 9.0, 9.0);
        let animated = Animatable::animated(track.clone(), rest);

        assert!(animated.is_animated());
        assert_eq!(animated.resolve(-1), rest);
        assert_eq!(animated.resolve(1), Vec3::new(1.0, 0.0, 0.0));
        assert!(Arc::ptr_eq(animated.track().unwrap(), &track));

        let fixed = Animatable::Static(rest);
        assert!(!fixed.is_animated());
        assert_eq!(fixed.resolve(3), rest);
        assert!(fixed.track().is_none());
    }

    #[test]
    fn test_set_rest_keeps_track() {
        let mut animated = Animatable::animated(Arc::new(line_track()), Vec3::ZERO);
        animated.set_rest(Vec3::ONE);
        assert_eq!(*animated.rest(), Vec3::ONE);
        assert!(animated.is_animated());
    }
}
