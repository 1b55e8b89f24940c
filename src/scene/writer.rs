//! Chunk-level writer producing streams [`SceneReader`](super::SceneReader) accepts.

use super::reader::SceneValue;
use super::{TAG_ANIMATION, TAG_BINAURAL_RECORDER, TAG_FLOAT, TAG_STRING, TAG_VEC3, Tag};
use crate::animation::{Animatable, KeyframeTrack};
use crate::error::{EarshotError, Result};
use crate::math::Vec3;
use crate::recorder::RecorderDesc;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

pub struct SceneWriter<W> {
    inner: W,
}

impl<W: Write> SceneWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_chunk(TAG_STRING, value.as_bytes())
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_chunk(TAG_FLOAT, &value.to_le_bytes())
    }

    pub fn write_vec3(&mut self, value: Vec3) -> Result<()> {
        let mut payload = Vec::with_capacity(12);
        value.write_to(&mut payload)?;
        self.write_chunk(TAG_VEC3, &payload)
    }

    pub fn write_animation<T: SceneValue>(&mut self, track: &KeyframeTrack<T>) -> Result<()> {
        let count = u32::try_from(track.len()).map_err(|_| {
            EarshotError::Animation(format!("Track with {} keyframes is too long", track.len()))
        })?;
        let mut payload = Vec::with_capacity(4 + track.len() * 4 * (1 + T::COMPONENTS));
        payload.write_u32::<LittleEndian>(count)?;
        for keyframe in track.keyframes() {
            payload.write_f32::<LittleEndian>(keyframe.time)?;
            keyframe.value.write_to(&mut payload)?;
        }
        self.write_chunk(TAG_ANIMATION, &payload)
    }

    /// Writes a complete binaural recorder entry.
    ///
    /// `time_offset` is stored for format compatibility; loaders discard it.
    pub fn write_recorder(&mut self, desc: &RecorderDesc, time_offset: f32) -> Result<()> {
        let mut entry = SceneWriter::new(Vec::new());
        entry.write_string(&desc.file_name)?;
        entry.write_float(time_offset)?;
        entry.write_animatable(&desc.location)?;
        entry.write_animatable(&desc.ear_axis)?;
        entry.write_float(desc.head_size)?;
        let [low, mid, high] = desc.head_absorption;
        entry.write_vec3(Vec3::new(low, mid, high))?;
        self.write_chunk(TAG_BINAURAL_RECORDER, &entry.into_inner())
    }

    /// Writes the animation track if present, else the static value.
    fn write_animatable(&mut self, value: &Animatable<Vec3>) -> Result<()> {
        match value {
            Animatable::Static(v) => self.write_vec3(*v),
            Animatable::Animated { track, .. } => self.write_animation(track.as_ref()),
        }
    }

    fn write_chunk(&mut self, tag: Tag, payload: &[u8]) -> Result<()> {
        let len = u32::try_from(payload.len()).map_err(|_| {
            EarshotError::MalformedScene(format!("Chunk of {} bytes is too large", payload.len()))
        })?;
        self.inner.write_all(&tag)?;
        self.inner.write_u32::<LittleEndian>(len)?;
        self.inner.write_all(payload)?;
        Ok(())
    }
}
