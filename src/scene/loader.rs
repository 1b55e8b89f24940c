//! Builds recorders from scene streams.

use super::reader::SceneReader;
use super::{TAG_ANIMATION, TAG_BINAURAL_RECORDER};
use crate::animation::Animatable;
use crate::config::RecorderConfig;
use crate::error::{EarshotError, Result};
use crate::math::{Point3, Vec3};
use crate::recorder::{BinauralRecorder, RecorderDesc};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Loads one binaural recorder entry.
///
/// Raw head absorption is converted to transmission on load. The stored time
/// offset is read and discarded.
///
/// # Errors
///
/// Fails with [`EarshotError::UnexpectedTag`] if the entry does not start with
/// the binaural recorder tag, and with [`EarshotError::MalformedScene`] if its
/// fields are truncated or inconsistent.
pub fn load_recorder<R: Read>(
    reader: &mut SceneReader<R>,
    config: RecorderConfig,
) -> Result<BinauralRecorder> {
    let entry_len = reader.expect_tag(TAG_BINAURAL_RECORDER)?;
    let start = reader.position();

    let file_name = reader.read_string()?;
    let time_offset = reader.read_float()?;
    log::debug!(
        "Recorder '{}' has time offset {}s, not retained",
        file_name,
        time_offset
    );

    let location = read_animatable(reader, Point3::ZERO)?;
    let ear_axis = read_animatable(reader, Vec3::X)?;
    let head_size = reader.read_float()?;
    let absorption = reader.read_vec3()?;

    let consumed = reader.position() - start;
    if consumed != entry_len as u64 {
        return Err(EarshotError::MalformedScene(format!(
            "Recorder entry '{}' declares {} bytes but holds {}",
            file_name, entry_len, consumed
        )));
    }

    let desc = RecorderDesc {
        file_name,
        location,
        ear_axis,
        head_size,
        head_absorption: absorption.to_array(),
    };
    let recorder = BinauralRecorder::new(desc, config)?;
    log::info!("Loaded binaural recorder\n{}", recorder);
    Ok(recorder)
}

/// Loads recorder entries until the end of the stream.
pub fn load_recorders<R: Read>(
    reader: &mut SceneReader<R>,
    config: RecorderConfig,
) -> Result<Vec<BinauralRecorder>> {
    let mut recorders = Vec::new();
    while !reader.is_at_end()? {
        recorders.push(load_recorder(reader, config)?);
    }
    Ok(recorders)
}

/// Loads every recorder stored in the scene file at `path`.
pub fn load_scene_file(
    path: impl AsRef<Path>,
    config: RecorderConfig,
) -> Result<Vec<BinauralRecorder>> {
    let path = path.as_ref();
    log::info!("Loading scene file: {}", path.display());
    let file = File::open(path)?;
    let mut reader = SceneReader::new(BufReader::new(file));
    load_recorders(&mut reader, config)
}

/// Reads either an animation track or a plain value, chosen by the next tag.
fn read_animatable<R: Read>(reader: &mut SceneReader<R>, rest: Vec3) -> Result<Animatable<Vec3>> {
    if reader.peek_tag()? == Some(TAG_ANIMATION) {
        let track = reader.read_animation::<Vec3>()?;
        Ok(Animatable::animated(Arc::new(track), rest))
    } else {
        Ok(Animatable::Static(reader.read_vec3()?))
    }
}
