//! Persisted scene descriptions of recorders.
//!
//! A scene stream is a sequence of tagged chunks. Every chunk starts with a
//! four byte ASCII tag and a little-endian `u32` payload length:
//!
//! | tag    | payload                                                   |
//! |--------|-----------------------------------------------------------|
//! | `OUT2` | nested chunks describing one binaural recorder            |
//! | `str ` | UTF-8 bytes                                               |
//! | `f32 ` | one `f32`                                                 |
//! | `vec3` | three `f32`                                               |
//! | `anim` | `u32` keyframe count, then `f32` time and value per frame |
//!
//! A binaural recorder entry holds, in order: output file name, time offset,
//! location (`anim` or `vec3`), right ear axis (`anim` or `vec3`), head size
//! and raw head absorption (`vec3`).
//!
//! # Example
//!
//! ```
//! use earshot::scene::{SceneReader, SceneWriter, load_recorders};
//! use earshot::{RecorderConfig, RecorderDesc};
//!
//! let mut writer = SceneWriter::new(Vec::new());
//! writer.write_recorder(&RecorderDesc::default(), 0.0)?;
//! let bytes = writer.into_inner();
//!
//! let mut reader = SceneReader::new(bytes.as_slice());
//! let recorders = load_recorders(&mut reader, RecorderConfig::default())?;
//! assert_eq!(recorders.len(), 1);
//! # Ok::<(), earshot::EarshotError>(())
//! ```

pub mod loader;
pub mod reader;
pub mod writer;

pub use loader::{load_recorder, load_recorders, load_scene_file};
pub use reader::{SceneReader, SceneValue};
pub use writer::SceneWriter;

/// Four byte chunk identifier.
pub type Tag = [u8; 4];

/// Binaural (two channel) recorder entry
pub const TAG_BINAURAL_RECORDER: Tag = *b"OUT2";
pub const TAG_STRING: Tag = *b"str ";
pub const TAG_FLOAT: Tag = *b"f32 ";
pub const TAG_VEC3: Tag = *b"vec3";
pub const TAG_ANIMATION: Tag = *b"anim";

/// Printable form of a tag for error messages.
pub(crate) fn tag_name(tag: &Tag) -> String {
    String::from_utf8_lossy(tag).into_owned()
}
