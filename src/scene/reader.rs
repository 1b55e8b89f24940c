//! Chunk-level reader for scene streams.

use super::{TAG_ANIMATION, TAG_FLOAT, TAG_STRING, TAG_VEC3, Tag, tag_name};
use crate::animation::{Keyframe, KeyframeTrack};
use crate::error::{EarshotError, Result};
use crate::math::{Interpolate, Vec3};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Upper bound on keyframes per track, guards allocation on corrupt input.
const MAX_KEYFRAMES: u32 = 1 << 20;

/// Upper bound on string payloads in bytes.
const MAX_STRING_LEN: u32 = 64 * 1024;

/// Values that can be stored in `anim` chunks.
pub trait SceneValue: Interpolate {
    /// Number of `f32` fields per value
    const COMPONENTS: usize;

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self>;

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

impl SceneValue for f32 {
    const COMPONENTS: usize = 1;

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_f32::<LittleEndian>()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_f32::<LittleEndian>(*self)
    }
}

impl SceneValue for Vec3 {
    const COMPONENTS: usize = 3;

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let x = reader.read_f32::<LittleEndian>()?;
        let y = reader.read_f32::<LittleEndian>()?;
        let z = reader.read_f32::<LittleEndian>()?;
        Ok(Vec3::new(x, y, z))
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        writer.write_f32::<LittleEndian>(self.z)
    }
}

/// Reads tagged chunks from a byte stream, with one tag of lookahead.
pub struct SceneReader<R> {
    inner: R,
    peeked: Option<Tag>,
    /// Bytes consumed from `inner`
    position: u64,
}

impl<R: Read> SceneReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
            position: 0,
        }
    }

    /// Number of bytes consumed so far, including a peeked tag.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Returns the next tag without consuming it, `None` at end of stream.
    pub fn peek_tag(&mut self) -> Result<Option<Tag>> {
        if self.peeked.is_none() {
            self.peeked = self.read_tag_or_eof()?;
        }
        Ok(self.peeked)
    }

    /// Whether the stream holds no further chunks.
    pub fn is_at_end(&mut self) -> Result<bool> {
        Ok(self.peek_tag()?.is_none())
    }

    /// Consumes a chunk header and returns its payload length.
    ///
    /// # Errors
    ///
    /// Returns [`EarshotError::UnexpectedTag`] if the next tag differs from
    /// `expected`, and [`EarshotError::MalformedScene`] at end of stream.
    pub fn expect_tag(&mut self, expected: Tag) -> Result<u32> {
        let found = match self.peeked.take() {
            Some(tag) => tag,
            None => self.read_tag_or_eof()?.ok_or_else(|| {
                EarshotError::MalformedScene(format!(
                    "Stream ended while expecting '{}'",
                    tag_name(&expected)
                ))
            })?,
        };
        if found != expected {
            // Leave the stream positioned after the offending tag.
            return Err(EarshotError::UnexpectedTag {
                expected: tag_name(&expected),
                found: tag_name(&found),
            });
        }
        self.read_u32()
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.expect_tag(TAG_STRING)?;
        if len > MAX_STRING_LEN {
            return Err(EarshotError::MalformedScene(format!(
                "String of {} bytes exceeds limit of {}",
                len, MAX_STRING_LEN
            )));
        }
        let mut bytes = vec![0u8; len as usize];
        self.read_exact(&mut bytes)?;
        String::from_utf8(bytes)
            .map_err(|e| EarshotError::MalformedScene(format!("Invalid UTF-8 string: {}", e)))
    }

    pub fn read_float(&mut self) -> Result<f32> {
        let len = self.expect_tag(TAG_FLOAT)?;
        expect_len("f32 ", len, 4)?;
        let mut bytes = [0u8; 4];
        self.read_exact(&mut bytes)?;
        Ok(f32::from_le_bytes(bytes))
    }

    /// Reads a `vec3` chunk, used for both points and vectors.
    pub fn read_vec3(&mut self) -> Result<Vec3> {
        let len = self.expect_tag(TAG_VEC3)?;
        expect_len("vec3", len, 12)?;
        let mut bytes = [0u8; 12];
        self.read_exact(&mut bytes)?;
        Ok(Vec3::read_from(&mut bytes.as_slice())?)
    }

    /// Reads an `anim` chunk into a keyframe track.
    pub fn read_animation<T: SceneValue>(&mut self) -> Result<KeyframeTrack<T>> {
        let len = self.expect_tag(TAG_ANIMATION)?;
        let count = self.read_u32()?;
        if count > MAX_KEYFRAMES {
            return Err(EarshotError::MalformedScene(format!(
                "Animation with {} keyframes exceeds limit of {}",
                count, MAX_KEYFRAMES
            )));
        }
        let frame_size = 4 * (1 + T::COMPONENTS as u64);
        let expected = 4 + count as u64 * frame_size;
        if len as u64 != expected {
            return Err(EarshotError::MalformedScene(format!(
                "Animation chunk of {} bytes does not hold {} keyframes ({} bytes)",
                len, count, expected
            )));
        }

        let mut payload = vec![0u8; (expected - 4) as usize];
        self.read_exact(&mut payload)?;
        let mut cursor = payload.as_slice();
        let mut keyframes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let time = cursor.read_f32::<LittleEndian>()?;
            let value = T::read_from(&mut cursor)?;
            keyframes.push(Keyframe::new(time, value));
        }
        KeyframeTrack::new(keyframes)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.read_exact(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                EarshotError::MalformedScene(format!(
                    "Truncated chunk at byte {}",
                    self.position
                ))
            } else {
                EarshotError::Io(e)
            }
        })?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn read_tag_or_eof(&mut self) -> Result<Option<Tag>> {
        let mut tag = [0u8; 4];
        let mut filled = 0;
        while filled < tag.len() {
            match self.inner.read(&mut tag[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += filled as u64;
        match filled {
            0 => Ok(None),
            4 => Ok(Some(tag)),
            _ => Err(EarshotError::MalformedScene(format!(
                "Truncated tag at byte {}",
                self.position
            ))),
        }
    }
}

fn expect_len(name: &str, len: u32, expected: u32) -> Result<()> {
    if len != expected {
        return Err(EarshotError::MalformedScene(format!(
            "'{}' chunk has {} bytes, expected {}",
            name, len, expected
        )));
    }
    Ok(())
}
