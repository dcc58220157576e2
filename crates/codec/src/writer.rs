use glam::{Quat, Vec3};

use crate::error::CodecError;
use crate::{MAX_STRING_LEN, QUAT_LEN, VEC3_LEN};

/// Writer over a fixed-capacity byte buffer.
///
/// Appends advance an internal cursor; the `*_at` variants patch an explicit
/// offset without moving it. Each call checks capacity on its own: a failing
/// call leaves the buffer untouched, but earlier calls of a multi-field
/// message stay written. Callers size buffers up front or discard the whole
/// serializer on error.
#[derive(Debug, Clone)]
pub struct Serializer {
    buffer: Vec<u8>,
    cursor: usize,
}

impl Serializer {
    /// Create a writer with room for exactly `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, CodecError> {
        if capacity == 0 {
            return Err(CodecError::ZeroCapacity);
        }
        Ok(Self {
            buffer: vec![0; capacity],
            cursor: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes appended so far.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// The appended bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }

    /// Consume the writer, returning the appended bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.cursor);
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) -> Result<usize, CodecError> {
        self.put(None, &[value])
    }

    pub fn write_u8_at(&mut self, value: u8, at: usize) -> Result<usize, CodecError> {
        self.put(Some(at), &[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<usize, CodecError> {
        self.put(None, &value.to_be_bytes())
    }

    pub fn write_u16_at(&mut self, value: u16, at: usize) -> Result<usize, CodecError> {
        self.put(Some(at), &value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<usize, CodecError> {
        self.put(None, &value.to_be_bytes())
    }

    pub fn write_u32_at(&mut self, value: u32, at: usize) -> Result<usize, CodecError> {
        self.put(Some(at), &value.to_be_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<usize, CodecError> {
        self.put(None, &value.to_be_bytes())
    }

    pub fn write_f32_at(&mut self, value: f32, at: usize) -> Result<usize, CodecError> {
        self.put(Some(at), &value.to_be_bytes())
    }

    pub fn write_vec3(&mut self, value: Vec3) -> Result<usize, CodecError> {
        self.put(None, &vec3_bytes(value))
    }

    pub fn write_vec3_at(&mut self, value: Vec3, at: usize) -> Result<usize, CodecError> {
        self.put(Some(at), &vec3_bytes(value))
    }

    pub fn write_quat(&mut self, value: Quat) -> Result<usize, CodecError> {
        self.put(None, &quat_bytes(value))
    }

    pub fn write_quat_at(&mut self, value: Quat, at: usize) -> Result<usize, CodecError> {
        self.put(Some(at), &quat_bytes(value))
    }

    /// Append a length-prefixed string: one length byte, then one byte per
    /// character. Only characters in `U+0000..=U+00FF` are representable.
    pub fn write_string(&mut self, value: &str) -> Result<usize, CodecError> {
        let bytes = string_bytes(value)?;
        self.put(None, &bytes)
    }

    pub fn write_string_at(&mut self, value: &str, at: usize) -> Result<usize, CodecError> {
        let bytes = string_bytes(value)?;
        self.put(Some(at), &bytes)
    }

    /// Copy `bytes` to `at` (or the cursor), returning the offset written.
    fn put(&mut self, at: Option<usize>, bytes: &[u8]) -> Result<usize, CodecError> {
        let offset = at.unwrap_or(self.cursor);
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= self.buffer.len())
            .ok_or(CodecError::OutOfRoom {
                offset,
                needed: bytes.len(),
                capacity: self.buffer.len(),
            })?;
        self.buffer[offset..end].copy_from_slice(bytes);
        if at.is_none() {
            self.cursor = end;
        }
        Ok(offset)
    }
}

fn vec3_bytes(v: Vec3) -> [u8; VEC3_LEN] {
    let mut out = [0u8; VEC3_LEN];
    for (chunk, c) in out.chunks_exact_mut(4).zip(v.to_array()) {
        chunk.copy_from_slice(&c.to_be_bytes());
    }
    out
}

fn quat_bytes(q: Quat) -> [u8; QUAT_LEN] {
    let mut out = [0u8; QUAT_LEN];
    for (chunk, c) in out.chunks_exact_mut(4).zip(q.to_array()) {
        chunk.copy_from_slice(&c.to_be_bytes());
    }
    out
}

fn string_bytes(value: &str) -> Result<Vec<u8>, CodecError> {
    let count = value.chars().count();
    if count > MAX_STRING_LEN {
        return Err(CodecError::StringTooLong(count));
    }
    let mut out = Vec::with_capacity(count + 1);
    out.push(count as u8);
    for ch in value.chars() {
        let byte = u8::try_from(u32::from(ch)).map_err(|_| CodecError::UnencodableChar(ch))?;
        out.push(byte);
    }
    Ok(out)
}
