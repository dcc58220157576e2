use glam::{Quat, Vec3};

use crate::error::CodecError;
use crate::{QUAT_LEN, VEC3_LEN};

/// Reader consuming fields in the order and types they were written.
///
/// In skip mode the `*_into` methods advance the cursor without touching
/// their destination, so a caller can discard a whole message while keeping
/// the stream aligned. Scalar reads always return the decoded value; decoders
/// that want to honor skip mode check [`Deserializer::is_skipping`].
#[derive(Debug, Clone)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    cursor: usize,
    skip: bool,
}

impl<'a> Deserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            skip: false,
        }
    }

    pub fn set_skip(&mut self, skip: bool) {
        self.skip = skip;
    }

    pub fn is_skipping(&self) -> bool {
        self.skip
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.take()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_be_bytes(self.take()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3, CodecError> {
        let raw = self.take::<VEC3_LEN>()?;
        Ok(Vec3::from_array(floats(&raw)))
    }

    /// Read a vector into `into` unless skipping.
    pub fn read_vec3_into(&mut self, into: &mut Vec3) -> Result<(), CodecError> {
        let value = self.read_vec3()?;
        if !self.skip {
            *into = value;
        }
        Ok(())
    }

    pub fn read_quat(&mut self) -> Result<Quat, CodecError> {
        let raw = self.take::<QUAT_LEN>()?;
        Ok(Quat::from_array(floats(&raw)))
    }

    /// Read a quaternion into `into` unless skipping.
    pub fn read_quat_into(&mut self, into: &mut Quat) -> Result<(), CodecError> {
        let value = self.read_quat()?;
        if !self.skip {
            *into = value;
        }
        Ok(())
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_u8()? as usize;
        let bytes = self.take_slice(len)?;
        Ok(bytes.iter().map(|b| char::from(*b)).collect())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let slice = self.take_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_slice(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        if available < len {
            return Err(CodecError::UnexpectedEnd {
                offset: self.cursor,
                needed: len,
                available,
            });
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.data[start..self.cursor])
    }
}

fn floats<const N: usize, const M: usize>(raw: &[u8; N]) -> [f32; M] {
    let mut out = [0f32; M];
    for (slot, chunk) in out.iter_mut().zip(raw.chunks_exact(4)) {
        *slot = f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Serializer;

    #[test]
    fn reads_in_written_order() {
        let mut w = Serializer::new(32).unwrap();
        w.write_u8(200).unwrap();
        w.write_u16(60_000).unwrap();
        w.write_u32(4_000_000_000).unwrap();
        w.write_f32(-0.5).unwrap();

        let mut r = Deserializer::new(w.as_bytes());
        assert_eq!(r.read_u8().unwrap(), 200);
        assert_eq!(r.read_u16().unwrap(), 60_000);
        assert_eq!(r.read_u32().unwrap(), 4_000_000_000);
        assert_eq!(r.read_f32().unwrap(), -0.5);
    }

    #[test]
    fn eleven_character_string_roundtrip() {
        let mut w = Serializer::new(16).unwrap();
        w.write_string("cannonballs").unwrap();
        let mut r = Deserializer::new(w.as_bytes());
        let s = r.read_string().unwrap();
        assert_eq!(s.len(), 11);
        assert_eq!(s, "cannonballs");
    }

    #[test]
    fn latin1_characters_survive() {
        let mut w = Serializer::new(16).unwrap();
        w.write_string("caf\u{e9}").unwrap();
        let mut r = Deserializer::new(w.as_bytes());
        assert_eq!(r.read_string().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn skip_mode_keeps_destination_and_alignment() {
        let mut w = Serializer::new(64).unwrap();
        w.write_vec3(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        w.write_quat(Quat::from_rotation_y(1.0)).unwrap();
        w.write_u8(42).unwrap();

        let mut r = Deserializer::new(w.as_bytes());
        r.set_skip(true);
        let mut v = Vec3::new(9.0, 9.0, 9.0);
        let mut q = Quat::IDENTITY;
        r.read_vec3_into(&mut v).unwrap();
        r.read_quat_into(&mut q).unwrap();
        assert_eq!(v, Vec3::new(9.0, 9.0, 9.0));
        assert_eq!(q, Quat::IDENTITY);

        r.set_skip(false);
        assert_eq!(r.read_u8().unwrap(), 42);
    }

    #[test]
    fn read_into_writes_when_not_skipping() {
        let mut w = Serializer::new(16).unwrap();
        w.write_vec3(Vec3::X).unwrap();
        let mut r = Deserializer::new(w.as_bytes());
        let mut v = Vec3::ZERO;
        r.read_vec3_into(&mut v).unwrap();
        assert_eq!(v, Vec3::X);
    }

    #[test]
    fn truncated_input_is_bounds_checked() {
        let bytes = [0u8, 1, 2];
        let mut r = Deserializer::new(&bytes);
        assert_eq!(
            r.read_u32().unwrap_err(),
            CodecError::UnexpectedEnd {
                offset: 0,
                needed: 4,
                available: 3
            }
        );
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 1);
    }

    #[test]
    fn truncated_string_body_fails() {
        let bytes = [5u8, b'a', b'b'];
        let mut r = Deserializer::new(&bytes);
        assert!(r.read_string().is_err());
    }
}
