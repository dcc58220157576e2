//! Binary codec: ordered reads and writes of primitives, vectors, quaternions
//! and short strings in network (big-endian) byte order.
//!
//! # Invariants
//! - Byte order is fixed regardless of host platform.
//! - Writes never grow a buffer past its declared capacity.
//! - There is no framing or type tagging; readers consume fields in exactly
//!   the order and type they were written.

mod error;
mod reader;
mod writer;

pub use error::CodecError;
pub use reader::Deserializer;
pub use writer::Serializer;

/// Encoded size of a 3-component vector.
pub const VEC3_LEN: usize = 12;
/// Encoded size of a quaternion.
pub const QUAT_LEN: usize = 16;
/// Longest string the codec can carry (one length byte).
pub const MAX_STRING_LEN: usize = 255;

pub fn crate_info() -> &'static str {
    "worldsync-codec v0.1.0"
}
