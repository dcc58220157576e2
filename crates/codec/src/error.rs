/// Errors raised by the codec.
///
/// Encoding errors are fatal to the single write that raised them; decoding
/// errors only protect raw buffer bounds and signal a caller contract
/// violation (fields read in a different order or type than written).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("serializer capacity must be greater than zero")]
    ZeroCapacity,
    #[error("out of room: {needed} bytes at offset {offset} exceed capacity {capacity}")]
    OutOfRoom {
        offset: usize,
        needed: usize,
        capacity: usize,
    },
    #[error("string of {0} characters exceeds the 255 character limit")]
    StringTooLong(usize),
    #[error("character {0:?} does not fit in a single byte")]
    UnencodableChar(char),
    #[error("unexpected end of input: {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        available: usize,
    },
}
