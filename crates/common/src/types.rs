use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a participating process (peer). Lower ids win authority ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub u8);

/// Unique identifier for a replicated object.
///
/// The high 8 bits carry the allocating process, the low 24 bits a counter
/// local to that process, so ids never collide across peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Unique identifier for a recorded event. Shares its id space with objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u32);

/// Wire type identifier for an object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(pub u8);

/// A handle referencing a mesh owned by the renderer / asset provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

const COUNTER_BITS: u32 = 24;
const COUNTER_MASK: u32 = (1 << COUNTER_BITS) - 1;

/// Largest per-process counter an id can carry.
pub const ID_COUNTER_MAX: u32 = COUNTER_MASK;

impl ObjectId {
    /// Compose an id from its allocating process and a local counter value.
    pub fn compose(process: ProcessId, counter: u32) -> Self {
        Self(((process.0 as u32) << COUNTER_BITS) | (counter & COUNTER_MASK))
    }

    /// The process that allocated this id.
    pub fn allocator(self) -> ProcessId {
        ProcessId((self.0 >> COUNTER_BITS) as u8)
    }
}

impl EventId {
    pub fn compose(process: ProcessId, counter: u32) -> Self {
        Self(ObjectId::compose(process, counter).0)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.allocator(), self.0 & COUNTER_MASK)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{:#x}", self.0)
    }
}
