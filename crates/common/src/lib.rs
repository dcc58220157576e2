//! Shared types for the worldsync workspace.
//!
//! # Invariants
//! - Identifiers are plain integers; cross-references between objects and
//!   events are always by id, never by owning reference.
//! - Quaternions stored in a `MotionState` are kept normalized.

mod aabb;
mod motion;
mod types;

pub use aabb::Aabb;
pub use motion::MotionState;
pub use types::{EventId, ID_COUNTER_MAX, KindId, MeshHandle, ObjectId, ProcessId};
