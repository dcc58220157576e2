//! Developer tooling: simulation inspector and frame timing.
//!
//! # Invariants
//! - Tools only read simulation state; nothing here feeds back into control flow.

pub mod frame_timer;
pub mod inspector;

pub use frame_timer::FrameTimer;
pub use inspector::{ObjectInfo, SimInspector, SimSummary};

pub fn crate_info() -> &'static str {
    "worldsync-tools v0.1.0"
}
