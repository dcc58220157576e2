//! Sync kernel: object authority and error smoothing, the per-tick
//! simulation loop, broadphase collision, authority-gated events and the
//! wire messages that carry them between processes.
//!
//! # Invariants
//! - An object's authority sequence never decreases; accepted snapshot
//!   sequences never decrease between authority transfers.
//! - Every process predicts every live object; only owners publish.
//! - Events take effect locally only on their authority or on replay of the
//!   authority's record, and each event id is applied at most once.
//! - `step` never blocks; all effects are functions of already-delivered data.

pub mod broadphase;
pub mod config;
pub mod events;
pub mod ids;
pub mod kinds;
pub mod object;
pub mod registry;
pub mod sync;
pub mod world;

pub use broadphase::{CollisionReport, CollisionSet, check_collisions};
pub use config::{ConfigError, SimConfig};
pub use events::{Event, EventKind, EventOutcome, event_authority};
pub use kinds::{MotionModel, ObjectKind, builtin_assets};
pub use object::{Authority, Object};
pub use registry::Registry;
pub use sync::{
    ObjectSnapshot, Packet, PacketKind, ReceiveOutcome, SnapshotOutcome, SyncError,
};
pub use world::{GameHooks, NoopHooks, SimContext, Simulation, SpawnError, build_object};

pub fn crate_info() -> &'static str {
    "worldsync-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
