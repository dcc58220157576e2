use std::time::Duration;
use worldsync_common::{ObjectId, ProcessId};
use worldsync_kernel::Simulation;

/// Read-only queries against a simulation for debugging and profiling.
pub struct SimInspector;

impl SimInspector {
    pub fn summary(sim: &Simulation) -> SimSummary {
        SimSummary {
            tick: sim.tick(),
            me: sim.me(),
            live_objects: sim.registry().live_count(),
            tombstones: sim.registry().tombstone_count(),
            owned_objects: sim.owned_ids().len(),
            logged_events: sim.events().len(),
            colliding_objects: sim.collisions().len(),
            last_broadphase: sim.last_collision_time(),
            state_hash: sim.state_hash(),
        }
    }

    /// Pose, error and authority of one live object.
    pub fn inspect_object(sim: &Simulation, id: ObjectId) -> Option<ObjectInfo> {
        sim.object(id).map(|o| {
            let p = o.motion.location;
            let r = o.motion.rotation;
            ObjectInfo {
                id,
                kind: o.kind.name(),
                position: [p.x, p.y, p.z],
                rotation: [r.x, r.y, r.z, r.w],
                location_error: o.location_error_magnitude(),
                rotation_error: o.rotation_error_magnitude(),
                owner: o.authority.owner,
                authority_seq: o.authority.seq,
                snap_seq: o.authority.snap_seq,
            }
        })
    }

    pub fn list_objects(sim: &Simulation) -> Vec<ObjectId> {
        sim.registry().live_ids()
    }
}

#[derive(Debug, Clone)]
pub struct SimSummary {
    pub tick: u64,
    pub me: ProcessId,
    pub live_objects: usize,
    pub tombstones: usize,
    pub owned_objects: usize,
    pub logged_events: usize,
    pub colliding_objects: usize,
    pub last_broadphase: Duration,
    pub state_hash: u64,
}

impl std::fmt::Display for SimSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sim {}: tick={} objects={} owned={} tombstones={} events={} colliding={} broadphase={:?} hash={:016x}",
            self.me,
            self.tick,
            self.live_objects,
            self.owned_objects,
            self.tombstones,
            self.logged_events,
            self.colliding_objects,
            self.last_broadphase,
            self.state_hash,
        )
    }
}

#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub location_error: f32,
    pub rotation_error: f32,
    pub owner: ProcessId,
    pub authority_seq: u32,
    pub snap_seq: Option<u32>,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self
            .snap_seq
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        write!(
            f,
            "{} [{}] pos=({:.2}, {:.2}, {:.2}) err=({:.4}, {:.4}rad) owner={} seq={} snap={}",
            self.kind,
            self.id,
            self.position[0],
            self.position[1],
            self.position[2],
            self.location_error,
            self.rotation_error,
            self.owner,
            self.authority_seq,
            snap,
        )
    }
}
