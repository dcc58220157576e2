use glam::Mat4;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use worldsync_common::{MeshHandle, ObjectId};

/// Renderer-agnostic interface. The simulation notifies it of object
/// lifecycle and pushes each object's smoothed world transform once a tick.
pub trait Renderer {
    /// A new object entered the world with the given mesh.
    fn add_object(&mut self, id: ObjectId, mesh: MeshHandle, transform: &Mat4);

    /// An object was deleted and must no longer be drawn.
    fn remove_object(&mut self, id: ObjectId);

    /// The object's derived world transform changed.
    fn update_transform(&mut self, id: ObjectId, transform: &Mat4);
}

/// Renderer that discards everything. Useful for headless peers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn add_object(&mut self, _id: ObjectId, _mesh: MeshHandle, _transform: &Mat4) {}

    fn remove_object(&mut self, _id: ObjectId) {}

    fn update_transform(&mut self, _id: ObjectId, _transform: &Mat4) {}
}

/// A mesh instance as mirrored by the debug renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub mesh: MeshHandle,
    pub transform: Mat4,
}

/// In-memory mirror of the scene that can print a text frame.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    instances: BTreeMap<ObjectId, Instance>,
    updates: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(&self, id: ObjectId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Total transform updates received.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Human-readable dump of every instance's translation.
    pub fn frame(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Frame ({} instances) ===", self.instances.len());
        for (id, inst) in &self.instances {
            let p = inst.transform.w_axis;
            let _ = writeln!(
                out,
                "  [{id}] mesh={} pos=({:.2}, {:.2}, {:.2})",
                inst.mesh.0, p.x, p.y, p.z
            );
        }
        out
    }
}

impl Renderer for DebugTextRenderer {
    fn add_object(&mut self, id: ObjectId, mesh: MeshHandle, transform: &Mat4) {
        self.instances.insert(
            id,
            Instance {
                mesh,
                transform: *transform,
            },
        );
    }

    fn remove_object(&mut self, id: ObjectId) {
        if self.instances.remove(&id).is_none() {
            tracing::debug!(%id, "remove of unknown render instance");
        }
    }

    fn update_transform(&mut self, id: ObjectId, transform: &Mat4) {
        if let Some(inst) = self.instances.get_mut(&id) {
            inst.transform = *transform;
            self.updates += 1;
        }
    }
}
