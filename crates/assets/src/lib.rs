//! Asset provider: resolves an object kind to its mesh and model-space box.
//!
//! Mesh data itself lives with the renderer; this crate only hands out
//! handles. The table can be loaded from a JSON manifest so kinds can be
//! re-skinned without touching simulation code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use worldsync_common::{Aabb, KindId, MeshHandle};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no asset registered for kind {0:?}")]
    UnknownKind(KindId),
    #[error("invalid bounding box for kind {0:?}: min exceeds max")]
    InvalidBox(KindId),
}

/// What the simulation needs to know about a kind's visuals.
pub trait AssetProvider {
    /// Mesh used to render objects of `kind`.
    fn mesh(&self, kind: KindId) -> Result<MeshHandle, AssetError>;

    /// Model-space bounding box of objects of `kind`.
    fn local_aabb(&self, kind: KindId) -> Result<Aabb, AssetError>;
}

/// A single manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub kind: KindId,
    pub name: String,
    pub mesh: MeshHandle,
    pub aabb: Aabb,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    kinds: Vec<AssetEntry>,
}

/// Table-backed asset provider.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    entries: BTreeMap<KindId, AssetEntry>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the entry for a kind.
    pub fn register(&mut self, entry: AssetEntry) -> Result<(), AssetError> {
        let b = entry.aabb;
        if b.min.x > b.max.x || b.min.y > b.max.y || b.min.z > b.max.z {
            return Err(AssetError::InvalidBox(entry.kind));
        }
        if let Some(old) = self.entries.insert(entry.kind, entry) {
            tracing::debug!(kind = old.kind.0, name = %old.name, "replaced asset entry");
        }
        Ok(())
    }

    pub fn get(&self, kind: KindId) -> Option<&AssetEntry> {
        self.entries.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a manifest of the form `{"kinds": [{kind, name, mesh, aabb}, ...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let mut table = Self::new();
        for entry in manifest.kinds {
            table.register(entry)?;
        }
        Ok(table)
    }

    /// Load a manifest file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_json_str(&data)?;
        tracing::info!(path = %path.as_ref().display(), kinds = table.len(), "loaded asset manifest");
        Ok(table)
    }

    /// Serialize the table back into manifest JSON.
    pub fn to_json(&self) -> Result<String, AssetError> {
        let manifest = Manifest {
            kinds: self.entries.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&manifest)?)
    }
}

impl AssetProvider for AssetTable {
    fn mesh(&self, kind: KindId) -> Result<MeshHandle, AssetError> {
        self.get(kind)
            .map(|e| e.mesh)
            .ok_or(AssetError::UnknownKind(kind))
    }

    fn local_aabb(&self, kind: KindId) -> Result<Aabb, AssetError> {
        self.get(kind)
            .map(|e| e.aabb)
            .ok_or(AssetError::UnknownKind(kind))
    }
}

pub fn crate_info() -> &'static str {
    "worldsync-assets v0.1.0"
}
