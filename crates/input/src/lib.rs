//! Input source collaborator: discrete key state and pointer deltas per tick.
//!
//! # Invariants
//! - An `Inputs` value is a snapshot for exactly one tick; the simulation
//!   never reads device state directly.
//! - Key clicks are edge-triggered counts, key downs are level-triggered.

pub mod key;

pub use key::Key;

use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet};

/// Input gathered for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    key_downs: BTreeSet<Key>,
    key_clicks: BTreeMap<Key, u32>,
    /// Pointer movement since the previous tick, in device pixels.
    pub pointer_delta: Vec2,
    pub lclick: bool,
    pub rclick: bool,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held for this tick.
    pub fn press(&mut self, key: Key) -> &mut Self {
        self.key_downs.insert(key);
        self
    }

    /// Register one click (press + release) of a key during this tick.
    pub fn click(&mut self, key: Key) -> &mut Self {
        *self.key_clicks.entry(key).or_default() += 1;
        self
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.key_downs.contains(&key)
    }

    /// Number of clicks of `key` during this tick.
    pub fn clicks(&self, key: Key) -> u32 {
        self.key_clicks.get(&key).copied().unwrap_or(0)
    }

    pub fn clicked(&self, key: Key) -> bool {
        self.clicks(key) > 0
    }

    /// Reset per-tick state, keeping held keys. Call once a tick was consumed.
    pub fn end_tick(&mut self) {
        if !self.key_clicks.is_empty() {
            tracing::trace!(clicks = self.key_clicks.len(), "clearing key clicks");
        }
        self.key_clicks.clear();
        self.pointer_delta = Vec2::ZERO;
        self.lclick = false;
        self.rclick = false;
    }

    pub fn release(&mut self, key: Key) {
        self.key_downs.remove(&key);
    }
}

pub fn crate_info() -> &'static str {
    "worldsync-input v0.1.0"
}
