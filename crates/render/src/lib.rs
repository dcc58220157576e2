//! Rendering collaborator: receives object add/remove and transform updates.
//!
//! # Invariants
//! - The renderer never mutates simulation state; it only mirrors it.
//! - Transforms handed to the renderer are derived, never authoritative.
//!
//! GPU mesh management lives outside this workspace. The trait is the seam;
//! `DebugTextRenderer` mirrors instances in memory for CLIs and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, Instance, NullRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "worldsync-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
