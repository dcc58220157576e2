use anyhow::Context;
use worldsync_assets::AssetTable;
use worldsync_common::ProcessId;
use worldsync_game::CannonGame;
use worldsync_input::Inputs;
use worldsync_kernel::{
    Packet, ReceiveOutcome, SimConfig, SimContext, Simulation, SnapshotOutcome,
};
use worldsync_render::DebugTextRenderer;
use worldsync_tools::FrameTimer;

/// Ticks of broadphase timing kept per peer.
const TIMER_HISTORY: usize = 120;

/// One simulated process with its own renderer, assets and input.
pub struct Peer {
    pub sim: Simulation,
    pub game: CannonGame,
    pub renderer: DebugTextRenderer,
    pub assets: AssetTable,
    pub inputs: Inputs,
    pub broadphase: FrameTimer,
    pub stale_snapshots: usize,
}

impl Peer {
    pub fn new(me: ProcessId, config: SimConfig, assets: AssetTable) -> Self {
        Self {
            sim: Simulation::new(me, config),
            game: CannonGame::new(),
            renderer: DebugTextRenderer::new(),
            assets,
            inputs: Inputs::new(),
            broadphase: FrameTimer::new(TIMER_HISTORY),
            stale_snapshots: 0,
        }
    }

    /// The simulation alongside a context over this peer's collaborators.
    pub fn split(&mut self) -> (&mut Simulation, SimContext<'_>) {
        let ctx = SimContext {
            renderer: &mut self.renderer,
            assets: &self.assets,
        };
        (&mut self.sim, ctx)
    }

    pub fn step(&mut self, dt: f32) {
        let mut ctx = SimContext {
            renderer: &mut self.renderer,
            assets: &self.assets,
        };
        self.sim.step(dt, &self.inputs, &mut self.game, &mut ctx);
        self.broadphase.record(self.sim.last_collision_time());
        self.inputs.end_tick();
    }

    fn deliver(&mut self, packets: &[Packet]) -> anyhow::Result<()> {
        let me = self.sim.me();
        for packet in packets {
            let mut ctx = SimContext {
                renderer: &mut self.renderer,
                assets: &self.assets,
            };
            let outcome = self
                .sim
                .receive(packet, &mut ctx)
                .with_context(|| format!("{me} failed to apply {:?} packet", packet.kind))?;
            if outcome == ReceiveOutcome::Snapshot(SnapshotOutcome::Stale) {
                self.stale_snapshots += 1;
            }
        }
        Ok(())
    }
}

/// Broadcast every peer's outgoing packets to every other peer, in process
/// order. Returns the number of packets sent.
pub fn exchange(peers: &mut [Peer]) -> anyhow::Result<usize> {
    let mut outboxes = Vec::with_capacity(peers.len());
    for peer in peers.iter_mut() {
        outboxes.push(peer.sim.collect_outgoing()?);
    }
    let mut sent = 0;
    for (from, packets) in outboxes.iter().enumerate() {
        for (to, peer) in peers.iter_mut().enumerate() {
            if to != from {
                peer.deliver(packets)?;
            }
        }
        sent += packets.len();
    }
    tracing::trace!(sent, "loopback exchange");
    Ok(sent)
}

/// True when every peer reports the same state hash.
pub fn converged(peers: &[Peer]) -> bool {
    let mut hashes = peers.iter().map(|p| p.sim.state_hash());
    match hashes.next() {
        Some(first) => hashes.all(|h| h == first),
        None => true,
    }
}
