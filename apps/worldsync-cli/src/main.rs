mod peer;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use worldsync_assets::AssetTable;
use worldsync_common::{MotionState, ProcessId};
use worldsync_input::Key;
use worldsync_kernel::{ObjectKind, SimConfig, builtin_assets};
use worldsync_tools::SimInspector;

use peer::{Peer, converged, exchange};

/// Fixed tick length in milliseconds.
const TICK_MS: f32 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "worldsync-cli", about = "Run loopback multiplayer sync sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Simulation config (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Asset manifest (JSON); the built-in kinds are used when omitted
    #[arg(short, long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run several peers over a loopback transport and check they converge
    Simulate {
        /// Number of processes
        #[arg(short, long, default_value = "3")]
        peers: u8,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "300")]
        ticks: u64,
        /// Number of target cubes spawned by the first process
        #[arg(short, long, default_value = "8")]
        objects: usize,
    },
    /// Hand a moving cube from one process to another mid-flight
    Handoff {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SimConfig> {
    match path {
        Some(p) => SimConfig::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(SimConfig::default()),
    }
}

fn load_assets(path: Option<&PathBuf>) -> anyhow::Result<AssetTable> {
    match path {
        Some(p) => AssetTable::load(p).with_context(|| format!("loading assets {}", p.display())),
        None => Ok(builtin_assets()?),
    }
}

fn make_peers(count: u8, config: &SimConfig, assets: &AssetTable) -> Vec<Peer> {
    (0..count)
        .map(|i| Peer::new(ProcessId(i), config.clone(), assets.clone()))
        .collect()
}

fn report(peers: &[Peer]) {
    for peer in peers {
        println!("{}", SimInspector::summary(&peer.sim));
        println!(
            "  broadphase avg={:?} p95={:?} max={:?} over {} ticks, stale snapshots={}",
            peer.broadphase.average(),
            peer.broadphase.percentile(95.0),
            peer.broadphase.max(),
            peer.broadphase.count(),
            peer.stale_snapshots,
        );
    }
    println!(
        "Converged: {}",
        if converged(peers) { "OK" } else { "MISMATCH" }
    );
}

fn simulate(
    config: SimConfig,
    assets: AssetTable,
    count: u8,
    ticks: u64,
    objects: usize,
) -> anyhow::Result<()> {
    anyhow::ensure!(count > 0, "need at least one peer");
    println!("Simulate: peers={count}, ticks={ticks}, cubes={objects}");

    let mut peers = make_peers(count, &config, &assets);

    if let Some(host) = peers.first_mut() {
        for i in 0..objects {
            let at = Vec3::new(i as f32 * 3.0 - objects as f32 * 1.5, 0.0, -20.0);
            let kind = ObjectKind::Cube {
                size: 1,
                color: Vec3::new(0.2, 0.6, 1.0),
            };
            let (sim, mut ctx) = host.split();
            sim.spawn(kind, MotionState::at(at), &mut ctx)?;
        }
    }
    for (i, peer) in peers.iter_mut().enumerate() {
        let mut game = std::mem::take(&mut peer.game);
        let at = Vec3::new(i as f32 * 3.0, 0.0, 0.0);
        let (sim, mut ctx) = peer.split();
        game.spawn_player(sim, &mut ctx, at)?;
        peer.game = game;
    }
    exchange(&mut peers)?;

    for tick in 0..ticks {
        for (i, peer) in peers.iter_mut().enumerate() {
            // scripted input: walk forward for the first half, fire every 30 ticks
            if tick < ticks / 2 {
                peer.inputs.press(Key::W);
            } else {
                peer.inputs.release(Key::W);
            }
            peer.inputs.lclick = (tick + i as u64 * 7) % 30 == 0;
            peer.step(TICK_MS);
        }
        exchange(&mut peers)?;
    }

    report(&peers);
    Ok(())
}

fn handoff(config: SimConfig, assets: AssetTable, ticks: u64) -> anyhow::Result<()> {
    println!("Handoff: ticks={ticks}");
    let mut peers = make_peers(2, &config, &assets);

    let motion = MotionState {
        linear_velocity: Vec3::new(0.005, 0.0, 0.0),
        angular_velocity: Vec3::new(0.0, 0.002, 0.0),
        ..MotionState::default()
    };
    let cube = {
        let host = &mut peers[0];
        let kind = ObjectKind::Cube {
            size: 2,
            color: Vec3::ONE,
        };
        let (sim, mut ctx) = host.split();
        sim.spawn(kind, motion, &mut ctx)?
    };
    exchange(&mut peers)?;

    for tick in 0..ticks {
        if tick == ticks / 2 {
            let taken = peers[1].sim.take_authority(cube);
            println!("tick {tick}: p1 takes authority: {taken}");
        }
        for peer in peers.iter_mut() {
            peer.step(TICK_MS);
        }
        exchange(&mut peers)?;
    }

    for peer in &peers {
        match SimInspector::inspect_object(&peer.sim, cube) {
            Some(info) => println!("{}: {info}", peer.sim.me()),
            None => println!("{}: cube {cube} missing", peer.sim.me()),
        }
    }
    report(&peers);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("worldsync-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("codec: {}", worldsync_codec::crate_info());
            println!("kernel: {}", worldsync_kernel::crate_info());
            println!("input: {}", worldsync_input::crate_info());
            println!("render: {}", worldsync_render::crate_info());
            println!("assets: {}", worldsync_assets::crate_info());
            println!("game: {}", worldsync_game::crate_info());
            println!("tools: {}", worldsync_tools::crate_info());
        }
        Commands::Simulate {
            peers,
            ticks,
            objects,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let assets = load_assets(cli.assets.as_ref())?;
            simulate(config, assets, peers, ticks, objects)?;
        }
        Commands::Handoff { ticks } => {
            let config = load_config(cli.config.as_ref())?;
            let assets = load_assets(cli.assets.as_ref())?;
            handoff(config, assets, ticks)?;
        }
    }

    Ok(())
}
