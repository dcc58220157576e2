//! Illustrative game built on the sync kernel: players walk around, pick up
//! ammunition and linstocks, load and fire cannons, and shoot bullets that
//! despawn on impact.
//!
//! Every shared mutation goes through kernel events so it replicates; the
//! hooks only drive motion of objects this process owns.

pub mod player;

use glam::Vec3;
use worldsync_common::{MotionState, ObjectId};
use worldsync_input::{Inputs, Key};
use worldsync_kernel::{EventKind, GameHooks, ObjectKind, SimContext, Simulation, SpawnError};

use player::{drive, facing, interaction_target};

/// Speed of a player's shot, units per millisecond.
pub const BULLET_SPEED: f32 = 0.02;
pub const BULLET_SPIN: f32 = 0.01;
/// Speed and spin of a cannon shot.
pub const CANNON_SHOT_SPEED: f32 = 0.02;
pub const CANNON_SHOT_SPIN: f32 = 0.02;
/// Distance in front of the cannon origin where its shot appears.
pub const CANNON_MUZZLE: f32 = 5.0;

/// Game hooks for one process.
#[derive(Debug, Default)]
pub struct CannonGame {
    /// The player this process drives, if any.
    pub player: Option<ObjectId>,
}

impl CannonGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the local player and take control of it.
    pub fn spawn_player(
        &mut self,
        sim: &mut Simulation,
        ctx: &mut SimContext<'_>,
        location: Vec3,
    ) -> Result<ObjectId, SpawnError> {
        let id = sim.spawn(ObjectKind::Player { tool: None }, MotionState::at(location), ctx)?;
        self.player = Some(id);
        Ok(id)
    }

    fn controlled_player(&self, sim: &Simulation) -> Option<ObjectId> {
        let id = self.player?;
        let obj = sim.object(id)?;
        (obj.owner() == sim.me()).then_some(id)
    }

    fn interact(&self, sim: &mut Simulation, ctx: &mut SimContext<'_>, player: ObjectId) {
        let Some(target) = interaction_target(sim, player) else {
            return;
        };
        let held = match sim.object(player).map(|o| &o.kind) {
            Some(ObjectKind::Player { tool }) => *tool,
            _ => return,
        };
        let held_kind = held.and_then(|t| sim.object(t)).map(|o| o.kind.clone());
        let Some(target_kind) = sim.object(target).map(|o| o.kind.clone()) else {
            return;
        };

        let outcome = match (target_kind, held, held_kind) {
            (kind, None, _) if kind.is_tool() => {
                sim.record_event(EventKind::PickUpTool, &[player, target], ctx)
            }
            (
                ObjectKind::Cannon { loaded: false, .. },
                Some(ammo),
                Some(ObjectKind::Ammunition { .. }),
            ) => sim.record_event(EventKind::LoadCannon, &[player, target, ammo], ctx),
            (ObjectKind::Cannon { loaded: true, .. }, Some(_), Some(ObjectKind::Linstock)) => {
                sim.record_event(EventKind::FireCannon, &[player, target], ctx)
            }
            _ => return,
        };
        tracing::debug!(%player, %target, ?outcome, "interaction");
    }

    fn shoot(&self, sim: &mut Simulation, ctx: &mut SimContext<'_>, player: ObjectId) {
        let Some(obj) = sim.object(player) else {
            return;
        };
        let axis = facing(obj.motion.rotation);
        let motion = MotionState {
            location: obj.motion.location,
            rotation: obj.motion.rotation,
            linear_velocity: axis * BULLET_SPEED,
            angular_velocity: axis * BULLET_SPIN,
        };
        if let Err(e) = sim.spawn(ObjectKind::Bullet, motion, ctx) {
            tracing::warn!(error = %e, "could not spawn bullet");
        }
    }

    /// Count every firing cannon down one tick. The cannon's owner fires
    /// when the count reaches zero.
    fn step_cannons(&self, sim: &mut Simulation, ctx: &mut SimContext<'_>) {
        let me = sim.me();
        let mut ready = Vec::new();
        let firing: Vec<ObjectId> = sim
            .objects()
            .filter(|o| matches!(o.kind, ObjectKind::Cannon { firing: true, .. }))
            .map(|o| o.id)
            .collect();
        for id in firing {
            let Some(obj) = sim.object_mut(id) else {
                continue;
            };
            if let ObjectKind::Cannon { countdown, .. } = &mut obj.kind {
                *countdown = countdown.saturating_sub(1);
                if *countdown == 0 && obj.authority.owner == me {
                    ready.push((id, obj.motion.location, obj.motion.rotation));
                }
            }
        }

        for (id, location, rotation) in ready {
            let axis = facing(rotation);
            let motion = MotionState {
                location: location + axis * CANNON_MUZZLE,
                rotation,
                linear_velocity: axis * CANNON_SHOT_SPEED,
                angular_velocity: axis * CANNON_SHOT_SPIN,
            };
            if let Err(e) = sim.spawn(ObjectKind::Bullet, motion, ctx) {
                tracing::warn!(error = %e, cannon = %id, "could not spawn cannon shot");
            }
            let outcome = sim.record_event(EventKind::FiredCannon, &[id], ctx);
            tracing::debug!(cannon = %id, ?outcome, "cannon fired");
        }
    }
}

impl GameHooks for CannonGame {
    fn step_game(&mut self, sim: &mut Simulation, ctx: &mut SimContext<'_>, _dt: f32, inputs: &Inputs) {
        if let Some(player) = self.controlled_player(sim) {
            drive(sim, player, inputs);
            if inputs.clicked(Key::E) {
                self.interact(sim, ctx, player);
            }
            let holding = matches!(
                sim.object(player).map(|o| &o.kind),
                Some(ObjectKind::Player { tool: Some(_) })
            );
            if inputs.clicked(Key::Q) && holding {
                sim.record_event(EventKind::DropTool, &[player], ctx);
            }
            if inputs.lclick {
                self.shoot(sim, ctx, player);
            }
        }
        self.step_cannons(sim, ctx);
    }

    /// Locally owned bullets that hit anything but a bullet or a player are
    /// despawned.
    fn handle_collisions(&mut self, sim: &mut Simulation, ctx: &mut SimContext<'_>) {
        let me = sim.me();
        let hits: Vec<ObjectId> = sim
            .objects()
            .filter(|o| o.kind == ObjectKind::Bullet && o.owner() == me)
            .filter(|o| {
                sim.collisions().colliding_with(o.id).iter().any(|other| {
                    sim.object(*other).is_some_and(|t| {
                        !matches!(t.kind, ObjectKind::Bullet | ObjectKind::Player { .. })
                    })
                })
            })
            .map(|o| o.id)
            .collect();
        for bullet in hits {
            sim.record_event(EventKind::Despawn, &[bullet], ctx);
        }
    }
}

pub fn crate_info() -> &'static str {
    "worldsync-game v0.1.0"
}
