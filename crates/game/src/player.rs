use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_6;
use worldsync_common::ObjectId;
use worldsync_input::{Inputs, Key};
use worldsync_kernel::{ObjectKind, Simulation};

/// Walking speed in units per millisecond.
pub const PLAYER_SPEED: f32 = 0.01;
/// Yaw per pointer pixel, in radians.
pub const POINTER_SENSITIVITY: f32 = 0.001;
pub const INTERACTION_DISTANCE: f32 = 10.0;
pub const INTERACTION_ANGLE: f32 = FRAC_PI_6;

/// Unit vector an object with `rotation` faces.
pub fn facing(rotation: Quat) -> Vec3 {
    rotation * Vec3::NEG_Z
}

/// Set horizontal velocity from WASD relative to facing and apply yaw from
/// the pointer. Vertical velocity is left alone.
pub fn drive(sim: &mut Simulation, player: ObjectId, inputs: &Inputs) {
    let Some(obj) = sim.object_mut(player) else {
        return;
    };
    let mut local = Vec3::ZERO;
    if inputs.is_down(Key::A) {
        local.x -= PLAYER_SPEED;
    }
    if inputs.is_down(Key::D) {
        local.x += PLAYER_SPEED;
    }
    if inputs.is_down(Key::W) {
        local.z -= PLAYER_SPEED;
    }
    if inputs.is_down(Key::S) {
        local.z += PLAYER_SPEED;
    }
    let world = obj.motion.rotation * local;
    obj.motion.linear_velocity.x = world.x;
    obj.motion.linear_velocity.z = world.z;

    if inputs.pointer_delta.x != 0.0 {
        let yaw = Quat::from_rotation_y(-inputs.pointer_delta.x * POINTER_SENSITIVITY);
        obj.motion.rotation = (obj.motion.rotation * yaw).normalize();
    }
}

/// Closest interactable object in front of `player`, skipping the tool it
/// already holds.
pub fn interaction_target(sim: &Simulation, player: ObjectId) -> Option<ObjectId> {
    let me = sim.object(player)?;
    let held = match me.kind {
        ObjectKind::Player { tool } => tool,
        _ => return None,
    };
    let origin = me.motion.location;
    let forward = facing(me.motion.rotation);

    let mut best: Option<(f32, ObjectId)> = None;
    for obj in sim.objects() {
        let interactable = matches!(obj.kind, ObjectKind::Cannon { .. }) || obj.kind.is_tool();
        if !interactable || Some(obj.id) == held {
            continue;
        }
        let to = obj.motion.location - origin;
        let distance = to.length();
        if distance >= INTERACTION_DISTANCE || distance == 0.0 {
            continue;
        }
        if to.angle_between(forward) >= INTERACTION_ANGLE {
            continue;
        }
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, obj.id));
        }
    }
    best.map(|(_, id)| id)
}
