use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Continuously simulated physical state of one object.
///
/// Mutated once per tick by the owning simulation; every process predicts
/// every object, so this is also written for objects owned elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub location: Vec3,
    pub rotation: Quat,
    /// Units per millisecond.
    pub linear_velocity: Vec3,
    /// Radians per millisecond, as a scaled axis.
    pub angular_velocity: Vec3,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

impl MotionState {
    /// A motion state at rest at `location`.
    pub fn at(location: Vec3) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Advance ballistically by `dt` milliseconds.
    ///
    /// Location moves along the linear velocity; rotation is advanced by the
    /// exponential map of `angular_velocity * dt` and renormalized.
    pub fn integrate(&mut self, dt: f32) {
        self.location += self.linear_velocity * dt;
        let delta = Quat::from_scaled_axis(self.angular_velocity * dt);
        self.rotation = (delta * self.rotation).normalize();
    }
}
