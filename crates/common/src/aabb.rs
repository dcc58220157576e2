use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    /// The unit box `[-1,-1,-1]..[1,1,1]`.
    fn default() -> Self {
        Self {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Fit the tightest box around a set of points. Empty input yields an
    /// inverted box (`min = +inf`, `max = -inf`) that overlaps nothing.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in positions {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Inclusive interval intersection on every axis.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        other.min.x <= self.max.x
            && other.min.y <= self.max.y
            && other.min.z <= self.max.z
            && self.min.x <= other.max.x
            && self.min.y <= other.max.y
            && self.min.z <= other.max.z
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transform all eight corners and re-fit an axis-aligned box.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let corners = self.corners().map(|c| transform.transform_point3(c));
        Self::from_positions(&corners)
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}
