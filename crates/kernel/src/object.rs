use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use worldsync_common::{Aabb, MeshHandle, MotionState, ObjectId, ProcessId};

use crate::kinds::ObjectKind;

/// Ownership triple of an object.
///
/// Claims are ordered by `seq` first, then by the lower process id. A
/// snapshot sequence of `None` precedes every accepted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub owner: ProcessId,
    pub seq: u32,
    pub snap_seq: Option<u32>,
}

impl Authority {
    pub fn new(owner: ProcessId) -> Self {
        Self {
            owner,
            seq: 0,
            snap_seq: None,
        }
    }

    /// Whether a claim `(owner, seq, snap_seq)` wins against the current triple.
    pub fn admits(&self, owner: ProcessId, seq: u32, snap_seq: Option<u32>) -> bool {
        snap_seq >= self.snap_seq && (self.seq < seq || (self.seq == seq && owner <= self.owner))
    }

    /// Snapshot sequence the owner publishes next.
    pub fn next_snap_seq(&self) -> u32 {
        self.snap_seq.map_or(0, |s| s.wrapping_add(1))
    }
}

/// A replicated object: identity, authority, predicted motion and the
/// smoothing error between the last correction and the displayed pose.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: ObjectId,
    pub creator: ProcessId,
    pub kind: ObjectKind,
    pub authority: Authority,
    pub motion: MotionState,
    /// Displayed location minus predicted location.
    pub location_error: Vec3,
    /// Predicted rotation times this gives the displayed rotation.
    pub rotation_error: Quat,
    /// False until a location has been assigned, locally or by a snapshot.
    pub location_placed: bool,
    /// False until a rotation has been assigned, locally or by a snapshot.
    pub rotation_placed: bool,
    pub deleted: bool,
    pub mesh: MeshHandle,
    pub local_aabb: Aabb,
    pub world_aabb: Aabb,
    /// Union of this and the previous tick's world box.
    pub swept_aabb: Aabb,
    previous_world_aabb: Option<Aabb>,
    /// Derived render transform. Never authoritative.
    pub transform: Mat4,
}

impl Object {
    /// A fresh object owned by its creator at authority sequence 0.
    pub fn new(
        id: ObjectId,
        creator: ProcessId,
        kind: ObjectKind,
        mesh: MeshHandle,
        local_aabb: Aabb,
    ) -> Self {
        let mut obj = Self {
            id,
            creator,
            kind,
            authority: Authority::new(creator),
            motion: MotionState::default(),
            location_error: Vec3::ZERO,
            rotation_error: Quat::IDENTITY,
            location_placed: true,
            rotation_placed: true,
            deleted: false,
            mesh,
            local_aabb,
            world_aabb: local_aabb,
            swept_aabb: local_aabb,
            previous_world_aabb: None,
            transform: Mat4::IDENTITY,
        };
        obj.update_bounds();
        obj.transform = obj.render_transform(false);
        obj
    }

    /// Place the object at `motion`, resetting bounds history.
    pub fn with_motion(mut self, motion: MotionState) -> Self {
        self.motion = motion;
        self.previous_world_aabb = None;
        self.update_bounds();
        self.transform = self.render_transform(false);
        self
    }

    pub fn owner(&self) -> ProcessId {
        self.authority.owner
    }

    /// Commit `(owner, seq, snap_seq)` if it wins the authority order.
    /// A losing claim is a silent no-op.
    pub fn claim_authority(&mut self, owner: ProcessId, seq: u32, snap_seq: Option<u32>) -> bool {
        if self.authority.admits(owner, seq, snap_seq) {
            self.authority = Authority {
                owner,
                seq,
                snap_seq,
            };
            true
        } else {
            tracing::debug!(
                id = %self.id,
                %owner,
                seq,
                ?snap_seq,
                current = ?self.authority,
                "rejected authority claim"
            );
            false
        }
    }

    pub fn displayed_location(&self) -> Vec3 {
        self.motion.location + self.location_error
    }

    pub fn displayed_rotation(&self) -> Quat {
        (self.motion.rotation * self.rotation_error).normalize()
    }

    /// Fold an authoritative location in without moving the displayed pose.
    ///
    /// An object that was never placed takes the value as is, with no error.
    pub fn snap_location(&mut self, location: Vec3) {
        if !self.location_placed {
            self.motion.location = location;
            self.location_error = Vec3::ZERO;
            self.location_placed = true;
            return;
        }
        self.location_error = self.displayed_location() - location;
        self.motion.location = location;
    }

    /// Fold an authoritative rotation in without moving the displayed pose.
    ///
    /// An object that was never oriented takes the value as is, with no error.
    pub fn snap_rotation(&mut self, rotation: Quat) {
        let rotation = rotation.normalize();
        if !self.rotation_placed {
            self.motion.rotation = rotation;
            self.rotation_error = Quat::IDENTITY;
            self.rotation_placed = true;
            return;
        }
        let displayed = self.displayed_rotation();
        self.rotation_error = (rotation.inverse() * displayed).normalize();
        self.motion.rotation = rotation;
    }

    /// Scale both errors by `factor` and snap them once below `epsilon`.
    pub fn decay_error(&mut self, factor: f32, epsilon: f32) {
        if self.location_error != Vec3::ZERO {
            self.location_error *= factor;
            if self.location_error.length() < epsilon {
                self.location_error = Vec3::ZERO;
            }
        }
        if self.rotation_error != Quat::IDENTITY {
            self.rotation_error = self
                .rotation_error
                .slerp(Quat::IDENTITY, 1.0 - factor)
                .normalize();
            if rotation_angle(self.rotation_error) < epsilon {
                self.rotation_error = Quat::IDENTITY;
            }
        }
    }

    pub fn location_error_magnitude(&self) -> f32 {
        self.location_error.length()
    }

    /// Angle in radians of the outstanding rotation error.
    pub fn rotation_error_magnitude(&self) -> f32 {
        rotation_angle(self.rotation_error)
    }

    /// Recompute world and swept boxes from the raw predicted pose.
    pub fn update_bounds(&mut self) {
        let pose = Mat4::from_rotation_translation(self.motion.rotation, self.motion.location);
        let world = self.local_aabb.transformed(&pose);
        let previous = self.previous_world_aabb.unwrap_or(world);
        self.world_aabb = world;
        self.swept_aabb = previous.union(&world);
        self.previous_world_aabb = Some(world);
    }

    /// Transform to draw with: predicted pose plus error when smoothing,
    /// raw predicted pose otherwise.
    pub fn render_transform(&self, smoothing: bool) -> Mat4 {
        if smoothing {
            Mat4::from_rotation_translation(self.displayed_rotation(), self.displayed_location())
        } else {
            Mat4::from_rotation_translation(self.motion.rotation, self.motion.location)
        }
    }
}

/// Rotation angle of a unit quaternion along the shortest arc.
fn rotation_angle(q: Quat) -> f32 {
    2.0 * q.xyz().length().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn cube(owner: u8) -> Object {
        Object::new(
            ObjectId::compose(ProcessId(owner), 1),
            ProcessId(owner),
            ObjectKind::Cube {
                size: 1,
                color: Vec3::ONE,
            },
            MeshHandle(0),
            Aabb::default(),
        )
    }

    fn splitmix64(state: &mut u64) -> u64 {
        *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = *state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    #[test]
    fn lower_process_wins_tie() {
        let mut o = cube(1);
        o.authority.seq = 1;
        // higher id at the same seq loses
        assert!(!o.claim_authority(ProcessId(2), 1, Some(0)));
        assert_eq!(o.owner(), ProcessId(1));
        // a newer seq wins regardless of id
        assert!(o.claim_authority(ProcessId(2), 2, Some(0)));
        assert_eq!(o.owner(), ProcessId(2));
        assert_eq!(o.authority.seq, 2);
        assert_eq!(o.authority.snap_seq, Some(0));
    }

    #[test]
    fn equal_or_lower_owner_at_same_seq_wins() {
        let mut o = cube(2);
        assert!(o.claim_authority(ProcessId(2), 0, Some(3)));
        assert!(o.claim_authority(ProcessId(1), 0, Some(3)));
        assert_eq!(o.owner(), ProcessId(1));
    }

    #[test]
    fn stale_snapshot_rejected_even_with_newer_seq() {
        let mut o = cube(1);
        assert!(o.claim_authority(ProcessId(1), 0, Some(5)));
        assert!(!o.claim_authority(ProcessId(0), 9, Some(4)));
        assert_eq!(o.authority.snap_seq, Some(5));
    }

    #[test]
    fn rejected_claim_is_a_no_op() {
        let mut o = cube(0);
        let before = o.authority;
        assert!(!o.claim_authority(ProcessId(3), 0, Some(0)));
        assert!(!o.claim_authority(ProcessId(3), 0, Some(0)));
        assert_eq!(o.authority, before);
    }

    #[test]
    fn accepted_claims_are_monotonic_under_interleaving() {
        let mut rng = 0x5eed_u64;
        let mut o = cube(3);
        let mut last = o.authority;
        for _ in 0..5000 {
            let owner = ProcessId((splitmix64(&mut rng) % 5) as u8);
            let seq = (splitmix64(&mut rng) % 8) as u32;
            let snap = match splitmix64(&mut rng) % 10 {
                0 => None,
                n => Some((n as u32) + (splitmix64(&mut rng) % 40) as u32),
            };
            if o.claim_authority(owner, seq, snap) {
                let now = o.authority;
                assert!(now.snap_seq >= last.snap_seq);
                assert!(now.seq > last.seq || (now.seq == last.seq && now.owner <= last.owner));
                last = now;
            } else {
                assert_eq!(o.authority, last);
            }
        }
    }

    #[test]
    fn first_snap_takes_value_directly() {
        let mut o = cube(0);
        o.location_placed = false;
        o.rotation_placed = false;
        o.snap_location(Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(o.motion.location, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(o.displayed_location(), Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(o.location_error, Vec3::ZERO);

        let r = Quat::from_rotation_y(0.7);
        o.snap_rotation(r);
        assert!(o.displayed_rotation().abs_diff_eq(r, 1e-6));
        assert_eq!(o.rotation_error, Quat::IDENTITY);
        assert!(o.location_placed && o.rotation_placed);
    }

    #[test]
    fn unplaced_object_snapped_to_origin_stays_put() {
        let mut o = cube(0);
        o.location_placed = false;
        o.rotation_placed = false;
        o.location_error = Vec3::X;
        o.snap_location(Vec3::ZERO);
        o.snap_rotation(Quat::IDENTITY);
        assert_eq!(o.displayed_location(), Vec3::ZERO);
        assert_eq!(o.location_error, Vec3::ZERO);

        // later corrections go through the error path
        o.snap_location(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(o.displayed_location(), Vec3::ZERO);
        assert_eq!(o.location_error, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn object_placed_at_origin_keeps_displayed_location() {
        let mut o = cube(0);
        o.location_error = Vec3::X;
        o.snap_location(Vec3::ZERO);
        assert_eq!(o.displayed_location(), Vec3::X);
        o.snap_location(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(o.motion.location, Vec3::new(0.0, 2.0, 0.0));
        assert!((o.displayed_location() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn object_placed_at_identity_keeps_displayed_rotation() {
        let mut o = cube(0);
        o.snap_rotation(Quat::IDENTITY);
        assert_eq!(o.displayed_rotation(), Quat::IDENTITY);
        o.snap_rotation(Quat::from_rotation_y(0.5));
        assert!(o.motion.rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
        assert!(o.displayed_rotation().abs_diff_eq(Quat::IDENTITY, 1e-5));
        assert!((o.rotation_error_magnitude() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn snap_location_preserves_displayed_pose() {
        let mut o = cube(0);
        o.motion.location = Vec3::new(1.0, 0.0, 0.0);
        o.location_error = Vec3::new(0.0, 0.5, 0.0);
        let displayed = o.displayed_location();
        o.snap_location(Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(o.motion.location, Vec3::new(2.0, 2.0, 2.0));
        assert!((o.displayed_location() - displayed).length() < 1e-6);
    }

    #[test]
    fn snap_rotation_preserves_displayed_pose() {
        let mut o = cube(0);
        o.motion.rotation = Quat::from_rotation_x(0.4);
        o.rotation_error = Quat::from_rotation_z(0.1);
        let displayed = o.displayed_rotation();
        let target = Quat::from_rotation_y(1.2);
        o.snap_rotation(target);
        assert!(o.motion.rotation.abs_diff_eq(target, 1e-6));
        assert!(o.displayed_rotation().abs_diff_eq(displayed, 1e-5));
    }

    #[test]
    fn error_decays_monotonically_to_exact_zero() {
        let config = SimConfig::default();
        let mut o = cube(0);
        o.motion.location = Vec3::X;
        o.motion.rotation = Quat::from_rotation_y(0.3);
        o.snap_location(Vec3::new(4.0, 0.0, 0.0));
        o.snap_rotation(Quat::from_rotation_y(1.3));
        assert!(o.location_error_magnitude() > 2.9);
        assert!(o.rotation_error_magnitude() > 0.9);

        let factor = config.decay_factor(16.0);
        let (mut loc, mut rot) = (o.location_error_magnitude(), o.rotation_error_magnitude());
        for _ in 0..2000 {
            o.decay_error(factor, config.error_epsilon);
            let (l, r) = (o.location_error_magnitude(), o.rotation_error_magnitude());
            assert!(l <= loc);
            assert!(r <= rot + 1e-6);
            loc = l;
            rot = r;
        }
        assert_eq!(o.location_error, Vec3::ZERO);
        assert_eq!(o.rotation_error, Quat::IDENTITY);

        o.decay_error(factor, config.error_epsilon);
        assert_eq!(o.location_error, Vec3::ZERO);
        assert_eq!(o.rotation_error, Quat::IDENTITY);
    }

    #[test]
    fn smoothed_transform_includes_error() {
        let mut o = cube(0);
        o.motion.location = Vec3::new(1.0, 0.0, 0.0);
        o.location_error = Vec3::new(0.0, 1.0, 0.0);
        let smooth = o.render_transform(true);
        let raw = o.render_transform(false);
        assert_eq!(smooth.w_axis.truncate(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(raw.w_axis.truncate(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn swept_box_covers_both_ticks() {
        let mut o = cube(0);
        o.motion.location = Vec3::new(10.0, 0.0, 0.0);
        o.update_bounds();
        assert_eq!(o.world_aabb.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(o.swept_aabb.min, Vec3::splat(-1.0));
        assert_eq!(o.swept_aabb.max, Vec3::new(11.0, 1.0, 1.0));
    }
}
