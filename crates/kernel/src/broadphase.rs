use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use worldsync_common::{Aabb, ObjectId};

/// Symmetric overlap relation for one tick. Ids without overlaps are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionSet {
    pairs: BTreeMap<ObjectId, Vec<ObjectId>>,
}

impl CollisionSet {
    fn link(&mut self, a: ObjectId, b: ObjectId) {
        self.pairs.entry(a).or_default().push(b);
        self.pairs.entry(b).or_default().push(a);
    }

    /// Objects overlapping `id`, in input order.
    pub fn colliding_with(&self, id: ObjectId) -> &[ObjectId] {
        self.pairs.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn collides(&self, a: ObjectId, b: ObjectId) -> bool {
        self.colliding_with(a).contains(&b)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &[ObjectId])> {
        self.pairs.iter().map(|(id, others)| (*id, others.as_slice()))
    }

    /// Number of objects with at least one overlap.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Result of one broadphase pass.
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    pub collisions: CollisionSet,
    /// Wall-clock cost of the pass. For profiling only.
    pub elapsed: Duration,
}

/// All pairwise box overlaps, O(n²).
pub fn check_collisions(boxes: &[(ObjectId, Aabb)]) -> CollisionReport {
    let _span = tracing::trace_span!("broadphase", objects = boxes.len()).entered();
    let start = Instant::now();
    let mut collisions = CollisionSet::default();
    for (i, (a, box_a)) in boxes.iter().enumerate() {
        for (b, box_b) in &boxes[i + 1..] {
            if box_a.overlaps(box_b) {
                collisions.link(*a, *b);
            }
        }
    }
    let elapsed = start.elapsed();
    tracing::trace!(colliding = collisions.len(), ?elapsed, "broadphase complete");
    CollisionReport {
        collisions,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn boxed(n: u32, min: f32, max: f32) -> (ObjectId, Aabb) {
        (ObjectId(n), Aabb::new(Vec3::splat(min), Vec3::splat(max)))
    }

    #[test]
    fn overlapping_and_disjoint_boxes() {
        let report = check_collisions(&[
            boxed(1, 0.0, 1.0),
            boxed(2, 0.5, 2.0),
            boxed(3, 2.5, 3.0),
        ]);
        let c = &report.collisions;
        assert!(c.collides(ObjectId(1), ObjectId(2)));
        assert!(!c.collides(ObjectId(1), ObjectId(3)));
        assert!(!c.collides(ObjectId(2), ObjectId(3)));
        assert_eq!(c.colliding_with(ObjectId(3)), &[] as &[ObjectId]);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn unit_box_does_not_reach_two() {
        let report = check_collisions(&[boxed(1, 0.0, 1.0), boxed(2, 2.0, 3.0)]);
        assert!(report.collisions.is_empty());
    }

    #[test]
    fn relation_is_symmetric() {
        let mut boxes = Vec::new();
        for n in 0..30u32 {
            let x = (n * 7 % 13) as f32 * 0.8;
            let y = (n * 5 % 11) as f32 * 0.6;
            boxes.push((
                ObjectId(n),
                Aabb::new(Vec3::new(x, y, 0.0), Vec3::new(x + 1.0, y + 1.0, 1.0)),
            ));
        }
        let report = check_collisions(&boxes);
        for (a, others) in report.collisions.iter() {
            assert!(!others.is_empty());
            for b in others {
                assert!(report.collisions.collides(*b, a));
            }
        }
    }

    #[test]
    fn empty_input_has_no_collisions() {
        assert!(check_collisions(&[]).collisions.is_empty());
    }
}
