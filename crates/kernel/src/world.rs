use std::collections::BTreeMap;
use std::time::Duration;
use worldsync_assets::{AssetError, AssetProvider};
use worldsync_common::{Aabb, EventId, MotionState, ObjectId, ProcessId};
use worldsync_input::Inputs;
use worldsync_render::Renderer;

use crate::broadphase::{CollisionSet, check_collisions};
use crate::config::SimConfig;
use crate::events::{self, Event, EventContext, EventKind, EventOutcome, event_authority};
use crate::ids::IdAllocator;
use crate::kinds::{MotionModel, ObjectKind};
use crate::object::Object;
use crate::registry::Registry;

/// Why a local spawn failed.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("process {0} has no object ids left")]
    IdsExhausted(ProcessId),
}

/// Collaborators threaded through every tick and event application.
pub struct SimContext<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub assets: &'a dyn AssetProvider,
}

/// Game-specific logic plugged into [`Simulation::step`].
pub trait GameHooks {
    /// Apply input and local game logic. Runs first in every tick.
    fn step_game(&mut self, sim: &mut Simulation, ctx: &mut SimContext<'_>, dt: f32, inputs: &Inputs);

    /// React to this tick's broadphase result.
    fn handle_collisions(&mut self, sim: &mut Simulation, ctx: &mut SimContext<'_>);
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl GameHooks for NoopHooks {
    fn step_game(&mut self, _sim: &mut Simulation, _ctx: &mut SimContext<'_>, _dt: f32, _inputs: &Inputs) {}

    fn handle_collisions(&mut self, _sim: &mut Simulation, _ctx: &mut SimContext<'_>) {}
}

/// One process's copy of the shared world.
///
/// Every live object is predicted locally regardless of who owns it; owners
/// publish snapshots and everyone else folds them in through the snap
/// operations. Events mutate discrete state and are gated on authority.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) me: ProcessId,
    pub(crate) config: SimConfig,
    pub(crate) registry: Registry,
    pub(crate) events: BTreeMap<EventId, Event>,
    pub(crate) ids: IdAllocator,
    collisions: CollisionSet,
    last_collision_time: Duration,
    tick: u64,
    /// Locally created objects whose construct message has not been sent.
    pub(crate) pending_constructs: Vec<ObjectId>,
    /// Locally authored events not yet sent.
    pub(crate) pending_events: Vec<EventId>,
}

impl Simulation {
    pub fn new(me: ProcessId, config: SimConfig) -> Self {
        Self {
            me,
            config,
            registry: Registry::new(),
            events: BTreeMap::new(),
            ids: IdAllocator::new(me),
            collisions: CollisionSet::default(),
            last_collision_time: Duration::ZERO,
            tick: 0,
            pending_constructs: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn me(&self) -> ProcessId {
        self.me
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.registry.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.registry.get_mut(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.registry.live()
    }

    /// Live objects this process is authoritative for.
    pub fn owned_ids(&self) -> Vec<ObjectId> {
        self.registry
            .live()
            .filter(|o| o.owner() == self.me)
            .map(|o| o.id)
            .collect()
    }

    /// Overlaps found by the last tick's broadphase.
    pub fn collisions(&self) -> &CollisionSet {
        &self.collisions
    }

    pub fn last_collision_time(&self) -> Duration {
        self.last_collision_time
    }

    pub fn events(&self) -> &BTreeMap<EventId, Event> {
        &self.events
    }

    /// Create a locally owned object and queue its construct message.
    pub fn spawn(
        &mut self,
        kind: ObjectKind,
        motion: MotionState,
        ctx: &mut SimContext<'_>,
    ) -> Result<ObjectId, SpawnError> {
        let id = self.ids.object().ok_or(SpawnError::IdsExhausted(self.me))?;
        let obj = build_object(id, self.me, kind, motion, ctx.assets)?;
        self.add_object(obj, ctx.renderer);
        Ok(id)
    }

    /// Insert an object and show it. Objects created by this process are
    /// queued for construct replication. Returns false for a known id.
    pub fn add_object(&mut self, obj: Object, renderer: &mut dyn Renderer) -> bool {
        let (id, mesh, transform, local) = (obj.id, obj.mesh, obj.transform, obj.creator == self.me);
        if !self.registry.insert(obj) {
            tracing::debug!(%id, "ignoring add of known object");
            return false;
        }
        renderer.add_object(id, mesh, &transform);
        if local {
            self.pending_constructs.push(id);
        }
        true
    }

    /// Move a live object to the tombstones and hide it.
    pub fn remove_object(&mut self, id: ObjectId, renderer: &mut dyn Renderer) -> bool {
        if self.registry.retire(id).is_none() {
            return false;
        }
        renderer.remove_object(id);
        true
    }

    /// Claim authority over `id` with the next authority sequence. The
    /// current snapshot sequence is kept, so peers accept the claim once this
    /// process has caught up with the previous owner's snapshots.
    pub fn take_authority(&mut self, id: ObjectId) -> bool {
        let me = self.me;
        let Some(obj) = self.registry.get_mut(id) else {
            return false;
        };
        let (seq, snap) = (obj.authority.seq.wrapping_add(1), obj.authority.snap_seq);
        obj.claim_authority(me, seq, snap)
    }

    /// Advance one tick of `dt` milliseconds.
    pub fn step(
        &mut self,
        dt: f32,
        inputs: &Inputs,
        hooks: &mut dyn GameHooks,
        ctx: &mut SimContext<'_>,
    ) {
        let _span = tracing::info_span!("sim_step", tick = self.tick + 1, me = self.me.0).entered();

        hooks.step_game(self, ctx, dt, inputs);

        let factor = self.config.decay_factor(dt);
        let epsilon = self.config.error_epsilon;
        for obj in self.registry.live_mut() {
            obj.decay_error(factor, epsilon);
            if obj.kind.motion_model() == MotionModel::Ballistic {
                obj.motion.integrate(dt);
            }
            obj.update_bounds();
        }

        let boxes: Vec<(ObjectId, Aabb)> = self
            .registry
            .live()
            .map(|o| (o.id, o.world_aabb))
            .collect();
        let report = check_collisions(&boxes);
        self.collisions = report.collisions;
        self.last_collision_time = report.elapsed;

        hooks.handle_collisions(self, ctx);

        let smoothing = self.config.smoothing;
        for obj in self.registry.live_mut() {
            obj.transform = obj.render_transform(smoothing);
            ctx.renderer.update_transform(obj.id, &obj.transform);
        }

        self.tick += 1;
        tracing::trace!(
            objects = self.registry.live_count(),
            colliding = self.collisions.len(),
            "tick complete"
        );
    }

    /// Submit an event. It is logged, applied and queued for replication
    /// only if this process is its authority and the event is legal here;
    /// otherwise nothing changes locally and nothing is sent.
    pub fn record_event(
        &mut self,
        kind: EventKind,
        participants: &[ObjectId],
        ctx: &mut SimContext<'_>,
    ) -> EventOutcome {
        let Some(authority) = event_authority(kind, &self.registry, participants) else {
            tracing::debug!(event = kind.name(), ?participants, "event participant missing");
            return EventOutcome::MissingParticipant;
        };
        if authority != self.me {
            tracing::trace!(event = kind.name(), %authority, "not the event authority");
            return EventOutcome::NotAuthority;
        }
        if !events::is_legal(kind, &self.registry, participants) {
            tracing::debug!(event = kind.name(), ?participants, "illegal event not recorded");
            return EventOutcome::Illegal;
        }
        let Some(id) = self.ids.event() else {
            tracing::warn!(event = kind.name(), me = %self.me, "event ids exhausted");
            return EventOutcome::IdsExhausted;
        };
        self.pending_events.push(id);
        self.commit_event(
            Event {
                id,
                kind,
                participants: participants.to_vec(),
                authority,
            },
            ctx,
        )
    }

    /// Apply an event recorded by its authority elsewhere. Each id is applied
    /// at most once.
    pub fn apply_remote_event(&mut self, event: Event, ctx: &mut SimContext<'_>) -> EventOutcome {
        if self.events.contains_key(&event.id) {
            tracing::debug!(id = %event.id, "duplicate event replay");
            return EventOutcome::Duplicate(event.id);
        }
        if !event.participants.iter().all(|id| self.registry.knows(*id)) {
            tracing::debug!(id = %event.id, event = event.kind.name(), "event participant missing");
            return EventOutcome::MissingParticipant;
        }
        self.commit_event(event, ctx)
    }

    fn commit_event(&mut self, event: Event, ctx: &mut SimContext<'_>) -> EventOutcome {
        let mut ectx = EventContext {
            registry: &mut self.registry,
            renderer: &mut *ctx.renderer,
            config: &self.config,
        };
        let applied = events::run(event.kind, &mut ectx, &event.participants);
        let id = event.id;
        self.events.insert(id, event);
        if applied {
            EventOutcome::Applied(id)
        } else {
            EventOutcome::Rejected(id)
        }
    }

    /// FNV-1a over live and tombstoned ids, owners, authority sequences and
    /// discrete kind state, in canonical order. Continuous motion is left
    /// out so that processes agreeing on every event hash equal.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for obj in self.registry.live() {
            mix(&mut h, &obj.id.0.to_le_bytes());
            mix(&mut h, &[obj.authority.owner.0]);
            mix(&mut h, &obj.authority.seq.to_le_bytes());
            mix(&mut h, &[obj.kind.kind_id().0]);
            match &obj.kind {
                ObjectKind::Player { tool } => {
                    mix(&mut h, &tool.map_or(0, |t| t.0).to_le_bytes());
                }
                ObjectKind::Cube { size, .. } => mix(&mut h, &[*size]),
                ObjectKind::Cannon { loaded, firing, .. } => {
                    mix(&mut h, &[u8::from(*loaded), u8::from(*firing)]);
                }
                ObjectKind::Ammunition { amount } => mix(&mut h, &amount.to_le_bytes()),
                ObjectKind::Bullet | ObjectKind::Linstock => {}
            }
        }
        mix(&mut h, b"tombstones");
        for id in self.registry.tombstone_ids() {
            mix(&mut h, &id.0.to_le_bytes());
        }
        h
    }
}

/// Build an object of `kind` with its mesh and (scaled) model-space box.
pub fn build_object(
    id: ObjectId,
    creator: ProcessId,
    kind: ObjectKind,
    motion: MotionState,
    assets: &dyn AssetProvider,
) -> Result<Object, AssetError> {
    let kind_id = kind.kind_id();
    let mesh = assets.mesh(kind_id)?;
    let local = assets.local_aabb(kind_id)?;
    let scale = kind.scale();
    let local = Aabb::new(local.min * scale, local.max * scale);
    Ok(Object::new(id, creator, kind, mesh, local).with_motion(motion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::builtin_assets;
    use glam::{Quat, Vec3};
    use worldsync_assets::AssetTable;
    use worldsync_render::DebugTextRenderer;

    struct Harness {
        assets: AssetTable,
        renderer: DebugTextRenderer,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                assets: builtin_assets().unwrap(),
                renderer: DebugTextRenderer::new(),
            }
        }

        fn ctx(&mut self) -> SimContext<'_> {
            SimContext {
                renderer: &mut self.renderer,
                assets: &self.assets,
            }
        }
    }

    fn moving_cube(velocity: Vec3) -> MotionState {
        let mut m = MotionState::at(Vec3::new(0.0, 5.0, 0.0));
        m.linear_velocity = velocity;
        m
    }

    fn cube() -> ObjectKind {
        ObjectKind::Cube {
            size: 1,
            color: Vec3::ONE,
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        collisions_seen: usize,
    }

    impl GameHooks for Recorder {
        fn step_game(&mut self, sim: &mut Simulation, _ctx: &mut SimContext<'_>, _dt: f32, _inputs: &Inputs) {
            assert_eq!(sim.collisions().len(), self.collisions_seen);
            self.calls.push("step_game");
        }

        fn handle_collisions(&mut self, sim: &mut Simulation, _ctx: &mut SimContext<'_>) {
            self.collisions_seen = sim.collisions().len();
            self.calls.push("handle_collisions");
        }
    }

    #[test]
    fn spawn_adds_to_registry_and_renderer() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let id = sim.spawn(cube(), MotionState::at(Vec3::X), &mut h.ctx()).unwrap();
        assert!(sim.object(id).is_some());
        assert_eq!(h.renderer.instance_count(), 1);
        assert_eq!(sim.pending_constructs, vec![id]);
        assert_eq!(id.allocator(), ProcessId(0));
    }

    #[test]
    fn spawn_of_unknown_asset_fails() {
        let mut renderer = DebugTextRenderer::new();
        let assets = AssetTable::new();
        let mut ctx = SimContext {
            renderer: &mut renderer,
            assets: &assets,
        };
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        assert!(sim.spawn(cube(), MotionState::default(), &mut ctx).is_err());
        assert_eq!(sim.registry().live_count(), 0);
    }

    #[test]
    fn remove_object_tombstones_and_hides() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let id = sim.spawn(cube(), MotionState::at(Vec3::X), &mut h.ctx()).unwrap();
        assert!(sim.remove_object(id, &mut h.renderer));
        assert!(!sim.remove_object(id, &mut h.renderer));
        assert_eq!(h.renderer.instance_count(), 0);
        assert!(sim.registry().lookup(id).is_some_and(|o| o.deleted));
    }

    #[test]
    fn step_integrates_ballistic_objects_only() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let c = sim
            .spawn(cube(), moving_cube(Vec3::new(0.01, 0.0, 0.0)), &mut h.ctx())
            .unwrap();
        let mut fixed = MotionState::at(Vec3::new(50.0, 0.0, 0.0));
        fixed.linear_velocity = Vec3::X;
        let stick = sim.spawn(ObjectKind::Linstock, fixed, &mut h.ctx()).unwrap();

        sim.step(100.0, &Inputs::new(), &mut NoopHooks, &mut h.ctx());
        assert!((sim.object(c).unwrap().motion.location.x - 1.0).abs() < 1e-5);
        assert_eq!(sim.object(stick).unwrap().motion.location.x, 50.0);
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn step_pushes_smoothed_transforms() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let id = sim
            .spawn(cube(), MotionState::at(Vec3::new(1.0, 0.0, 0.0)), &mut h.ctx())
            .unwrap();
        sim.object_mut(id).unwrap().location_error = Vec3::new(0.0, 3.0, 0.0);
        sim.step(0.0, &Inputs::new(), &mut NoopHooks, &mut h.ctx());
        let shown = h.renderer.instance(id).unwrap().transform.w_axis.truncate();
        assert_eq!(shown, Vec3::new(1.0, 3.0, 0.0));
        assert_eq!(h.renderer.update_count(), 1);
    }

    #[test]
    fn unsmoothed_mode_shows_raw_pose() {
        let mut h = Harness::new();
        let config = SimConfig {
            smoothing: false,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(ProcessId(0), config);
        let id = sim
            .spawn(cube(), MotionState::at(Vec3::new(1.0, 0.0, 0.0)), &mut h.ctx())
            .unwrap();
        sim.object_mut(id).unwrap().location_error = Vec3::new(0.0, 3.0, 0.0);
        sim.step(0.0, &Inputs::new(), &mut NoopHooks, &mut h.ctx());
        let shown = h.renderer.instance(id).unwrap().transform.w_axis.truncate();
        assert_eq!(shown, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn step_decays_error_for_objects_owned_elsewhere() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let remote = build_object(
            ObjectId::compose(ProcessId(1), 1),
            ProcessId(1),
            cube(),
            MotionState::at(Vec3::X),
            &h.assets,
        )
        .unwrap();
        let id = remote.id;
        sim.add_object(remote, &mut h.renderer);
        assert!(sim.pending_constructs.is_empty());
        {
            let o = sim.object_mut(id).unwrap();
            o.location_error = Vec3::new(1.0, 0.0, 0.0);
            o.rotation_error = Quat::from_rotation_y(0.5);
        }
        sim.step(16.0, &Inputs::new(), &mut NoopHooks, &mut h.ctx());
        let o = sim.object(id).unwrap();
        assert!(o.location_error.x < 1.0 && o.location_error.x > 0.0);
        assert!(o.rotation_error_magnitude() < 0.5);
    }

    #[test]
    fn hooks_run_around_broadphase() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        sim.spawn(cube(), MotionState::at(Vec3::X), &mut h.ctx()).unwrap();
        sim.spawn(cube(), MotionState::at(Vec3::new(1.5, 0.0, 0.0)), &mut h.ctx())
            .unwrap();
        let mut hooks = Recorder::default();
        sim.step(16.0, &Inputs::new(), &mut hooks, &mut h.ctx());
        sim.step(16.0, &Inputs::new(), &mut hooks, &mut h.ctx());
        assert_eq!(
            hooks.calls,
            vec!["step_game", "handle_collisions", "step_game", "handle_collisions"]
        );
        assert_eq!(hooks.collisions_seen, 2);
    }

    #[test]
    fn record_event_applies_only_on_authority() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(1), SimConfig::default());
        let theirs = build_object(
            ObjectId::compose(ProcessId(0), 1),
            ProcessId(0),
            ObjectKind::Bullet,
            MotionState::at(Vec3::X),
            &h.assets,
        )
        .unwrap();
        let theirs_id = theirs.id;
        sim.add_object(theirs, &mut h.renderer);
        let hash = sim.state_hash();

        let outcome = sim.record_event(EventKind::Despawn, &[theirs_id], &mut h.ctx());
        assert_eq!(outcome, EventOutcome::NotAuthority);
        assert!(sim.registry().is_live(theirs_id));
        assert!(sim.events().is_empty());
        assert_eq!(sim.state_hash(), hash);

        let mine = sim
            .spawn(ObjectKind::Bullet, MotionState::at(Vec3::Y), &mut h.ctx())
            .unwrap();
        let outcome = sim.record_event(EventKind::Despawn, &[mine], &mut h.ctx());
        assert!(matches!(outcome, EventOutcome::Applied(_)));
        assert!(!sim.registry().is_live(mine));
        assert_eq!(sim.events().len(), 1);
        assert_eq!(sim.pending_events.len(), 1);
    }

    #[test]
    fn illegal_local_event_is_neither_logged_nor_sent() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let b = sim
            .spawn(ObjectKind::Bullet, MotionState::at(Vec3::X), &mut h.ctx())
            .unwrap();
        assert!(matches!(
            sim.record_event(EventKind::Despawn, &[b], &mut h.ctx()),
            EventOutcome::Applied(_)
        ));
        let issued = sim.ids.issued();
        // second despawn resolves through the tombstone but is no longer legal
        assert_eq!(
            sim.record_event(EventKind::Despawn, &[b], &mut h.ctx()),
            EventOutcome::Illegal
        );
        assert_eq!(sim.registry().tombstone_count(), 1);
        assert_eq!(sim.events().len(), 1);
        assert_eq!(sim.pending_events.len(), 1);
        assert_eq!(sim.ids.issued(), issued);
    }

    #[test]
    fn illegal_remote_event_is_logged_but_inert() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(1), SimConfig::default());
        let obj = build_object(
            ObjectId::compose(ProcessId(0), 1),
            ProcessId(0),
            ObjectKind::Bullet,
            MotionState::at(Vec3::X),
            &h.assets,
        )
        .unwrap();
        let id = obj.id;
        sim.add_object(obj, &mut h.renderer);
        sim.remove_object(id, &mut h.renderer);
        let event = Event {
            id: EventId::compose(ProcessId(0), 2),
            kind: EventKind::Despawn,
            participants: vec![id],
            authority: ProcessId(0),
        };
        assert_eq!(
            sim.apply_remote_event(event.clone(), &mut h.ctx()),
            EventOutcome::Rejected(event.id)
        );
        assert_eq!(
            sim.apply_remote_event(event.clone(), &mut h.ctx()),
            EventOutcome::Duplicate(event.id)
        );
    }

    #[test]
    fn exhausted_ids_stop_spawns_and_events() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        let b = sim
            .spawn(ObjectKind::Bullet, MotionState::at(Vec3::X), &mut h.ctx())
            .unwrap();
        while sim.ids.object().is_some() {}
        assert!(matches!(
            sim.spawn(ObjectKind::Bullet, MotionState::at(Vec3::Y), &mut h.ctx()),
            Err(SpawnError::IdsExhausted(ProcessId(0)))
        ));
        assert_eq!(
            sim.record_event(EventKind::Despawn, &[b], &mut h.ctx()),
            EventOutcome::IdsExhausted
        );
        assert!(sim.registry().is_live(b));
        assert!(sim.events().is_empty());
    }

    #[test]
    fn missing_participant_drops_event() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(0), SimConfig::default());
        assert_eq!(
            sim.record_event(EventKind::Despawn, &[ObjectId(1234)], &mut h.ctx()),
            EventOutcome::MissingParticipant
        );
        assert!(sim.events().is_empty());
    }

    #[test]
    fn remote_events_apply_once() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(1), SimConfig::default());
        let obj = build_object(
            ObjectId::compose(ProcessId(0), 1),
            ProcessId(0),
            ObjectKind::Bullet,
            MotionState::at(Vec3::X),
            &h.assets,
        )
        .unwrap();
        let id = obj.id;
        sim.add_object(obj, &mut h.renderer);
        let event = Event {
            id: EventId::compose(ProcessId(0), 2),
            kind: EventKind::Despawn,
            participants: vec![id],
            authority: ProcessId(0),
        };
        assert_eq!(
            sim.apply_remote_event(event.clone(), &mut h.ctx()),
            EventOutcome::Applied(event.id)
        );
        assert_eq!(
            sim.apply_remote_event(event.clone(), &mut h.ctx()),
            EventOutcome::Duplicate(event.id)
        );
        assert!(!sim.registry().is_live(id));
        assert_eq!(h.renderer.instance_count(), 0);
    }

    #[test]
    fn take_authority_bumps_sequence() {
        let mut h = Harness::new();
        let mut sim = Simulation::new(ProcessId(1), SimConfig::default());
        let mut obj = build_object(
            ObjectId::compose(ProcessId(0), 1),
            ProcessId(0),
            cube(),
            MotionState::at(Vec3::X),
            &h.assets,
        )
        .unwrap();
        obj.authority.snap_seq = Some(7);
        let id = obj.id;
        sim.add_object(obj, &mut h.renderer);
        assert!(sim.take_authority(id));
        let auth = sim.object(id).unwrap().authority;
        assert_eq!(auth.owner, ProcessId(1));
        assert_eq!(auth.seq, 1);
        assert_eq!(auth.snap_seq, Some(7));
        assert_eq!(sim.owned_ids(), vec![id]);
        assert!(!sim.take_authority(ObjectId(999)));
    }

    #[test]
    fn state_hash_ignores_motion_but_tracks_events() {
        let mut h = Harness::new();
        let mut a = Simulation::new(ProcessId(0), SimConfig::default());
        let mut b = Simulation::new(ProcessId(0), SimConfig::default());
        let ia = a.spawn(ObjectKind::Bullet, moving_cube(Vec3::X), &mut h.ctx()).unwrap();
        let ib = b.spawn(ObjectKind::Bullet, moving_cube(Vec3::Y), &mut h.ctx()).unwrap();
        assert_eq!(ia, ib);
        assert_eq!(a.state_hash(), b.state_hash());

        a.record_event(EventKind::Despawn, &[ia], &mut h.ctx());
        assert_ne!(a.state_hash(), b.state_hash());
    }
}
