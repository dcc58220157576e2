//! Authority-gated events and the table of per-kind behavior.
//!
//! Each event kind names the participant that anchors its authority, a
//! legality predicate re-checked whenever the event is applied, and the
//! mutation itself. Only the authoritative process records an event; every
//! other process applies the replicated record with the same table.

use serde::{Deserialize, Serialize};
use worldsync_common::{EventId, ObjectId, ProcessId};
use worldsync_render::Renderer;

use crate::config::SimConfig;
use crate::kinds::ObjectKind;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// `[object]`
    Despawn,
    /// `[player, cannon, ammunition]`
    LoadCannon,
    /// `[player, cannon]`
    FireCannon,
    /// `[cannon]`
    FiredCannon,
    /// `[player, tool]`
    PickUpTool,
    /// `[player]`
    DropTool,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        Self::Despawn,
        Self::LoadCannon,
        Self::FireCannon,
        Self::FiredCannon,
        Self::PickUpTool,
        Self::DropTool,
    ];

    pub fn to_wire(self) -> u8 {
        self as u8
    }

    pub fn from_wire(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Despawn => "despawn",
            Self::LoadCannon => "load-cannon",
            Self::FireCannon => "fire-cannon",
            Self::FiredCannon => "fired-cannon",
            Self::PickUpTool => "pick-up-tool",
            Self::DropTool => "drop-tool",
        }
    }
}

/// A recorded event. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub participants: Vec<ObjectId>,
    pub authority: ProcessId,
}

/// What happened to a submitted or replicated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Another process is authoritative; nothing changed locally.
    NotAuthority,
    /// A participant is neither live nor tombstoned; dropped.
    MissingParticipant,
    /// Logged and applied.
    Applied(EventId),
    /// A local submission failed the legality check; not logged or sent.
    Illegal,
    /// A replicated event failed the legality check here. Logged so a
    /// duplicate replay is still recognized, but nothing changed.
    Rejected(EventId),
    /// This process has no event ids left; nothing changed.
    IdsExhausted,
    /// Already in the log; ignored.
    Duplicate(EventId),
}

/// Which participant's owner is authoritative for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityAnchor {
    /// Lowest owner id among all participants.
    MinOwner,
    /// Owner of the participant at this index.
    Participant(usize),
}

/// What an event's apply logic may touch.
pub struct EventContext<'a> {
    pub registry: &'a mut Registry,
    pub renderer: &'a mut dyn Renderer,
    pub config: &'a SimConfig,
}

pub struct EventHandler {
    pub anchor: AuthorityAnchor,
    pub legal: fn(&Registry, &[ObjectId]) -> bool,
    pub apply: fn(&mut EventContext<'_>, &[ObjectId]),
}

static HANDLERS: [EventHandler; 6] = [
    EventHandler {
        anchor: AuthorityAnchor::MinOwner,
        legal: despawn_legal,
        apply: despawn_apply,
    },
    EventHandler {
        anchor: AuthorityAnchor::Participant(0),
        legal: load_cannon_legal,
        apply: load_cannon_apply,
    },
    EventHandler {
        anchor: AuthorityAnchor::Participant(0),
        legal: fire_cannon_legal,
        apply: fire_cannon_apply,
    },
    EventHandler {
        anchor: AuthorityAnchor::Participant(0),
        legal: fired_cannon_legal,
        apply: fired_cannon_apply,
    },
    EventHandler {
        anchor: AuthorityAnchor::Participant(0),
        legal: pick_up_legal,
        apply: pick_up_apply,
    },
    EventHandler {
        anchor: AuthorityAnchor::Participant(0),
        legal: drop_tool_legal,
        apply: drop_tool_apply,
    },
];

pub fn handler(kind: EventKind) -> &'static EventHandler {
    &HANDLERS[kind as usize]
}

/// The process authoritative for `kind` over `participants`, or `None` when
/// a participant cannot be resolved (live or tombstoned).
pub fn event_authority(
    kind: EventKind,
    registry: &Registry,
    participants: &[ObjectId],
) -> Option<ProcessId> {
    let owners = participants
        .iter()
        .map(|id| registry.owner_of(*id))
        .collect::<Option<Vec<_>>>()?;
    match handler(kind).anchor {
        AuthorityAnchor::MinOwner => owners.into_iter().min(),
        AuthorityAnchor::Participant(i) => owners.get(i).copied(),
    }
}

/// Whether `kind` may currently apply to `participants`.
pub fn is_legal(kind: EventKind, registry: &Registry, participants: &[ObjectId]) -> bool {
    (handler(kind).legal)(registry, participants)
}

/// Re-check legality and apply. Returns whether the mutation ran.
pub fn run(kind: EventKind, ctx: &mut EventContext<'_>, participants: &[ObjectId]) -> bool {
    if !is_legal(kind, ctx.registry, participants) {
        tracing::debug!(event = kind.name(), ?participants, "illegal event dropped");
        return false;
    }
    (handler(kind).apply)(ctx, participants);
    true
}

fn kind_of(registry: &Registry, id: ObjectId) -> Option<&ObjectKind> {
    registry.get(id).map(|o| &o.kind)
}

fn is_player(registry: &Registry, id: ObjectId) -> bool {
    matches!(kind_of(registry, id), Some(ObjectKind::Player { .. }))
}

fn despawn_legal(registry: &Registry, p: &[ObjectId]) -> bool {
    matches!(p, [obj] if registry.is_live(*obj))
}

fn despawn_apply(ctx: &mut EventContext<'_>, p: &[ObjectId]) {
    for id in p {
        if ctx.registry.retire(*id).is_some() {
            ctx.renderer.remove_object(*id);
        }
    }
}

fn load_cannon_legal(registry: &Registry, p: &[ObjectId]) -> bool {
    let [player, cannon, ammo] = p else {
        return false;
    };
    is_player(registry, *player)
        && matches!(
            kind_of(registry, *cannon),
            Some(ObjectKind::Cannon { loaded: false, .. })
        )
        && matches!(
            kind_of(registry, *ammo),
            Some(ObjectKind::Ammunition { amount }) if *amount > 0
        )
}

fn load_cannon_apply(ctx: &mut EventContext<'_>, p: &[ObjectId]) {
    let [_, cannon, ammo] = p else {
        return;
    };
    if let Some(ObjectKind::Cannon { loaded, .. }) =
        ctx.registry.get_mut(*cannon).map(|o| &mut o.kind)
    {
        *loaded = true;
    }
    if let Some(ObjectKind::Ammunition { amount }) =
        ctx.registry.get_mut(*ammo).map(|o| &mut o.kind)
    {
        *amount = amount.saturating_sub(1);
    }
}

fn fire_cannon_legal(registry: &Registry, p: &[ObjectId]) -> bool {
    let [player, cannon] = p else {
        return false;
    };
    is_player(registry, *player)
        && matches!(
            kind_of(registry, *cannon),
            Some(ObjectKind::Cannon { loaded: true, .. })
        )
}

/// Unload, start the countdown, and hand the cannon to the firing player's
/// owner so that process spawns the shot.
fn fire_cannon_apply(ctx: &mut EventContext<'_>, p: &[ObjectId]) {
    let [player, cannon] = p else {
        return;
    };
    let Some(new_owner) = ctx.registry.owner_of(*player) else {
        return;
    };
    let delay = ctx.config.cannon_fire_delay_ticks;
    if let Some(obj) = ctx.registry.get_mut(*cannon) {
        if let ObjectKind::Cannon {
            loaded,
            firing,
            countdown,
        } = &mut obj.kind
        {
            *loaded = false;
            *firing = true;
            *countdown = delay;
        }
        obj.authority.owner = new_owner;
        obj.authority.seq = obj.authority.seq.wrapping_add(1);
        obj.authority.snap_seq = None;
    }
}

fn fired_cannon_legal(registry: &Registry, p: &[ObjectId]) -> bool {
    matches!(p, [cannon] if matches!(kind_of(registry, *cannon), Some(ObjectKind::Cannon { .. })))
}

fn fired_cannon_apply(ctx: &mut EventContext<'_>, p: &[ObjectId]) {
    if let Some(ObjectKind::Cannon { firing, .. }) =
        p.first().and_then(|c| ctx.registry.get_mut(*c)).map(|o| &mut o.kind)
    {
        *firing = false;
    }
}

fn pick_up_legal(registry: &Registry, p: &[ObjectId]) -> bool {
    let [player, tool] = p else {
        return false;
    };
    let empty_handed = matches!(
        kind_of(registry, *player),
        Some(ObjectKind::Player { tool: None })
    );
    let is_tool = kind_of(registry, *tool).is_some_and(ObjectKind::is_tool);
    let held = registry
        .live()
        .any(|o| matches!(o.kind, ObjectKind::Player { tool: Some(t) } if t == *tool));
    empty_handed && is_tool && !held
}

fn pick_up_apply(ctx: &mut EventContext<'_>, p: &[ObjectId]) {
    let [player, picked] = p else {
        return;
    };
    if let Some(ObjectKind::Player { tool }) = ctx.registry.get_mut(*player).map(|o| &mut o.kind) {
        *tool = Some(*picked);
    }
}

fn drop_tool_legal(registry: &Registry, p: &[ObjectId]) -> bool {
    matches!(p, [player] if matches!(kind_of(registry, *player), Some(ObjectKind::Player { tool: Some(_) })))
}

fn drop_tool_apply(ctx: &mut EventContext<'_>, p: &[ObjectId]) {
    if let Some(ObjectKind::Player { tool }) =
        p.first().and_then(|id| ctx.registry.get_mut(*id)).map(|o| &mut o.kind)
    {
        *tool = None;
    }
}
