//! Wire messages and the simulation's send/receive side.
//!
//! Three message bodies exist, told apart by an out-of-band [`PacketKind`]:
//! constructs (full state, once per object), snapshots (motion, every tick
//! from the owner) and event records.

use worldsync_assets::AssetError;
use worldsync_codec::{CodecError, Deserializer, Serializer, QUAT_LEN, VEC3_LEN};
use worldsync_common::{EventId, KindId, MotionState, ObjectId, ProcessId};

use crate::events::{Event, EventKind, EventOutcome};
use crate::kinds::ObjectKind;
use crate::object::Authority;
use crate::world::{SimContext, Simulation, build_object};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("unknown object kind {0:?}")]
    UnknownKind(KindId),
    #[error("unknown event kind {0}")]
    UnknownEventKind(u8),
    #[error("event has {0} participants, at most 255 fit on the wire")]
    TooManyParticipants(usize),
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

/// Encoded size of an [`ObjectSnapshot`].
pub const SNAPSHOT_LEN: usize = 4 + 1 + 4 + 4 + VEC3_LEN + QUAT_LEN + VEC3_LEN + VEC3_LEN;

const CONSTRUCT_HEADER_LEN: usize = 4 + 1 + 1 + 1 + 4;
const CONSTRUCT_MAX_LEN: usize = CONSTRUCT_HEADER_LEN + 3 * VEC3_LEN;

/// Authoritative motion of one object, tagged with its authority triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub owner: ProcessId,
    pub authority_seq: u32,
    pub snap_seq: u32,
    pub motion: MotionState,
}

impl ObjectSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, SyncError> {
        let mut w = Serializer::new(SNAPSHOT_LEN)?;
        w.write_u32(self.id.0)?;
        w.write_u8(self.owner.0)?;
        w.write_u32(self.authority_seq)?;
        w.write_u32(self.snap_seq)?;
        w.write_vec3(self.motion.location)?;
        w.write_quat(self.motion.rotation)?;
        w.write_vec3(self.motion.linear_velocity)?;
        w.write_vec3(self.motion.angular_velocity)?;
        Ok(w.into_bytes())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SyncError> {
        let mut r = Deserializer::new(bytes);
        Ok(Self {
            id: ObjectId(r.read_u32()?),
            owner: ProcessId(r.read_u8()?),
            authority_seq: r.read_u32()?,
            snap_seq: r.read_u32()?,
            motion: MotionState {
                location: r.read_vec3()?,
                rotation: r.read_quat()?,
                linear_velocity: r.read_vec3()?,
                angular_velocity: r.read_vec3()?,
            },
        })
    }
}

/// Full description of an object, sent once after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructMessage {
    pub id: ObjectId,
    pub creator: ProcessId,
    pub owner: ProcessId,
    pub authority_seq: u32,
    pub kind: ObjectKind,
    pub motion: MotionState,
}

impl ConstructMessage {
    pub fn encode(&self) -> Result<Vec<u8>, SyncError> {
        let mut w = Serializer::new(CONSTRUCT_MAX_LEN)?;
        w.write_u32(self.id.0)?;
        w.write_u8(self.creator.0)?;
        w.write_u8(self.kind.kind_id().0)?;
        w.write_u8(self.owner.0)?;
        w.write_u32(self.authority_seq)?;
        self.kind.encode_construct(&self.motion, &mut w)?;
        Ok(w.into_bytes())
    }
}

/// Header fields of a construct, read before deciding how to read the body.
struct ConstructHeader {
    id: ObjectId,
    creator: ProcessId,
    kind: KindId,
    owner: ProcessId,
    authority_seq: u32,
}

impl ConstructHeader {
    fn read(r: &mut Deserializer<'_>) -> Result<Self, SyncError> {
        Ok(Self {
            id: ObjectId(r.read_u32()?),
            creator: ProcessId(r.read_u8()?),
            kind: KindId(r.read_u8()?),
            owner: ProcessId(r.read_u8()?),
            authority_seq: r.read_u32()?,
        })
    }
}

pub fn encode_event(event: &Event) -> Result<Vec<u8>, SyncError> {
    let count = u8::try_from(event.participants.len())
        .map_err(|_| SyncError::TooManyParticipants(event.participants.len()))?;
    let mut w = Serializer::new(4 + 1 + 1 + 1 + 4 * usize::from(count))?;
    w.write_u32(event.id.0)?;
    w.write_u8(event.kind.to_wire())?;
    w.write_u8(event.authority.0)?;
    w.write_u8(count)?;
    for id in &event.participants {
        w.write_u32(id.0)?;
    }
    Ok(w.into_bytes())
}

pub fn decode_event(bytes: &[u8]) -> Result<Event, SyncError> {
    let mut r = Deserializer::new(bytes);
    let id = EventId(r.read_u32()?);
    let raw_kind = r.read_u8()?;
    let kind = EventKind::from_wire(raw_kind).ok_or(SyncError::UnknownEventKind(raw_kind))?;
    let authority = ProcessId(r.read_u8()?);
    let count = r.read_u8()?;
    let participants = (0..count)
        .map(|_| r.read_u32().map(ObjectId))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Event {
        id,
        kind,
        participants,
        authority,
    })
}

/// Out-of-band message type carried by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Construct,
    Snapshot,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub kind: PacketKind,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// No live object with that id.
    Unknown,
    /// The claim lost against the current authority triple.
    Stale,
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Constructed(ObjectId),
    /// The id was already live or tombstoned; the body was skipped.
    AlreadyKnown(ObjectId),
    Snapshot(SnapshotOutcome),
    Event(EventOutcome),
}

impl Simulation {
    /// Fold a snapshot into the local copy.
    ///
    /// The authority claim is checked first. If it wins and the new owner is
    /// another process, motion is corrected through the snap operations so
    /// the displayed pose does not jump. Echoes of our own snapshots only
    /// touch authority.
    pub fn apply_snapshot(&mut self, snap: &ObjectSnapshot) -> SnapshotOutcome {
        let me = self.me;
        let Some(obj) = self.registry.get_mut(snap.id) else {
            return SnapshotOutcome::Unknown;
        };
        if !obj.claim_authority(snap.owner, snap.authority_seq, Some(snap.snap_seq)) {
            return SnapshotOutcome::Stale;
        }
        if snap.owner != me {
            obj.snap_location(snap.motion.location);
            obj.snap_rotation(snap.motion.rotation);
            obj.motion.linear_velocity = snap.motion.linear_velocity;
            obj.motion.angular_velocity = snap.motion.angular_velocity;
        }
        SnapshotOutcome::Applied
    }

    /// Create an object from a construct message. Known ids are skipped.
    pub fn apply_construct(
        &mut self,
        bytes: &[u8],
        ctx: &mut SimContext<'_>,
    ) -> Result<ReceiveOutcome, SyncError> {
        let mut r = Deserializer::new(bytes);
        let header = ConstructHeader::read(&mut r)?;
        let mut motion = MotionState::default();
        if self.registry.knows(header.id) {
            r.set_skip(true);
            ObjectKind::decode_construct(header.kind, &mut r, &mut motion)?;
            tracing::debug!(id = %header.id, "construct for known object skipped");
            return Ok(ReceiveOutcome::AlreadyKnown(header.id));
        }
        let kind = ObjectKind::decode_construct(header.kind, &mut r, &mut motion)?;
        let mut obj = build_object(header.id, header.creator, kind, motion, ctx.assets)?;
        obj.authority = Authority {
            owner: header.owner,
            seq: header.authority_seq,
            snap_seq: None,
        };
        obj.location_placed = obj.kind.construct_carries_location();
        obj.rotation_placed = false;
        self.add_object(obj, ctx.renderer);
        tracing::debug!(id = %header.id, kind = header.kind.0, "constructed remote object");
        Ok(ReceiveOutcome::Constructed(header.id))
    }

    /// Route an inbound packet to the matching applier.
    pub fn receive(
        &mut self,
        packet: &Packet,
        ctx: &mut SimContext<'_>,
    ) -> Result<ReceiveOutcome, SyncError> {
        match packet.kind {
            PacketKind::Construct => self.apply_construct(&packet.bytes, ctx),
            PacketKind::Snapshot => {
                let snap = ObjectSnapshot::decode(&packet.bytes)?;
                Ok(ReceiveOutcome::Snapshot(self.apply_snapshot(&snap)))
            }
            PacketKind::Event => {
                let event = decode_event(&packet.bytes)?;
                Ok(ReceiveOutcome::Event(self.apply_remote_event(event, ctx)))
            }
        }
    }

    /// Everything this process must broadcast this tick: constructs of newly
    /// created objects, locally recorded events, then a snapshot of every
    /// owned object stamped with its next snapshot sequence.
    pub fn collect_outgoing(&mut self) -> Result<Vec<Packet>, SyncError> {
        let mut out = Vec::new();

        for id in std::mem::take(&mut self.pending_constructs) {
            let Some(obj) = self.registry.get(id) else {
                continue;
            };
            let msg = ConstructMessage {
                id,
                creator: obj.creator,
                owner: obj.authority.owner,
                authority_seq: obj.authority.seq,
                kind: obj.kind.clone(),
                motion: obj.motion,
            };
            out.push(Packet {
                kind: PacketKind::Construct,
                bytes: msg.encode()?,
            });
        }

        for id in std::mem::take(&mut self.pending_events) {
            if let Some(event) = self.events.get(&id) {
                out.push(Packet {
                    kind: PacketKind::Event,
                    bytes: encode_event(event)?,
                });
            }
        }

        let me = self.me;
        for obj in self.registry.live_mut().filter(|o| o.owner() == me) {
            let snap_seq = obj.authority.next_snap_seq();
            let seq = obj.authority.seq;
            obj.claim_authority(me, seq, Some(snap_seq));
            let snap = ObjectSnapshot {
                id: obj.id,
                owner: me,
                authority_seq: seq,
                snap_seq,
                motion: obj.motion,
            };
            out.push(Packet {
                kind: PacketKind::Snapshot,
                bytes: snap.encode()?,
            });
        }

        tracing::trace!(packets = out.len(), "collected outgoing packets");
        Ok(out)
    }
}
