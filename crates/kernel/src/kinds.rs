//! The closed set of object kinds and their construct payloads.

use glam::Vec3;
use worldsync_assets::{AssetEntry, AssetError, AssetTable};
use worldsync_codec::{CodecError, Deserializer, Serializer};
use worldsync_common::{Aabb, KindId, MeshHandle, MotionState, ObjectId};

use crate::sync::SyncError;

/// How the simulation loop advances an object between corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionModel {
    /// `location += v * dt`, rotation advanced by angular velocity.
    Ballistic,
    /// Never integrated; only moved by snapshots or game logic.
    Static,
}

/// Kind-specific state carried by every object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Player { tool: Option<ObjectId> },
    Bullet,
    Cube { size: u8, color: Vec3 },
    Cannon { loaded: bool, firing: bool, countdown: u32 },
    Ammunition { amount: u16 },
    Linstock,
}

impl ObjectKind {
    pub const PLAYER: KindId = KindId(0);
    pub const BULLET: KindId = KindId(1);
    pub const CUBE: KindId = KindId(2);
    pub const CANNON: KindId = KindId(3);
    pub const AMMUNITION: KindId = KindId(4);
    pub const LINSTOCK: KindId = KindId(5);

    pub fn kind_id(&self) -> KindId {
        match self {
            Self::Player { .. } => Self::PLAYER,
            Self::Bullet => Self::BULLET,
            Self::Cube { .. } => Self::CUBE,
            Self::Cannon { .. } => Self::CANNON,
            Self::Ammunition { .. } => Self::AMMUNITION,
            Self::Linstock => Self::LINSTOCK,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Player { .. } => "player",
            Self::Bullet => "bullet",
            Self::Cube { .. } => "cube",
            Self::Cannon { .. } => "cannon",
            Self::Ammunition { .. } => "ammunition",
            Self::Linstock => "linstock",
        }
    }

    pub fn motion_model(&self) -> MotionModel {
        match self {
            Self::Player { .. } | Self::Bullet | Self::Cube { .. } => MotionModel::Ballistic,
            Self::Cannon { .. } | Self::Ammunition { .. } | Self::Linstock => MotionModel::Static,
        }
    }

    /// Tools can be picked up by players.
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Ammunition { .. } | Self::Linstock)
    }

    /// Whether the construct payload carries a location. No kind's construct
    /// carries a rotation.
    pub fn construct_carries_location(&self) -> bool {
        !matches!(self, Self::Cube { .. })
    }

    /// Scale applied to the kind's model-space box.
    pub fn scale(&self) -> f32 {
        match self {
            Self::Cube { size, .. } if *size > 0 => f32::from(*size),
            _ => 1.0,
        }
    }

    /// Append the construct payload for this kind.
    pub fn encode_construct(
        &self,
        motion: &MotionState,
        w: &mut Serializer,
    ) -> Result<(), CodecError> {
        match self {
            Self::Player { tool } => {
                w.write_vec3(motion.location)?;
                w.write_u32(tool.map_or(0, |t| t.0))?;
            }
            Self::Bullet => {
                w.write_vec3(motion.location)?;
                w.write_vec3(motion.linear_velocity)?;
                w.write_vec3(motion.angular_velocity)?;
            }
            Self::Cube { size, color } => {
                w.write_u8(*size)?;
                w.write_vec3(*color)?;
            }
            Self::Cannon { .. } | Self::Linstock => {
                w.write_vec3(motion.location)?;
            }
            Self::Ammunition { amount } => {
                w.write_vec3(motion.location)?;
                w.write_u16(*amount)?;
            }
        }
        Ok(())
    }

    /// Read a construct payload for `kind`.
    ///
    /// Motion fields go through the reader's `*_into` methods, so a reader in
    /// skip mode leaves `motion` untouched while staying aligned.
    pub fn decode_construct(
        kind: KindId,
        r: &mut Deserializer<'_>,
        motion: &mut MotionState,
    ) -> Result<Self, SyncError> {
        let decoded = match kind {
            Self::PLAYER => {
                r.read_vec3_into(&mut motion.location)?;
                let tool = match r.read_u32()? {
                    0 => None,
                    raw => Some(ObjectId(raw)),
                };
                Self::Player { tool }
            }
            Self::BULLET => {
                r.read_vec3_into(&mut motion.location)?;
                r.read_vec3_into(&mut motion.linear_velocity)?;
                r.read_vec3_into(&mut motion.angular_velocity)?;
                Self::Bullet
            }
            Self::CUBE => {
                let size = r.read_u8()?;
                let color = r.read_vec3()?;
                Self::Cube { size, color }
            }
            Self::CANNON => {
                r.read_vec3_into(&mut motion.location)?;
                Self::Cannon {
                    loaded: false,
                    firing: false,
                    countdown: 0,
                }
            }
            Self::AMMUNITION => {
                r.read_vec3_into(&mut motion.location)?;
                let amount = r.read_u16()?;
                Self::Ammunition { amount }
            }
            Self::LINSTOCK => {
                r.read_vec3_into(&mut motion.location)?;
                Self::Linstock
            }
            other => return Err(SyncError::UnknownKind(other)),
        };
        Ok(decoded)
    }
}

/// Asset table covering every kind with placeholder mesh handles.
pub fn builtin_assets() -> Result<AssetTable, AssetError> {
    let entries = [
        (ObjectKind::PLAYER, "player", Aabb::default()),
        (ObjectKind::BULLET, "bullet", Aabb::new(Vec3::splat(-0.3), Vec3::splat(0.3))),
        (ObjectKind::CUBE, "cube", Aabb::default()),
        (
            ObjectKind::CANNON,
            "cannon",
            Aabb::new(Vec3::new(-1.5, -1.0, -3.0), Vec3::new(1.5, 1.5, 3.0)),
        ),
        (
            ObjectKind::AMMUNITION,
            "ammunition",
            Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
        ),
        (
            ObjectKind::LINSTOCK,
            "linstock",
            Aabb::new(Vec3::new(-0.1, -1.0, -0.1), Vec3::new(0.1, 1.0, 0.1)),
        ),
    ];
    let mut table = AssetTable::new();
    for (kind, name, aabb) in entries {
        table.register(AssetEntry {
            kind,
            name: name.into(),
            mesh: MeshHandle(u32::from(kind.0)),
            aabb,
        })?;
    }
    Ok(table)
}
