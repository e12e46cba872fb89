//! Simulation-side collaborator seam.
//!
//! The remote command engine never touches world state directly; handlers go
//! through the [`World`] trait, which the host simulation implements.
//! [`MemoryWorld`] is the in-memory reference implementation used by the
//! server binary and the test suite.

mod memory;
mod permission;

pub use memory::MemoryWorld;
pub use permission::{FallbackGate, PermissionGate};

use thiserror::Error;

/// Stable identity token for a simulation entity.
pub type EntityId = u64;

/// Absolute block coordinates within one named world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Orientation a directional block can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Facing {
    pub const COUNT: usize = 6;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            2 => Some(Self::North),
            3 => Some(Self::South),
            4 => Some(Self::West),
            5 => Some(Self::East),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
        }
    }
}

/// A resolved player account, as known to the host simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub name: String,
    pub online: bool,
}

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("no such world: {0}")]
    UnknownWorld(String),
    #[error("no such material: {0}")]
    UnknownMaterial(String),
    #[error("no such entity type: {0}")]
    UnknownEntityType(String),
    #[error("no such particle type: {0}")]
    UnknownParticle(String),
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),
}

/// Everything the command handlers need from the host simulation.
///
/// All calls happen on the simulation tick thread, so implementations need
/// no internal locking.
pub trait World {
    fn has_world(&self, name: &str) -> bool;

    fn get_block(&self, world: &str, pos: BlockPos) -> Result<String, WorldError>;

    /// Material name plus its block-state string (e.g. `facing=east`).
    fn get_block_with_data(&self, world: &str, pos: BlockPos)
        -> Result<(String, String), WorldError>;

    fn set_block(
        &mut self,
        world: &str,
        pos: BlockPos,
        material: &str,
        facing: Facing,
    ) -> Result<(), WorldError>;

    /// Y coordinate of the highest non-air block in the column at (x, z).
    fn height_at(&self, world: &str, x: i32, z: i32) -> Result<i32, WorldError>;

    fn spawn_entity(&mut self, world: &str, pos: BlockPos, kind: &str)
        -> Result<EntityId, WorldError>;

    #[allow(clippy::too_many_arguments)]
    fn spawn_particle(
        &mut self,
        world: &str,
        pos: BlockPos,
        offset: [f32; 3],
        kind: &str,
        speed: f64,
        count: u32,
        force: bool,
    ) -> Result<(), WorldError>;

    /// Entities within `radius` blocks horizontally (and a fixed vertical
    /// band) of `pos`, as (name, id) pairs.
    fn nearby_entities(
        &self,
        world: &str,
        pos: BlockPos,
        radius: f64,
    ) -> Result<Vec<(String, EntityId)>, WorldError>;

    fn entity_position(&self, id: EntityId) -> Result<(f64, f64, f64), WorldError>;

    fn set_entity_position(&mut self, id: EntityId, pos: BlockPos) -> Result<(), WorldError>;

    /// (yaw, pitch) in degrees.
    fn entity_rotation(&self, id: EntityId) -> Result<(f32, f32), WorldError>;

    fn set_entity_rotation(&mut self, id: EntityId, yaw: f32, pitch: f32)
        -> Result<(), WorldError>;

    fn remove_entity(&mut self, id: EntityId) -> Result<(), WorldError>;

    /// Look up a player by (case-insensitive) name.
    fn resolve_player(&self, name: &str) -> Option<PlayerRef>;

    /// Broadcast a chat message to all connected actors.
    fn broadcast(&mut self, message: &str);
}
