use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{BlockPos, EntityId, Facing, PlayerRef, World, WorldError};

const AIR: &str = "AIR";

#[derive(Debug, Clone)]
struct BlockState {
    material: String,
    facing: Facing,
}

#[derive(Debug, Default)]
struct WorldData {
    // BTreeMap keeps block iteration deterministic for height queries.
    blocks: BTreeMap<(i32, i32, i32), BlockState>,
}

#[derive(Debug, Clone)]
struct EntityState {
    world: String,
    kind: String,
    x: f64,
    y: f64,
    z: f64,
    yaw: f32,
    pitch: f32,
}

/// In-memory reference implementation of [`World`].
///
/// Holds named worlds of sparse blocks, a flat entity table, and a player
/// directory. Broadcast messages are retained so callers (and tests) can
/// observe them.
#[derive(Debug)]
pub struct MemoryWorld {
    worlds: HashMap<String, WorldData>,
    materials: HashSet<String>,
    entity_types: HashSet<String>,
    particle_types: HashSet<String>,
    entities: HashMap<EntityId, EntityState>,
    players: HashMap<String, PlayerRef>,
    chat_log: Vec<String>,
    next_entity: EntityId,
}

impl MemoryWorld {
    /// An empty host with one world named `world` and a small default
    /// material/entity/particle registry.
    pub fn new() -> Self {
        let mut w = Self {
            worlds: HashMap::new(),
            materials: HashSet::new(),
            entity_types: HashSet::new(),
            particle_types: HashSet::new(),
            entities: HashMap::new(),
            players: HashMap::new(),
            chat_log: Vec::new(),
            next_entity: 1,
        };
        w.add_world("world");
        for m in [
            AIR,
            "STONE",
            "DIRT",
            "GRASS_BLOCK",
            "SAND",
            "GLASS",
            "OAK_PLANKS",
            "TORCH",
            "WATER",
            "OBSIDIAN",
            "AMETHYST_BLOCK",
            "BEACON",
        ] {
            w.register_material(m);
        }
        for e in ["COW", "SHEEP", "PIG", "ZOMBIE", "ARMOR_STAND", "ARROW"] {
            w.register_entity_type(e);
        }
        for p in ["FLAME", "HEART", "CRIT", "SMOKE"] {
            w.register_particle_type(p);
        }
        w
    }

    pub fn add_world(&mut self, name: &str) {
        self.worlds.entry(name.to_string()).or_default();
    }

    pub fn register_material(&mut self, name: &str) {
        self.materials.insert(name.to_string());
    }

    pub fn register_entity_type(&mut self, name: &str) {
        self.entity_types.insert(name.to_string());
    }

    pub fn register_particle_type(&mut self, name: &str) {
        self.particle_types.insert(name.to_string());
    }

    /// Register a player in the directory. Lookup is case-insensitive.
    pub fn add_player(&mut self, name: &str, online: bool) {
        self.players.insert(
            name.to_lowercase(),
            PlayerRef {
                name: name.to_string(),
                online,
            },
        );
    }

    /// Messages broadcast so far, oldest first.
    pub fn chat_log(&self) -> &[String] {
        &self.chat_log
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn world_data(&self, name: &str) -> Result<&WorldData, WorldError> {
        self.worlds
            .get(name)
            .ok_or_else(|| WorldError::UnknownWorld(name.to_string()))
    }

    fn world_data_mut(&mut self, name: &str) -> Result<&mut WorldData, WorldError> {
        self.worlds
            .get_mut(name)
            .ok_or_else(|| WorldError::UnknownWorld(name.to_string()))
    }

    fn entity(&self, id: EntityId) -> Result<&EntityState, WorldError> {
        self.entities.get(&id).ok_or(WorldError::EntityNotFound(id))
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut EntityState, WorldError> {
        self.entities
            .get_mut(&id)
            .ok_or(WorldError::EntityNotFound(id))
    }
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl World for MemoryWorld {
    fn has_world(&self, name: &str) -> bool {
        self.worlds.contains_key(name)
    }

    fn get_block(&self, world: &str, pos: BlockPos) -> Result<String, WorldError> {
        let data = self.world_data(world)?;
        Ok(data
            .blocks
            .get(&(pos.x, pos.y, pos.z))
            .map(|b| b.material.clone())
            .unwrap_or_else(|| AIR.to_string()))
    }

    fn get_block_with_data(
        &self,
        world: &str,
        pos: BlockPos,
    ) -> Result<(String, String), WorldError> {
        let data = self.world_data(world)?;
        Ok(match data.blocks.get(&(pos.x, pos.y, pos.z)) {
            Some(b) => (b.material.clone(), format!("facing={}", b.facing.name())),
            None => (AIR.to_string(), String::new()),
        })
    }

    fn set_block(
        &mut self,
        world: &str,
        pos: BlockPos,
        material: &str,
        facing: Facing,
    ) -> Result<(), WorldError> {
        if !self.materials.contains(material) {
            return Err(WorldError::UnknownMaterial(material.to_string()));
        }
        let material = material.to_string();
        let data = self.world_data_mut(world)?;
        if material == AIR {
            data.blocks.remove(&(pos.x, pos.y, pos.z));
        } else {
            data.blocks
                .insert((pos.x, pos.y, pos.z), BlockState { material, facing });
        }
        Ok(())
    }

    fn height_at(&self, world: &str, x: i32, z: i32) -> Result<i32, WorldError> {
        let data = self.world_data(world)?;
        Ok(data
            .blocks
            .keys()
            .filter(|(bx, _, bz)| *bx == x && *bz == z)
            .map(|(_, y, _)| *y)
            .max()
            .unwrap_or(0))
    }

    fn spawn_entity(
        &mut self,
        world: &str,
        pos: BlockPos,
        kind: &str,
    ) -> Result<EntityId, WorldError> {
        if !self.has_world(world) {
            return Err(WorldError::UnknownWorld(world.to_string()));
        }
        if !self.entity_types.contains(kind) {
            return Err(WorldError::UnknownEntityType(kind.to_string()));
        }
        let id = self.next_entity;
        self.next_entity += 1;
        self.entities.insert(
            id,
            EntityState {
                world: world.to_string(),
                kind: kind.to_string(),
                x: pos.x as f64,
                y: pos.y as f64,
                z: pos.z as f64,
                yaw: 0.0,
                pitch: 0.0,
            },
        );
        Ok(id)
    }

    fn spawn_particle(
        &mut self,
        world: &str,
        _pos: BlockPos,
        _offset: [f32; 3],
        kind: &str,
        _speed: f64,
        _count: u32,
        _force: bool,
    ) -> Result<(), WorldError> {
        if !self.has_world(world) {
            return Err(WorldError::UnknownWorld(world.to_string()));
        }
        if !self.particle_types.contains(kind) {
            return Err(WorldError::UnknownParticle(kind.to_string()));
        }
        // Particles are purely visual; the reference host just validates.
        Ok(())
    }

    fn nearby_entities(
        &self,
        world: &str,
        pos: BlockPos,
        radius: f64,
    ) -> Result<Vec<(String, EntityId)>, WorldError> {
        const VERTICAL_BAND: f64 = 5.0;
        self.world_data(world)?;
        let mut found: Vec<(String, EntityId)> = self
            .entities
            .iter()
            .filter(|(_, e)| {
                e.world == world
                    && (e.x - pos.x as f64).abs() <= radius
                    && (e.y - pos.y as f64).abs() <= VERTICAL_BAND
                    && (e.z - pos.z as f64).abs() <= radius
            })
            .map(|(id, e)| (e.kind.clone(), *id))
            .collect();
        found.sort_by_key(|(_, id)| *id);
        Ok(found)
    }

    fn entity_position(&self, id: EntityId) -> Result<(f64, f64, f64), WorldError> {
        let e = self.entity(id)?;
        Ok((e.x, e.y, e.z))
    }

    fn set_entity_position(&mut self, id: EntityId, pos: BlockPos) -> Result<(), WorldError> {
        let e = self.entity_mut(id)?;
        e.x = pos.x as f64;
        e.y = pos.y as f64;
        e.z = pos.z as f64;
        Ok(())
    }

    fn entity_rotation(&self, id: EntityId) -> Result<(f32, f32), WorldError> {
        let e = self.entity(id)?;
        Ok((e.yaw, e.pitch))
    }

    fn set_entity_rotation(&mut self, id: EntityId, yaw: f32, pitch: f32)
        -> Result<(), WorldError> {
        let e = self.entity_mut(id)?;
        e.yaw = yaw;
        e.pitch = pitch;
        Ok(())
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<(), WorldError> {
        self.entities
            .remove(&id)
            .map(|_| ())
            .ok_or(WorldError::EntityNotFound(id))
    }

    fn resolve_player(&self, name: &str) -> Option<PlayerRef> {
        self.players.get(&name.to_lowercase()).cloned()
    }

    fn broadcast(&mut self, message: &str) {
        tracing::info!(message, "chat broadcast");
        self.chat_log.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_block_defaults_to_air() {
        let w = MemoryWorld::new();
        assert_eq!(w.get_block("world", BlockPos::new(0, 64, 0)).unwrap(), "AIR");
    }

    #[test]
    fn set_then_get_block() {
        let mut w = MemoryWorld::new();
        let pos = BlockPos::new(10, 64, -3);
        w.set_block("world", pos, "STONE", Facing::East).unwrap();
        assert_eq!(w.get_block("world", pos).unwrap(), "STONE");
        let (material, data) = w.get_block_with_data("world", pos).unwrap();
        assert_eq!(material, "STONE");
        assert_eq!(data, "facing=east");
    }

    #[test]
    fn set_air_clears_block() {
        let mut w = MemoryWorld::new();
        let pos = BlockPos::new(1, 1, 1);
        w.set_block("world", pos, "DIRT", Facing::Down).unwrap();
        w.set_block("world", pos, "AIR", Facing::Down).unwrap();
        assert_eq!(w.get_block("world", pos).unwrap(), "AIR");
    }

    #[test]
    fn unknown_material_rejected() {
        let mut w = MemoryWorld::new();
        let err = w
            .set_block("world", BlockPos::new(0, 0, 0), "BOGUS", Facing::Down)
            .unwrap_err();
        assert!(matches!(err, WorldError::UnknownMaterial(m) if m == "BOGUS"));
    }

    #[test]
    fn unknown_world_rejected() {
        let w = MemoryWorld::new();
        assert!(w.get_block("nether", BlockPos::new(0, 0, 0)).is_err());
    }

    #[test]
    fn height_tracks_highest_block() {
        let mut w = MemoryWorld::new();
        w.set_block("world", BlockPos::new(5, 60, 5), "STONE", Facing::Down)
            .unwrap();
        w.set_block("world", BlockPos::new(5, 70, 5), "DIRT", Facing::Down)
            .unwrap();
        assert_eq!(w.height_at("world", 5, 5).unwrap(), 70);
        assert_eq!(w.height_at("world", 6, 5).unwrap(), 0);
    }

    #[test]
    fn entity_lifecycle() {
        let mut w = MemoryWorld::new();
        let id = w
            .spawn_entity("world", BlockPos::new(0, 64, 0), "COW")
            .unwrap();
        assert_eq!(w.entity_position(id).unwrap(), (0.0, 64.0, 0.0));

        w.set_entity_position(id, BlockPos::new(3, 65, -2)).unwrap();
        assert_eq!(w.entity_position(id).unwrap(), (3.0, 65.0, -2.0));

        w.set_entity_rotation(id, 90.0, -15.0).unwrap();
        assert_eq!(w.entity_rotation(id).unwrap(), (90.0, -15.0));

        w.remove_entity(id).unwrap();
        assert!(matches!(
            w.entity_position(id),
            Err(WorldError::EntityNotFound(_))
        ));
    }

    #[test]
    fn spawn_unknown_entity_type_rejected() {
        let mut w = MemoryWorld::new();
        let err = w
            .spawn_entity("world", BlockPos::new(0, 0, 0), "DRAGON")
            .unwrap_err();
        assert!(matches!(err, WorldError::UnknownEntityType(_)));
    }

    #[test]
    fn nearby_entities_box_filter() {
        let mut w = MemoryWorld::new();
        let close = w
            .spawn_entity("world", BlockPos::new(2, 64, 2), "COW")
            .unwrap();
        let far = w
            .spawn_entity("world", BlockPos::new(50, 64, 50), "SHEEP")
            .unwrap();
        let above = w
            .spawn_entity("world", BlockPos::new(0, 80, 0), "PIG")
            .unwrap();

        let found = w
            .nearby_entities("world", BlockPos::new(0, 64, 0), 10.0)
            .unwrap();
        let ids: Vec<EntityId> = found.iter().map(|(_, id)| *id).collect();
        assert!(ids.contains(&close));
        assert!(!ids.contains(&far));
        assert!(!ids.contains(&above));
    }

    #[test]
    fn player_directory_case_insensitive() {
        let mut w = MemoryWorld::new();
        w.add_player("Steve", false);
        let p = w.resolve_player("steve").unwrap();
        assert_eq!(p.name, "Steve");
        assert!(!p.online);
        assert!(w.resolve_player("alex").is_none());
    }

    #[test]
    fn broadcast_recorded() {
        let mut w = MemoryWorld::new();
        w.broadcast("hello");
        assert_eq!(w.chat_log(), ["hello"]);
    }
}
