//! World container for entities
//!
//! The World is the content root: every entity is one of its children. It
//! owns the physics simulation and keeps entity transforms in step with the
//! bodies they are linked to.

use slotmap::{new_key_type, SlotMap};
use throwball_physics::{PhysicsConfig, PhysicsWorld};
use crate::{DirtyFlags, Entity, Transform};

new_key_type! {
    /// Generational key to an entity in the world
    ///
    /// Removing an entity invalidates its key; a stale key never resolves to
    /// a newer entity that reuses the slot.
    pub struct EntityKey;
}

/// The world containing all entities
pub struct World {
    entities: SlotMap<EntityKey, Entity>,
    physics_world: PhysicsWorld,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world with default physics
    pub fn new() -> Self {
        Self::with_physics(PhysicsConfig::default())
    }

    /// Create a new empty world with the given physics configuration
    pub fn with_physics(config: PhysicsConfig) -> Self {
        Self {
            entities: SlotMap::with_key(),
            physics_world: PhysicsWorld::with_config(config),
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics_world
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics_world
    }

    /// Add an entity as a child of the world, returning its key
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Detach an entity from the world
    ///
    /// Any physics body or static collider linked to the entity is removed
    /// from the physics world as well.
    pub fn remove_entity(&mut self, key: EntityKey) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        if let Some(body) = entity.physics_body {
            self.physics_world.remove_body(body);
        }
        if let Some(collider) = entity.collider {
            self.physics_world.remove_static_collider(collider);
        }
        Some(entity)
    }

    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Find the first entity with the given name
    pub fn get_by_name(&self, name: &str) -> Option<(EntityKey, &Entity)> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.name.as_deref() == Some(name))
    }

    /// Iterate over entities carrying a tag
    pub fn get_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = (EntityKey, &'a Entity)> + 'a {
        self.entities.iter().filter(move |(_, entity)| entity.has_tag(tag))
    }

    /// Move an entity, and its physics body if it has one
    pub fn set_entity_transform(&mut self, key: EntityKey, transform: Transform) -> bool {
        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };
        entity.set_transform(transform);
        if let Some(body) = entity.physics_body {
            self.physics_world
                .set_body_transform(body, transform.position, transform.rotation);
        }
        true
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Step physics by dt seconds and sync entity transforms from bodies
    ///
    /// Entities whose body moved are marked with [`DirtyFlags::TRANSFORM`].
    pub fn update(&mut self, dt: f32) {
        self.physics_world.step(dt);

        for (_key, entity) in &mut self.entities {
            let Some(body) = entity.physics_body.and_then(|k| self.physics_world.get_body(k)) else {
                continue;
            };
            if entity.transform.position != body.position || entity.transform.rotation != body.rotation {
                entity.transform.position = body.position;
                entity.transform.rotation = body.rotation;
                entity.mark_dirty(DirtyFlags::TRANSFORM);
            }
        }
    }

    /// Check whether any entity changed since the last [`World::clear_all_dirty`]
    pub fn has_dirty_entities(&self) -> bool {
        self.entities.values().any(Entity::is_dirty)
    }

    pub fn clear_all_dirty(&mut self) {
        for entity in self.entities.values_mut() {
            entity.clear_dirty();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_with_keys(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }
}
