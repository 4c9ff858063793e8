//! Reconstructed room geometry
//!
//! Scene reconstruction reports the room as a stream of mesh anchors, each
//! identified by a UUID and carrying geometry in anchor-local space. The
//! registry keeps exactly one static-collision entity per live anchor.
//!
//! Ingestion is split in two so the expensive part can run off the owning
//! thread:
//!
//! 1. [`MeshAnchorUpdate::prepare`] turns raw geometry into a world-space
//!    [`TriangleMesh`]. This may fail with a [`ShapeError`].
//! 2. [`MeshAnchorRegistry::apply`] performs the bookkeeping against the
//!    [`World`]. This never fails.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use throwball_math::{RigidTransform, Vec3};
use throwball_physics::{Collider, PhysicsMaterial, ShapeError, StaticCollider, TriangleMesh};
use uuid::Uuid;

use crate::{DirtyFlags, Entity, EntityKey, Transform, World};

/// Tag carried by every reconstructed entity
pub const ENVIRONMENT_TAG: &str = "environment";

/// Stable identifier of a mesh anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(Uuid);

impl AnchorId {
    /// A fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Anchor-local mesh geometry
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshGeometry {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshGeometry {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self { vertices, triangles }
    }

    /// Build from the flat buffers a reconstruction provider hands out
    ///
    /// `positions` is packed `x, y, z` floats; `indices` is packed triangle
    /// corners.
    pub fn from_raw(positions: &[f32], indices: &[u32]) -> Result<Self, ShapeError> {
        let vertices: &[Vec3] = bytemuck::try_cast_slice(positions)
            .map_err(|_| ShapeError::MalformedVertexBuffer { len: positions.len() })?;

        if indices.len() % 3 != 0 {
            return Err(ShapeError::MalformedIndexBuffer { len: indices.len() });
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();

        Ok(Self {
            vertices: vertices.to_vec(),
            triangles,
        })
    }

    /// Generate a static collision shape placed at the anchor
    pub fn generate_static(&self, origin_from_anchor: &RigidTransform) -> Result<TriangleMesh, ShapeError> {
        TriangleMesh::generate_static(&self.vertices, &self.triangles, origin_from_anchor)
    }
}

/// One event from the mesh-anchor stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MeshAnchorUpdate {
    Added {
        id: AnchorId,
        origin_from_anchor: RigidTransform,
        geometry: MeshGeometry,
    },
    Updated {
        id: AnchorId,
        origin_from_anchor: RigidTransform,
        geometry: MeshGeometry,
    },
    Removed {
        id: AnchorId,
    },
}

impl MeshAnchorUpdate {
    pub fn id(&self) -> AnchorId {
        match self {
            MeshAnchorUpdate::Added { id, .. }
            | MeshAnchorUpdate::Updated { id, .. }
            | MeshAnchorUpdate::Removed { id } => *id,
        }
    }

    /// Generate collision geometry for this event
    ///
    /// Removals carry no geometry and always succeed.
    pub fn prepare(self) -> Result<MeshChange, ShapeError> {
        Ok(match self {
            MeshAnchorUpdate::Added {
                id,
                origin_from_anchor,
                geometry,
            } => MeshChange::Added {
                id,
                shape: geometry.generate_static(&origin_from_anchor)?,
                origin_from_anchor,
            },
            MeshAnchorUpdate::Updated {
                id,
                origin_from_anchor,
                geometry,
            } => MeshChange::Updated {
                id,
                shape: geometry.generate_static(&origin_from_anchor)?,
                origin_from_anchor,
            },
            MeshAnchorUpdate::Removed { id } => MeshChange::Removed { id },
        })
    }
}

/// A mesh-anchor event whose collision shape has already been generated
#[derive(Clone, Debug)]
pub enum MeshChange {
    Added {
        id: AnchorId,
        origin_from_anchor: RigidTransform,
        shape: TriangleMesh,
    },
    Updated {
        id: AnchorId,
        origin_from_anchor: RigidTransform,
        shape: TriangleMesh,
    },
    Removed {
        id: AnchorId,
    },
}

/// What [`MeshAnchorRegistry::apply`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshOutcome {
    /// A new entity was created
    Inserted(EntityKey),
    /// An Added for a known anchor replaced its entity
    Replaced(EntityKey),
    /// Transform and collider of an existing entity were refreshed
    Refreshed(EntityKey),
    /// The anchor's entity was detached
    Removed,
    /// Nothing to do (update or removal of an unknown anchor)
    Ignored,
}

/// Maps mesh-anchor ids to their static-collision entities
#[derive(Debug)]
pub struct MeshAnchorRegistry {
    entities: HashMap<AnchorId, EntityKey>,
    material: PhysicsMaterial,
}

impl Default for MeshAnchorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshAnchorRegistry {
    pub fn new() -> Self {
        Self::with_material(PhysicsMaterial::ROOM_SURFACE)
    }

    /// Registry whose colliders use the given surface material
    pub fn with_material(material: PhysicsMaterial) -> Self {
        Self {
            entities: HashMap::new(),
            material,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: AnchorId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Entity currently standing in for an anchor
    pub fn entity(&self, id: AnchorId) -> Option<EntityKey> {
        self.entities.get(&id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = AnchorId> + '_ {
        self.entities.keys().copied()
    }

    /// Apply a prepared change to the world
    pub fn apply(&mut self, world: &mut World, change: MeshChange) -> MeshOutcome {
        match change {
            MeshChange::Added {
                id,
                origin_from_anchor,
                shape,
            } => {
                let replaced = self.entities.remove(&id).and_then(|old| world.remove_entity(old));

                let collider = world
                    .physics_mut()
                    .add_static_collider(StaticCollider::new(Collider::mesh(shape), self.material));
                let entity = Entity::new(Transform::from(origin_from_anchor))
                    .with_tag(ENVIRONMENT_TAG)
                    .with_collider(collider);
                let key = world.add_entity(entity);
                self.entities.insert(id, key);

                if replaced.is_some() {
                    log::debug!("Mesh anchor {} re-added, entity replaced", id);
                    MeshOutcome::Replaced(key)
                } else {
                    log::debug!("Mesh anchor {} added", id);
                    MeshOutcome::Inserted(key)
                }
            }
            MeshChange::Updated {
                id,
                origin_from_anchor,
                shape,
            } => {
                let Some(key) = self.entities.get(&id).copied() else {
                    log::trace!("Update for unknown mesh anchor {}, dropped", id);
                    return MeshOutcome::Ignored;
                };
                let Some(entity) = world.get_entity_mut(key) else {
                    self.entities.remove(&id);
                    return MeshOutcome::Ignored;
                };

                entity.set_transform(Transform::from(origin_from_anchor));
                entity.mark_dirty(DirtyFlags::MESH);
                let collider = entity.collider;

                match collider {
                    Some(collider) => {
                        world.physics_mut().replace_static_shape(collider, Collider::mesh(shape));
                    }
                    None => {
                        let collider = world
                            .physics_mut()
                            .add_static_collider(StaticCollider::new(Collider::mesh(shape), self.material));
                        if let Some(entity) = world.get_entity_mut(key) {
                            entity.collider = Some(collider);
                        }
                    }
                }
                MeshOutcome::Refreshed(key)
            }
            MeshChange::Removed { id } => match self.entities.remove(&id) {
                Some(key) => {
                    world.remove_entity(key);
                    log::debug!("Mesh anchor {} removed", id);
                    MeshOutcome::Removed
                }
                None => MeshOutcome::Ignored,
            },
        }
    }

    /// Prepare and apply in one go
    ///
    /// Geometry failures are logged and the event is skipped without
    /// touching the world.
    pub fn ingest(&mut self, world: &mut World, update: MeshAnchorUpdate) -> MeshOutcome {
        let id = update.id();
        match update.prepare() {
            Ok(change) => self.apply(world, change),
            Err(err) => {
                log::debug!("Skipping mesh anchor {}: {}", id, err);
                MeshOutcome::Ignored
            }
        }
    }

    /// Detach every reconstructed entity
    pub fn clear(&mut self, world: &mut World) {
        for (_, key) in self.entities.drain() {
            world.remove_entity(key);
        }
    }
}
