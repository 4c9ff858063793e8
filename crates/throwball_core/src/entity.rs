//! Scene entities
//!
//! The scene holds two kinds of things: the ball, which owns a rigid body,
//! and pieces of the reconstructed room, which own a static collider.

use std::collections::HashSet;
use bitflags::bitflags;
use throwball_physics::{BodyKey, ColliderKey};
use crate::Transform;

bitflags! {
    /// What changed on an entity since the scene was last consumed
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        const NONE = 0;
        /// Pose moved
        const TRANSFORM = 1 << 0;
        /// Collision geometry replaced
        const MESH = 1 << 1;
        const ALL = Self::TRANSFORM.bits() | Self::MESH.bits();
    }
}

/// One child of the world root
#[derive(Clone, Debug)]
pub struct Entity {
    pub name: Option<String>,
    /// e.g. "dynamic" for the ball, "environment" for room meshes
    pub tags: HashSet<String>,
    /// Pose in origin space
    pub transform: Transform,
    /// Rigid body driving this entity, if it moves
    pub physics_body: Option<BodyKey>,
    /// Static collider owned by this entity, if it is room geometry
    pub collider: Option<ColliderKey>,
    dirty: DirtyFlags,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new(Transform::identity())
    }
}

impl Entity {
    /// A fresh entity starts fully dirty
    pub fn new(transform: Transform) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform,
            physics_body: None,
            collider: None,
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn with_physics_body(mut self, key: BodyKey) -> Self {
        self.physics_body = Some(key);
        self
    }

    pub fn with_collider(mut self, key: ColliderKey) -> Self {
        self.collider = Some(key);
        self
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// Move the entity without touching any linked body
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }
}
