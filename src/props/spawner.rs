// src/props/spawner.rs
//! `PropSpawner` backed by Bevy `Commands`: refuses placements whose collision
//! box overlaps any existing `PropCollider` (or a prop placed earlier in the
//! same pass, since commands are only applied after the system returns).

use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::prelude::*;

use crate::props::catalog::PropCatalog;
use crate::props::core::{PropCollider, PropInstance};
use crate::props::sampler::{PropSpawner, SpawnCollision};

/// World AABB of a rotated box.
pub fn world_aabb(translation: Vec3, rotation: Quat, half_extents: Vec3) -> Aabb3d {
    let m = Mat3::from_quat(rotation);
    let half = m.x_axis.abs() * half_extents.x
        + m.y_axis.abs() * half_extents.y
        + m.z_axis.abs() * half_extents.z;
    Aabb3d::new(translation, half)
}

/// World AABB of a collider placed with `transform`.
pub fn collider_aabb(collider: &PropCollider, transform: &GlobalTransform) -> Aabb3d {
    let (scale, rotation, translation) = transform.to_scale_rotation_translation();
    world_aabb(translation, rotation, collider.half_extents * scale.abs())
}

pub struct WorldSpawner<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    catalog: &'a PropCatalog,
    generator: Entity,
    occupied: Vec<Aabb3d>,
    spawned: u32,
}

impl<'a, 'w, 's> WorldSpawner<'a, 'w, 's> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        catalog: &'a PropCatalog,
        generator: Entity,
        occupied: Vec<Aabb3d>,
    ) -> Self {
        Self { commands, catalog, generator, occupied, spawned: 0 }
    }

    /// Boxes considered solid, including everything spawned so far.
    #[cfg(test)]
    pub fn occupied(&self) -> &[Aabb3d] {
        &self.occupied
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Hand the occupied set on to the next generator in the same frame.
    pub fn into_occupied(self) -> Vec<Aabb3d> {
        self.occupied
    }

    fn overlaps(&self, aabb: &Aabb3d) -> bool {
        self.occupied.iter().any(|o| o.intersects(aabb))
    }
}

impl PropSpawner for WorldSpawner<'_, '_, '_> {
    fn try_spawn(
        &mut self,
        prop: &str,
        translation: Vec3,
        rotation: Quat,
        collision: SpawnCollision,
    ) -> Option<Entity> {
        let Some(def) = self.catalog.get(prop) else {
            debug!("PropGen: unknown archetype '{}', nothing spawned", prop);
            return None;
        };

        let aabb = world_aabb(translation, rotation, def.half_extents);
        if collision == SpawnCollision::DontSpawnIfColliding && self.overlaps(&aabb) {
            return None;
        }

        // spawned after propagation, so seed GlobalTransform too
        let transform = Transform::from_translation(translation).with_rotation(rotation);
        let entity = self
            .commands
            .spawn((
                Name::new(format!("Prop {}", def.name)),
                PropInstance { archetype: def.name.clone(), generator: self.generator },
                PropCollider { half_extents: def.half_extents },
                transform,
                GlobalTransform::from(transform),
                Visibility::default(),
            ))
            .id();
        self.occupied.push(aabb);
        self.spawned += 1;
        Some(entity)
    }
}
