// src/props/core.rs
//! Authored data for tag-driven prop placement, plus the runtime markers the
//! host puts on generators and spawned props.
//! Keep this file dependency-light; the sampler and the host both build on it.

use bevy::prelude::*; // Vec3, Quat, Component
use serde::{Deserialize, Serialize};

// ---------- Rotation ----------

/// Pitch/yaw/roll in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    /// Around +X.
    pub pitch: f32,
    /// Around +Y (up).
    pub yaw: f32,
    /// Around +Z.
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }
}

// ---------- Candidates & groups ----------

/// One prop archetype eligible for placement inside a group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropCandidate {
    /// Archetype name in the `PropCatalog`.
    pub prop: String,

    #[serde(default)]
    pub min_rotation: Rotator,

    #[serde(default)]
    pub max_rotation: Rotator,

    /// How many times this candidate may be placed during one pass.
    pub spawn_limit: u32,

    /// Placed so far in the current pass. Never authored.
    #[serde(skip)]
    spawn_count: u32,
}

impl PropCandidate {
    pub fn new(prop: impl Into<String>, spawn_limit: u32) -> Self {
        Self {
            prop: prop.into(),
            min_rotation: Rotator::ZERO,
            max_rotation: Rotator::ZERO,
            spawn_limit,
            spawn_count: 0,
        }
    }

    pub fn with_rotation(mut self, min: Rotator, max: Rotator) -> Self {
        self.min_rotation = min;
        self.max_rotation = max;
        self
    }

    /// Start the pass with `count` already placed (clamped to the limit).
    #[allow(dead_code)]
    pub fn with_spawn_count(mut self, count: u32) -> Self {
        self.spawn_count = count.min(self.spawn_limit);
        self
    }

    #[inline]
    pub fn spawn_count(&self) -> u32 { self.spawn_count }

    #[inline]
    pub fn under_spawn_limit(&self) -> bool { self.spawn_count < self.spawn_limit }

    #[inline]
    pub fn increment_spawn_count(&mut self) {
        debug_assert!(self.under_spawn_limit());
        self.spawn_count += 1;
    }

    #[inline]
    pub fn reset_spawn_count(&mut self) { self.spawn_count = 0; }
}

/// Candidates that share one spawn volume.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropGroup {
    /// Tag used to find the spawn volume.
    pub volume_tag: String,
    pub props: Vec<PropCandidate>,
    /// Upper bound on placements in the volume.
    pub max_props: u32,
}

impl PropGroup {
    pub fn new(volume_tag: impl Into<String>, max_props: u32) -> Self {
        Self { volume_tag: volume_tag.into(), props: Vec::new(), max_props }
    }

    pub fn with_prop(mut self, candidate: PropCandidate) -> Self {
        self.props.push(candidate);
        self
    }

    pub fn reset_spawn_counts(&mut self) {
        for c in &mut self.props {
            c.reset_spawn_count();
        }
    }
}

// ---------- Components ----------

/// Places props into its own tagged volumes once per activation.
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct PropGenerator {
    pub groups: Vec<PropGroup>,
    /// Consecutive failed attempts tolerated before a group is abandoned.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

fn default_retry_limit() -> u32 {
    10
}

/// Box region props are scattered in. Samples run from the local origin to
/// `extent` and are mapped through the entity's `GlobalTransform`.
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
#[require(Transform)]
pub struct SpawnVolume {
    pub tags: Vec<String>,
    pub extent: Vec3,
}

impl SpawnVolume {
    pub fn new(tag: impl Into<String>, extent: Vec3) -> Self {
        Self { tags: vec![tag.into()], extent }
    }
}

/// Inserted once a generator's pass has run. Remove it to run the pass again.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct GeneratorActivated;

/// Marker on every prop a generator placed.
#[derive(Component, Clone, Debug)]
pub struct PropInstance {
    pub archetype: String,
    pub generator: Entity,
}

/// Box that blocks placement (half-extents in local space, scaled by the
/// entity's transform).
#[derive(Component, Clone, Copy, Debug)]
pub struct PropCollider {
    pub half_extents: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_count_stops_at_limit() {
        let mut c = PropCandidate::new("crate", 2);
        assert!(c.under_spawn_limit());
        c.increment_spawn_count();
        c.increment_spawn_count();
        assert!(!c.under_spawn_limit());
        assert_eq!(c.spawn_count(), 2);

        c.reset_spawn_count();
        assert_eq!(c.spawn_count(), 0);
    }

    #[test]
    fn zero_limit_is_never_eligible() {
        assert!(!PropCandidate::new("crate", 0).under_spawn_limit());
    }

    #[test]
    fn preseeded_count_is_clamped() {
        let c = PropCandidate::new("barrel", 1).with_spawn_count(5);
        assert_eq!(c.spawn_count(), 1);
    }

    #[test]
    fn yaw_turns_around_up_axis() {
        let q = Rotator::new(0.0, 90.0, 0.0).to_quat();
        let v = q * Vec3::X;
        assert!((v - Vec3::NEG_Z).length() < 1e-5, "got {v:?}");
    }

    #[test]
    fn generator_parses_from_ron_without_counts() {
        let src = r#"(
            groups: [
                (
                    volume_tag: "Floor",
                    props: [
                        (prop: "barrel", spawn_limit: 3, max_rotation: (pitch: 0.0, yaw: 360.0, roll: 0.0)),
                    ],
                    max_props: 4,
                ),
            ],
        )"#;
        let generator: PropGenerator = ron::from_str(src).expect("valid generator");
        assert_eq!(generator.retry_limit, 10);
        let c = &generator.groups[0].props[0];
        assert_eq!(c.spawn_count(), 0);
        assert_eq!(c.max_rotation.yaw, 360.0);
        assert_eq!(c.min_rotation, Rotator::ZERO);
    }
}
