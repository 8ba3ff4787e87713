// src/props/sampler.rs
//! Bounded rejection sampling of props inside tagged volumes.
//!
//! The pass only talks to the world through three small capabilities:
//! - [`VolumeLookup`]: tag -> spawn volume
//! - [`PlacementRng`]: the random draws
//! - [`PropSpawner`]: collision-aware instantiation
//!
//! The Bevy host implements them in `props::spawner` / `props::generator`;
//! tests plug in scripted versions.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::props::core::{PropCandidate, PropGroup, Rotator};

// ---------- Capabilities ----------

/// A resolved spawn volume: local box `[0, extent]` plus its world transform.
#[derive(Clone, Copy, Debug)]
pub struct VolumeView {
    pub extent: Vec3,
    pub transform: GlobalTransform,
}

impl VolumeView {
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.transform.transform_point(local)
    }
}

/// Finds the spawn volume for a group tag.
pub trait VolumeLookup {
    /// First volume carrying `tag`, if any.
    fn find_volume(&self, tag: &str) -> Option<VolumeView>;
}

/// A volume together with the tags it answers to.
#[derive(Clone, Debug)]
pub struct TaggedVolume {
    pub tags: Vec<String>,
    pub view: VolumeView,
}

impl TaggedVolume {
    #[cfg(test)]
    pub fn new(tag: impl Into<String>, extent: Vec3, transform: GlobalTransform) -> Self {
        Self { tags: vec![tag.into()], view: VolumeView { extent, transform } }
    }
}

impl VolumeLookup for [TaggedVolume] {
    fn find_volume(&self, tag: &str) -> Option<VolumeView> {
        self.iter()
            .find(|v| v.tags.iter().any(|t| t == tag))
            .map(|v| v.view)
    }
}

/// Random draws used by the pass.
pub trait PlacementRng {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index_in(&mut self, len: usize) -> usize;
    /// Uniform float in `[min, max]`.
    fn float_in(&mut self, min: f32, max: f32) -> f32;
    /// Uniform point in the box spanning the origin and `extent`.
    fn point_in_box(&mut self, extent: Vec3) -> Vec3;
}

impl PlacementRng for ChaCha8Rng {
    fn index_in(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }

    fn float_in(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = ordered(min, max);
        if !lo.is_finite() || !hi.is_finite() {
            return finite_or_zero(lo, hi);
        }
        if lo == hi {
            return lo;
        }
        if !(hi - lo).is_finite() {
            // span overflows f32; blend the bounds instead of subtracting them
            let t: f32 = self.random();
            return lo * (1.0 - t) + hi * t;
        }
        self.random_range(lo..=hi)
    }

    fn point_in_box(&mut self, extent: Vec3) -> Vec3 {
        Vec3::new(
            self.float_in(0.0, extent.x),
            self.float_in(0.0, extent.y),
            self.float_in(0.0, extent.z),
        )
    }
}

/// How the spawner treats overlaps with existing colliders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnCollision {
    /// Spawn regardless of overlaps.
    #[allow(dead_code)]
    AlwaysSpawn,
    /// Refuse (spawn nothing) if the new prop would overlap anything.
    DontSpawnIfColliding,
}

/// Creates prop instances in the world.
pub trait PropSpawner {
    /// Returns the new entity, or `None` if nothing was spawned.
    fn try_spawn(
        &mut self,
        prop: &str,
        translation: Vec3,
        rotation: Quat,
        collision: SpawnCollision,
    ) -> Option<Entity>;
}

// ---------- Pass ----------

/// Runs one placement pass over `groups`.
///
/// Candidate counts are not reset here; callers hand in fresh groups for
/// every pass. Groups whose tag matches no volume, or that have no
/// candidates, are skipped.
pub fn run_placement_pass<V, R, S>(
    groups: &mut [PropGroup],
    volumes: &V,
    retry_limit: u32,
    rng: &mut R,
    spawner: &mut S,
) where
    V: VolumeLookup + ?Sized,
    R: PlacementRng + ?Sized,
    S: PropSpawner + ?Sized,
{
    for group in groups.iter_mut() {
        let Some(volume) = volumes.find_volume(&group.volume_tag) else {
            debug!("PropGen: no volume tagged '{}', skipping group", group.volume_tag);
            continue;
        };
        if group.props.is_empty() {
            debug!("PropGen: group '{}' has no props, skipping", group.volume_tag);
            continue;
        }

        let placed = place_group(group, &volume, retry_limit, rng, spawner);

        debug!(
            "PropGen: group '{}' placed {}/{}",
            group.volume_tag, placed, group.max_props
        );
    }
}

/// Fills a single group; returns how many props were placed.
fn place_group<R, S>(
    group: &mut PropGroup,
    volume: &VolumeView,
    retry_limit: u32,
    rng: &mut R,
    spawner: &mut S,
) -> u32
where
    R: PlacementRng + ?Sized,
    S: PropSpawner + ?Sized,
{
    let mut placed = 0u32;
    let mut retries = 0u32;

    while placed < group.max_props && retries < retry_limit {
        let idx = rng.index_in(group.props.len());
        let candidate = &mut group.props[idx];

        if !candidate.under_spawn_limit() {
            retries += 1;
            continue;
        }

        if try_spawn_in_volume(candidate, volume, rng, spawner).is_some() {
            candidate.increment_spawn_count();
            placed += 1;
            retries = 0;
        } else {
            retries += 1;
        }
    }

    trace!(
        "PropGen: group '{}' stopped with placed={} retries={}",
        group.volume_tag, placed, retries
    );
    placed
}

/// One spawn attempt: random point in the volume, random rotation, refuse on overlap.
pub fn try_spawn_in_volume<R, S>(
    candidate: &PropCandidate,
    volume: &VolumeView,
    rng: &mut R,
    spawner: &mut S,
) -> Option<Entity>
where
    R: PlacementRng + ?Sized,
    S: PropSpawner + ?Sized,
{
    let local = rng.point_in_box(volume.extent);
    let translation = volume.to_world(local);
    let rotation = random_rotation(candidate, rng).to_quat();

    spawner.try_spawn(
        &candidate.prop,
        translation,
        rotation,
        SpawnCollision::DontSpawnIfColliding,
    )
}

/// Independent uniform draw per axis between the candidate's min and max.
/// An inverted axis is treated as the same interval written backwards.
pub fn random_rotation<R: PlacementRng + ?Sized>(candidate: &PropCandidate, rng: &mut R) -> Rotator {
    let (min, max) = (candidate.min_rotation, candidate.max_rotation);
    Rotator {
        pitch: draw_axis(rng, min.pitch, max.pitch),
        yaw: draw_axis(rng, min.yaw, max.yaw),
        roll: draw_axis(rng, min.roll, max.roll),
    }
}

#[inline]
fn draw_axis<R: PlacementRng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = ordered(a, b);
    rng.float_in(lo, hi)
}

#[inline]
fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Fallback for a range with a NaN or infinite bound: the first finite bound, else 0.
#[inline]
fn finite_or_zero(a: f32, b: f32) -> f32 {
    if a.is_finite() {
        a
    } else if b.is_finite() {
        b
    } else {
        0.0
    }
}
