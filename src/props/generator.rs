// src/props/generator.rs
//! Runs each `PropGenerator`'s placement pass once per activation.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use crate::props::catalog::PropCatalog;
use crate::props::core::{GeneratorActivated, PropCollider, PropGenerator, SpawnVolume};
use crate::props::plugin::{PlacementRandom, PropCatalogHandle};
use crate::props::sampler::{run_placement_pass, TaggedVolume, VolumeView};
use crate::props::spawner::{collider_aabb, WorldSpawner};

/// Run condition: the catalog asset has finished loading.
pub fn catalog_ready(handle: Res<PropCatalogHandle>, catalogs: Res<Assets<PropCatalog>>) -> bool {
    catalogs.get(&handle.0).is_some()
}

/// Volumes a generator can place into: its own, then every descendant's,
/// depth-first in child order.
pub fn collect_volumes(
    generator: Entity,
    children: &Query<&Children>,
    volumes: &Query<(&SpawnVolume, &GlobalTransform)>,
) -> Vec<TaggedVolume> {
    let mut out = Vec::new();
    let mut stack = vec![generator];

    while let Some(e) = stack.pop() {
        if let Ok((volume, gt)) = volumes.get(e) {
            out.push(TaggedVolume {
                tags: volume.tags.clone(),
                view: VolumeView { extent: volume.extent, transform: *gt },
            });
        }
        if let Ok(kids) = children.get(e) {
            let kids: &[Entity] = kids;
            stack.extend(kids.iter().rev().copied());
        }
    }
    out
}

/// PostUpdate (after transform propagation): place props for every generator
/// that hasn't run yet, then mark it `GeneratorActivated`.
pub fn run_prop_generators(
    mut commands: Commands,
    handle: Res<PropCatalogHandle>,
    catalogs: Res<Assets<PropCatalog>>,
    mut rng: ResMut<PlacementRandom>,
    generators: Query<(Entity, &PropGenerator), Without<GeneratorActivated>>,
    children: Query<&Children>,
    volumes: Query<(&SpawnVolume, &GlobalTransform)>,
    colliders: Query<(&PropCollider, &GlobalTransform)>,
) {
    if generators.is_empty() { return; }
    let Some(catalog) = catalogs.get(&handle.0) else { return };

    let mut occupied: Vec<Aabb3d> = colliders
        .iter()
        .map(|(collider, gt)| collider_aabb(collider, gt))
        .collect();

    for (entity, generator) in &generators {
        let tagged = collect_volumes(entity, &children, &volumes);

        // fresh counts every activation
        let mut groups = generator.groups.clone();
        for group in &mut groups {
            group.reset_spawn_counts();
        }

        let mut spawner = WorldSpawner::new(&mut commands, catalog, entity, occupied);
        run_placement_pass(
            &mut groups,
            tagged.as_slice(),
            generator.retry_limit,
            &mut rng.0,
            &mut spawner,
        );
        let spawned = spawner.spawned();
        occupied = spawner.into_occupied();

        commands.entity(entity).insert(GeneratorActivated);
        info!(
            "PropGen: generator {:?} placed {} props across {} volume(s)",
            entity,
            spawned,
            tagged.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::catalog::{PropArchetypeDef, PropCatalogAssetPlugin, PropRender};
    use crate::props::core::{PropCandidate, PropGroup, PropInstance};
    use bevy::transform::TransformPlugin;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), TransformPlugin, PropCatalogAssetPlugin))
            .insert_resource(PlacementRandom(ChaCha8Rng::seed_from_u64(1337)))
            .add_systems(
                PostUpdate,
                run_prop_generators
                    .after(bevy::transform::TransformSystem::TransformPropagate)
                    .run_if(catalog_ready),
            );

        let catalog = PropCatalog::from_defs(vec![
            PropArchetypeDef {
                name: "barrel".into(),
                half_extents: Vec3::splat(0.25),
                render: PropRender::Cuboid { color: [0.5, 0.3, 0.1] },
            },
            PropArchetypeDef {
                name: "pillar".into(),
                half_extents: Vec3::new(0.5, 2.0, 0.5),
                render: PropRender::Cuboid { color: [0.7, 0.7, 0.7] },
            },
        ])
        .expect("unique names");
        let handle = app.world_mut().resource_mut::<Assets<PropCatalog>>().add(catalog);
        app.insert_resource(PropCatalogHandle(handle));
        app
    }

    fn props_of(app: &mut App, generator: Entity) -> Vec<(String, Vec3)> {
        let world = app.world_mut();
        let mut q = world.query::<(&PropInstance, &Transform)>();
        q.iter(world)
            .filter(|(p, _)| p.generator == generator)
            .map(|(p, t)| (p.archetype.clone(), t.translation))
            .collect()
    }

    fn generator(groups: Vec<PropGroup>, retry_limit: u32) -> PropGenerator {
        PropGenerator { groups, retry_limit }
    }

    #[test]
    fn places_into_child_volume_in_world_space() {
        let mut app = test_app();
        let gen = app
            .world_mut()
            .spawn((
                generator(vec![PropGroup::new("Floor", 3).with_prop(PropCandidate::new("barrel", 5))], 50),
                Transform::from_xyz(100.0, 0.0, 0.0),
            ))
            .with_children(|p| {
                p.spawn((
                    SpawnVolume::new("Floor", Vec3::new(20.0, 0.0, 20.0)),
                    Transform::from_xyz(0.0, 1.0, 0.0),
                ));
            })
            .id();

        app.update();

        let props = props_of(&mut app, gen);
        assert_eq!(props.len(), 3);
        for (name, p) in &props {
            assert_eq!(name, "barrel");
            assert!(p.x >= 100.0 && p.x <= 120.0, "{p:?}");
            assert!((p.y - 1.0).abs() < 1e-4, "{p:?}");
            assert!(p.z >= 0.0 && p.z <= 20.0, "{p:?}");
        }
        assert!(app.world().get::<GeneratorActivated>(gen).is_some());
    }

    #[test]
    fn finds_volumes_nested_below_children() {
        let mut app = test_app();
        let gen = app
            .world_mut()
            .spawn((
                generator(vec![PropGroup::new("Cellar", 2).with_prop(PropCandidate::new("barrel", 2))], 50),
                Transform::default(),
            ))
            .with_children(|room| {
                room.spawn(Transform::from_xyz(0.0, -10.0, 0.0)).with_children(|stairs| {
                    stairs.spawn((
                        SpawnVolume::new("Cellar", Vec3::new(10.0, 0.0, 10.0)),
                        Transform::from_xyz(50.0, 0.0, 0.0),
                    ));
                });
            })
            .id();

        app.update();

        let props = props_of(&mut app, gen);
        assert_eq!(props.len(), 2);
        for (_, p) in &props {
            assert!(p.x >= 50.0 && p.x <= 60.0, "{p:?}");
            assert!((p.y + 10.0).abs() < 1e-4, "{p:?}");
        }
    }

    #[test]
    fn runs_once_per_activation() {
        let mut app = test_app();
        let gen = app
            .world_mut()
            .spawn((
                generator(vec![PropGroup::new("Floor", 2).with_prop(PropCandidate::new("barrel", 2))], 50),
                SpawnVolume::new("Floor", Vec3::new(50.0, 0.0, 50.0)),
            ))
            .id();

        app.update();
        app.update();
        assert_eq!(props_of(&mut app, gen).len(), 2);

        // re-activate: counts start fresh, the earlier props now block placement
        app.world_mut().entity_mut(gen).remove::<GeneratorActivated>();
        app.update();
        assert_eq!(props_of(&mut app, gen).len(), 4);
    }

    #[test]
    fn existing_colliders_block_placement() {
        let mut app = test_app();
        // one blocker covering the whole volume
        app.world_mut().spawn((
            PropCollider { half_extents: Vec3::splat(10.0) },
            Transform::from_xyz(0.0, 0.0, 0.0),
        ));
        let gen = app
            .world_mut()
            .spawn((
                generator(vec![PropGroup::new("Floor", 5).with_prop(PropCandidate::new("pillar", 5))], 25),
                SpawnVolume::new("Floor", Vec3::splat(1.0)),
            ))
            .id();

        app.update();

        assert!(props_of(&mut app, gen).is_empty());
        assert!(app.world().get::<GeneratorActivated>(gen).is_some());
    }

    #[test]
    fn unknown_tag_and_unknown_archetype_are_silent() {
        let mut app = test_app();
        let gen = app
            .world_mut()
            .spawn((
                generator(
                    vec![
                        PropGroup::new("Attic", 3).with_prop(PropCandidate::new("barrel", 3)),
                        PropGroup::new("Floor", 3).with_prop(PropCandidate::new("anvil", 3)),
                    ],
                    5,
                ),
                SpawnVolume::new("Floor", Vec3::splat(10.0)),
            ))
            .id();

        app.update();

        assert!(props_of(&mut app, gen).is_empty());
        assert!(app.world().get::<GeneratorActivated>(gen).is_some());
    }

    #[test]
    fn waits_for_catalog() {
        let mut app = test_app();
        app.insert_resource(PropCatalogHandle(Handle::default()));
        let gen = app
            .world_mut()
            .spawn((
                generator(vec![PropGroup::new("Floor", 1).with_prop(PropCandidate::new("barrel", 1))], 5),
                SpawnVolume::new("Floor", Vec3::splat(10.0)),
            ))
            .id();

        app.update();

        assert!(app.world().get::<GeneratorActivated>(gen).is_none());
        assert!(props_of(&mut app, gen).is_empty());
    }
}
