use bevy::prelude::*;

use crate::props::core::{PropCandidate, PropCollider, PropGenerator, PropGroup, Rotator, SpawnVolume};

pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // 1) Light
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            range: 60.0,
            intensity: 4_000_000.0,
            ..default()
        },
        Transform::from_xyz(8.0, 14.0, 8.0),
    ));

    // 2) Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-12.0, 16.0, 22.0).looking_at(Vec3::new(8.0, 0.0, 8.0), Vec3::Y),
    ));

    // 3) Floor (visual only, props rest on it without colliding)
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.25, 0.28))),
        Transform::from_xyz(8.0, 0.0, 8.0),
    ));

    // 4) Pillars: static blockers the generator has to place around
    let pillar_half = Vec3::new(0.6, 2.0, 0.6);
    let pillar_mesh = meshes.add(Cuboid::from_size(pillar_half * 2.0));
    let pillar_mat = materials.add(Color::srgb(0.6, 0.58, 0.55));
    for (x, z) in [(4.0, 4.0), (12.0, 4.0), (4.0, 12.0), (12.0, 12.0)] {
        commands.spawn((
            Name::new("Pillar"),
            Mesh3d(pillar_mesh.clone()),
            MeshMaterial3d(pillar_mat.clone()),
            Transform::from_xyz(x, pillar_half.y, z),
            PropCollider { half_extents: pillar_half },
        ));
    }

    // 5) Generator with two tagged volumes. Volumes sit at y=0.5, the shared
    //    half-height of every catalog archetype, so props rest on the floor.
    let any_yaw = (Rotator::ZERO, Rotator::new(0.0, 360.0, 0.0));
    commands
        .spawn((
            Name::new("Room Props"),
            PropGenerator {
                groups: vec![
                    PropGroup::new("Floor", 24)
                        .with_prop(PropCandidate::new("barrel", 10).with_rotation(any_yaw.0, any_yaw.1))
                        .with_prop(PropCandidate::new("crate", 10).with_rotation(any_yaw.0, any_yaw.1))
                        .with_prop(PropCandidate::new("chest", 2).with_rotation(
                            Rotator::new(0.0, -15.0, 0.0),
                            Rotator::new(0.0, 15.0, 0.0),
                        )),
                    PropGroup::new("Alcove", 4)
                        .with_prop(PropCandidate::new("urn", 4).with_rotation(
                            Rotator::new(-5.0, 0.0, -5.0),
                            Rotator::new(5.0, 360.0, 5.0),
                        )),
                ],
                retry_limit: 20,
            },
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|room| {
            room.spawn((
                Name::new("Floor Volume"),
                SpawnVolume::new("Floor", Vec3::new(16.0, 0.0, 16.0)),
                Transform::from_xyz(0.0, 0.5, 0.0),
            ));
            room.spawn((
                Name::new("Alcove Volume"),
                SpawnVolume::new("Alcove", Vec3::new(3.0, 0.0, 2.0)),
                Transform::from_xyz(20.0, 0.5, 6.0),
            ));
        });
}
