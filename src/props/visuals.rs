// src/props/visuals.rs
//! Give freshly spawned props something to render, per catalog `PropRender`.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::props::catalog::{PropCatalog, PropRender};
use crate::props::core::PropInstance;
use crate::props::plugin::PropCatalogHandle;

/// Cuboid mesh + material shared by all instances of one archetype.
type CuboidCache = HashMap<String, (Handle<Mesh>, Handle<StandardMaterial>)>;

pub fn attach_prop_visuals(
    mut commands: Commands,
    added: Query<(Entity, &PropInstance), Added<PropInstance>>,
    handle: Res<PropCatalogHandle>,
    catalogs: Res<Assets<PropCatalog>>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut cache: Local<CuboidCache>,
) {
    if added.is_empty() { return; }
    let Some(catalog) = catalogs.get(&handle.0) else { return };

    for (entity, instance) in &added {
        let Some(def) = catalog.get(&instance.archetype) else {
            warn!("Props: no archetype '{}' for visuals; skipping.", instance.archetype);
            continue;
        };

        match &def.render {
            PropRender::Cuboid { color } => {
                let (mesh, material) = cache
                    .entry(def.name.clone())
                    .or_insert_with(|| {
                        (
                            meshes.add(Cuboid::from_size(def.half_extents * 2.0)),
                            materials.add(StandardMaterial {
                                base_color: Color::linear_rgb(color[0], color[1], color[2]),
                                perceptual_roughness: 0.9,
                                ..default()
                            }),
                        )
                    })
                    .clone();
                commands.entity(entity).insert((Mesh3d(mesh), MeshMaterial3d(material)));
            }
            PropRender::Scene { path } => {
                commands
                    .entity(entity)
                    .insert(SceneRoot(asset_server.load(path.clone())));
            }
        }
    }
}
