//! Props plugin wiring (glue).
//! - Catalog asset/loader
//! - Settings + seeded placement RNG
//! - Generator pass (PostUpdate, after transforms propagate)

use bevy::prelude::*;
use bevy::transform::TransformSystem;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::catalog::{PropCatalog, PropCatalogAssetPlugin};
use super::generator::{catalog_ready, run_prop_generators};
use super::visuals::attach_prop_visuals;

/// Configure where the catalog lives and the placement seed.
#[derive(Resource, Clone)]
pub struct PropsSettings {
    pub catalog_path: String,
    pub seed: u64,
}
impl Default for PropsSettings {
    fn default() -> Self {
        Self {
            catalog_path: "props/dungeon.catalog.ron".to_string(),
            seed: 1337,
        }
    }
}

/// Handle to the loaded PropCatalog asset.
#[derive(Resource, Default)]
pub struct PropCatalogHandle(pub Handle<PropCatalog>);

/// Shared random source for every placement pass; changing the seed reshuffles props.
#[derive(Resource)]
pub struct PlacementRandom(pub ChaCha8Rng);

pub struct PropsPlugin;
impl Plugin for PropsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PropCatalogAssetPlugin)
            .init_resource::<PropsSettings>()
            .init_resource::<PropCatalogHandle>()
            .add_systems(Startup, (init_placement_random, load_catalog))
            .add_systems(Update, monitor_catalog_ready)
            .add_systems(
                PostUpdate,
                run_prop_generators
                    .after(TransformSystem::TransformPropagate)
                    .run_if(catalog_ready),
            );
    }
}

/// Meshes/materials/scenes for spawned props. Needs the render plugins.
pub struct PropVisualsPlugin;
impl Plugin for PropVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, attach_prop_visuals.run_if(catalog_ready));
    }
}

/// Startup: seed the placement RNG from PropsSettings.
fn init_placement_random(mut commands: Commands, settings: Res<PropsSettings>) {
    commands.insert_resource(PlacementRandom(ChaCha8Rng::seed_from_u64(settings.seed)));
}

/// Startup: request loading the catalog, store handle.
fn load_catalog(
    mut handle_res: ResMut<PropCatalogHandle>,
    settings: Res<PropsSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() { return; }
    handle_res.0 = assets.load(settings.catalog_path.as_str());
    info!(
        "Props: loading catalog from '{}', seed={}",
        settings.catalog_path, settings.seed
    );
}

/// Update: log once when the catalog becomes available.
fn monitor_catalog_ready(
    handle_res: Res<PropCatalogHandle>,
    catalogs: Res<Assets<PropCatalog>>,
    mut logged: Local<bool>,
) {
    if *logged { return; }
    if let Some(catalog) = catalogs.get(&handle_res.0) {
        *logged = true;
        info!("Props: catalog ready ({} archetypes)", catalog.archetypes.len());
    }
}
