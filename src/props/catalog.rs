// src/props/catalog.rs
//! Data-driven prop archetypes (what a candidate's `prop` name spawns) + loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------- Public plugin to register asset+loader ----------

pub struct PropCatalogAssetPlugin;

impl Plugin for PropCatalogAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PropCatalog>()
            .register_asset_loader(PropCatalogLoader);
    }
}

// ---------- Render refs (data form) ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PropRender {
    /// Plain box the size of the collider, linear RGB.
    Cuboid { color: [f32; 3] },
    /// glTF scene path, e.g. "models/barrel.glb#Scene0".
    Scene { path: String },
}

// ---------- Archetype definition (data form) ----------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropArchetypeDef {
    /// Unique name; candidates refer to archetypes by it.
    pub name: String,

    /// Collision box used for the overlap test at spawn time.
    pub half_extents: Vec3,

    pub render: PropRender,
}

// ---------- Runtime catalog asset ----------

#[derive(Asset, TypePath, Clone, Debug, Default)]
pub struct PropCatalog {
    pub archetypes: Vec<PropArchetypeDef>,
    /// Name → index into `archetypes`.
    pub name_to_index: HashMap<String, usize>,
}

impl PropCatalog {
    pub fn from_defs(defs: Vec<PropArchetypeDef>) -> Result<Self, PropCatalogLoadError> {
        let mut name_to_index = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if let Some(prev) = name_to_index.insert(def.name.clone(), i) {
                return Err(PropCatalogLoadError::DuplicateName {
                    name: def.name.clone(),
                    first: prev,
                    second: i,
                });
            }
        }
        Ok(Self { archetypes: defs, name_to_index })
    }

    pub fn get(&self, name: &str) -> Option<&PropArchetypeDef> {
        self.name_to_index.get(name).and_then(|&i| self.archetypes.get(i))
    }
}

// ---------- Asset loader for `.catalog.ron` ----------

#[derive(Default)]
pub struct PropCatalogLoader;

impl AssetLoader for PropCatalogLoader {
    type Asset = PropCatalog;
    type Settings = ();
    type Error = PropCatalogLoadError;

    fn extensions(&self) -> &[&str] {
        &["catalog.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        parse_catalog(&bytes)
    }
}

/// Parse a RON list of archetypes into a catalog.
pub fn parse_catalog(bytes: &[u8]) -> Result<PropCatalog, PropCatalogLoadError> {
    let defs: Vec<PropArchetypeDef> =
        ron::de::from_bytes(bytes).map_err(|e| PropCatalogLoadError::Ron(e.to_string()))?;
    PropCatalog::from_defs(defs)
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum PropCatalogLoadError {
    #[error("I/O while reading catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate archetype name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: usize, second: usize },
}
