use bevy::prelude::*;

mod setup;
mod props;

use props::plugin::PropsSettings;
use props::{PropVisualsPlugin, PropsPlugin};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        // seed + catalog location; change the seed to reshuffle the room
        .insert_resource(PropsSettings::default())
        .add_plugins(PropsPlugin)        // catalog + placement pass
        .add_plugins(PropVisualsPlugin)  // meshes/scenes for placed props
        // camera, light, floor, pillars and the room's generator
        .add_systems(Startup, setup::setup)
        .run();
}
