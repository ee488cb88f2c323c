//! Bevy application setup

use bevy::prelude::*;
use player_core::SceneConfig;
use player_scene::PlayerScenePlugin;

use crate::overlay::OverlayPlugin;

pub fn run() {
    let config = SceneConfig::default();
    let asset_root = config.render.asset_root().to_string();
    let canvas = config.render.canvas.clone();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Player".to_string(),
                        canvas: Some(canvas),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    // The model is served next to the page under the site base path
                    file_path: asset_root,
                    // Don't look for .meta files - the static host doesn't have them
                    meta_check: bevy::asset::AssetMetaCheck::Never,
                    ..default()
                }),
        )
        .add_plugins(PlayerScenePlugin { config })
        .add_plugins(OverlayPlugin)
        .run();
}
