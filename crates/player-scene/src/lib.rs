//! Player Scene - Bevy host for the player model scene
//!
//! This crate runs the engine-agnostic motion/sync loop from `player-core`
//! inside a Bevy app: it spawns the camera and lighting, loads the player
//! model, finds the screen anchor, drives camera drift and idle motion each
//! frame, and adds the ambient occlusion and film-grain passes. The HTML
//! overlay itself is composited by the host page (see `player-web`); this
//! crate only keeps the overlay entities positioned.

pub mod camera;
pub mod convert;
pub mod film_grain;
pub mod models;
pub mod motion;
pub mod scene;

use bevy::prelude::*;
use player_core::SceneConfig;

/// Scene configuration shared by every system
#[derive(Debug, Clone, Resource, Default)]
pub struct SceneSettings(pub SceneConfig);

/// Plugin that sets up the player scene
#[derive(Default)]
pub struct PlayerScenePlugin {
    pub config: SceneConfig,
}

impl Plugin for PlayerScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SceneSettings(self.config.clone()))
            .add_plugins(film_grain::FilmGrainPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(motion::MotionPlugin);
    }
}

// Re-export commonly used types
pub use camera::{MainCamera, ViewState, ViewportChanged};
pub use film_grain::FilmGrainSettings;
pub use models::{OverlayContent, OverlayGroup, PlayerModel, ScreenAnchor};
pub use motion::MotionSync;
