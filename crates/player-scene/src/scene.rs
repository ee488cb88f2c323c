//! Scene setup - background and lights

use bevy::prelude::*;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_lights);
    }
}

/// Neutral room-style lighting: a soft key light from above and a warm fill
fn setup_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 4.0, 3.0).looking_at(Vec3::new(0.0, 1.3, 0.0), Vec3::Y),
    ));

    commands.spawn((
        PointLight {
            intensity: 150000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_xyz(-2.0, 2.0, 2.5),
    ));
}
