//! Per-frame systems driving the motion/sync loop
//!
//! [`EcsScene`] lets the engine-agnostic loop read and write entity
//! transforms. World transforms are computed on demand from the current
//! local transforms, so the overlay group sees the idle pose written
//! earlier in the same tick rather than last frame's propagated one.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::transform::helper::TransformHelper;
use bevy::window::{CursorMoved, PrimaryWindow};
use player_core::math::Transform as CoreTransform;
use player_core::{MotionSyncLoop, SceneAccess, SceneError};
use tracing::warn;

use crate::camera::viewport_of;
use crate::convert::{from_bevy, from_global, to_bevy};
use crate::film_grain::FilmGrainSettings;

/// The motion loop, keyed by entity
#[derive(Resource)]
pub struct MotionSync(pub MotionSyncLoop<Entity>);

/// Ordering of the player systems within `Update`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerSystems {
    /// Model attach and anchor discovery
    Load,
    /// Pointer retargeting
    Input,
    /// The motion/sync tick
    Frame,
}

/// Plugin for the frame loop
pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (PlayerSystems::Load, PlayerSystems::Input, PlayerSystems::Frame).chain(),
        )
        .add_systems(Update, retarget_camera.in_set(PlayerSystems::Input))
        .add_systems(Update, drive_frame.in_set(PlayerSystems::Frame));
    }
}

fn missing(entity: Entity) -> SceneError {
    SceneError::UnknownNode(format!("{entity}"))
}

/// Scene access over ECS entities
#[derive(SystemParam)]
pub struct EcsScene<'w, 's> {
    transforms: ParamSet<'w, 's, (Query<'w, 's, &'static mut Transform>, TransformHelper<'w, 's>)>,
    grain: Query<'w, 's, &'static mut FilmGrainSettings>,
}

impl SceneAccess for EcsScene<'_, '_> {
    type Handle = Entity;

    fn set_local(&mut self, node: Entity, transform: CoreTransform) -> Result<(), SceneError> {
        let mut transforms = self.transforms.p0();
        let mut local = transforms.get_mut(node).map_err(|_| missing(node))?;
        *local = to_bevy(&transform);
        Ok(())
    }

    fn modify_local<F>(&mut self, node: Entity, f: F) -> Result<(), SceneError>
    where
        F: FnOnce(&mut CoreTransform),
    {
        let mut transforms = self.transforms.p0();
        let mut local = transforms.get_mut(node).map_err(|_| missing(node))?;
        let mut core = from_bevy(&local);
        f(&mut core);
        *local = to_bevy(&core);
        Ok(())
    }

    fn world_transform(&mut self, node: Entity) -> Result<CoreTransform, SceneError> {
        self.transforms
            .p1()
            .compute_global_transform(node)
            .map(|global| from_global(&global))
            .map_err(|_| missing(node))
    }

    fn set_noise_time(&mut self, time: f32) {
        for mut grain in self.grain.iter_mut() {
            grain.time = time;
        }
    }
}

fn retarget_camera(
    mut moves: MessageReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
    sync: Option<ResMut<MotionSync>>,
) {
    let Some(mut sync) = sync else {
        moves.clear();
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = viewport_of(window);
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return;
    }
    // Only the latest position matters for the target
    if let Some(last) = moves.read().last() {
        sync.0.on_pointer_move(last.position.x, last.position.y, &viewport);
    }
}

fn drive_frame(time: Res<Time>, sync: Option<ResMut<MotionSync>>, mut scene: EcsScene) {
    let Some(mut sync) = sync else {
        return;
    };
    if let Err(e) = sync.0.tick(time.delta_secs(), &mut scene) {
        warn!("Frame skipped: {}", e);
    }
}
