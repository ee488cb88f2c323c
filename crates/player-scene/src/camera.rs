//! Camera spawn and viewport tracking

use bevy::pbr::{ScreenSpaceAmbientOcclusion, ScreenSpaceAmbientOcclusionQualityLevel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use player_core::resize::Projection as CoreProjection;
use player_core::{
    BufferSize, CameraRig, FilmGrain, MotionSyncLoop, ResizeReactor, Ssao, SsaoQuality, ViewportSink,
    ViewportSize,
};
use tracing::{debug, info};

use crate::convert::to_bevy;
use crate::film_grain::FilmGrainSettings;
use crate::motion::MotionSync;
use crate::SceneSettings;

/// Ambient brightness per unit of environment intensity
const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 250.0;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Sent whenever the viewport size actually changes
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ViewportChanged {
    pub viewport: ViewportSize,
    pub buffer: BufferSize,
}

/// Current projection and viewport, shared with the overlay compositor
#[derive(Resource, Debug, Clone)]
pub struct ViewState {
    pub projection: CoreProjection,
    pub viewport: Option<ViewportSize>,
}

#[derive(Resource)]
struct Resizer(ResizeReactor);

/// Collects the change so it can be sent once the reactor is done
#[derive(Default)]
struct PendingChange(Option<ViewportChanged>);

impl ViewportSink for PendingChange {
    fn resize(&mut self, viewport: &ViewportSize, buffer: BufferSize) {
        self.0 = Some(ViewportChanged {
            viewport: *viewport,
            buffer,
        });
    }
}

/// Plugin for the camera and viewport handling
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SceneSettings>()
            .cloned()
            .unwrap_or_default()
            .0;

        app.add_message::<ViewportChanged>()
            .insert_resource(Resizer(ResizeReactor::new(&config.render)))
            .insert_resource(ViewState {
                projection: CoreProjection::new(&config.camera, 1.0),
                viewport: None,
            })
            .add_systems(Startup, spawn_camera)
            .add_systems(PreUpdate, track_viewport);
    }
}

pub fn ssao_quality(quality: SsaoQuality) -> ScreenSpaceAmbientOcclusionQualityLevel {
    match quality {
        SsaoQuality::Low => ScreenSpaceAmbientOcclusionQualityLevel::Low,
        SsaoQuality::Medium => ScreenSpaceAmbientOcclusionQualityLevel::Medium,
        SsaoQuality::High => ScreenSpaceAmbientOcclusionQualityLevel::High,
        SsaoQuality::Ultra => ScreenSpaceAmbientOcclusionQualityLevel::Ultra,
    }
}

fn spawn_camera(mut commands: Commands, settings: Res<SceneSettings>) {
    let config = &settings.0;
    let rig = CameraRig::new(&config.camera).transform();

    let mut camera = commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.camera.fov_degrees.to_radians(),
            near: config.camera.near,
            far: config.camera.far,
            ..default()
        }),
        to_bevy(&rig),
        Msaa::Off,
        AmbientLight {
            color: Color::WHITE,
            brightness: config.render.environment_intensity * AMBIENT_BRIGHTNESS_PER_UNIT,
            ..default()
        },
        FilmGrainSettings::from(FilmGrain::new(&config.post)),
        MainCamera,
    ));

    let ssao = Ssao::new(&config.post);
    if ssao.enabled {
        camera.insert(ScreenSpaceAmbientOcclusion {
            quality_level: ssao_quality(ssao.quality()),
            constant_object_thickness: ssao.object_thickness(),
        });
    }

    let entity = camera.id();
    info!(?entity, fov = config.camera.fov_degrees, ssao = ssao.enabled, "Camera spawned");
    commands.insert_resource(MotionSync(MotionSyncLoop::new(config, entity)));
}

pub fn viewport_of(window: &Window) -> ViewportSize {
    ViewportSize::new(window.width(), window.height(), window.scale_factor())
}

/// Feed window size changes through the resize reactor. The first frame
/// counts as a change so consumers get an initial size.
fn track_viewport(
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut resizer: ResMut<Resizer>,
    mut view: ResMut<ViewState>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
    mut changes: MessageWriter<ViewportChanged>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    let first = resizer.0.last_viewport().is_none();
    let notified = resized.read().count() > 0;
    if !first && !notified {
        return;
    }

    let viewport = viewport_of(window);
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        debug!("Ignoring zero-sized viewport");
        return;
    }

    let mut pending = PendingChange::default();
    let outcome = {
        let view = &mut *view;
        resizer.0.handle(viewport, &mut view.projection, &mut [&mut pending])
    };
    view.viewport = Some(viewport);

    for mut projection in projections.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = outcome.aspect;
        }
    }

    if let Some(change) = pending.0 {
        changes.write(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssao_quality_mapping() {
        let ssao = Ssao::default();
        assert_eq!(
            ssao_quality(ssao.quality()),
            ScreenSpaceAmbientOcclusionQualityLevel::High
        );
        assert_eq!(
            ssao_quality(SsaoQuality::Low),
            ScreenSpaceAmbientOcclusionQualityLevel::Low
        );
    }

    #[test]
    fn test_pending_change_records_last_resize() {
        let mut pending = PendingChange::default();
        let viewport = ViewportSize::new(800.0, 600.0, 3.0);
        let buffer = BufferSize {
            width: 1600,
            height: 1200,
        };
        pending.resize(&viewport, buffer);
        assert_eq!(pending.0, Some(ViewportChanged { viewport, buffer }));
    }
}
