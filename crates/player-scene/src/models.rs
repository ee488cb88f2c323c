//! Player model loading and screen anchor discovery
//!
//! The model is spawned from its glTF scene at startup. Once the scene has
//! instantiated, the root is handed to the motion loop for idle motion and
//! the subtree is searched for the screen anchor: first by the node's glTF
//! extras (`"name": "Screen"`), then by node name. The search runs every
//! frame until it succeeds; the overlay entities are created exactly once.

use bevy::gltf::GltfExtras;
use bevy::prelude::*;
use player_core::OverlayPlane;
use tracing::{debug, info};

use crate::convert::{from_bevy, to_bevy};
use crate::motion::{MotionSync, PlayerSystems};
use crate::SceneSettings;

/// Root entity of the player model
#[derive(Component)]
pub struct PlayerModel;

/// Added to the model root once the motion loop owns it
#[derive(Component)]
pub struct ModelAttached;

/// The node the overlay is mounted on
#[derive(Component)]
pub struct ScreenAnchor;

/// Root-level entity that follows the anchor's world transform
#[derive(Component)]
pub struct OverlayGroup;

/// Child of the overlay group; the HTML panel is composited at its pose
#[derive(Component)]
pub struct OverlayContent {
    pub width_px: u32,
    pub height_px: u32,
}

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player_model).add_systems(
            Update,
            (attach_loaded_model, resolve_screen_anchor)
                .chain()
                .in_set(PlayerSystems::Load),
        );
    }
}

/// The glTF loader has no Draco decoder; the model must ship with
/// uncompressed (or meshopt) geometry
fn spawn_player_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<SceneSettings>,
) {
    let path = settings.0.render.model_path.clone();
    info!("Starting to load player model: {}", path);
    commands.spawn((
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(path))),
        Transform::default(),
        PlayerModel,
    ));
}

/// The scene spawner adds the whole hierarchy in one go, so `Children`
/// showing up on the root means the model has loaded
fn attach_loaded_model(
    mut commands: Commands,
    sync: Option<ResMut<MotionSync>>,
    models: Query<(Entity, &Transform), (With<PlayerModel>, With<Children>, Without<ModelAttached>)>,
) {
    let Some(mut sync) = sync else {
        return;
    };
    for (entity, transform) in models.iter() {
        sync.0.attach_model(entity, from_bevy(transform));
        commands.entity(entity).insert(ModelAttached);
    }
}

/// Whether a node's glTF extras name it `tag`
pub fn extras_match(extras: &str, tag: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(extras)
        .ok()
        .and_then(|value| value.get("name").and_then(|n| n.as_str()).map(|n| n == tag))
        .unwrap_or(false)
}

/// Depth-first search under `root` for the first entity accepted by `matches`
fn find_in_subtree(
    root: Entity,
    children_query: &Query<&Children>,
    matches: &dyn Fn(Entity) -> bool,
) -> Option<Entity> {
    if matches(root) {
        return Some(root);
    }
    if let Ok(children) = children_query.get(root) {
        for child in children.iter() {
            if let Some(found) = find_in_subtree(child, children_query, matches) {
                return Some(found);
            }
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn resolve_screen_anchor(
    mut commands: Commands,
    sync: Option<ResMut<MotionSync>>,
    settings: Res<SceneSettings>,
    models: Query<Entity, (With<PlayerModel>, With<ModelAttached>)>,
    children_query: Query<&Children>,
    names: Query<&Name>,
    extras: Query<&GltfExtras>,
    mut screen_materials: Query<&mut MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(mut sync) = sync else {
        return;
    };
    if sync.0.is_anchor_resolved() {
        return;
    }

    let tag = settings.0.overlay.anchor_tag.as_str();
    for model in models.iter() {
        let by_extras = |e: Entity| extras.get(e).is_ok_and(|x| extras_match(&x.value, tag));
        let by_name = |e: Entity| names.get(e).is_ok_and(|n| n.as_str() == tag);

        let Some(anchor) = find_in_subtree(model, &children_query, &by_extras)
            .or_else(|| find_in_subtree(model, &children_query, &by_name))
        else {
            debug!(?model, tag, "Screen anchor not found yet");
            continue;
        };

        let plane = OverlayPlane::new(&settings.0.overlay);
        let content = commands
            .spawn((
                to_bevy(&plane.content_transform()),
                OverlayContent {
                    width_px: plane.width_px,
                    height_px: plane.height_px,
                },
            ))
            .id();
        let group = commands
            .spawn((Transform::default(), OverlayGroup))
            .add_child(content)
            .id();

        commands.entity(anchor).insert(ScreenAnchor);
        sync.0.attach_anchor(anchor, group);

        // The composited HTML should read as the screen itself
        let screen = materials.add(StandardMaterial {
            base_color: Color::BLACK,
            metallic: 0.4,
            perceptual_roughness: 0.0,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        let mut swapped = 0;
        let mut pending = vec![anchor];
        while let Some(entity) = pending.pop() {
            if let Ok(mut material) = screen_materials.get_mut(entity) {
                material.0 = screen.clone();
                swapped += 1;
            }
            if let Ok(children) = children_query.get(entity) {
                pending.extend(children.iter());
            }
        }

        info!(?anchor, ?group, swapped, "Screen anchor found, overlay created");
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_extras_match_name_field() {
        assert!(extras_match(r#"{"name":"Screen"}"#, "Screen"));
        assert!(extras_match(r#"{"name": "Screen", "other": 1}"#, "Screen"));
    }

    #[test]
    fn test_extras_mismatch() {
        assert!(!extras_match(r#"{"name":"Body"}"#, "Screen"));
        assert!(!extras_match(r#"{"label":"Screen"}"#, "Screen"));
        assert!(!extras_match(r#"{"name":1}"#, "Screen"));
        assert!(!extras_match("not json", "Screen"));
    }

    #[test]
    fn test_anchor_found_by_name_under_model() {
        let mut app = App::new();
        let screen = app.world_mut().spawn((Transform::default(), Name::new("Screen"))).id();
        let body = app.world_mut().spawn((Transform::default(), Name::new("Body"))).id();
        app.world_mut().entity_mut(body).add_child(screen);
        let root = app.world_mut().spawn((Transform::default(), PlayerModel)).id();
        app.world_mut().entity_mut(root).add_child(body);

        let found = app
            .world_mut()
            .run_system_once(move |children: Query<&Children>, names: Query<&Name>| {
                find_in_subtree(root, &children, &|e| {
                    names.get(e).is_ok_and(|n| n.as_str() == "Screen")
                })
            })
            .unwrap();
        assert_eq!(found, Some(screen));
    }

    #[test]
    fn test_anchor_prefers_extras_over_name() {
        let mut app = App::new();
        let named = app.world_mut().spawn(Name::new("Screen")).id();
        let tagged = app
            .world_mut()
            .spawn(GltfExtras {
                value: r#"{"name":"Screen"}"#.to_string(),
            })
            .id();
        let root = app.world_mut().spawn(PlayerModel).id();
        app.world_mut().entity_mut(root).add_children(&[named, tagged]);

        let found = app
            .world_mut()
            .run_system_once(
                move |children: Query<&Children>, names: Query<&Name>, extras: Query<&GltfExtras>| {
                    find_in_subtree(root, &children, &|e| {
                        extras.get(e).is_ok_and(|x| extras_match(&x.value, "Screen"))
                    })
                    .or_else(|| {
                        find_in_subtree(root, &children, &|e| {
                            names.get(e).is_ok_and(|n| n.as_str() == "Screen")
                        })
                    })
                },
            )
            .unwrap();
        assert_eq!(found, Some(tagged));
    }
}
