//! Overlay plane: the HTML panel mounted on the model's screen
//!
//! The overlay is two nodes. The group sits at the scene root and receives
//! the anchor's world transform every frame; the content node is the
//! group's child and carries a fixed local transform that turns CSS pixels
//! into world units and lays the panel onto the screen surface.

use glam::{Quat, Vec3};

use crate::config::OverlayConfig;
use crate::math::Transform;
use crate::scene::{NodeId, SceneError, SceneStore};

/// Handles of the two overlay nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayNodes<H> {
    pub group: H,
    pub content: H,
}

/// Panel size and placement
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlane {
    pub width_px: u32,
    pub height_px: u32,
    pub border_radius_px: u32,
    scale: f32,
    tilt: f32,
}

impl OverlayPlane {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            width_px: config.width_px,
            height_px: config.height_px,
            border_radius_px: config.border_radius_px,
            scale: config.scale,
            tilt: config.tilt,
        }
    }

    /// Local transform of the content node inside the group
    pub fn content_transform(&self) -> Transform {
        Transform::IDENTITY
            .with_rotation(Quat::from_rotation_x(self.tilt))
            .with_scale(Vec3::splat(self.scale))
    }

    /// Create the group and content nodes in an arena scene. The group
    /// starts at identity until the first sync.
    pub fn spawn(&self, store: &mut SceneStore) -> Result<OverlayNodes<NodeId>, SceneError> {
        let group = store.spawn("overlay-group", None, Transform::IDENTITY)?;
        let content = store.spawn("overlay-content", Some(group), self.content_transform())?;
        Ok(OverlayNodes { group, content })
    }
}

impl Default for OverlayPlane {
    fn default() -> Self {
        Self::new(&OverlayConfig::default())
    }
}
