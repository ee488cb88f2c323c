//! Pointer input mapping

use glam::Vec2;

use crate::config::CameraConfig;
use crate::resize::ViewportSize;

/// Map a pointer position in CSS pixels (origin top-left, y down) to
/// normalized device coordinates: top-left is `(-1, 1)`, bottom-right is
/// `(1, -1)`.
pub fn normalize_pointer(x: f32, y: f32, viewport: &ViewportSize) -> Vec2 {
    Vec2::new(
        (x / viewport.width) * 2.0 - 1.0,
        -(y / viewport.height) * 2.0 + 1.0,
    )
}

/// Camera drift target for a normalized pointer position
///
/// Only x and y are returned; the camera's z never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerMapper {
    scale: Vec2,
    base_y: f32,
}

impl PointerMapper {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            scale: Vec2::from_array(config.target_scale),
            base_y: config.target_base_y,
        }
    }

    pub fn target_for(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(ndc.x * self.scale.x, self.base_y + ndc.y * self.scale.y)
    }

    /// Raw pixel position straight to camera target
    pub fn map(&self, x: f32, y: f32, viewport: &ViewportSize) -> Vec2 {
        self.target_for(normalize_pointer(x, y, viewport))
    }
}

impl Default for PointerMapper {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportSize {
        ViewportSize::new(1280.0, 720.0, 1.0)
    }

    #[test]
    fn test_corners_and_centre() {
        let vp = viewport();
        assert_eq!(normalize_pointer(0.0, 0.0, &vp), Vec2::new(-1.0, 1.0));
        assert_eq!(normalize_pointer(1280.0, 720.0, &vp), Vec2::new(1.0, -1.0));
        assert_eq!(normalize_pointer(640.0, 360.0, &vp), Vec2::ZERO);
    }

    #[test]
    fn test_mapping_is_linear() {
        let vp = viewport();
        let a = normalize_pointer(100.0, 50.0, &vp);
        let b = normalize_pointer(300.0, 250.0, &vp);
        let mid = normalize_pointer(200.0, 150.0, &vp);
        assert!(((a + b) * 0.5).abs_diff_eq(mid, 1e-6));
    }

    #[test]
    fn test_target_scale() {
        let mapper = PointerMapper::default();
        assert_eq!(mapper.target_for(Vec2::ZERO), Vec2::new(0.0, 1.25));

        let top_right = mapper.target_for(Vec2::new(1.0, 1.0));
        assert!(top_right.abs_diff_eq(Vec2::new(0.75, 1.55), 1e-6));

        let bottom_left = mapper.map(0.0, 720.0, &viewport());
        assert!(bottom_left.abs_diff_eq(Vec2::new(-0.75, 0.95), 1e-6));
    }
}
