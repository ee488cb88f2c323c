//! CSS 3D compositing math
//!
//! Places HTML elements in the 3D scene by handing the browser CSS
//! `matrix3d` transforms that line up with the WebGL projection. Three
//! elements are involved: the compositor root carries the `perspective`,
//! a camera element carries the inverse camera transform, and each object
//! element carries its own world matrix. CSS has y pointing down, so the
//! camera matrix flips its second row and the object matrix its second
//! column.

use glam::Mat4;
use std::collections::HashMap;
use std::fmt::Write;

use crate::math::Transform;
use crate::resize::{Projection, ViewportSize};

/// Styles for the compositor root and the camera element
#[derive(Debug, Clone, PartialEq)]
pub struct CameraStyle {
    /// Value for the root's `perspective` property, in pixels
    pub perspective_px: f32,
    /// Value for the camera element's `transform` property
    pub transform: String,
}

fn epsilon(value: f32) -> f32 {
    if value.abs() < 1e-10 {
        0.0
    } else {
        value
    }
}

fn matrix3d(elements: &[f32; 16]) -> String {
    let mut out = String::from("matrix3d(");
    for (i, value) in elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Writing into a String cannot fail
        let _ = write!(out, "{}", epsilon(*value));
    }
    out.push(')');
    out
}

/// Distance in pixels from the viewer to the z=0 plane that makes CSS
/// perspective match the projection's vertical field of view
pub fn perspective_px(projection: &Projection, viewport: &ViewportSize) -> f32 {
    projection.matrix().y_axis.y * viewport.height * 0.5
}

/// `matrix3d(...)` for a camera view matrix, second row negated
pub fn camera_matrix3d(view: &Mat4) -> String {
    let mut e = view.to_cols_array();
    for i in [1, 5, 9, 13] {
        e[i] = -e[i];
    }
    matrix3d(&e)
}

/// `matrix3d(...)` for an object's world matrix, second column negated
pub fn object_matrix3d(world: &Mat4) -> String {
    let mut e = world.to_cols_array();
    for value in &mut e[4..8] {
        *value = -*value;
    }
    matrix3d(&e)
}

/// Root perspective and camera element transform for the current frame
pub fn camera_style(
    camera_world: &Transform,
    projection: &Projection,
    viewport: &ViewportSize,
) -> CameraStyle {
    let fov = perspective_px(projection, viewport);
    let view = camera_world.to_matrix().inverse();
    let transform = format!(
        "translateZ({}px){}translate({}px,{}px)",
        fov,
        camera_matrix3d(&view),
        viewport.width * 0.5,
        viewport.height * 0.5
    );
    CameraStyle {
        perspective_px: fov,
        transform,
    }
}

/// Transform for an object element; the element is first centred on its
/// own origin
pub fn object_style(world: &Transform) -> String {
    format!("translate(-50%,-50%){}", object_matrix3d(&world.to_matrix()))
}

/// Remembers the last style written per element so unchanged styles are
/// not written again
#[derive(Debug, Clone, Default)]
pub struct StyleCache {
    written: HashMap<String, String>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(style)` when `style` differs from what was last
    /// recorded for `key` (and records it), `None` otherwise
    pub fn update<'a>(&mut self, key: &str, style: &'a str) -> Option<&'a str> {
        match self.written.get(key) {
            Some(previous) if previous == style => None,
            _ => {
                self.written.insert(key.to_string(), style.to_string());
                Some(style)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use glam::Vec3;

    fn projection() -> Projection {
        Projection::new(&CameraConfig::default(), 1280.0 / 720.0)
    }

    fn viewport() -> ViewportSize {
        ViewportSize::new(1280.0, 720.0, 1.0)
    }

    #[test]
    fn test_perspective_matches_fov() {
        let fov = perspective_px(&projection(), &viewport());
        let expected = 360.0 / (55.0_f32.to_radians() / 2.0).tan();
        assert!((fov - expected).abs() < 1e-2);
    }

    #[test]
    fn test_identity_matrices() {
        assert_eq!(
            camera_matrix3d(&Mat4::IDENTITY),
            "matrix3d(1,0,0,0,0,-1,0,0,0,0,1,0,0,0,0,1)"
        );
        assert_eq!(
            object_matrix3d(&Mat4::IDENTITY),
            "matrix3d(1,0,0,0,0,-1,0,0,0,0,1,0,0,0,0,1)"
        );
    }

    #[test]
    fn test_translation_signs() {
        let m = Mat4::from_translation(Vec3::new(2.0, 3.0, 4.0));
        // Object: translation column untouched
        assert!(object_matrix3d(&m).ends_with(",2,3,4,1)"));
        // Camera: y translation flipped
        assert!(camera_matrix3d(&m).ends_with(",2,-3,4,1)"));
    }

    #[test]
    fn test_tiny_values_written_as_zero() {
        let mut m = Mat4::IDENTITY;
        m.w_axis.x = 1e-12;
        assert!(object_matrix3d(&m).ends_with(",0,0,0,1)"));
    }

    #[test]
    fn test_camera_style_layout() {
        let camera = Transform::from_xyz(0.0, 0.0, 5.0);
        let style = camera_style(&camera, &projection(), &viewport());
        assert!(style.transform.starts_with(&format!("translateZ({}px)matrix3d(", style.perspective_px)));
        assert!(style.transform.ends_with("translate(640px,360px)"));
        // View matrix of a camera at z=5 pushes the scene back by 5
        assert!(style.transform.contains(",0,-0,-5,1)") || style.transform.contains(",0,0,-5,1)"));
    }

    #[test]
    fn test_object_style_prefix() {
        let style = object_style(&Transform::IDENTITY);
        assert!(style.starts_with("translate(-50%,-50%)matrix3d("));
    }

    #[test]
    fn test_style_cache_skips_unchanged() {
        let mut cache = StyleCache::new();
        assert_eq!(cache.update("camera", "a"), Some("a"));
        assert_eq!(cache.update("camera", "a"), None);
        assert_eq!(cache.update("camera", "b"), Some("b"));
        assert_eq!(cache.update("overlay", "a"), Some("a"));
    }
}
