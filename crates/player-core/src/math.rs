//! Transform math shared by the scene store, the motion loop and the hosts

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Linear interpolation `a + (b - a) * t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position, rotation and scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Affine matrix (scale, then rotation, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix back into position, rotation and scale
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose `self` (parent) with `child`, giving the child's transform in
    /// the parent's space
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform::from_matrix(&(self.to_matrix() * child.to_matrix()))
    }

    /// Rotate so that -Z points at `target`, keeping `up` as close to +Y of
    /// the result as possible. Leaves the rotation alone when `target`
    /// coincides with the translation.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if let Some(rotation) = look_rotation(self.translation, target, up) {
            self.rotation = rotation;
        }
    }

    /// Euler angles in XYZ order (the convention glTF tooling exports)
    pub fn euler_xyz(&self) -> (f32, f32, f32) {
        self.rotation.to_euler(EulerRot::XYZ)
    }

    /// Component-wise comparison within `epsilon`. Rotations compare as
    /// orientations, so `q` and `-q` are equal.
    pub fn abs_diff_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
            && (self.rotation.abs_diff_eq(other.rotation, epsilon)
                || self.rotation.abs_diff_eq(-other.rotation, epsilon))
    }
}

/// Rotation of an object at `eye` whose -Z axis faces `target`
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Option<Quat> {
    let back = (eye - target).try_normalize()?;
    let right = up.cross(back).try_normalize()?;
    let up = back.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, back)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert!((lerp(2.0, 4.0, 0.05) - 2.1).abs() < 1e-6);
    }

    #[test]
    fn test_matrix_round_trip_keeps_components() {
        let t = Transform::from_xyz(1.0, -2.0, 0.5)
            .with_rotation(Quat::from_rotation_y(0.3) * Quat::from_rotation_x(-0.2))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let back = Transform::from_matrix(&t.to_matrix());
        assert!(t.abs_diff_eq(&back, 1e-5));
    }

    #[test]
    fn test_mul_transform_applies_parent_rotation_to_child_offset() {
        let parent = Transform::from_xyz(0.0, 1.0, 0.0).with_rotation(Quat::from_rotation_y(FRAC_PI_2));
        let child = Transform::from_xyz(1.0, 0.0, 0.0);
        let world = parent.mul_transform(&child);
        // +X rotated a quarter turn about Y lands on -Z
        assert!(world.translation.abs_diff_eq(Vec3::new(0.0, 1.0, -1.0), 1e-5));
    }

    #[test]
    fn test_look_at_faces_target() {
        let mut t = Transform::from_xyz(0.0, 1.25, 3.5);
        let target = Vec3::new(0.0, 1.3, 0.0);
        t.look_at(target, Vec3::Y);
        let forward = t.rotation * Vec3::NEG_Z;
        let expected = (target - t.translation).normalize();
        assert!(forward.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_look_at_degenerate_keeps_rotation() {
        let mut t = Transform::from_xyz(0.0, 1.0, 0.0).with_rotation(Quat::from_rotation_z(0.4));
        let before = t.rotation;
        t.look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(t.rotation, before);
    }
}
