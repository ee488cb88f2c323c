//! Camera rig: pointer-driven drift with per-frame easing

use glam::{Vec2, Vec3};

use crate::config::CameraConfig;
use crate::math::{lerp, Transform};

/// Camera position easing toward a pointer-derived target while always
/// aiming at a fixed point.
///
/// The easing step is a fixed fraction per frame, not scaled by delta time,
/// so drift speed follows the display refresh rate.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    position: Vec3,
    target: Vec3,
    look_at: Vec3,
    easing_rate: f32,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        let start = Vec3::from_array(config.start);
        Self {
            position: start,
            target: start,
            look_at: Vec3::from_array(config.look_at),
            easing_rate: config.easing_rate,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn look_at_point(&self) -> Vec3 {
        self.look_at
    }

    /// Set the x/y drift target; z stays where it is
    pub fn set_target(&mut self, xy: Vec2) {
        self.target.x = xy.x;
        self.target.y = xy.y;
    }

    /// One easing step on x and y
    pub fn step(&mut self) -> Vec3 {
        self.position.x = lerp(self.position.x, self.target.x, self.easing_rate);
        self.position.y = lerp(self.position.y, self.target.y, self.easing_rate);
        self.position
    }

    /// Camera transform for the current position, aimed at the look-at point
    pub fn transform(&self) -> Transform {
        let mut transform = Transform::from_translation(self.position);
        transform.look_at(self.look_at, Vec3::Y);
        transform
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_rest() {
        let mut rig = CameraRig::default();
        let start = rig.position();
        assert_eq!(rig.step(), start);
        assert_eq!(start, Vec3::new(0.0, 1.25, 3.5));
    }

    #[test]
    fn test_step_is_contraction_without_overshoot() {
        let mut rig = CameraRig::default();
        rig.set_target(Vec2::new(0.75, 0.95));

        let mut previous = rig.position().distance(rig.target());
        for _ in 0..200 {
            let p = rig.step();
            let distance = p.distance(rig.target());
            assert!(distance < previous);
            // Never past the target on either axis
            assert!(p.x <= rig.target().x);
            assert!(p.y >= rig.target().y);
            previous = distance;
        }
    }

    #[test]
    fn test_z_never_moves() {
        let mut rig = CameraRig::default();
        rig.set_target(Vec2::new(-0.5, 1.5));
        for _ in 0..50 {
            assert_eq!(rig.step().z, 3.5);
        }
        assert_eq!(rig.target().z, 3.5);
    }

    #[test]
    fn test_converges_in_five_seconds_at_60hz() {
        let mut rig = CameraRig::default();
        let start = rig.position();
        rig.set_target(Vec2::new(start.x + 1.0, start.y));
        for _ in 0..300 {
            rig.step();
        }
        assert!((rig.position().x - rig.target().x).abs() < 1e-6);
    }

    #[test]
    fn test_transform_aims_at_fixed_point() {
        let mut rig = CameraRig::default();
        rig.set_target(Vec2::new(0.6, 1.4));
        for _ in 0..10 {
            rig.step();
        }
        let t = rig.transform();
        let forward = t.rotation * Vec3::NEG_Z;
        let expected = (rig.look_at_point() - t.translation).normalize();
        assert!(forward.abs_diff_eq(expected, 1e-5));
    }
}
