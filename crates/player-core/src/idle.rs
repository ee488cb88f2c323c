//! Idle motion: a slow bob and yaw sway driven only by elapsed time

use glam::{EulerRot, Quat};
use std::f32::consts::PI;

use crate::config::IdleConfig;
use crate::math::Transform;

/// Model pose offsets for one instant
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct IdlePose {
    /// Vertical offset
    pub bob: f32,
    /// Rotation about +Y in radians
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdleMotion {
    bob_amplitude: f32,
    bob_frequency: f32,
    sway_amplitude: f32,
    sway_frequency: f32,
}

impl IdleMotion {
    pub fn new(config: &IdleConfig) -> Self {
        Self {
            bob_amplitude: config.bob_amplitude,
            bob_frequency: config.bob_frequency,
            sway_amplitude: config.sway_amplitude,
            sway_frequency: config.sway_frequency,
        }
    }

    pub fn pose_at(&self, time: f32) -> IdlePose {
        IdlePose {
            bob: (time * self.bob_frequency).sin() * self.bob_amplitude,
            yaw: (time * self.sway_frequency).sin() * PI * self.sway_amplitude,
        }
    }

    /// Largest |bob| and |yaw| this motion can produce
    pub fn bounds(&self) -> IdlePose {
        IdlePose {
            bob: self.bob_amplitude.abs(),
            yaw: PI * self.sway_amplitude.abs(),
        }
    }
}

impl Default for IdleMotion {
    fn default() -> Self {
        Self::new(&IdleConfig::default())
    }
}

impl IdlePose {
    /// Write this pose onto a model's rest transform: y is replaced by the
    /// bob, the Y Euler angle by the yaw; x, z and the other two angles keep
    /// their rest values.
    pub fn apply(&self, rest: &Transform, target: &mut Transform) {
        let (rx, _, rz) = rest.euler_xyz();
        target.translation.x = rest.translation.x;
        target.translation.y = self.bob;
        target.translation.z = rest.translation.z;
        target.rotation = Quat::from_euler(EulerRot::XYZ, rx, self.yaw, rz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_pose_at_zero_is_rest() {
        let pose = IdleMotion::default().pose_at(0.0);
        assert_eq!(pose.bob, 0.0);
        assert_eq!(pose.yaw, 0.0);
    }

    #[test]
    fn test_pose_bounded_over_long_runs() {
        let motion = IdleMotion::default();
        let bounds = motion.bounds();
        let mut t = 0.0_f32;
        while t < 10_000.0 {
            let pose = motion.pose_at(t);
            assert!(pose.bob.abs() <= bounds.bob + 1e-6);
            assert!(pose.yaw.abs() <= bounds.yaw + 1e-6);
            t += 0.37;
        }
        assert!((bounds.bob - 0.1).abs() < 1e-7);
        assert!((bounds.yaw - PI * 0.05).abs() < 1e-7);
    }

    #[test]
    fn test_pose_peaks() {
        let motion = IdleMotion::default();
        let pose = motion.pose_at(std::f32::consts::FRAC_PI_2);
        assert!((pose.bob - 0.1).abs() < 1e-6);

        let pose = motion.pose_at(PI);
        assert!((pose.yaw - PI * 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_apply_keeps_rest_components() {
        let rest = Transform::from_xyz(0.3, 0.0, -0.2)
            .with_rotation(Quat::from_rotation_x(0.1))
            .with_scale(Vec3::splat(2.0));
        let mut current = rest;
        let pose = IdlePose { bob: 0.05, yaw: 0.12 };
        pose.apply(&rest, &mut current);

        assert_eq!(current.translation, Vec3::new(0.3, 0.05, -0.2));
        assert_eq!(current.scale, Vec3::splat(2.0));
        let (rx, ry, rz) = current.euler_xyz();
        assert!((rx - 0.1).abs() < 1e-5);
        assert!((ry - 0.12).abs() < 1e-5);
        assert!(rz.abs() < 1e-5);
    }
}
