//! Conversions between `player-core` transforms and Bevy transforms
//!
//! Goes through plain arrays so the two crates never need to agree on a
//! glam version.

use bevy::prelude::*;
use player_core::glam;
use player_core::math::Transform as CoreTransform;

pub fn to_bevy(t: &CoreTransform) -> Transform {
    Transform {
        translation: Vec3::from_array(t.translation.to_array()),
        rotation: Quat::from_array(t.rotation.to_array()),
        scale: Vec3::from_array(t.scale.to_array()),
    }
}

pub fn from_bevy(t: &Transform) -> CoreTransform {
    CoreTransform {
        translation: glam::Vec3::from_array(t.translation.to_array()),
        rotation: glam::Quat::from_array(t.rotation.to_array()),
        scale: glam::Vec3::from_array(t.scale.to_array()),
    }
}

pub fn from_global(t: &GlobalTransform) -> CoreTransform {
    let (scale, rotation, translation) = t.to_scale_rotation_translation();
    from_bevy(&Transform {
        translation,
        rotation,
        scale,
    })
}
