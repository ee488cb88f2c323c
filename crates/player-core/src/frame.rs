//! Motion/sync loop
//!
//! One `tick` per displayed frame. Order within a tick:
//!
//! 1. advance the time accumulator by the frame delta
//! 2. ease the camera toward its pointer-derived target (x and y only)
//! 3. re-aim the camera at the fixed look-at point
//! 4. apply idle bob and sway to the model (once it has loaded)
//! 5. copy the anchor's world transform onto the overlay group (once the
//!    anchor has been found); this reads the pose written in step 4, so it
//!    must come after it
//! 6. hand the accumulated time to the noise pass
//!
//! Pointer moves only retarget the camera; they never move it directly.

use glam::{Vec2, Vec3};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{info, trace, warn};

use crate::camera::CameraRig;
use crate::clock::{FrameClock, TimeAccumulator};
use crate::config::SceneConfig;
use crate::idle::{IdleMotion, IdlePose};
use crate::math::Transform;
use crate::overlay::{OverlayNodes, OverlayPlane};
use crate::pointer::PointerMapper;
use crate::resize::ViewportSize;
use crate::scene::{NodeId, SceneAccess, SceneError, SceneStore};

/// Model root and the transform it had when it finished loading
#[derive(Debug, Clone, Copy)]
struct ModelBinding<H> {
    root: H,
    rest: Transform,
}

/// What a single tick did
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub time: f32,
    pub camera: Vec3,
    /// Idle pose written to the model, if the model is loaded
    pub model: Option<IdlePose>,
    /// Transform written to the overlay group, if the anchor is resolved
    pub overlay: Option<Transform>,
}

pub struct MotionSyncLoop<H> {
    time: TimeAccumulator,
    rig: CameraRig,
    mapper: PointerMapper,
    idle: IdleMotion,
    camera: H,
    model: Option<ModelBinding<H>>,
    anchor: Option<H>,
    overlay_group: Option<H>,
}

impl<H: Copy + Debug> MotionSyncLoop<H> {
    pub fn new(config: &SceneConfig, camera: H) -> Self {
        Self {
            time: TimeAccumulator::new(),
            rig: CameraRig::new(&config.camera),
            mapper: PointerMapper::new(&config.camera),
            idle: IdleMotion::new(&config.idle),
            camera,
            model: None,
            anchor: None,
            overlay_group: None,
        }
    }

    pub fn time(&self) -> f32 {
        self.time.elapsed()
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn camera(&self) -> H {
        self.camera
    }

    pub fn anchor(&self) -> Option<H> {
        self.anchor
    }

    pub fn overlay_group(&self) -> Option<H> {
        self.overlay_group
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn is_anchor_resolved(&self) -> bool {
        self.anchor.is_some() && self.overlay_group.is_some()
    }

    /// Retarget the camera from a raw pointer position in CSS pixels
    pub fn on_pointer_move(&mut self, x: f32, y: f32, viewport: &ViewportSize) -> Vec2 {
        let target = self.mapper.map(x, y, viewport);
        self.rig.set_target(target);
        trace!(x, y, target_x = target.x, target_y = target.y, "Pointer moved");
        target
    }

    /// Start idle motion on a freshly loaded model. `rest` is the root's
    /// local transform as loaded.
    pub fn attach_model(&mut self, root: H, rest: Transform) {
        if self.model.is_some() {
            warn!(?root, "Model already attached, keeping the first one");
            return;
        }
        info!(?root, "Model attached");
        self.model = Some(ModelBinding { root, rest });
    }

    /// Publish the anchor and the overlay group that follows it. The overlay
    /// is created once; later calls are ignored and return `false`.
    pub fn attach_anchor(&mut self, anchor: H, overlay_group: H) -> bool {
        if self.is_anchor_resolved() {
            warn!(?anchor, "Anchor already resolved, ignoring");
            return false;
        }
        info!(?anchor, ?overlay_group, "Anchor resolved, overlay will follow it");
        self.anchor = Some(anchor);
        self.overlay_group = Some(overlay_group);
        true
    }

    /// Pull the frame delta from `clock` and tick
    pub fn run<C, S>(&mut self, clock: &mut C, scene: &mut S) -> Result<FrameReport, SceneError>
    where
        C: FrameClock,
        S: SceneAccess<Handle = H>,
    {
        let delta = clock.delta();
        self.tick(delta, scene)
    }

    pub fn tick<S>(&mut self, delta: f32, scene: &mut S) -> Result<FrameReport, SceneError>
    where
        S: SceneAccess<Handle = H>,
    {
        let time = self.time.advance(delta);

        let camera = self.rig.step();
        scene.set_local(self.camera, self.rig.transform())?;

        let model = match self.model {
            Some(binding) => {
                let pose = self.idle.pose_at(time);
                scene.modify_local(binding.root, |t| pose.apply(&binding.rest, t))?;
                Some(pose)
            }
            None => None,
        };

        let overlay = match (self.anchor, self.overlay_group) {
            (Some(anchor), Some(group)) => {
                let world = scene.world_transform(anchor)?;
                scene.set_local(group, world)?;
                Some(world)
            }
            _ => None,
        };

        scene.set_noise_time(time);

        trace!(time, synced = overlay.is_some(), "Frame");
        Ok(FrameReport {
            time,
            camera,
            model,
            overlay,
        })
    }
}

impl MotionSyncLoop<NodeId> {
    /// Arena-side model load completion: remember the model root, look for
    /// the anchor tag in its subtree and, if present, create the overlay
    /// nodes and attach them. Returns the overlay nodes when the anchor was
    /// found.
    pub fn load_model(
        &mut self,
        store: &mut SceneStore,
        root: NodeId,
        anchor_tag: &str,
        plane: &OverlayPlane,
    ) -> Result<Option<OverlayNodes<NodeId>>, SceneError> {
        self.attach_model(root, *store.local(root)?);

        let Some(anchor) = store.find_by_tag(root, anchor_tag)? else {
            warn!(tag = anchor_tag, "Model has no anchor node, overlay stays hidden");
            return Ok(None);
        };

        let nodes = plane.spawn(store)?;
        self.attach_anchor(anchor, nodes.group);
        Ok(Some(nodes))
    }
}
