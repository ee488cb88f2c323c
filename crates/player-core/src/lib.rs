//! Player Core - engine-agnostic scene motion and overlay sync
//!
//! This crate holds everything about the player scene that is not tied to a
//! renderer:
//! - The per-frame motion/sync loop (camera drift, idle motion, overlay
//!   anchoring, noise time)
//! - An arena scene store with generational handles
//! - Pointer mapping, resize handling and projection math
//! - CSS 3D compositing math for the HTML overlay
//! - Configuration loading

pub mod camera;
pub mod clock;
pub mod config;
pub mod css3d;
pub mod frame;
pub mod idle;
pub mod math;
pub mod overlay;
pub mod pointer;
pub mod post;
pub mod resize;
pub mod scene;

pub use glam;

pub use camera::CameraRig;
pub use clock::{FixedStepClock, FrameClock, TimeAccumulator};
pub use config::{load_config, save_default_config, ConfigError, SceneConfig};
pub use frame::{FrameReport, MotionSyncLoop};
pub use idle::{IdleMotion, IdlePose};
pub use math::Transform;
pub use overlay::{OverlayNodes, OverlayPlane};
pub use pointer::PointerMapper;
pub use post::{FilmGrain, Ssao, SsaoQuality};
pub use resize::{BufferSize, Projection, ResizeReactor, ViewportSink, ViewportSize};
pub use scene::{NodeId, SceneAccess, SceneError, SceneStore};
