//! Scene configuration
//!
//! Every value has a default equal to the tuned constant the scene ships
//! with, so an empty file (or no file) reproduces the original look.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Starting position; also the starting target
    #[serde(default = "default_start")]
    pub start: [f32; 3],
    /// Fixed point the camera re-aims at every frame
    #[serde(default = "default_look_at")]
    pub look_at: [f32; 3],
    /// Fraction of the remaining distance covered per frame
    #[serde(default = "default_easing_rate")]
    pub easing_rate: f32,
    /// Pointer-to-target scale for x and y
    #[serde(default = "default_target_scale")]
    pub target_scale: [f32; 2],
    /// Target y when the pointer is centred
    #[serde(default = "default_target_base_y")]
    pub target_base_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            start: default_start(),
            look_at: default_look_at(),
            easing_rate: default_easing_rate(),
            target_scale: default_target_scale(),
            target_base_y: default_target_base_y(),
        }
    }
}

fn default_fov() -> f32 {
    55.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    2000.0
}

fn default_start() -> [f32; 3] {
    [0.0, 1.25, 3.5]
}

fn default_look_at() -> [f32; 3] {
    [0.0, 1.3, 0.0]
}

fn default_easing_rate() -> f32 {
    0.05
}

fn default_target_scale() -> [f32; 2] {
    [0.75, 0.3]
}

fn default_target_base_y() -> f32 {
    1.25
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleConfig {
    /// Vertical bob amplitude
    #[serde(default = "default_bob_amplitude")]
    pub bob_amplitude: f32,
    /// Bob phase multiplier on elapsed time
    #[serde(default = "default_bob_frequency")]
    pub bob_frequency: f32,
    /// Yaw amplitude as a fraction of pi
    #[serde(default = "default_sway_amplitude")]
    pub sway_amplitude: f32,
    /// Yaw phase multiplier on elapsed time
    #[serde(default = "default_sway_frequency")]
    pub sway_frequency: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            bob_amplitude: default_bob_amplitude(),
            bob_frequency: default_bob_frequency(),
            sway_amplitude: default_sway_amplitude(),
            sway_frequency: default_sway_frequency(),
        }
    }
}

fn default_bob_amplitude() -> f32 {
    0.1
}

fn default_bob_frequency() -> f32 {
    1.0
}

fn default_sway_amplitude() -> f32 {
    0.05
}

fn default_sway_frequency() -> f32 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Tag of the model node the overlay mounts on
    #[serde(default = "default_anchor_tag")]
    pub anchor_tag: String,
    /// Panel size in CSS pixels
    #[serde(default = "default_overlay_width")]
    pub width_px: u32,
    #[serde(default = "default_overlay_height")]
    pub height_px: u32,
    #[serde(default = "default_border_radius")]
    pub border_radius_px: u32,
    /// World units per CSS pixel
    #[serde(default = "default_overlay_scale")]
    pub scale: f32,
    /// Rotation about X applied to the panel inside its group, in radians
    #[serde(default = "default_overlay_tilt")]
    pub tilt: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            anchor_tag: default_anchor_tag(),
            width_px: default_overlay_width(),
            height_px: default_overlay_height(),
            border_radius_px: default_border_radius(),
            scale: default_overlay_scale(),
            tilt: default_overlay_tilt(),
        }
    }
}

fn default_anchor_tag() -> String {
    "Screen".to_string()
}

fn default_overlay_width() -> u32 {
    1024
}

fn default_overlay_height() -> u32 {
    682
}

fn default_border_radius() -> u32 {
    100
}

fn default_overlay_scale() -> f32 {
    0.0015
}

fn default_overlay_tilt() -> f32 {
    -std::f32::consts::FRAC_PI_2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostConfig {
    /// Film-grain strength added to each channel
    #[serde(default = "default_grain_amount")]
    pub grain_amount: f32,
    #[serde(default = "default_true")]
    pub ssao: bool,
    #[serde(default = "default_kernel_radius")]
    pub ssao_kernel_radius: f32,
    #[serde(default = "default_ssao_min_distance")]
    pub ssao_min_distance: f32,
    #[serde(default = "default_ssao_max_distance")]
    pub ssao_max_distance: f32,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            grain_amount: default_grain_amount(),
            ssao: true,
            ssao_kernel_radius: default_kernel_radius(),
            ssao_min_distance: default_ssao_min_distance(),
            ssao_max_distance: default_ssao_max_distance(),
        }
    }
}

fn default_grain_amount() -> f32 {
    0.085
}

fn default_true() -> bool {
    true
}

fn default_kernel_radius() -> f32 {
    16.0
}

fn default_ssao_min_distance() -> f32 {
    0.001
}

fn default_ssao_max_distance() -> f32 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Site base path the model is served under
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Upper bound on the device pixel ratio used for buffers
    #[serde(default = "default_max_pixel_ratio")]
    pub max_pixel_ratio: f32,
    #[serde(default = "default_environment_intensity")]
    pub environment_intensity: f32,
    /// Canvas selector the renderer attaches to
    #[serde(default = "default_canvas")]
    pub canvas: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_path: default_model_path(),
            max_pixel_ratio: default_max_pixel_ratio(),
            environment_intensity: default_environment_intensity(),
            canvas: default_canvas(),
        }
    }
}

fn default_base_url() -> String {
    "/Music/".to_string()
}

fn default_model_path() -> String {
    "player.glb".to_string()
}

fn default_max_pixel_ratio() -> f32 {
    2.0
}

fn default_environment_intensity() -> f32 {
    2.0
}

fn default_canvas() -> String {
    "#player-canvas".to_string()
}

impl RenderConfig {
    /// Directory assets are fetched from, without the trailing slash
    pub fn asset_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Model URL relative to the site root, e.g. `/Music/player.glb`
    pub fn model_url(&self) -> String {
        let path = self.model_path.trim_start_matches('/');
        let root = self.asset_root();
        if root.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", root, path)
        }
    }
}

impl SceneConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the scene cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.easing_rate > 0.0 && cam.easing_rate <= 1.0) {
            return Err(invalid("camera.easing_rate", format!("{} is outside (0, 1]", cam.easing_rate)));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(invalid(
                "camera.near",
                format!("need 0 < near < far, got near={} far={}", cam.near, cam.far),
            ));
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(invalid("camera.fov_degrees", format!("{} is outside (0, 180)", cam.fov_degrees)));
        }
        if self.overlay.width_px == 0 || self.overlay.height_px == 0 {
            return Err(invalid("overlay.width_px", "panel size must be nonzero".to_string()));
        }
        if self.overlay.scale <= 0.0 {
            return Err(invalid("overlay.scale", format!("{} must be positive", self.overlay.scale)));
        }
        if self.overlay.anchor_tag.trim().is_empty() {
            return Err(invalid("overlay.anchor_tag", "must not be empty".to_string()));
        }
        if self.render.max_pixel_ratio < 1.0 {
            return Err(invalid(
                "render.max_pixel_ratio",
                format!("{} must be at least 1", self.render.max_pixel_ratio),
            ));
        }
        if self.post.grain_amount < 0.0 {
            return Err(invalid("post.grain_amount", format!("{} must not be negative", self.post.grain_amount)));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Load configuration from file, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<SceneConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = SceneConfig::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(SceneConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = SceneConfig::default().to_toml_string()?;
    std::fs::write(path, content)?;
    Ok(())
}
