//! Viewport size, projection and the resize reactor

use glam::Mat4;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CameraConfig, RenderConfig};

/// Viewport in CSS pixels plus the device pixel ratio reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Size of a pixel-dimensioned render buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// Right-handed, OpenGL-style clip space (depth -1..1)
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Anything holding pixel-sized buffers that must follow the viewport
pub trait ViewportSink {
    fn resize(&mut self, viewport: &ViewportSize, buffer: BufferSize);
}

/// What a resize produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    pub aspect: f32,
    pub buffer: BufferSize,
    pub changed: bool,
}

/// Recomputes projection and buffer sizes when the viewport changes
#[derive(Debug, Clone)]
pub struct ResizeReactor {
    max_pixel_ratio: f32,
    last: Option<ViewportSize>,
}

impl ResizeReactor {
    pub fn new(render: &RenderConfig) -> Self {
        Self {
            max_pixel_ratio: render.max_pixel_ratio,
            last: None,
        }
    }

    /// Pixel ratio actually used for buffers
    pub fn effective_pixel_ratio(&self, viewport: &ViewportSize) -> f32 {
        viewport.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    pub fn buffer_size(&self, viewport: &ViewportSize) -> BufferSize {
        let ratio = self.effective_pixel_ratio(viewport);
        BufferSize {
            width: ((viewport.width * ratio).round() as u32).max(1),
            height: ((viewport.height * ratio).round() as u32).max(1),
        }
    }

    /// Handle one viewport notification. Every call is processed; sinks are
    /// only touched when the size actually differs from the last one seen.
    pub fn handle(
        &mut self,
        viewport: ViewportSize,
        projection: &mut Projection,
        sinks: &mut [&mut dyn ViewportSink],
    ) -> ResizeOutcome {
        let aspect = viewport.aspect();
        let buffer = self.buffer_size(&viewport);
        let changed = self.last != Some(viewport);

        projection.aspect = aspect;

        if changed {
            debug!(
                width = viewport.width,
                height = viewport.height,
                buffer_width = buffer.width,
                buffer_height = buffer.height,
                "Viewport resized"
            );
            for sink in sinks.iter_mut() {
                sink.resize(&viewport, buffer);
            }
            self.last = Some(viewport);
        }

        ResizeOutcome {
            aspect,
            buffer,
            changed,
        }
    }

    pub fn last_viewport(&self) -> Option<ViewportSize> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<BufferSize>,
    }

    impl ViewportSink for RecordingSink {
        fn resize(&mut self, _viewport: &ViewportSize, buffer: BufferSize) {
            self.calls.push(buffer);
        }
    }

    #[test]
    fn test_resize_updates_aspect_and_buffers() {
        let mut reactor = ResizeReactor::new(&RenderConfig::default());
        let mut projection = Projection::new(&CameraConfig::default(), 1.0);
        let mut scene = RecordingSink::default();
        let mut overlay = RecordingSink::default();

        let outcome = reactor.handle(
            ViewportSize::new(1600.0, 900.0, 1.0),
            &mut projection,
            &mut [&mut scene, &mut overlay],
        );

        assert!(outcome.changed);
        assert!((projection.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(scene.calls, vec![BufferSize { width: 1600, height: 900 }]);
        assert_eq!(overlay.calls.len(), 1);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut reactor = ResizeReactor::new(&RenderConfig::default());
        let mut projection = Projection::new(&CameraConfig::default(), 1.0);
        let mut sink = RecordingSink::default();
        let viewport = ViewportSize::new(800.0, 600.0, 1.5);

        let first = reactor.handle(viewport, &mut projection, &mut [&mut sink]);
        let aspect_after_first = projection.aspect;
        let second = reactor.handle(viewport, &mut projection, &mut [&mut sink]);

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.buffer, second.buffer);
        assert_eq!(projection.aspect, aspect_after_first);
        assert_eq!(sink.calls.len(), 1);
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let reactor = ResizeReactor::new(&RenderConfig::default());
        let retina = ViewportSize::new(400.0, 300.0, 3.0);
        assert_eq!(reactor.effective_pixel_ratio(&retina), 2.0);
        assert_eq!(reactor.buffer_size(&retina), BufferSize { width: 800, height: 600 });

        let low = ViewportSize::new(400.0, 300.0, 0.5);
        assert_eq!(reactor.effective_pixel_ratio(&low), 0.5);
        assert_eq!(reactor.buffer_size(&low), BufferSize { width: 200, height: 150 });
    }

    #[test]
    fn test_tiny_viewport_keeps_one_pixel() {
        let reactor = ResizeReactor::new(&RenderConfig::default());
        let tiny = ViewportSize::new(1.0, 1.0, 0.25);
        assert_eq!(reactor.buffer_size(&tiny), BufferSize { width: 1, height: 1 });
    }

    #[test]
    fn test_projection_matrix_uses_fov() {
        let projection = Projection::new(&CameraConfig::default(), 2.0);
        let m = projection.matrix();
        let focal = 1.0 / (55.0_f32.to_radians() / 2.0).tan();
        assert!((m.y_axis.y - focal).abs() < 1e-5);
        assert!((m.x_axis.x - focal / 2.0).abs() < 1e-5);
    }
}
