//! HTML overlay compositing
//!
//! The menu panel is a real DOM element layered over the canvas. Every
//! frame, after transform propagation, the camera and overlay content
//! poses are turned into CSS `matrix3d` transforms. Only styles that
//! changed since the last frame are queued; on the web the queue is
//! flushed into the DOM (see `dom.rs`).

use bevy::prelude::*;
use bevy::transform::TransformSystems;
use player_core::css3d::{self, StyleCache};
use player_core::math::Transform as CoreTransform;
use player_core::resize::Projection as CoreProjection;
use player_core::{OverlayPlane, ViewportSize};
use player_scene::convert::from_global;
use player_scene::{MainCamera, OverlayContent, ViewState, ViewportChanged};

/// One entry of the panel menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub icon: &'static str,
    pub now_playing: bool,
}

pub const MENU: [MenuItem; 4] = [
    MenuItem {
        label: "♪  Now Playing",
        icon: "⏸",
        now_playing: true,
    },
    MenuItem {
        label: "The Start Radio",
        icon: "→",
        now_playing: false,
    },
    MenuItem {
        label: "Favourite Albums",
        icon: "→",
        now_playing: false,
    },
    MenuItem {
        label: "Staff Playlists",
        icon: "→",
        now_playing: false,
    },
];

const PANEL_CSS: &str = "\
.music-player { width: 100%; height: 100%; display: flex; flex-direction: column; }
.header { text-align: center; padding: 48px; }
.menu { flex: 1; display: flex; flex-direction: column; gap: 4px; }
.menu-item { padding: 24px 48px; font-weight: 600; font-size: 40px; cursor: pointer; transition: all 0.2s ease; display: flex; justify-content: space-between; align-items: center; width: 100%; box-sizing: border-box; }
.menu-item:hover { color: #000; background: rgba(255, 255, 255, 1.0); }
.menu-item .icon { opacity: 0.7; font-size: 16px; }
.menu-item:hover .icon { opacity: 1; }
.now-playing { background: rgba(255, 255, 255, 0.1); border-left: 3px solid #ffffff; }
";

/// Header wordmark
const WORDMARK_SVG: &str = concat!(
    r##"<svg height="48" viewBox="0 0 166 22" fill="none" xmlns="http://www.w3.org/2000/svg">"##,
    r##"<path d="M149.188 1.10353V4.5314H155.519V20.6874H159.442V4.5314H165.769V1.10353H149.188Z" fill="#DEDEDE"/>"##,
    r##"<path d="M146.838 10.397C147.398 9.48588 147.677 8.3891 147.677 7.11353C147.677 5.16752 147.007 3.67535 145.653 2.66452C144.331 1.66057 142.407 1.16891 139.916 1.16891H132.421V20.7528H136.244V13.4226H140.363C140.559 13.4054 140.741 13.3848 140.909 13.3676L144.516 20.7528H148.748L144.489 12.4668C145.519 11.9545 146.303 11.2669 146.838 10.397ZM147.505 7.11353V7.34733C147.501 7.38859 147.498 7.42641 147.495 7.46767C147.498 7.35077 147.505 7.23387 147.505 7.11697V7.11353ZM145.67 2.89488C145.732 2.94302 145.787 3.00147 145.846 3.05304C145.749 2.96708 145.657 2.88113 145.55 2.80205L145.67 2.89488ZM140.147 1.34426C140.274 1.34426 140.391 1.35458 140.514 1.35801C140.315 1.35114 140.123 1.34426 139.916 1.34426H140.147ZM140.696 13.2163L140.349 13.2507C140.593 13.2301 140.813 13.206 141.012 13.1854C140.913 13.1957 140.806 13.206 140.696 13.2197V13.2163ZM143.067 9.37586L142.96 9.46525C142.386 9.93628 141.421 10.1907 140.02 10.1907H136.248V4.40081H139.786C141.28 4.40081 142.318 4.6346 142.936 5.06781C143.541 5.49071 143.857 6.18179 143.857 7.1823C143.857 8.18281 143.585 8.90827 143.067 9.3793V9.37586Z" fill="#DEDEDE"/>"##,
    r##"<path d="M32.3947 8.94408H23.8892V1.24942H19.9662V20.8333H23.8892V12.506H32.3947V20.8333H36.2834V1.24942H32.3947V8.94408Z" fill="#DEDEDE"/>"##,
    r##"<path d="M113.829 1.16891H97.2468V4.60022H103.574V20.7528H107.497V4.60022H113.829V1.16891Z" fill="#DEDEDE"/>"##,
    r##"<path d="M94.502 11.2668C93.5573 10.3866 92.0768 9.75053 90.0809 9.34482L86.9274 8.73627L86.7247 8.69845C85.8041 8.51622 85.1377 8.2618 84.7048 7.94548L84.6155 7.87672C84.1758 7.51571 83.9491 7.00686 83.9491 6.31922C83.9491 5.48718 84.2617 4.87862 84.8835 4.47292C85.5155 4.0569 86.4877 3.83685 87.8206 3.83685C89.0641 3.83685 89.971 4.06721 90.5687 4.50042V4.50386C91.187 4.91644 91.6439 5.6144 91.9222 6.62866L91.9565 6.75587H95.694L95.6734 6.56677L95.6219 6.0923V6.08543V6.07855L95.591 5.91008C95.2543 4.18755 94.4608 2.87416 93.1898 1.99055C91.8913 1.08287 90.0981 0.639343 87.824 0.639343C85.4915 0.639343 83.6193 1.11037 82.2246 2.06963L82.0906 2.16246C80.6753 3.19048 79.9643 4.62764 79.9643 6.44644C79.9643 8.09676 80.4761 9.39984 81.5135 10.3247L81.6132 10.4107C82.6471 11.2805 84.2651 11.9028 86.4362 12.2913L89.0194 12.7555H89.0229C90.1153 12.9309 90.871 13.2334 91.321 13.6426L91.3279 13.6494C91.7882 14.0311 92.0287 14.5743 92.0287 15.3066C92.0287 16.2487 91.7126 16.9295 91.1046 17.3833C90.4863 17.844 89.5347 18.0881 88.2259 18.0881C86.79 18.0881 85.7079 17.8475 84.9556 17.3833L84.8113 17.287C84.0865 16.7679 83.6296 15.953 83.4578 14.815L83.4338 14.6706H79.5211L79.5383 14.8562C79.7169 16.9535 80.5345 18.5592 81.991 19.6559C83.4682 20.7493 85.519 21.2822 88.1229 21.2822C90.555 21.2822 92.4855 20.7562 93.894 19.6869C95.3093 18.5901 96.0169 17.0911 96.0169 15.2035C96.0169 13.5841 95.5497 12.2913 94.5982 11.3527L94.5054 11.2633L94.502 11.2668Z" fill="#DEDEDE"/>"##,
    r##"<path d="M67.2467 11.2976C64.1207 10.9022 61.4893 13.5358 61.8809 16.668C62.1489 18.7997 63.8699 20.5256 66.0032 20.7938C69.1326 21.1892 71.764 18.5556 71.3689 15.4234C71.101 13.2917 69.38 11.5657 67.2467 11.2976Z" fill="#DEDEDE"/>"##,
    r##"<path d="M118.897 1.16891L118.855 1.27894L111.308 20.7528H115.324L117.079 16.0081H124.829L126.578 20.6393L126.619 20.7494H130.734L123.177 1.16891H118.897ZM118.165 12.7453L120.937 5.09188L123.771 12.7453H118.165Z" fill="#DEDEDE"/>"##,
    r##"<path d="M0.855957 4.68073H7.18702V20.8333H11.11V4.68073H17.4377V1.24942H0.855957V4.68073Z" fill="#DEDEDE"/>"##,
    r##"<path d="M39.8958 20.8333H53.7293V17.6049H43.7878V12.4063H52.9323V9.17787H43.7878V4.48131H53.7293V1.24942H39.8958V20.8333Z" fill="#DEDEDE"/>"##,
    "</svg>",
);

const FONT_STACK: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";

/// Inner HTML of the panel element
pub fn panel_markup() -> String {
    let mut html = format!("<style>{}</style>", PANEL_CSS);
    html.push_str("<div class=\"music-player\"><div class=\"header\">");
    html.push_str(WORDMARK_SVG);
    html.push_str("</div><div class=\"menu\">");
    for item in MENU {
        let class = if item.now_playing {
            "menu-item now-playing"
        } else {
            "menu-item"
        };
        html.push_str(&format!(
            "<div class=\"{}\"><span>{}</span><span class=\"icon\">{}</span></div>",
            class, item.label, item.icon
        ));
    }
    html.push_str("</div></div>");
    html
}

/// Fixed inline styles of the panel element
pub fn panel_style(plane: &OverlayPlane) -> Vec<(&'static str, String)> {
    vec![
        ("position", "absolute".to_string()),
        ("width", format!("{}px", plane.width_px)),
        ("height", format!("{}px", plane.height_px)),
        ("border-radius", format!("{}px", plane.border_radius_px)),
        ("color", "#fff".to_string()),
        ("overflow", "hidden".to_string()),
        ("box-sizing", "border-box".to_string()),
        ("flex-direction", "column".to_string()),
        ("font-family", FONT_STACK.to_string()),
        ("pointer-events", "none".to_string()),
    ]
}

/// Elements the compositor writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayElement {
    /// Layer covering the canvas; carries the perspective
    Root,
    /// Holds the inverse camera transform
    Camera,
    /// The menu panel
    Panel,
}

/// A single inline style assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleWrite {
    pub element: OverlayElement,
    pub property: &'static str,
    pub value: String,
}

/// Style queue with change detection
#[derive(Resource, Default)]
pub struct Compositor {
    cache: StyleCache,
    pending: Vec<StyleWrite>,
}

impl Compositor {
    /// Queue `value` unless it is what was last written
    pub fn write(&mut self, element: OverlayElement, property: &'static str, value: String) {
        let key = format!("{:?}.{}", element, property);
        if self.cache.update(&key, &value).is_some() {
            self.pending.push(StyleWrite {
                element,
                property,
                value,
            });
        }
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, StyleWrite> {
        self.pending.drain(..)
    }

    pub fn pending(&self) -> &[StyleWrite] {
        &self.pending
    }

    /// Resize the root and camera layers to the viewport
    pub fn resize(&mut self, viewport: &ViewportSize) {
        for element in [OverlayElement::Root, OverlayElement::Camera] {
            self.write(element, "width", format!("{}px", viewport.width));
            self.write(element, "height", format!("{}px", viewport.height));
        }
    }

    /// Queue the styles for one frame. The panel stays hidden until the
    /// overlay content exists.
    pub fn compose(
        &mut self,
        camera_world: &CoreTransform,
        content_world: Option<&CoreTransform>,
        projection: &CoreProjection,
        viewport: &ViewportSize,
    ) {
        let camera = css3d::camera_style(camera_world, projection, viewport);
        self.write(
            OverlayElement::Root,
            "perspective",
            format!("{}px", camera.perspective_px),
        );
        self.write(OverlayElement::Camera, "transform", camera.transform);

        match content_world {
            Some(world) => {
                self.write(OverlayElement::Panel, "transform", css3d::object_style(world));
                self.write(OverlayElement::Panel, "display", "flex".to_string());
            }
            None => self.write(OverlayElement::Panel, "display", "none".to_string()),
        }
    }
}

/// Plugin for the overlay compositor
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Compositor>().add_systems(
            PostUpdate,
            composite_overlay.after(TransformSystems::Propagate),
        );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, crate::dom::mount_overlay).add_systems(
            PostUpdate,
            crate::dom::flush_styles.after(composite_overlay),
        );

        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(PostUpdate, discard_styles.after(composite_overlay));
    }
}

/// Without a DOM there is nothing to flush into
#[cfg(not(target_arch = "wasm32"))]
fn discard_styles(mut compositor: ResMut<Compositor>) {
    let dropped = compositor.drain().count();
    if dropped > 0 {
        tracing::trace!(dropped, "Discarded overlay styles");
    }
}

fn composite_overlay(
    mut changes: MessageReader<ViewportChanged>,
    view: Res<ViewState>,
    cameras: Query<&GlobalTransform, With<MainCamera>>,
    contents: Query<&GlobalTransform, With<OverlayContent>>,
    mut compositor: ResMut<Compositor>,
) {
    for change in changes.read() {
        compositor.resize(&change.viewport);
    }

    let Some(viewport) = view.viewport else {
        return;
    };
    let Ok(camera) = cameras.single() else {
        return;
    };
    let content = contents.iter().next().map(from_global);

    compositor.compose(
        &from_global(camera),
        content.as_ref(),
        &view.projection,
        &viewport,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_core::config::CameraConfig;
    use player_core::glam::Vec3;

    fn viewport() -> ViewportSize {
        ViewportSize::new(1280.0, 720.0, 1.0)
    }

    fn camera_world() -> CoreTransform {
        let mut camera = CoreTransform::from_xyz(0.0, 1.25, 3.5);
        camera.look_at(Vec3::new(0.0, 1.3, 0.0), Vec3::Y);
        camera
    }

    #[test]
    fn test_panel_markup_lists_menu() {
        let html = panel_markup();
        for item in MENU {
            assert!(html.contains(item.label));
        }
        assert_eq!(html.matches("now-playing\"").count(), 1);
        assert_eq!(html.matches("class=\"menu-item").count(), 4);
    }

    #[test]
    fn test_panel_header_is_wordmark() {
        let html = panel_markup();
        assert!(html.contains("<div class=\"header\"><svg height=\"48\" viewBox=\"0 0 166 22\""));
        assert_eq!(html.matches("<path ").count(), 9);
        assert_eq!(html.matches("fill=\"#DEDEDE\"").count(), 9);
        assert!(!html.contains("letter-spacing"));
    }

    #[test]
    fn test_panel_style_uses_plane_size() {
        let style = panel_style(&OverlayPlane::default());
        assert!(style.contains(&("width", "1024px".to_string())));
        assert!(style.contains(&("height", "682px".to_string())));
        assert!(style.contains(&("border-radius", "100px".to_string())));
    }

    #[test]
    fn test_panel_hidden_until_content_exists() {
        let projection = CoreProjection::new(&CameraConfig::default(), viewport().aspect());
        let mut compositor = Compositor::default();
        compositor.compose(&camera_world(), None, &projection, &viewport());

        let display: Vec<_> = compositor
            .drain()
            .filter(|w| w.element == OverlayElement::Panel)
            .collect();
        assert_eq!(display.len(), 1);
        assert_eq!(display[0].value, "none");

        let content = CoreTransform::from_xyz(0.0, 1.3, 0.0);
        compositor.compose(&camera_world(), Some(&content), &projection, &viewport());
        let panel: Vec<_> = compositor
            .drain()
            .filter(|w| w.element == OverlayElement::Panel)
            .map(|w| w.property)
            .collect();
        assert_eq!(panel, vec!["transform", "display"]);
    }

    #[test]
    fn test_unchanged_frame_writes_nothing() {
        let projection = CoreProjection::new(&CameraConfig::default(), viewport().aspect());
        let content = CoreTransform::from_xyz(0.0, 1.3, 0.0);
        let mut compositor = Compositor::default();

        compositor.compose(&camera_world(), Some(&content), &projection, &viewport());
        assert!(!compositor.pending().is_empty());
        compositor.drain();

        compositor.compose(&camera_world(), Some(&content), &projection, &viewport());
        assert!(compositor.pending().is_empty());
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut compositor = Compositor::default();
        compositor.resize(&viewport());
        assert_eq!(compositor.drain().count(), 4);
        compositor.resize(&viewport());
        assert_eq!(compositor.pending().len(), 0);
    }

    #[test]
    fn test_native_app_drains_style_queue() {
        let mut app = App::new();
        app.add_message::<ViewportChanged>()
            .insert_resource(ViewState {
                projection: CoreProjection::new(&CameraConfig::default(), 1.0),
                viewport: None,
            })
            .add_plugins(OverlayPlugin);

        app.world_mut()
            .resource_mut::<Compositor>()
            .resize(&viewport());
        assert_eq!(app.world().resource::<Compositor>().pending().len(), 4);

        app.update();
        assert!(app.world().resource::<Compositor>().pending().is_empty());
    }
}
