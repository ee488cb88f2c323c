//! DOM side of the overlay compositor (browser only)

use bevy::prelude::*;
use player_core::OverlayPlane;
use player_scene::SceneSettings;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::overlay::{panel_markup, panel_style, Compositor, OverlayElement, StyleWrite};

/// The three overlay layers, held as a non-send resource
pub struct OverlayDom {
    root: HtmlElement,
    camera: HtmlElement,
    panel: HtmlElement,
}

fn create_div(document: &Document) -> Result<HtmlElement, JsValue> {
    document
        .create_element("div")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str("div is not an HtmlElement"))
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (property, value) in styles {
        style.set_property(property, value)?;
    }
    Ok(())
}

impl OverlayDom {
    /// Build the layers and attach them next to the canvas
    pub fn mount(canvas_selector: &str, plane: &OverlayPlane) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document object"))?;

        let root = create_div(&document)?;
        set_styles(
            &root,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("left", "0"),
                ("overflow", "hidden"),
                ("pointer-events", "none"),
            ],
        )?;

        let camera = create_div(&document)?;
        set_styles(
            &camera,
            &[("transform-style", "preserve-3d"), ("pointer-events", "none")],
        )?;

        let panel = create_div(&document)?;
        for (property, value) in panel_style(plane) {
            panel.style().set_property(property, &value)?;
        }
        panel.style().set_property("display", "none")?;
        panel.set_inner_html(&panel_markup());

        camera.append_child(&panel)?;
        root.append_child(&camera)?;

        let host = document
            .query_selector(canvas_selector)?
            .and_then(|canvas| canvas.parent_element())
            .or_else(|| document.body().map(Into::into))
            .ok_or_else(|| JsValue::from_str("no element to attach the overlay to"))?;
        host.append_child(&root)?;

        Ok(Self {
            root,
            camera,
            panel,
        })
    }

    fn element(&self, element: OverlayElement) -> &HtmlElement {
        match element {
            OverlayElement::Root => &self.root,
            OverlayElement::Camera => &self.camera,
            OverlayElement::Panel => &self.panel,
        }
    }

    pub fn apply(&self, write: &StyleWrite) -> Result<(), JsValue> {
        self.element(write.element)
            .style()
            .set_property(write.property, &write.value)
    }
}

pub fn mount_overlay(world: &mut World) {
    let Some(settings) = world.get_resource::<SceneSettings>() else {
        tracing::error!("mount_overlay: scene settings missing");
        return;
    };
    let plane = OverlayPlane::new(&settings.0.overlay);
    let canvas = settings.0.render.canvas.clone();

    match OverlayDom::mount(&canvas, &plane) {
        Ok(dom) => {
            tracing::info!("Overlay mounted next to {}", canvas);
            world.insert_non_send_resource(dom);
        }
        Err(e) => tracing::error!("mount_overlay: failed to build overlay: {:?}", e),
    }
}

pub fn flush_styles(dom: Option<NonSend<OverlayDom>>, mut compositor: ResMut<Compositor>) {
    let Some(dom) = dom else {
        compositor.drain();
        return;
    };
    for write in compositor.drain() {
        if let Err(e) = dom.apply(&write) {
            tracing::warn!("Failed to set {} on {:?}: {:?}", write.property, write.element, e);
        }
    }
}
