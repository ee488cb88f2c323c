//! Player Web - browser front end for the music player scene
//!
//! Runs the Bevy scene on the page canvas and composites the HTML menu
//! panel over the model's screen with CSS 3D transforms.

mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
mod overlay;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    app::run();
}
