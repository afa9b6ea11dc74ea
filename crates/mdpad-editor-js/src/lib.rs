//! WASM bindings for the mdpad markdown editor.
//!
//! Exposes [`JsEditor`], which a JavaScript view wires to its editor element's
//! DOM events.

mod editor;
mod types;

pub use editor::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };
        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );
        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}
