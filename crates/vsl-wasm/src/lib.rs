//! VSL WASM - browser adapter for the VSL player
//!
//! Renders the player into a container element, drives the `<video>`
//! element (through hls.js when the platform needs it), persists watch
//! progress in `localStorage`, and forwards lifecycle events to embedder
//! callbacks. All state decisions live in `vsl-core`.
//!
//! ## Usage
//!
//! ```javascript
//! import wasmInit, { init } from '@vsl/player';
//!
//! await wasmInit();
//! const player = init('#vsl', {
//!   videoSrc: 'https://cdn.example.com/offer/master.m3u8',
//!   colorTheme: '#5A3FFF',
//!   autoplay: true,
//!   onEnded: () => showOffer(),
//! });
//! ```

use tracing_subscriber::filter::LevelFilter;
use wasm_bindgen::prelude::*;

mod bindings;
mod dom;
mod logging;
mod media;
mod player;
mod registry;
mod storage;

pub use media::{HlsEngine, VideoMedia};
pub use player::VslPlayer;
pub use registry::VslPlayerRegistry;
pub use storage::BrowserStorage;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::INFO);
    vsl_core::init();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    vsl_core::VERSION.to_string()
}

/// Mount a player into the element matching `selector`.
///
/// Returns `undefined` (and logs the reason) when the element does not
/// exist or the options are invalid.
#[wasm_bindgen(js_name = init)]
pub fn init_player(selector: &str, options: JsValue) -> Option<VslPlayer> {
    match VslPlayer::mount(selector, &options) {
        Ok(player) => Some(player),
        Err(e) => {
            report_mount_error(&e);
            None
        }
    }
}

/// Change console verbosity: `"off"`, `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("unknown log level {:?}", level)))?;
    logging::set_level(filter);
    Ok(())
}

pub(crate) fn report_mount_error(err: &vsl_core::Error) {
    tracing::error!(code = err.error_code(), "{}", err);
}
