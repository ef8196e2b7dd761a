//! hls.js bindings
//!
//! The library is expected as the global `Hls` (script tag). Only the
//! surface the player drives is bound.

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

/// `Hls.Events.MANIFEST_PARSED`
pub const MANIFEST_PARSED: &str = "hlsManifestParsed";

/// `Hls.Events.ERROR`
pub const ERROR: &str = "hlsError";

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type Hls;

    #[wasm_bindgen(constructor)]
    pub fn new() -> Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported)]
    pub fn is_supported() -> bool;

    #[wasm_bindgen(method, js_name = loadSource)]
    pub fn load_source(this: &Hls, src: &str);

    #[wasm_bindgen(method, js_name = attachMedia)]
    pub fn attach_media(this: &Hls, media: &HtmlMediaElement);

    #[wasm_bindgen(method)]
    pub fn on(this: &Hls, event: &str, callback: &Function);

    #[wasm_bindgen(method, getter)]
    pub fn levels(this: &Hls) -> js_sys::Array;

    #[wasm_bindgen(method, setter = currentLevel)]
    pub fn set_current_level(this: &Hls, level: i32);

    #[wasm_bindgen(method)]
    pub fn destroy(this: &Hls);
}

/// Whether hls.js is loaded and the platform has Media Source Extensions
pub fn hls_available() -> bool {
    let loaded = Reflect::has(&js_sys::global(), &JsValue::from_str("Hls")).unwrap_or(false);
    loaded && Hls::is_supported()
}

/// Numeric property, `0` when missing. Level fields may be prototype getters.
pub fn number_prop(target: &JsValue, name: &str) -> f64 {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

/// Fatal flag and `type` string of an `Hls.Events.ERROR` payload
pub fn error_details(data: &JsValue) -> (bool, String) {
    let fatal = Reflect::get(data, &JsValue::from_str("fatal"))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let kind = Reflect::get(data, &JsValue::from_str("type"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    (fatal, kind)
}
