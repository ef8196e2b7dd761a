//! Media element and streaming engine backed by the browser

use vsl_core::{MediaElement, QualityLevel, StreamingEngine};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlVideoElement;

use crate::bindings::{number_prop, Hls};

/// MIME type probed for native HLS support (Safari, iOS)
const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// `<video>` element driven by the player core
#[derive(Clone)]
pub struct VideoMedia {
    video: HtmlVideoElement,
}

impl VideoMedia {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }

    /// Whether the element plays HLS manifests itself
    pub fn supports_native_hls(&self) -> bool {
        !self.video.can_play_type(HLS_MIME).is_empty()
    }

    /// Request playback and wait for the autoplay policy's verdict
    pub async fn request_autoplay(&self) -> bool {
        match self.video.play() {
            Ok(promise) => match JsFuture::from(promise).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!(reason = ?e, "Play promise rejected");
                    false
                }
            },
            Err(_) => false,
        }
    }

    /// Stop playback and release the network resource
    pub fn unload(&self) {
        let _ = self.video.pause();
        let _ = self.video.remove_attribute("src");
        self.video.load();
    }
}

impl MediaElement for VideoMedia {
    fn play(&self) {
        // Explicit plays can still be refused (no source, policy); observe the
        // rejection so it never surfaces as an unhandled promise.
        if let Ok(promise) = self.video.play() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    tracing::debug!(reason = ?e, "Play request refused");
                }
            });
        }
    }

    fn pause(&self) {
        let _ = self.video.pause();
    }

    fn paused(&self) -> bool {
        self.video.paused()
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn volume(&self) -> f64 {
        self.video.volume()
    }

    fn set_volume(&self, volume: f64) {
        self.video.set_volume(volume);
    }

    fn muted(&self) -> bool {
        self.video.muted()
    }

    fn set_muted(&self, muted: bool) {
        self.video.set_muted(muted);
    }

    fn set_playback_rate(&self, rate: f64) {
        self.video.set_playback_rate(rate);
    }

    fn buffered_end(&self) -> Option<f64> {
        let ranges = self.video.buffered();
        let count = ranges.length();
        if count == 0 {
            return None;
        }
        ranges.end(count - 1).ok()
    }
}

/// hls.js instance attached to the player's video element
pub struct HlsEngine {
    hls: Hls,
}

impl HlsEngine {
    pub fn new(hls: Hls) -> Self {
        Self { hls }
    }
}

impl StreamingEngine for HlsEngine {
    fn levels(&self) -> Vec<QualityLevel> {
        self.hls
            .levels()
            .iter()
            .enumerate()
            .map(|(index, level): (usize, JsValue)| {
                QualityLevel::new(
                    index,
                    number_prop(&level, "height") as u32,
                    number_prop(&level, "width") as u32,
                    number_prop(&level, "bitrate") as u64,
                )
            })
            .collect()
    }

    fn set_current_level(&self, level: i32) {
        self.hls.set_current_level(level);
    }

    fn destroy(&self) {
        self.hls.destroy();
    }
}
