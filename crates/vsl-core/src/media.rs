//! Media primitives the player drives, and streaming backend selection

use crate::quality::QualityLevel;
use url::Url;

/// The host's media element.
///
/// Every setter is a request; resulting state changes arrive later as media
/// events.
pub trait MediaElement {
    /// Request playback. Rejections (autoplay policy) are handled by the host.
    fn play(&self);
    fn pause(&self);
    fn paused(&self) -> bool;

    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);

    /// Duration in seconds, `NaN` until metadata is known
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    fn set_playback_rate(&self, rate: f64);

    /// End of the most recent buffered range
    fn buffered_end(&self) -> Option<f64>;
}

/// Adaptive streaming library attached to the media element
pub trait StreamingEngine {
    /// Renditions reported so far, in engine order
    fn levels(&self) -> Vec<QualityLevel>;

    /// Pin a rendition index, or `-1` for adaptive mode
    fn set_current_level(&self, level: i32);

    /// Release the engine and detach it from the media element
    fn destroy(&self);
}

/// How the source URL must be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// HLS manifest (`.m3u8` / `.m3u`)
    Manifest,
    /// Anything the media element plays directly
    Progressive,
}

/// Classify a source URL by its path extension, ignoring query and fragment
pub fn detect_source_kind(video_src: &str) -> SourceKind {
    let path = match Url::parse(video_src) {
        Ok(url) => url.path().to_lowercase(),
        Err(_) => video_src
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    };

    if path.ends_with(".m3u8") || path.ends_with(".m3u") {
        SourceKind::Manifest
    } else {
        SourceKind::Progressive
    }
}

/// What the platform can do with an HLS manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformSupport {
    /// Media element plays `application/vnd.apple.mpegurl` itself
    pub native_hls: bool,
    /// Streaming engine is loaded and reports support
    pub engine: bool,
}

/// Playback path chosen for a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hand the URL to the media element
    Native,
    /// Drive the media element through the streaming engine
    Engine,
    /// Manifest with no way to play it
    Unsupported,
}

/// Pick the playback path. Native support always bypasses the engine.
pub fn select_backend(kind: SourceKind, support: PlatformSupport) -> Backend {
    match kind {
        SourceKind::Progressive => Backend::Native,
        SourceKind::Manifest if support.native_hls => Backend::Native,
        SourceKind::Manifest if support.engine => Backend::Engine,
        SourceKind::Manifest => Backend::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_manifest() {
        assert_eq!(detect_source_kind("https://cdn.example.com/master.m3u8"), SourceKind::Manifest);
        assert_eq!(
            detect_source_kind("https://cdn.example.com/master.M3U8?token=abc"),
            SourceKind::Manifest
        );
        assert_eq!(detect_source_kind("/media/playlist.m3u8#t=10"), SourceKind::Manifest);
    }

    #[test]
    fn test_detect_progressive() {
        assert_eq!(detect_source_kind("https://cdn.example.com/video.mp4"), SourceKind::Progressive);
        assert_eq!(detect_source_kind("clip.webm"), SourceKind::Progressive);
    }

    #[test]
    fn test_native_support_bypasses_engine() {
        let support = PlatformSupport { native_hls: true, engine: true };
        assert_eq!(select_backend(SourceKind::Manifest, support), Backend::Native);
    }

    #[test]
    fn test_engine_when_no_native_support() {
        let support = PlatformSupport { native_hls: false, engine: true };
        assert_eq!(select_backend(SourceKind::Manifest, support), Backend::Engine);
        assert_eq!(
            select_backend(SourceKind::Manifest, PlatformSupport::default()),
            Backend::Unsupported
        );
        assert_eq!(
            select_backend(SourceKind::Progressive, PlatformSupport::default()),
            Backend::Native
        );
    }
}
