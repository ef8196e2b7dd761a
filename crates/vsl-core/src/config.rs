//! Player configuration

use crate::{quality::QualityPreference, Error, Result};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Default accent color for controls and overlays
pub const DEFAULT_THEME_COLOR: &str = "#5A3FFF";

/// Default progress-bar distortion exponent
pub const DEFAULT_DISTORTION_FACTOR: f64 = 0.4;

/// Configuration for a single mounted player.
///
/// Field names deserialize from the camelCase option names embedders pass
/// (`videoSrc`, `saveProgress`, ...). Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Media source URL (progressive file or HLS manifest)
    pub video_src: String,
    /// Accent color, exposed as `--vsl-theme-color`
    pub color_theme: String,
    /// Attempt muted autoplay on mount
    pub autoplay: bool,
    /// Hide the time display and disable progress-bar seeking
    pub hide_controls: bool,
    /// Persist watch position
    pub save_progress: bool,
    /// Exponent applied to the linear playback fraction
    pub distortion_factor: f64,
    /// Show volume controls and enable volume keys
    pub volume_control: bool,
    /// Show the fullscreen button and enable the `f` key
    pub fullscreen_control: bool,
    /// Initial playback rate
    pub playback_rate: f64,
    /// Storage key override
    pub persistence_key: Option<String>,
    /// Quality applied once the engine reports its levels
    #[serde(deserialize_with = "quality_or_auto")]
    pub default_quality: QualityPreference,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video_src: String::new(),
            color_theme: DEFAULT_THEME_COLOR.to_string(),
            autoplay: false,
            hide_controls: false,
            save_progress: true,
            distortion_factor: DEFAULT_DISTORTION_FACTOR,
            volume_control: true,
            fullscreen_control: true,
            playback_rate: 1.0,
            persistence_key: None,
            default_quality: QualityPreference::Auto,
        }
    }
}

impl PlayerConfig {
    /// Create a config for `video_src` with every other field defaulted
    pub fn new(video_src: impl Into<String>) -> Self {
        Self {
            video_src: video_src.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON options object
    pub fn from_json(json: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(json)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?
            .with_fallbacks();
        config.validate()?;
        Ok(config)
    }

    /// Replace blank and zero options with their defaults, the way embedders
    /// expect `colorTheme: ""` or `playbackRate: 0` to mean "unset"
    pub fn with_fallbacks(mut self) -> Self {
        if self.color_theme.trim().is_empty() {
            self.color_theme = DEFAULT_THEME_COLOR.to_string();
        }
        if self.distortion_factor == 0.0 {
            self.distortion_factor = DEFAULT_DISTORTION_FACTOR;
        }
        if self.playback_rate == 0.0 {
            self.playback_rate = 1.0;
        }
        self
    }

    /// Check field invariants
    pub fn validate(&self) -> Result<()> {
        if self.video_src.trim().is_empty() {
            return Err(Error::InvalidConfig("videoSrc must not be empty".into()));
        }
        if self.color_theme.trim().is_empty() {
            return Err(Error::InvalidConfig("colorTheme must not be empty".into()));
        }
        if !self.distortion_factor.is_finite() || self.distortion_factor <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "distortionFactor must be a positive number, got {}",
                self.distortion_factor
            )));
        }
        if !self.playback_rate.is_finite() || self.playback_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "playbackRate must be a positive number, got {}",
                self.playback_rate
            )));
        }
        if let QualityPreference::Height(0) = self.default_quality {
            return Err(Error::InvalidConfig("defaultQuality height must be positive".into()));
        }
        Ok(())
    }

    /// Explicit persistence key, ignoring blank overrides
    pub fn persistence_key_override(&self) -> Option<&str> {
        self.persistence_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// `defaultQuality` with `""`, `0` and `false` read as auto
fn quality_or_auto<'de, D>(deserializer: D) -> std::result::Result<QualityPreference, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Height(f64),
        Name(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Flag(false) => Ok(QualityPreference::Auto),
        Raw::Height(h) if h == 0.0 => Ok(QualityPreference::Auto),
        Raw::Name(name) if name.trim().is_empty() => Ok(QualityPreference::Auto),
        Raw::Flag(true) => Err(de::Error::custom("defaultQuality must be a preset name or a height")),
        Raw::Height(h) => QualityPreference::from_height(h).map_err(de::Error::custom),
        Raw::Name(name) => name.parse().map_err(de::Error::custom),
    }
}
