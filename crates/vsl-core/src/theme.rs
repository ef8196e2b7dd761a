//! VSL Theme - accent color handling and the widget stylesheet
//!
//! The stylesheet is static and keyed on CSS custom properties; each player
//! container sets its own accent through [`css_variables`], so one injected
//! `<style>` element serves every instance on the page.
//!
//! # Usage
//!
//! ```rust
//! use vsl_core::theme::{css_variables, THEME_VARIABLE};
//!
//! let vars = css_variables("#5A3FFF");
//! assert_eq!(vars[0].0, THEME_VARIABLE);
//! ```

use crate::config::DEFAULT_THEME_COLOR;

/// Custom property carrying the accent color
pub const THEME_VARIABLE: &str = "--vsl-theme-color";

/// Custom property carrying a translucent accent for glows and hovers
pub const THEME_GLOW_VARIABLE: &str = "--vsl-theme-glow";

/// `id` of the injected `<style>` element; one per document
pub const STYLESHEET_ID: &str = "vsl-player-styles";

/// Parse `#rgb` or `#rrggbb`
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((digits.next()??, digits.next()??, digits.next()??))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

/// Accent as `rgba(...)`. Non-hex colors (named, `hsl()`, ...) fall back to
/// the default accent's channels.
pub fn accent_rgba(color: &str, alpha: f32) -> String {
    let (r, g, b) = parse_hex(color)
        .or_else(|| parse_hex(DEFAULT_THEME_COLOR))
        .unwrap_or((90, 63, 255));
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

/// Custom properties to set on a player container
pub fn css_variables(color: &str) -> Vec<(&'static str, String)> {
    vec![
        (THEME_VARIABLE, color.trim().to_string()),
        (THEME_GLOW_VARIABLE, accent_rgba(color, 0.4)),
    ]
}

/// Widget stylesheet
pub fn stylesheet() -> &'static str {
    STYLESHEET
}

const STYLESHEET: &str = r#"
/* VSL Player */
.vsl-player-container {
  --vsl-theme-color: #5A3FFF;
  --vsl-theme-glow: rgba(90, 63, 255, 0.4);
  position: relative;
  width: 100%;
  background: #000;
  font-family: system-ui, -apple-system, sans-serif;
  color: #fff;
  overflow: hidden;
  outline: none;
  user-select: none;
}

.vsl-player-container .vsl-hidden {
  display: none !important;
}

.vsl-player-wrapper {
  position: relative;
  width: 100%;
  aspect-ratio: 16 / 9;
}

.vsl-video {
  display: block;
  width: 100%;
  height: 100%;
  object-fit: contain;
  background: #000;
  cursor: pointer;
}

/* Center play button */
.vsl-center-play-btn {
  position: absolute;
  top: 50%;
  left: 50%;
  width: 88px;
  height: 88px;
  transform: translate(-50%, -50%);
  border: none;
  border-radius: 50%;
  background: var(--vsl-theme-color);
  box-shadow: 0 4px 20px var(--vsl-theme-glow);
  color: #fff;
  cursor: pointer;
  z-index: 2;
  transition: transform 0.2s ease, opacity 0.2s ease;
}

.vsl-center-play-btn svg {
  width: 44px;
  height: 44px;
}

.vsl-center-play-btn:hover {
  transform: translate(-50%, -50%) scale(1.05);
}

.vsl-player-container.playing .vsl-center-play-btn {
  opacity: 0;
  pointer-events: none;
}

/* Overlays */
.vsl-overlay {
  position: absolute;
  inset: 0;
  display: flex;
  align-items: center;
  justify-content: center;
  background: rgba(0, 0, 0, 0.75);
  z-index: 3;
  text-align: center;
  cursor: pointer;
}

.vsl-overlay-content {
  max-width: 90%;
  padding: 24px;
}

.vsl-overlay-title {
  margin: 0 0 20px;
  font-size: 1.5rem;
  font-weight: 600;
}

.vsl-overlay-buttons {
  display: flex;
  gap: 12px;
  justify-content: center;
  flex-wrap: wrap;
}

.vsl-overlay-btn {
  display: inline-flex;
  align-items: center;
  gap: 8px;
  padding: 12px 24px;
  border: none;
  border-radius: 6px;
  background: var(--vsl-theme-color);
  color: #fff;
  font-size: 1rem;
  cursor: pointer;
  transition: box-shadow 0.2s ease;
}

.vsl-overlay-btn:hover {
  box-shadow: 0 0 12px var(--vsl-theme-glow);
}

.vsl-icon {
  width: 20px;
  height: 20px;
}

.vsl-icon-large {
  width: 64px;
  height: 64px;
  margin-bottom: 16px;
}

.vsl-error-overlay {
  cursor: default;
}

.vsl-error-message {
  margin: 0;
  opacity: 0.85;
}

/* Progress */
.vsl-progress-container {
  position: relative;
  height: 6px;
  background: rgba(255, 255, 255, 0.2);
}

.vsl-progress-buffered,
.vsl-progress-bar {
  position: absolute;
  top: 0;
  left: 0;
  height: 100%;
  width: 0;
}

.vsl-progress-buffered {
  background: rgba(255, 255, 255, 0.35);
}

.vsl-progress-bar {
  background: var(--vsl-theme-color);
  transition: width 0.1s linear;
}

/* Control bar */
.vsl-controls {
  display: flex;
  align-items: center;
  gap: 12px;
  padding: 8px 12px;
  background: linear-gradient(transparent, rgba(0, 0, 0, 0.9));
}

.vsl-controls-right {
  display: flex;
  align-items: center;
  gap: 8px;
  margin-left: auto;
}

.vsl-control-btn {
  display: inline-flex;
  padding: 4px;
  border: none;
  background: transparent;
  color: #fff;
  cursor: pointer;
}

.vsl-control-btn:hover {
  color: var(--vsl-theme-color);
}

.vsl-time-display {
  font-size: 0.875rem;
  font-variant-numeric: tabular-nums;
}

.vsl-volume-control {
  display: flex;
  align-items: center;
  gap: 6px;
}

.vsl-volume-slider {
  width: 80px;
  accent-color: var(--vsl-theme-color);
}

/* Custom fullscreen */
.vsl-player-container.vsl-fullscreen {
  position: fixed;
  inset: 0;
  z-index: 2147483647;
  display: flex;
  flex-direction: column;
}

.vsl-player-container.vsl-fullscreen .vsl-player-wrapper {
  flex: 1;
  aspect-ratio: auto;
}

/* Narrow viewports: controls float over the video and appear on tap */
@media (max-width: 768px) {
  .vsl-player-container .vsl-controls {
    position: absolute;
    left: 0;
    right: 0;
    bottom: 0;
    opacity: 0;
    pointer-events: none;
    transition: opacity 0.3s ease;
    z-index: 4;
  }

  .vsl-player-container .vsl-progress-container {
    position: absolute;
    left: 0;
    right: 0;
    bottom: 44px;
    z-index: 4;
  }

  .vsl-player-container:has(.vsl-player-wrapper.vsl-show-controls) .vsl-controls,
  .vsl-player-container:not(.playing) .vsl-controls {
    opacity: 1;
    pointer-events: auto;
  }

  .vsl-center-play-btn {
    width: 64px;
    height: 64px;
  }

  .vsl-overlay-title {
    font-size: 1.1rem;
  }

  .vsl-volume-slider {
    display: none;
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#5A3FFF"), Some((90, 63, 255)));
        assert_eq!(parse_hex("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex(" #000000 "), Some((0, 0, 0)));
        assert_eq!(parse_hex("red"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_accent_fallback() {
        assert_eq!(accent_rgba("#ff0000", 0.5), "rgba(255, 0, 0, 0.5)");
        assert_eq!(accent_rgba("hsl(0 100% 50%)", 0.4), "rgba(90, 63, 255, 0.4)");
    }

    #[test]
    fn test_css_variables() {
        let vars = css_variables("#ff0000");
        assert_eq!(vars[0], (THEME_VARIABLE, "#ff0000".to_string()));
        assert_eq!(vars[1], (THEME_GLOW_VARIABLE, "rgba(255, 0, 0, 0.4)".to_string()));
    }

    #[test]
    fn test_stylesheet_covers_states() {
        let css = stylesheet();
        assert!(css.contains("var(--vsl-theme-color)"));
        assert!(css.contains(".vsl-player-container.playing"));
        assert!(css.contains(".vsl-fullscreen"));
        assert!(css.contains("vsl-show-controls"));
        assert!(css.contains("max-width: 768px"));
        assert!(css.contains(".vsl-hidden"));
    }
}
