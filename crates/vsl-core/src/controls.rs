//! Control bar state: keyboard bindings, touch auto-hide, and the render snapshot

use crate::overlay::Overlay;
use serde::Serialize;
use std::time::Duration;

/// Viewports at or below this width toggle controls on tap
pub const NARROW_VIEWPORT_MAX_WIDTH: f64 = 768.0;

/// Idle time before tapped-open controls hide again
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Keyboard shortcut, active while the container has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Space or `k`
    TogglePlay,
    /// `f`
    ToggleFullscreen,
    /// `m`
    ToggleMute,
    /// Arrow up
    VolumeUp,
    /// Arrow down
    VolumeDown,
}

impl KeyCommand {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "k" => Some(KeyCommand::TogglePlay),
            "f" => Some(KeyCommand::ToggleFullscreen),
            "m" => Some(KeyCommand::ToggleMute),
            "ArrowUp" => Some(KeyCommand::VolumeUp),
            "ArrowDown" => Some(KeyCommand::VolumeDown),
            _ => None,
        }
    }
}

/// Result of a tap on the video wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Wide viewport, nothing changes
    Ignored,
    /// Controls revealed; schedule a hide after [`CONTROLS_HIDE_DELAY`]
    Shown,
    /// Controls hidden; cancel any pending hide
    Hidden,
}

/// Tap-to-show controls on narrow viewports
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlsVisibility {
    shown: bool,
}

impl ControlsVisibility {
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Toggle on a tap; wide viewports are left alone
    pub fn tap(&mut self, viewport_width: f64) -> TapOutcome {
        if viewport_width > NARROW_VIEWPORT_MAX_WIDTH {
            return TapOutcome::Ignored;
        }
        self.shown = !self.shown;
        if self.shown {
            TapOutcome::Shown
        } else {
            TapOutcome::Hidden
        }
    }

    /// Hide after the idle delay elapsed
    pub fn auto_hide(&mut self) {
        self.shown = false;
    }
}

/// Everything the rendering adapter needs to paint the controls.
///
/// Recomputed from scratch after every event, so what is displayed never
/// lags the last event delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlsView {
    /// Drives the `playing` container class and the bar's play/pause icon
    pub playing: bool,
    pub overlay: Overlay,
    /// `M:SS` clock for the position
    pub current_time: String,
    /// `M:SS` clock for the duration
    pub duration: String,
    /// Distorted progress-bar width in percent
    pub progress_percent: f64,
    /// Buffered indicator width in percent, `None` before anything buffered
    pub buffered_percent: Option<f64>,
    /// Volume slider position, `0` while muted
    pub volume_percent: f64,
    /// Show the muted speaker glyph
    pub muted_icon: bool,
    pub fullscreen: bool,
    pub time_display_visible: bool,
    /// Tapped-open controls on narrow viewports
    pub controls_shown: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyCommand::from_key(" "), Some(KeyCommand::TogglePlay));
        assert_eq!(KeyCommand::from_key("k"), Some(KeyCommand::TogglePlay));
        assert_eq!(KeyCommand::from_key("f"), Some(KeyCommand::ToggleFullscreen));
        assert_eq!(KeyCommand::from_key("m"), Some(KeyCommand::ToggleMute));
        assert_eq!(KeyCommand::from_key("ArrowUp"), Some(KeyCommand::VolumeUp));
        assert_eq!(KeyCommand::from_key("ArrowDown"), Some(KeyCommand::VolumeDown));
        assert_eq!(KeyCommand::from_key("K"), None);
        assert_eq!(KeyCommand::from_key("Enter"), None);
    }

    #[test]
    fn test_tap_on_narrow_viewport() {
        let mut controls = ControlsVisibility::default();
        assert_eq!(controls.tap(375.0), TapOutcome::Shown);
        assert!(controls.is_shown());
        assert_eq!(controls.tap(375.0), TapOutcome::Hidden);
        assert_eq!(controls.tap(768.0), TapOutcome::Shown);
        controls.auto_hide();
        assert!(!controls.is_shown());
    }

    #[test]
    fn test_tap_on_wide_viewport() {
        let mut controls = ControlsVisibility::default();
        assert_eq!(controls.tap(1024.0), TapOutcome::Ignored);
        assert!(!controls.is_shown());
    }
}
