//! Overlay state machine
//!
//! ```text
//!            trusted record                  autoplay resolved
//!   Hidden ─────────────────> Resume   Hidden ─────────────────> Autoplay
//!     ^   resume / restart      │        ^   unmute / overlay click  │
//!     └─────────────────────────┘        └───────────────────────────┘
//!
//!   any state ── media or network error ──> Error   (terminal)
//! ```
//!
//! Resume and autoplay overlays are mutually exclusive and are never shown
//! once the user has interacted.

use crate::error::PlaybackErrorKind;
use serde::Serialize;

/// Overlay currently covering the video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Overlay {
    #[default]
    Hidden,
    Resume,
    Autoplay,
    Error { kind: PlaybackErrorKind },
}

impl Overlay {
    /// Message for the error overlay
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Overlay::Error { kind } => Some(kind.message()),
            _ => None,
        }
    }
}

/// Transition rules for [`Overlay`]
#[derive(Debug, Default, Clone)]
pub struct OverlayMachine {
    current: Overlay,
}

impl OverlayMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Overlay {
        self.current
    }

    /// Whether an error has ended this instance
    pub fn is_terminal(&self) -> bool {
        matches!(self.current, Overlay::Error { .. })
    }

    /// Offer to resume. Only from `Hidden` and before any interaction.
    pub fn show_resume(&mut self, interacted: bool) -> bool {
        self.enter_prompt(Overlay::Resume, interacted)
    }

    /// Announce muted autoplay. Only from `Hidden` and before any interaction.
    pub fn show_autoplay(&mut self, interacted: bool) -> bool {
        self.enter_prompt(Overlay::Autoplay, interacted)
    }

    fn enter_prompt(&mut self, prompt: Overlay, interacted: bool) -> bool {
        if interacted || self.current != Overlay::Hidden {
            return false;
        }
        self.current = prompt;
        true
    }

    /// Leave the resume prompt
    pub fn dismiss_resume(&mut self) -> bool {
        self.dismiss(Overlay::Resume)
    }

    /// Leave the autoplay prompt
    pub fn dismiss_autoplay(&mut self) -> bool {
        self.dismiss(Overlay::Autoplay)
    }

    fn dismiss(&mut self, prompt: Overlay) -> bool {
        if self.current != prompt {
            return false;
        }
        self.current = Overlay::Hidden;
        true
    }

    /// Enter the error state. The first error wins and nothing leaves it.
    pub fn fail(&mut self, kind: PlaybackErrorKind) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.current = Overlay::Error { kind };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_round_trip() {
        let mut machine = OverlayMachine::new();
        assert!(machine.show_resume(false));
        assert_eq!(machine.current(), Overlay::Resume);
        assert!(!machine.dismiss_autoplay());
        assert!(machine.dismiss_resume());
        assert_eq!(machine.current(), Overlay::Hidden);
    }

    #[test]
    fn test_prompts_are_exclusive() {
        let mut machine = OverlayMachine::new();
        assert!(machine.show_resume(false));
        assert!(!machine.show_autoplay(false));
        assert_eq!(machine.current(), Overlay::Resume);
    }

    #[test]
    fn test_no_prompt_after_interaction() {
        let mut machine = OverlayMachine::new();
        assert!(!machine.show_autoplay(true));
        assert!(!machine.show_resume(true));
        assert_eq!(machine.current(), Overlay::Hidden);
    }

    #[test]
    fn test_error_is_terminal() {
        let mut machine = OverlayMachine::new();
        machine.show_autoplay(false);
        assert!(machine.fail(PlaybackErrorKind::Network));
        assert!(!machine.fail(PlaybackErrorKind::Media));
        assert!(!machine.dismiss_autoplay());
        assert!(!machine.show_resume(false));
        assert_eq!(
            machine.current().error_message(),
            Some("Network error. Please check your connection.")
        );
    }
}
