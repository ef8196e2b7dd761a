//! VSL Core - state machine for the VSL video sales letter player
//!
//! This crate holds everything about the player that does not touch a
//! rendering surface:
//! - Configuration and validation
//! - Playback intent and the user-interaction latch
//! - Overlay transitions (resume, muted autoplay, error)
//! - Watch-progress persistence behind a storage trait
//! - Quality selection against the streaming engine's renditions
//! - Control-bar snapshot and theme stylesheet
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         VSL Core                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐        │
//! │  │   Playback   │  │   Progress   │  │   Quality    │        │
//! │  │  Controller  │  │    Store     │  │   Resolver   │        │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘        │
//! │         └─────────────────┼─────────────────┘                │
//! │                    ┌──────┴──────┐                           │
//! │                    │ Player Core │◄── UserAction / MediaEvent│
//! │                    └──────┬──────┘                           │
//! │         ┌─────────────────┼─────────────────┐                │
//! │  ┌──────┴───────┐  ┌──────┴──────┐  ┌───────┴──────┐         │
//! │  │   Overlay    │  │  Controls   │  │Notifications │         │
//! │  │   Machine    │  │    View     │  │              │         │
//! │  └──────────────┘  └─────────────┘  └──────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//!            ▲                                 │
//!   MediaElement / StreamingEngine /     render + callbacks
//!   ProgressStorage (host adapter)        (host adapter)
//! ```

pub mod config;
pub mod controller;
pub mod controls;
pub mod error;
pub mod format;
pub mod media;
pub mod overlay;
pub mod player;
pub mod progress;
pub mod quality;
pub mod registry;
pub mod theme;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::PlayerConfig;
pub use controller::PlaybackController;
pub use controls::{ControlsView, KeyCommand, TapOutcome};
pub use error::{Error, PlaybackErrorKind, Result};
pub use format::format_time;
pub use media::{detect_source_kind, select_backend, Backend, MediaElement, PlatformSupport, SourceKind, StreamingEngine};
pub use overlay::Overlay;
pub use player::{MediaEvent, Notification, Outcome, PlayerCore, Startup, UserAction};
pub use progress::{MemoryStorage, ProgressRecord, ProgressStorage, ProgressStore};
pub use quality::{QualityLevel, QualityLevelInfo, QualityPreference, QualitySelection};
pub use registry::{InstanceId, Registry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library
pub fn init() {
    tracing::info!(version = VERSION, "VSL Core initialized");
}
