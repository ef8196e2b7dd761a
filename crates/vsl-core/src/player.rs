//! Player Core - per-instance orchestrator
//!
//! Coordinates:
//! - Overlay transitions (resume, autoplay, error)
//! - Playback intent via the controller
//! - Progress persistence and the save-timer lifecycle
//! - Quality selection once the engine reports its levels
//! - Lifecycle notifications for embedder callbacks
//!
//! The core never touches a rendering surface. A host adapter feeds it
//! [`UserAction`]s and [`MediaEvent`]s, repaints from [`PlayerCore::view`],
//! mirrors [`PlayerCore::save_timer_running`] onto a real interval, and
//! forwards [`PlayerCore::take_notifications`] to the embedder.

use crate::{
    config::PlayerConfig,
    controller::{PlaybackController, VOLUME_STEP},
    controls::{ControlsView, ControlsVisibility, KeyCommand, TapOutcome},
    error::PlaybackErrorKind,
    format::{buffered_fill, format_time, progress_fill},
    media::{MediaElement, StreamingEngine},
    overlay::{Overlay, OverlayMachine},
    progress::{ProgressStorage, ProgressStore, SaveTimer},
    quality::{QualityLevelInfo, QualityPreference, QualitySelection},
    Result,
};
use tracing::{debug, error, info, instrument, warn};

/// Input coming from the user through the rendered controls or the embedder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserAction {
    /// Center button, control-bar button, or a click on the video surface
    TogglePlay,
    /// "Continue watching?" on the resume overlay
    Resume,
    /// "Start from beginning?" on the resume overlay
    Restart,
    /// Click anywhere on the autoplay overlay, including its button
    Unmute,
    /// Click on the progress track at this fraction of its width
    SeekToFraction(f64),
    /// Volume slider, `[0, 1]`
    SetVolume(f64),
    /// Volume button
    ToggleMute,
    /// Fullscreen button
    ToggleFullscreen,
    /// Platform asked for native fullscreen (iOS); enter the custom one instead
    EnterFullscreen,
    /// Keyboard shortcut
    Key(KeyCommand),
}

/// Event reported by the media element or the streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// Manifest parsed (engine) or metadata loaded (native)
    Ready,
    Play,
    Pause,
    TimeUpdate,
    Ended,
    VolumeChange,
    /// Buffered ranges changed
    Progress,
    Error(PlaybackErrorKind),
}

/// Lifecycle notification for embedder callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Play,
    Pause,
    Progress { current_time: f64, duration: f64 },
    Ended,
    Error { message: String },
}

/// Initial overlay decided at mount
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Startup {
    /// Resume overlay shown, position preset
    Resume { position: f64 },
    /// Media muted; the host must request playback and report the outcome
    /// through [`PlayerCore::autoplay_resolved`]
    Autoplay,
    /// Wait for the user
    Idle,
}

/// Result of a [`UserAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    /// Not applicable in the current state or disabled by configuration
    Ignored,
    /// Custom fullscreen toggled; the host should lock (`true`) or unlock
    /// (`false`) the screen orientation
    FullscreenChanged(bool),
}

/// State machine for one mounted player
pub struct PlayerCore<M, S> {
    config: PlayerConfig,
    controller: PlaybackController<M>,
    engine: Option<Box<dyn StreamingEngine>>,
    store: ProgressStore<S>,
    overlay: OverlayMachine,
    save_timer: SaveTimer,
    controls: ControlsVisibility,
    notifications: Vec<Notification>,
    playing: bool,
    ready: bool,
    fullscreen: bool,
    autoplay_pending: bool,
    destroyed: bool,
}

impl<M: MediaElement, S: ProgressStorage> PlayerCore<M, S> {
    /// Create the core for a validated config
    pub fn new(
        config: PlayerConfig,
        media: M,
        engine: Option<Box<dyn StreamingEngine>>,
        storage: S,
    ) -> Result<Self> {
        config.validate()?;

        let controller = PlaybackController::new(media, config.default_quality);
        controller.set_playback_rate(config.playback_rate);
        let store = ProgressStore::for_config(storage, &config);

        info!(
            src = %config.video_src,
            key = store.key(),
            engine = engine.is_some(),
            "Player created"
        );

        Ok(Self {
            config,
            controller,
            engine,
            store,
            overlay: OverlayMachine::new(),
            save_timer: SaveTimer::default(),
            controls: ControlsVisibility::default(),
            notifications: Vec::new(),
            playing: false,
            ready: false,
            fullscreen: false,
            autoplay_pending: false,
            destroyed: false,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        self.controller.media()
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay.current()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_interacted(&self) -> bool {
        self.controller.has_interacted()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the host should keep a 1-second save interval alive
    pub fn save_timer_running(&self) -> bool {
        self.save_timer.is_running()
    }

    /// Decide the initial overlay from saved progress and the autoplay flag
    #[instrument(skip(self), fields(key = self.store.key()))]
    pub fn start(&mut self) -> Startup {
        if self.destroyed {
            return Startup::Idle;
        }

        if self.config.save_progress {
            if let Some(record) = self.store.load_resumable() {
                if self.overlay.show_resume(self.controller.has_interacted()) {
                    info!(position = record.current_time, "Showing resume overlay");
                    self.controller.seek(record.current_time);
                    return Startup::Resume {
                        position: record.current_time,
                    };
                }
            }
        }

        if self.config.autoplay {
            self.controller.mute_for_autoplay();
            self.autoplay_pending = true;
            return Startup::Autoplay;
        }

        Startup::Idle
    }

    /// Report whether the muted autoplay request was allowed.
    ///
    /// Late results after [`destroy`](Self::destroy) are ignored.
    pub fn autoplay_resolved(&mut self, started: bool) {
        if self.destroyed || !std::mem::take(&mut self.autoplay_pending) {
            return;
        }

        if !started {
            warn!("Autoplay prevented");
            self.controller.media().set_muted(false);
            return;
        }

        if self.overlay.show_autoplay(self.controller.has_interacted()) {
            info!("Muted autoplay started");
        } else if self.controller.has_interacted() {
            // The user pressed play while the request was in flight
            self.controller.media().set_muted(false);
        }
    }

    /// Apply a user action
    pub fn handle_action(&mut self, action: UserAction) -> Outcome {
        if self.destroyed {
            return Outcome::Ignored;
        }

        match action {
            UserAction::TogglePlay => {
                self.controller.toggle_play();
                Outcome::Handled
            }
            UserAction::Resume => {
                if !self.overlay.dismiss_resume() {
                    return Outcome::Ignored;
                }
                self.controller.play_by_user();
                Outcome::Handled
            }
            UserAction::Restart => {
                if !self.overlay.dismiss_resume() {
                    return Outcome::Ignored;
                }
                self.controller.mark_interacted();
                self.store.clear();
                self.controller.seek(0.0);
                self.controller.play();
                Outcome::Handled
            }
            UserAction::Unmute => self.unmute_autoplay(),
            UserAction::SeekToFraction(fraction) => {
                let duration = self.controller.media().duration();
                if self.config.hide_controls || !duration.is_finite() || !fraction.is_finite() {
                    return Outcome::Ignored;
                }
                self.controller.seek(fraction * duration);
                Outcome::Handled
            }
            UserAction::SetVolume(volume) => {
                self.controller.set_volume(volume);
                Outcome::Handled
            }
            UserAction::ToggleMute => {
                self.controller.toggle_mute();
                Outcome::Handled
            }
            UserAction::ToggleFullscreen => {
                if !self.config.fullscreen_control {
                    return Outcome::Ignored;
                }
                self.fullscreen = !self.fullscreen;
                Outcome::FullscreenChanged(self.fullscreen)
            }
            UserAction::EnterFullscreen => {
                if !self.config.fullscreen_control || self.fullscreen {
                    return Outcome::Ignored;
                }
                self.fullscreen = true;
                Outcome::FullscreenChanged(true)
            }
            UserAction::Key(command) => self.handle_key(command),
        }
    }

    fn handle_key(&mut self, command: KeyCommand) -> Outcome {
        match command {
            KeyCommand::TogglePlay => self.handle_action(UserAction::TogglePlay),
            KeyCommand::ToggleFullscreen => self.handle_action(UserAction::ToggleFullscreen),
            KeyCommand::ToggleMute if self.config.volume_control => {
                self.handle_action(UserAction::ToggleMute)
            }
            KeyCommand::VolumeUp if self.config.volume_control => {
                self.controller.adjust_volume(VOLUME_STEP);
                Outcome::Handled
            }
            KeyCommand::VolumeDown if self.config.volume_control => {
                self.controller.adjust_volume(-VOLUME_STEP);
                Outcome::Handled
            }
            _ => Outcome::Ignored,
        }
    }

    /// Autoplay overlay dismissed: restart audibly from the top
    fn unmute_autoplay(&mut self) -> Outcome {
        if !self.overlay.dismiss_autoplay() {
            return Outcome::Ignored;
        }

        self.controller.mark_interacted();
        self.controller.seek(0.0);
        self.controller.media().set_muted(false);

        // Already playing, so no play event will start the timer
        if self.config.save_progress && self.save_timer.start() {
            info!("Starting progress save interval from autoplay");
        }

        Outcome::Handled
    }

    /// Apply a media element or engine event
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.destroyed {
            return;
        }

        match event {
            MediaEvent::Ready => {
                if !self.ready {
                    self.ready = true;
                    self.controller.apply_quality(self.engine.as_deref());
                    debug!(duration = self.controller.media().duration(), "Media ready");
                }
            }
            MediaEvent::Play => {
                self.playing = true;
                let interacted = self.controller.has_interacted();
                if self.config.save_progress && interacted {
                    if self.save_timer.start() {
                        info!("Starting progress save interval");
                    }
                } else {
                    debug!(
                        save_progress = self.config.save_progress,
                        interacted, "Not saving progress"
                    );
                }
                self.notifications.push(Notification::Play);
            }
            MediaEvent::Pause => {
                self.playing = false;
                if self.save_timer.stop() && self.controller.has_interacted() {
                    self.save_now();
                }
                self.notifications.push(Notification::Pause);
            }
            MediaEvent::TimeUpdate => {
                let media = self.controller.media();
                self.notifications.push(Notification::Progress {
                    current_time: media.current_time(),
                    duration: media.duration(),
                });
            }
            MediaEvent::Ended => {
                self.playing = false;
                self.save_timer.stop();
                if self.config.save_progress {
                    self.store.clear();
                }
                self.notifications.push(Notification::Ended);
            }
            MediaEvent::VolumeChange | MediaEvent::Progress => {}
            MediaEvent::Error(kind) => {
                error!(code = kind.error_code(), "Playback error: {}", kind);
                if self.overlay.fail(kind) {
                    self.notifications.push(Notification::Error {
                        message: kind.message().to_string(),
                    });
                }
            }
        }
    }

    /// Periodic save, called by the host's interval
    pub fn tick(&mut self) -> bool {
        if self.destroyed || !self.save_timer.is_running() {
            return false;
        }
        self.save_now()
    }

    fn save_now(&self) -> bool {
        let media = self.controller.media();
        self.store
            .save(&self.config.video_src, media.current_time(), media.duration())
    }

    /// Tap on the video wrapper
    pub fn tap_controls(&mut self, viewport_width: f64) -> TapOutcome {
        if self.destroyed {
            return TapOutcome::Ignored;
        }
        self.controls.tap(viewport_width)
    }

    /// Idle delay after a tap elapsed
    pub fn auto_hide_controls(&mut self) {
        self.controls.auto_hide();
    }

    /// Embedder `play()`: counts as a user gesture
    pub fn play(&mut self) {
        if !self.destroyed {
            self.controller.play_by_user();
        }
    }

    pub fn pause(&mut self) {
        if !self.destroyed {
            self.controller.pause();
        }
    }

    pub fn seek_to(&mut self, seconds: f64) {
        if !self.destroyed {
            self.controller.seek(seconds);
        }
    }

    pub fn current_time(&self) -> f64 {
        self.controller.media().current_time()
    }

    /// Change the quality preference
    pub fn set_quality(&mut self, preference: QualityPreference) -> Option<QualitySelection> {
        if self.destroyed {
            return None;
        }
        self.controller.set_quality(self.engine.as_deref(), preference)
    }

    pub fn quality(&self) -> QualityPreference {
        self.controller.quality()
    }

    /// Levels reported by the engine; empty for native playback
    pub fn quality_levels(&self) -> Vec<QualityLevelInfo> {
        self.engine
            .as_ref()
            .map(|engine| engine.levels().iter().map(|l| l.info()).collect())
            .unwrap_or_default()
    }

    /// Drain pending lifecycle notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Snapshot for the rendering adapter
    pub fn view(&self) -> ControlsView {
        let media = self.controller.media();
        let position = media.current_time();
        let duration = media.duration();
        let muted = media.muted();
        let volume = media.volume();

        ControlsView {
            playing: self.playing,
            overlay: self.overlay.current(),
            current_time: format_time(position),
            duration: format_time(duration),
            progress_percent: progress_fill(position, duration, self.config.distortion_factor),
            buffered_percent: media.buffered_end().map(|end| buffered_fill(end, duration)),
            volume_percent: if muted { 0.0 } else { volume * 100.0 },
            muted_icon: muted || volume == 0.0,
            fullscreen: self.fullscreen,
            time_display_visible: self.ready && !self.config.hide_controls,
            controls_shown: self.controls.is_shown(),
        }
    }

    /// Stop the save timer, save once, release the engine.
    ///
    /// Idempotent; everything after the first call is a no-op.
    #[instrument(skip(self), fields(key = self.store.key()))]
    pub fn destroy(&mut self) {
        if std::mem::replace(&mut self.destroyed, true) {
            return;
        }

        self.save_timer.stop();
        self.autoplay_pending = false;
        if self.config.save_progress {
            self.save_now();
        }
        if let Some(engine) = self.engine.take() {
            engine.destroy();
        }

        info!("Player destroyed");
    }
}
