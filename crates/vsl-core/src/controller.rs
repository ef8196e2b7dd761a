//! Playback Controller - forwards playback intent to the media element
//!
//! All operations are synchronous requests; the media element reports the
//! resulting state changes later through its events.

use crate::{
    media::{MediaElement, StreamingEngine},
    quality::{self, QualityPreference, QualitySelection},
};
use tracing::{debug, info};

/// Step applied by the volume keys
pub const VOLUME_STEP: f64 = 0.1;

/// Playback intent for one player instance
pub struct PlaybackController<M> {
    media: M,
    /// One-way latch set by any explicit play gesture
    interacted: bool,
    /// Volume to restore when unmuting
    saved_volume: f64,
    /// Current quality preference
    quality: QualityPreference,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(media: M, quality: QualityPreference) -> Self {
        Self {
            media,
            interacted: false,
            saved_volume: 1.0,
            quality,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Whether the user has made an explicit play gesture
    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    /// Set the interaction latch. It is never cleared.
    pub fn mark_interacted(&mut self) {
        if !self.interacted {
            info!("User interaction detected, progress saving enabled");
        }
        self.interacted = true;
    }

    pub fn play(&self) {
        self.media.play();
    }

    /// Play on behalf of an explicit user gesture
    pub fn play_by_user(&mut self) {
        self.mark_interacted();
        self.play();
    }

    pub fn pause(&self) {
        self.media.pause();
    }

    /// Play when paused, pause otherwise. Returns true if play was requested.
    pub fn toggle_play(&mut self) -> bool {
        if self.media.paused() {
            self.play_by_user();
            true
        } else {
            self.pause();
            false
        }
    }

    /// Set the media position directly
    pub fn seek(&self, seconds: f64) {
        debug!(to = seconds, "Seeking");
        self.media.set_current_time(seconds);
    }

    /// Set volume in `[0, 1]` and unmute
    pub fn set_volume(&self, volume: f64) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        self.media.set_volume(volume);
        self.media.set_muted(false);
    }

    /// Nudge the volume by `delta`, clamped to `[0, 1]`
    pub fn adjust_volume(&self, delta: f64) {
        self.set_volume(self.media.volume() + delta);
    }

    /// Mute, remembering the volume, or unmute and restore it
    pub fn toggle_mute(&mut self) {
        if self.media.muted() {
            self.media.set_muted(false);
            self.media.set_volume(self.saved_volume);
        } else {
            self.saved_volume = self.media.volume();
            self.media.set_muted(true);
        }
    }

    /// Mute without touching the saved volume (autoplay)
    pub fn mute_for_autoplay(&self) {
        self.media.set_muted(true);
    }

    pub fn set_playback_rate(&self, rate: f64) {
        self.media.set_playback_rate(rate);
    }

    pub fn quality(&self) -> QualityPreference {
        self.quality
    }

    /// Record a new preference and apply it to the engine
    pub fn set_quality(
        &mut self,
        engine: Option<&dyn StreamingEngine>,
        preference: QualityPreference,
    ) -> Option<QualitySelection> {
        self.quality = preference;
        self.apply_quality(engine)
    }

    /// Resolve the current preference against the engine's levels.
    ///
    /// No-op without an engine or before it reports any levels.
    pub fn apply_quality(&self, engine: Option<&dyn StreamingEngine>) -> Option<QualitySelection> {
        let engine = engine?;
        let levels = engine.levels();
        let selection = quality::resolve(&levels, self.quality)?;
        engine.set_current_level(selection.engine_level());

        match selection {
            QualitySelection::Auto => info!("Quality set to auto"),
            QualitySelection::Fixed(index) => {
                let level = &levels[index];
                info!(height = level.height, bitrate = level.bitrate, "Quality set to {}", level.label());
            }
        }

        Some(selection)
    }
}
