//! In-process stand-ins for the browser media element and hls.js

use crate::media::{MediaElement, StreamingEngine};
use crate::quality::QualityLevel;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug)]
struct MediaState {
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    buffered_end: Option<f64>,
    play_requests: usize,
}

/// Media element whose requests take effect immediately
#[derive(Debug, Clone)]
pub struct FakeMedia(Rc<RefCell<MediaState>>);

impl FakeMedia {
    pub fn new(duration: f64) -> Self {
        Self(Rc::new(RefCell::new(MediaState {
            paused: true,
            current_time: 0.0,
            duration,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            buffered_end: None,
            play_requests: 0,
        })))
    }

    pub fn set_buffered_end(&self, end: f64) {
        self.0.borrow_mut().buffered_end = Some(end);
    }

    pub fn playback_rate(&self) -> f64 {
        self.0.borrow().playback_rate
    }

    pub fn play_requests(&self) -> usize {
        self.0.borrow().play_requests
    }
}

impl MediaElement for FakeMedia {
    fn play(&self) {
        let mut state = self.0.borrow_mut();
        state.paused = false;
        state.play_requests += 1;
    }

    fn pause(&self) {
        self.0.borrow_mut().paused = true;
    }

    fn paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.0.borrow_mut().current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn volume(&self) -> f64 {
        self.0.borrow().volume
    }

    fn set_volume(&self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn muted(&self) -> bool {
        self.0.borrow().muted
    }

    fn set_muted(&self, muted: bool) {
        self.0.borrow_mut().muted = muted;
    }

    fn set_playback_rate(&self, rate: f64) {
        self.0.borrow_mut().playback_rate = rate;
    }

    fn buffered_end(&self) -> Option<f64> {
        self.0.borrow().buffered_end
    }
}

/// Engine reporting a fixed ladder and recording level changes
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    levels: Rc<Vec<QualityLevel>>,
    current_level: Rc<Cell<Option<i32>>>,
    destroyed: Rc<Cell<bool>>,
}

impl FakeEngine {
    pub fn with_heights(heights: &[u32]) -> Self {
        let levels = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| QualityLevel::new(i, h, h * 16 / 9, u64::from(h) * 4_000))
            .collect();
        Self {
            levels: Rc::new(levels),
            ..Default::default()
        }
    }

    pub fn current_level(&self) -> Option<i32> {
        self.current_level.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

impl StreamingEngine for FakeEngine {
    fn levels(&self) -> Vec<QualityLevel> {
        self.levels.as_ref().clone()
    }

    fn set_current_level(&self, level: i32) {
        self.current_level.set(Some(level));
    }

    fn destroy(&self) {
        self.destroyed.set(true);
    }
}
