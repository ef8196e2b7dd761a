//! Mounted player - wires DOM, media and hls.js events into the core
//!
//! Every event goes through [`Shared::update`]: the core handles it, the
//! save interval is reconciled with the core's timer state, the controls
//! are repainted, and only then, with no borrow held, embedder callbacks
//! run. Callbacks may therefore call back into the player.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::{Interval, Timeout};
use js_sys::{Array, Function, Object, Reflect};
use vsl_core::{
    controls::CONTROLS_HIDE_DELAY,
    format::seek_fraction,
    progress::SAVE_INTERVAL,
    detect_source_kind, select_backend, Backend, Error, InstanceId, KeyCommand, MediaEvent,
    Notification, Outcome, PlatformSupport, PlaybackErrorKind, PlayerConfig, PlayerCore,
    QualityPreference, Result, Startup, StreamingEngine, TapOutcome, UserAction,
};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent};

use crate::bindings::{self, Hls};
use crate::dom::{self, Elements};
use crate::media::{HlsEngine, VideoMedia};
use crate::storage::BrowserStorage;

type Core = PlayerCore<VideoMedia, BrowserStorage>;
type HlsCallback = Closure<dyn FnMut(JsValue, JsValue)>;

/// Release a JS-facing closure once the current task has finished, so a
/// listener is never freed while it is still running.
fn defer_drop<T: 'static>(value: T) {
    wasm_bindgen_futures::spawn_local(async move {
        drop(value);
    });
}

/// Embedder callbacks taken from the options object
#[derive(Default)]
struct Callbacks {
    on_ready: Option<Function>,
    on_play: Option<Function>,
    on_pause: Option<Function>,
    on_progress: Option<Function>,
    on_ended: Option<Function>,
    on_error: Option<Function>,
}

impl Callbacks {
    fn from_options(options: &JsValue) -> Self {
        let get = |name: &str| {
            Reflect::get(options, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.dyn_into::<Function>().ok())
        };
        Self {
            on_ready: get("onReady"),
            on_play: get("onPlay"),
            on_pause: get("onPause"),
            on_progress: get("onProgress"),
            on_ended: get("onEnded"),
            on_error: get("onError"),
        }
    }

    fn dispatch(&self, notification: Notification) {
        let this = JsValue::NULL;
        let result = match notification {
            Notification::Play => self.on_play.as_ref().map(|f| f.call0(&this)),
            Notification::Pause => self.on_pause.as_ref().map(|f| f.call0(&this)),
            Notification::Ended => self.on_ended.as_ref().map(|f| f.call0(&this)),
            Notification::Progress {
                current_time,
                duration,
            } => self
                .on_progress
                .as_ref()
                .map(|f| f.call2(&this, &current_time.into(), &duration.into())),
            Notification::Error { message } => self
                .on_error
                .as_ref()
                .map(|f| f.call1(&this, &JsValue::from_str(&message))),
        };

        if let Some(Err(e)) = result {
            tracing::warn!(error = ?e, "Player callback threw");
        }
    }

    fn ready(&self, player: &VslPlayer) {
        if let Some(f) = &self.on_ready {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from(player.clone())) {
                tracing::warn!(error = ?e, "onReady callback threw");
            }
        }
    }
}

/// Copy the options object without callbacks and empty values, then
/// deserialize it into a validated config
fn parse_config(options: &JsValue) -> Result<PlayerConfig> {
    let plain = Object::new();
    if let Some(object) = options.dyn_ref::<Object>() {
        for entry in Object::entries(object).iter() {
            let pair: Array = entry.unchecked_into();
            let value = pair.get(1);
            if value.is_function() || value.is_undefined() || value.is_null() {
                continue;
            }
            Reflect::set(&plain, &pair.get(0), &value)
                .map_err(|_| Error::InvalidConfig("options object is not readable".into()))?;
        }
    }

    let config = serde_wasm_bindgen::from_value::<PlayerConfig>(plain.into())
        .map_err(|e| Error::InvalidConfig(e.to_string()))?
        .with_fallbacks();
    config.validate()?;
    Ok(config)
}

struct Inner {
    core: Core,
    save_interval: Option<Interval>,
    hide_timeout: Option<Timeout>,
    listeners: Vec<EventListener>,
    hls_callbacks: Vec<HlsCallback>,
}

struct Shared {
    id: InstanceId,
    container: HtmlElement,
    elements: Elements,
    media: VideoMedia,
    callbacks: Callbacks,
    inner: RefCell<Inner>,
}

impl Shared {
    /// Run `f` against the core, then reconcile timers, repaint and notify
    fn update<R>(self: &Rc<Self>, f: impl FnOnce(&mut Core) -> R) -> R {
        let (result, view, notifications) = {
            let mut inner = self.inner.borrow_mut();
            let result = f(&mut inner.core);
            let running = inner.core.save_timer_running();
            self.sync_save_timer(&mut inner, running);
            let view = (!inner.core.is_destroyed()).then(|| inner.core.view());
            (result, view, inner.core.take_notifications())
        };

        if let Some(view) = view {
            self.elements.render(&self.container, &view);
        }
        for notification in notifications {
            self.callbacks.dispatch(notification);
        }
        result
    }

    /// Keep exactly one interval alive while the core's save timer runs
    fn sync_save_timer(self: &Rc<Self>, inner: &mut Inner, running: bool) {
        match (running, inner.save_interval.is_some()) {
            (true, false) => {
                let weak = Rc::downgrade(self);
                inner.save_interval = Some(Interval::new(SAVE_INTERVAL.as_millis() as u32, move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.update(|core| {
                            core.tick();
                        });
                    }
                }));
            }
            (false, true) => {
                if let Some(interval) = inner.save_interval.take() {
                    defer_drop(interval.cancel());
                }
            }
            _ => {}
        }
    }

    /// Apply a user action, following up on fullscreen changes
    fn act(self: &Rc<Self>, action: UserAction) -> Outcome {
        let outcome = self.update(|core| core.handle_action(action));

        if let Outcome::FullscreenChanged(entered) = outcome {
            let result = if entered {
                dom::lock_orientation()
            } else {
                dom::unlock_orientation()
            };
            if let Err(e) = result {
                tracing::debug!(reason = ?e, "Orientation change unavailable");
            }
        }

        outcome
    }

    /// Tap on the video wrapper: toggle controls and (re)arm the hide delay
    fn tap(self: &Rc<Self>) {
        let width = web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|w| w.as_f64())
            .unwrap_or(f64::INFINITY);
        let outcome = self.update(|core| core.tap_controls(width));

        let mut inner = self.inner.borrow_mut();
        if let Some(previous) = inner.hide_timeout.take() {
            defer_drop(previous.cancel());
        }
        if outcome == TapOutcome::Shown {
            let weak = Rc::downgrade(self);
            inner.hide_timeout = Some(Timeout::new(CONTROLS_HIDE_DELAY.as_millis() as u32, move || {
                if let Some(shared) = weak.upgrade() {
                    if let Some(fired) = shared.inner.borrow_mut().hide_timeout.take() {
                        defer_drop(fired);
                    }
                    shared.update(|core| core.auto_hide_controls());
                }
            }));
        }
    }

    fn request_autoplay(self: &Rc<Self>) {
        let media = self.media.clone();
        let weak = Rc::downgrade(self);
        wasm_bindgen_futures::spawn_local(async move {
            let started = media.request_autoplay().await;
            // Resolution after destroy or unmount is dropped here or by the core
            if let Some(shared) = weak.upgrade() {
                shared.update(|core| core.autoplay_resolved(started));
            }
        });
    }
}

fn listen<F>(weak: &Weak<Shared>, target: &EventTarget, event: &'static str, handler: F) -> EventListener
where
    F: Fn(&Rc<Shared>, &Event) + 'static,
{
    let weak = weak.clone();
    EventListener::new(target, event, move |e| {
        if let Some(shared) = weak.upgrade() {
            handler(&shared, e);
        }
    })
}

fn listen_preventable<F>(
    weak: &Weak<Shared>,
    target: &EventTarget,
    event: &'static str,
    handler: F,
) -> EventListener
where
    F: Fn(&Rc<Shared>, &Event) + 'static,
{
    let weak = weak.clone();
    EventListener::new_with_options(
        target,
        event,
        EventListenerOptions::enable_prevent_default(),
        move |e| {
            if let Some(shared) = weak.upgrade() {
                handler(&shared, e);
            }
        },
    )
}

fn on_media(weak: &Weak<Shared>, target: &EventTarget, event: &'static str, media_event: MediaEvent) -> EventListener {
    listen(weak, target, event, move |shared, _| {
        shared.update(|core| core.handle_media_event(media_event));
    })
}

fn on_click(weak: &Weak<Shared>, target: &EventTarget, action: UserAction) -> EventListener {
    listen(weak, target, "click", move |shared, _| {
        shared.act(action);
    })
}

fn attach_listeners(shared: &Rc<Shared>, engine_backed: bool) -> Vec<EventListener> {
    let weak = Rc::downgrade(shared);
    let el = &shared.elements;
    let video: &EventTarget = el.video.as_ref();

    let mut listeners = vec![
        on_media(&weak, video, "play", MediaEvent::Play),
        on_media(&weak, video, "pause", MediaEvent::Pause),
        on_media(&weak, video, "timeupdate", MediaEvent::TimeUpdate),
        on_media(&weak, video, "ended", MediaEvent::Ended),
        on_media(&weak, video, "volumechange", MediaEvent::VolumeChange),
        on_media(&weak, video, "progress", MediaEvent::Progress),
        listen(&weak, video, "error", |shared, _| {
            if let Some(error) = shared.elements.video.error() {
                let kind = PlaybackErrorKind::from_media_error_code(error.code());
                shared.update(|core| core.handle_media_event(MediaEvent::Error(kind)));
            }
        }),
        // iOS Safari: swap native fullscreen for the custom one
        listen_preventable(&weak, video, "webkitbeginfullscreen", |shared, e| {
            e.prevent_default();
            shared.act(UserAction::EnterFullscreen);
        }),
        on_click(&weak, video, UserAction::TogglePlay),
        on_click(&weak, &el.center_play, UserAction::TogglePlay),
        on_click(&weak, &el.play_btn, UserAction::TogglePlay),
        on_click(&weak, &el.resume_btn, UserAction::Resume),
        on_click(&weak, &el.restart_btn, UserAction::Restart),
        // Covers the "Click to listen" button as well
        on_click(&weak, &el.autoplay_overlay, UserAction::Unmute),
        on_click(&weak, &el.volume_btn, UserAction::ToggleMute),
        on_click(&weak, &el.fullscreen_btn, UserAction::ToggleFullscreen),
        listen(&weak, &el.progress_container, "click", |shared, e| {
            let Some(click) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let rect = shared.elements.progress_container.get_bounding_client_rect();
            if let Some(fraction) = seek_fraction(f64::from(click.client_x()), rect.left(), rect.width()) {
                shared.act(UserAction::SeekToFraction(fraction));
            }
        }),
        listen(&weak, &el.volume_slider, "input", |shared, _| {
            let value = shared.elements.volume_slider.value_as_number();
            if value.is_finite() {
                shared.act(UserAction::SetVolume(value / 100.0));
            }
        }),
        listen(&weak, &el.wrapper, "click", |shared, e| {
            // Buttons bubble here too; only bare surface taps toggle the controls
            if !dom::is_button_click(e) {
                shared.tap();
            }
        }),
        listen_preventable(&weak, &shared.container, "keydown", |shared, e| {
            let Some(key) = e.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
                return;
            };
            if let Some(command) = KeyCommand::from_key(&key) {
                e.prevent_default();
                shared.act(UserAction::Key(command));
            }
        }),
    ];

    // hls.js reports readiness through MANIFEST_PARSED instead
    if !engine_backed {
        listeners.push(on_media(&weak, video, "loadedmetadata", MediaEvent::Ready));
    }

    listeners
}

fn attach_hls(shared: &Rc<Shared>, hls: &Hls) -> Vec<HlsCallback> {
    let weak = Rc::downgrade(shared);

    let parsed = {
        let weak = weak.clone();
        Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_event: JsValue, _data: JsValue| {
            if let Some(shared) = weak.upgrade() {
                shared.update(|core| core.handle_media_event(MediaEvent::Ready));
            }
        })
    };
    hls.on(bindings::MANIFEST_PARSED, parsed.as_ref().unchecked_ref());

    let error = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_event: JsValue, data: JsValue| {
        let (fatal, kind) = bindings::error_details(&data);
        if !fatal {
            tracing::warn!(kind = %kind, "Recoverable stream error");
            return;
        }
        if let Some(shared) = weak.upgrade() {
            let kind = PlaybackErrorKind::from_engine_type(&kind);
            shared.update(|core| core.handle_media_event(MediaEvent::Error(kind)));
        }
    });
    hls.on(bindings::ERROR, error.as_ref().unchecked_ref());

    vec![parsed, error]
}

/// A mounted VSL player.
///
/// Keep the handle (or a [`VslPlayerRegistry`](crate::VslPlayerRegistry))
/// alive for as long as the player should run.
#[wasm_bindgen]
#[derive(Clone)]
pub struct VslPlayer {
    shared: Rc<Shared>,
}

impl VslPlayer {
    /// Mount into the element matching `selector`
    pub fn mount(selector: &str, options: &JsValue) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::Internal("no document available".into()))?;
        let container = document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| Error::ContainerNotFound {
                selector: selector.to_string(),
            })?;

        let config = parse_config(options)?;
        let callbacks = Callbacks::from_options(options);
        let src = config.video_src.clone();

        if let Err(e) = dom::inject_stylesheet(&document) {
            tracing::warn!(error = ?e, "Failed to inject stylesheet");
        }
        let elements = Elements::build(&container, &config)
            .map_err(|e| Error::Internal(format!("failed to build player: {:?}", e)))?;
        let media = VideoMedia::new(elements.video.clone());

        let support = PlatformSupport {
            native_hls: media.supports_native_hls(),
            engine: bindings::hls_available(),
        };
        let backend = select_backend(detect_source_kind(&src), support);
        let hls = (backend == Backend::Engine).then(Hls::new);
        let engine = hls
            .clone()
            .map(|hls| Box::new(HlsEngine::new(hls)) as Box<dyn StreamingEngine>);

        let core = PlayerCore::new(config, media.clone(), engine, BrowserStorage::new())?;
        let shared = Rc::new(Shared {
            id: InstanceId::new(),
            container,
            elements,
            media,
            callbacks,
            inner: RefCell::new(Inner {
                core,
                save_interval: None,
                hide_timeout: None,
                listeners: Vec::new(),
                hls_callbacks: Vec::new(),
            }),
        });

        let listeners = attach_listeners(&shared, hls.is_some());
        let hls_callbacks = hls
            .as_ref()
            .map(|hls| attach_hls(&shared, hls))
            .unwrap_or_default();
        {
            let mut inner = shared.inner.borrow_mut();
            inner.listeners = listeners;
            inner.hls_callbacks = hls_callbacks;
        }

        match (backend, &hls) {
            (Backend::Engine, Some(hls)) => {
                hls.load_source(&src);
                hls.attach_media(&shared.elements.video);
            }
            (Backend::Unsupported, _) => {
                shared.update(|core| {
                    core.handle_media_event(MediaEvent::Error(PlaybackErrorKind::Unsupported))
                });
            }
            _ => shared.elements.video.set_src(&src),
        }

        if shared.update(|core| core.start()) == Startup::Autoplay {
            shared.request_autoplay();
        }

        tracing::info!(id = %shared.id, ?backend, "Player mounted");

        let player = Self { shared };
        player.shared.callbacks.ready(&player);
        Ok(player)
    }

    pub fn instance_id(&self) -> InstanceId {
        self.shared.id
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.inner.borrow().core.is_destroyed()
    }
}

#[wasm_bindgen]
impl VslPlayer {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.shared.id.to_string()
    }

    /// Start playback; counts as a user gesture
    pub fn play(&self) {
        self.shared.update(|core| core.play());
    }

    pub fn pause(&self) {
        self.shared.update(|core| core.pause());
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.shared.act(UserAction::TogglePlay);
    }

    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&self, seconds: f64) {
        self.shared.update(|core| core.seek_to(seconds));
    }

    #[wasm_bindgen(js_name = getCurrentTime)]
    pub fn current_time(&self) -> f64 {
        self.shared.inner.borrow().core.current_time()
    }

    /// Set volume in `[0, 1]`; out-of-range values are clamped
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.shared.act(UserAction::SetVolume(volume));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.shared.act(UserAction::ToggleMute);
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        self.shared.act(UserAction::ToggleFullscreen);
    }

    /// `"auto"`, `"high"`, `"medium"`, `"low"`, or a pixel height
    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&self, preference: JsValue) -> std::result::Result<(), JsValue> {
        let preference: QualityPreference = serde_wasm_bindgen::from_value(preference)?;
        self.shared.update(|core| core.set_quality(preference));
        Ok(())
    }

    /// `[{index, height, width, bitrate, label}]`; empty without hls.js
    #[wasm_bindgen(js_name = getQualityLevels)]
    pub fn quality_levels(&self) -> std::result::Result<JsValue, JsValue> {
        let levels = self.shared.inner.borrow().core.quality_levels();
        Ok(serde_wasm_bindgen::to_value(&levels)?)
    }

    /// Save progress, release hls.js and every listener, and empty the
    /// container. Calling it again does nothing.
    pub fn destroy(&self) {
        let (released, was_fullscreen) = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.core.is_destroyed() {
                return;
            }
            let was_fullscreen = inner.core.is_fullscreen();
            inner.core.destroy();
            let released = (
                std::mem::take(&mut inner.listeners),
                std::mem::take(&mut inner.hls_callbacks),
                inner.save_interval.take().map(Interval::cancel),
                inner.hide_timeout.take().map(Timeout::cancel),
            );
            (released, was_fullscreen)
        };

        if was_fullscreen {
            let _ = dom::unlock_orientation();
        }
        self.shared.media.unload();
        dom::teardown(&self.shared.container);
        defer_drop(released);

        tracing::info!(id = %self.shared.id, "Player unmounted");
    }
}
