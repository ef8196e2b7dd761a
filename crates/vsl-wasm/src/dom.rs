//! DOM construction and rendering
//!
//! The widget owns the container's subtree. [`Elements::render`] repaints
//! it from a [`ControlsView`] snapshot after every event.

use js_sys::Promise;
use vsl_core::{
    theme::{self, STYLESHEET_ID},
    ControlsView, Overlay, PlayerConfig,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, HtmlVideoElement, OrientationLockType};

/// Root class of a mounted container
pub const CONTAINER_CLASS: &str = "vsl-player-container";

const HIDDEN: &str = "vsl-hidden";

/// Clicks inside these never count as a tap on the video surface
const BUTTON_SELECTOR: &str = ".vsl-control-btn, .vsl-overlay-btn, .vsl-center-play-btn";

const TEMPLATE: &str = r#"
<div class="vsl-player-wrapper">
  <video class="vsl-video" playsinline webkit-playsinline></video>

  <button class="vsl-center-play-btn" aria-label="Play">
    <svg viewBox="0 0 24 24"><polygon points="8 5 19 12 8 19 8 5" fill="currentColor"></polygon></svg>
  </button>

  <div class="vsl-overlay vsl-resume-overlay vsl-hidden">
    <div class="vsl-overlay-content">
      <h2 class="vsl-overlay-title">You have already started watching this video</h2>
      <div class="vsl-overlay-buttons">
        <button class="vsl-overlay-btn vsl-resume-btn">
          <svg class="vsl-icon" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polygon points="5 3 19 12 5 21 5 3"></polygon></svg>
          <span>Continue watching?</span>
        </button>
        <button class="vsl-overlay-btn vsl-restart-btn">
          <svg class="vsl-icon" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polyline points="1 4 1 10 7 10"></polyline><path d="M3.51 15a9 9 0 1 0 2.13-9.36L1 10"></path></svg>
          <span>Start from beginning?</span>
        </button>
      </div>
    </div>
  </div>

  <div class="vsl-overlay vsl-autoplay-overlay vsl-hidden">
    <div class="vsl-overlay-content">
      <h2 class="vsl-overlay-title">Your video has already started</h2>
      <svg class="vsl-icon-large" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polygon points="11 5 6 9 2 9 2 15 6 15 11 19 11 5"></polygon><line x1="23" y1="9" x2="17" y2="15"></line><line x1="17" y1="9" x2="23" y2="15"></line></svg>
      <div><button class="vsl-overlay-btn vsl-unmute-btn">Click to listen</button></div>
    </div>
  </div>

  <div class="vsl-overlay vsl-error-overlay vsl-hidden">
    <div class="vsl-overlay-content">
      <svg class="vsl-icon-large" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><circle cx="12" cy="12" r="10"></circle><line x1="12" y1="8" x2="12" y2="12"></line><line x1="12" y1="16" x2="12.01" y2="16"></line></svg>
      <h2 class="vsl-overlay-title vsl-error-title">Video Error</h2>
      <p class="vsl-error-message"></p>
    </div>
  </div>
</div>

<div class="vsl-progress-container">
  <div class="vsl-progress-buffered"></div>
  <div class="vsl-progress-bar"></div>
</div>

<div class="vsl-controls">
  <button class="vsl-control-btn vsl-play-btn" aria-label="Play">
    <svg class="vsl-icon vsl-play-icon" viewBox="0 0 24 24" fill="currentColor"><polygon points="5 3 19 12 5 21 5 3"></polygon></svg>
    <svg class="vsl-icon vsl-pause-icon vsl-hidden" viewBox="0 0 24 24" fill="currentColor"><rect x="6" y="4" width="4" height="16"></rect><rect x="14" y="4" width="4" height="16"></rect></svg>
  </button>

  <div class="vsl-time-display vsl-hidden">
    <span class="vsl-current-time">0:00</span> / <span class="vsl-duration">0:00</span>
  </div>

  <div class="vsl-controls-right">
    <div class="vsl-volume-control">
      <button class="vsl-control-btn vsl-volume-btn" aria-label="Mute">
        <svg class="vsl-icon vsl-volume-high" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polygon points="11 5 6 9 2 9 2 15 6 15 11 19 11 5"></polygon><path d="M19.07 4.93a10 10 0 0 1 0 14.14"></path><path d="M15.54 8.46a5 5 0 0 1 0 7.07"></path></svg>
        <svg class="vsl-icon vsl-volume-muted vsl-hidden" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><polygon points="11 5 6 9 2 9 2 15 6 15 11 19 11 5"></polygon><line x1="23" y1="9" x2="17" y2="15"></line><line x1="17" y1="9" x2="23" y2="15"></line></svg>
      </button>
      <input type="range" class="vsl-volume-slider" min="0" max="100" value="100" aria-label="Volume">
    </div>

    <button class="vsl-control-btn vsl-fullscreen-btn" aria-label="Fullscreen">
      <svg class="vsl-icon vsl-fullscreen-enter" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M8 3H5a2 2 0 0 0-2 2v3m18 0V5a2 2 0 0 0-2-2h-3m0 18h3a2 2 0 0 0 2-2v-3M3 16v3a2 2 0 0 0 2 2h3"></path></svg>
      <svg class="vsl-icon vsl-fullscreen-exit vsl-hidden" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M8 3v3a2 2 0 0 1-2 2H3m18 0h-3a2 2 0 0 1-2-2V3m0 18v-3a2 2 0 0 1 2-2h3M3 16h3a2 2 0 0 1 2 2v3"></path></svg>
    </button>
  </div>
</div>
"#;

fn query<T: JsCast>(root: &Element, selector: &str) -> Result<T, JsValue> {
    root.query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("missing element {}", selector)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("unexpected element type for {}", selector)))
}

fn set_hidden(element: &Element, hidden: bool) {
    let _ = element.class_list().toggle_with_force(HIDDEN, hidden);
}

fn set_width(element: &HtmlElement, percent: f64) {
    let _ = element.style().set_property("width", &format!("{:.3}%", percent));
}

/// Handles to every element the player updates or listens on
pub struct Elements {
    pub wrapper: HtmlElement,
    pub video: HtmlVideoElement,
    pub center_play: HtmlElement,
    pub resume_overlay: HtmlElement,
    pub resume_btn: HtmlElement,
    pub restart_btn: HtmlElement,
    pub autoplay_overlay: HtmlElement,
    pub error_overlay: HtmlElement,
    pub error_message: HtmlElement,
    pub progress_container: HtmlElement,
    pub progress_buffered: HtmlElement,
    pub progress_bar: HtmlElement,
    pub play_btn: HtmlElement,
    pub play_icon: Element,
    pub pause_icon: Element,
    pub time_display: HtmlElement,
    pub current_time: HtmlElement,
    pub duration: HtmlElement,
    pub volume_control: HtmlElement,
    pub volume_btn: HtmlElement,
    pub volume_high: Element,
    pub volume_muted: Element,
    pub volume_slider: HtmlInputElement,
    pub fullscreen_btn: HtmlElement,
    pub fullscreen_enter: Element,
    pub fullscreen_exit: Element,
}

impl Elements {
    /// Replace the container's content with the player tree and apply the
    /// parts of the config that never change
    pub fn build(container: &HtmlElement, config: &PlayerConfig) -> Result<Self, JsValue> {
        container.set_class_name(CONTAINER_CLASS);
        container.set_inner_html(TEMPLATE);
        container.set_tab_index(0);

        let style = container.style();
        for (name, value) in theme::css_variables(&config.color_theme) {
            style.set_property(name, &value)?;
        }

        let root: &Element = container.as_ref();
        let elements = Self {
            wrapper: query(root, ".vsl-player-wrapper")?,
            video: query(root, ".vsl-video")?,
            center_play: query(root, ".vsl-center-play-btn")?,
            resume_overlay: query(root, ".vsl-resume-overlay")?,
            resume_btn: query(root, ".vsl-resume-btn")?,
            restart_btn: query(root, ".vsl-restart-btn")?,
            autoplay_overlay: query(root, ".vsl-autoplay-overlay")?,
            error_overlay: query(root, ".vsl-error-overlay")?,
            error_message: query(root, ".vsl-error-message")?,
            progress_container: query(root, ".vsl-progress-container")?,
            progress_buffered: query(root, ".vsl-progress-buffered")?,
            progress_bar: query(root, ".vsl-progress-bar")?,
            play_btn: query(root, ".vsl-play-btn")?,
            play_icon: query(root, ".vsl-play-icon")?,
            pause_icon: query(root, ".vsl-pause-icon")?,
            time_display: query(root, ".vsl-time-display")?,
            current_time: query(root, ".vsl-current-time")?,
            duration: query(root, ".vsl-duration")?,
            volume_control: query(root, ".vsl-volume-control")?,
            volume_btn: query(root, ".vsl-volume-btn")?,
            volume_high: query(root, ".vsl-volume-high")?,
            volume_muted: query(root, ".vsl-volume-muted")?,
            volume_slider: query(root, ".vsl-volume-slider")?,
            fullscreen_btn: query(root, ".vsl-fullscreen-btn")?,
            fullscreen_enter: query(root, ".vsl-fullscreen-enter")?,
            fullscreen_exit: query(root, ".vsl-fullscreen-exit")?,
        };

        elements.video.set_controls(false);
        elements.video.set_preload("metadata");

        let cursor = if config.hide_controls { "default" } else { "pointer" };
        elements.progress_container.style().set_property("cursor", cursor)?;
        set_hidden(&elements.volume_control, !config.volume_control);
        set_hidden(&elements.fullscreen_btn, !config.fullscreen_control);

        Ok(elements)
    }

    /// Repaint from a snapshot
    pub fn render(&self, container: &HtmlElement, view: &ControlsView) {
        let classes = container.class_list();
        let _ = classes.toggle_with_force("playing", view.playing);
        let _ = classes.toggle_with_force("vsl-fullscreen", view.fullscreen);
        let _ = self
            .wrapper
            .class_list()
            .toggle_with_force("vsl-show-controls", view.controls_shown);

        set_hidden(&self.play_icon, view.playing);
        set_hidden(&self.pause_icon, !view.playing);

        set_hidden(&self.resume_overlay, view.overlay != Overlay::Resume);
        set_hidden(&self.autoplay_overlay, view.overlay != Overlay::Autoplay);
        match view.overlay.error_message() {
            Some(message) => {
                self.error_message.set_text_content(Some(message));
                set_hidden(&self.error_overlay, false);
            }
            None => set_hidden(&self.error_overlay, true),
        }

        set_width(&self.progress_bar, view.progress_percent);
        if let Some(buffered) = view.buffered_percent {
            set_width(&self.progress_buffered, buffered);
        }

        set_hidden(&self.time_display, !view.time_display_visible);
        self.current_time.set_text_content(Some(&view.current_time));
        self.duration.set_text_content(Some(&view.duration));

        self.volume_slider
            .set_value(&format!("{}", view.volume_percent.round()));
        set_hidden(&self.volume_high, view.muted_icon);
        set_hidden(&self.volume_muted, !view.muted_icon);

        set_hidden(&self.fullscreen_enter, view.fullscreen);
        set_hidden(&self.fullscreen_exit, !view.fullscreen);
    }
}

/// Whether `event` started on (or inside) one of the widget's buttons
pub fn is_button_click(event: &Event) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest(BUTTON_SELECTOR).ok().flatten())
        .is_some()
}

/// Remove everything the widget added to the container
pub fn teardown(container: &HtmlElement) {
    container.set_inner_html("");
    let _ = container.class_list().remove_3(CONTAINER_CLASS, "playing", "vsl-fullscreen");
    let _ = container.remove_attribute("tabindex");
    let style = container.style();
    for (name, _) in theme::css_variables("") {
        let _ = style.remove_property(name);
    }
}

/// Add the widget stylesheet unless a previous mount already did
pub fn inject_stylesheet(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLESHEET_ID).is_some() {
        return Ok(());
    }

    let style = document.create_element("style")?;
    style.set_id(STYLESHEET_ID);
    style.set_text_content(Some(theme::stylesheet()));

    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?
            .append_child(&style)?,
    };
    Ok(())
}

/// Ask for landscape orientation. Resolves in the background; rejections
/// (desktop, no fullscreen document) are only logged.
pub fn lock_orientation() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let promise: Promise = window
        .screen()?
        .orientation()
        .lock(OrientationLockType::Landscape)?;

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            tracing::debug!(reason = ?e, "Orientation lock refused");
        }
    });
    Ok(())
}

/// Release the orientation lock
pub fn unlock_orientation() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.screen()?.orientation().unlock()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes_of(tag: &str) -> Vec<Vec<&'static str>> {
        TEMPLATE
            .split('<')
            .filter(|element| element.starts_with(tag))
            .filter_map(|element| element.split("class=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .map(|classes| classes.split_whitespace().collect())
            .collect()
    }

    #[test]
    fn test_every_button_is_excluded_from_taps() {
        let excluded: Vec<&str> = BUTTON_SELECTOR
            .split(',')
            .map(|s| s.trim().trim_start_matches('.'))
            .collect();

        let buttons = classes_of("button");
        assert_eq!(buttons.len(), 7);
        for classes in buttons {
            assert!(
                classes.iter().any(|c| excluded.contains(c)),
                "button {:?} would toggle the controls",
                classes
            );
        }
    }

    #[test]
    fn test_surface_elements_still_tap() {
        let excluded: Vec<&str> = BUTTON_SELECTOR
            .split(',')
            .map(|s| s.trim().trim_start_matches('.'))
            .collect();

        for classes in classes_of("video").into_iter().chain(classes_of("div")) {
            assert!(!classes.iter().any(|c| excluded.contains(c)), "{:?}", classes);
        }
    }
}
