//! Console logging - forwards `tracing` events to the browser console

use std::fmt::Write;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::console;

/// Most verbose level written (see [`level_rank`]), adjustable at runtime
static MAX_LEVEL: AtomicU8 = AtomicU8::new(3);

fn level_rank(level: Level) -> u8 {
    match level {
        Level::ERROR => 1,
        Level::WARN => 2,
        Level::INFO => 3,
        Level::DEBUG => 4,
        _ => 5,
    }
}

fn filter_rank(filter: LevelFilter) -> u8 {
    filter.into_level().map(level_rank).unwrap_or(0)
}

/// Layer writing one console line per event, at the matching console level
struct ConsoleLayer;

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if level_rank(*event.metadata().level()) > MAX_LEVEL.load(Ordering::Relaxed) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = JsValue::from_str(&format!("[VSL] {}{}", visitor.message, visitor.fields));
        match *event.metadata().level() {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            Level::INFO => console::info_1(&line),
            _ => console::debug_1(&line),
        }
    }
}

/// Install the console subscriber. Later calls only change the level.
pub fn init(level: LevelFilter) {
    set_level(level);
    let _ = tracing_subscriber::registry().with(ConsoleLayer).try_init();
}

pub fn set_level(level: LevelFilter) {
    MAX_LEVEL.store(filter_rank(level), Ordering::Relaxed);
}
