//! Browser surface: a `wasm-bindgen` wrapper around [`LevelSession`] and a `log`
//! sink that writes to the devtools console.
//!
//! Results cross the boundary as JSON strings; errors become `JsValue` strings.

use log::{Level, LevelFilter, Metadata, Record};
use wasm_bindgen::prelude::*;

use crate::error::SessionError;
use crate::idioms::IdiomLibrary;
use crate::levels::{self, LevelId};
use crate::session::{LevelSession, SessionEvent};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("{} {} - {}", record.level(), record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Later calls are no-ops.
pub fn init_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn events_json(events: &[SessionEvent]) -> Result<String, JsValue> {
    serde_json::to_string(events).map_err(to_js)
}

#[cfg(feature = "rng")]
fn seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            log::warn!("getrandom failed ({err}); seeding from clock");
            clock_seed()
        }
    }
}

#[cfg(not(feature = "rng"))]
fn seed() -> u64 {
    clock_seed()
}

fn clock_seed() -> u64 {
    crate::performance_now().to_bits() ^ 0x9e37_79b9_7f4a_7c15
}

#[wasm_bindgen]
pub struct IdiomGame {
    level: LevelId,
    session: LevelSession,
}

#[wasm_bindgen]
impl IdiomGame {
    /// Start level `level` (1-based) with the bundled idiom list.
    #[wasm_bindgen(constructor)]
    pub fn new(level: u32) -> Result<IdiomGame, JsValue> {
        let id = LevelId::from_number(level).ok_or_else(|| JsValue::from_str(&format!("unknown level {level}")))?;
        let session = LevelSession::new(levels::level(id), IdiomLibrary::bundled(), seed()).map_err(to_js)?;
        Ok(IdiomGame { level: id, session })
    }

    /// Replace the idiom list and redeal. Bad input, or a list too short for the
    /// current level, leaves the game playing on the bundled list; the latter is
    /// still reported as an error.
    pub fn load_idioms(&mut self, json: &str) -> Result<(), JsValue> {
        self.session.set_library(IdiomLibrary::load_or_bundled(Some(json)));
        match self.session.reset() {
            Ok(()) => Ok(()),
            Err(err @ SessionError::NotEnoughIdioms { .. }) => {
                log::warn!("{err}; restoring bundled idioms");
                self.session.set_library(IdiomLibrary::bundled());
                self.session.reset().map_err(to_js)?;
                Err(to_js(err))
            }
            Err(err) => Err(to_js(err)),
        }
    }

    pub fn level(&self) -> u32 {
        self.level.number()
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.session.phase()).to_lowercase()
    }

    /// Advance animation time; pass `performance.now()` from the frame callback.
    pub fn tick(&mut self, now_ms: f64) {
        self.session.set_time(now_ms);
    }

    pub fn handle_tap(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        self.session.set_time(crate::performance_now());
        events_json(&self.session.handle_tap(x, y))
    }

    pub fn undo(&mut self) -> Result<String, JsValue> {
        let events = self.session.undo().map_err(to_js)?;
        events_json(&events)
    }

    pub fn move_to_buffer(&mut self) -> Result<String, JsValue> {
        let events = self.session.move_to_buffer().map_err(to_js)?;
        events_json(&events)
    }

    pub fn return_from_buffer(&mut self, index: usize) -> Result<String, JsValue> {
        self.session.set_time(crate::performance_now());
        let events = self.session.return_from_buffer(index).map_err(to_js)?;
        events_json(&events)
    }

    pub fn shuffle(&mut self) -> Result<String, JsValue> {
        let events = self.session.shuffle().map_err(to_js)?;
        events_json(&events)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.session.reset().map_err(to_js)
    }

    /// Difficulty for the next deal (clamped to 1..=10).
    pub fn set_difficulty(&mut self, difficulty: u8) {
        self.session.config_mut().set_difficulty(difficulty);
    }

    /// Move to the following level. Returns false after the last one.
    pub fn next_level(&mut self) -> Result<bool, JsValue> {
        let Some(next) = self.level.next() else {
            return Ok(false);
        };
        *self.session.config_mut() = levels::level(next);
        self.session.reset().map_err(to_js)?;
        self.level = next;
        Ok(true)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(to_js)
    }
}
