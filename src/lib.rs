//! Idiom Stack core crate.
//!
//! Stacked-tile idiom puzzle: tap uncovered tiles to collect their characters into a
//! ten-card slot and clear them by completing four-character idioms. The game logic
//! is plain Rust and tested natively; `IdiomGame` is the only type the browser sees.

use wasm_bindgen::prelude::*;

pub mod arrange;
pub mod board;
pub mod error;
pub mod idioms;
pub mod levels;
pub mod matcher;
pub mod session;
pub mod slot;
mod web;

pub use board::{Board, BoardLayout, Placement, Position, Tile, TileId, TileStatus};
pub use error::{ActionError, BoardError, CapacityExceeded, IdiomDataError, SessionError};
pub use idioms::{IdiomLibrary, IdiomRecord};
pub use levels::{ActionBudget, BoardShape, LevelConfig, LevelId};
pub use session::{Action, GamePhase, LevelSession, LossReason, SessionEvent, SessionSnapshot};
pub use web::IdiomGame;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web::init_logger();
}

/// Milliseconds from `performance.now()`, or 0 outside a browser.
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
