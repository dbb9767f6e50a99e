//! Error types shared across the crate.

use crate::session::{Action, GamePhase};

/// Failures while building the tile board from a layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board layout has no positions")]
    EmptyLayout,
    #[error("layer {layer} appears twice at position ({x}, {y})")]
    DuplicateLayer { x: i32, y: i32, layer: u32 },
    #[error("layer must be >= 1 (got 0 at ({x}, {y}))")]
    ZeroLayer { x: i32, y: i32 },
    #[error("no character assigned to ({x}, {y}) layer {layer}")]
    Unassigned { x: i32, y: i32, layer: u32 },
}

/// Failures while decoding a host-supplied idiom dataset.
#[derive(Debug, thiserror::Error)]
pub enum IdiomDataError {
    #[error("idiom data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("idiom data contains no usable idioms")]
    Empty,
}

/// Failures while constructing a level session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("no idioms available to build the level")]
    NoIdioms,
    #[error("invalid level config: {0}")]
    Config(String),
    #[error("level needs {needed} distinct idioms but only {available} are loaded")]
    NotEnoughIdioms { needed: usize, available: usize },
}

/// A player action that could not run. The session state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("level is not being played (phase: {0:?})")]
    NotPlaying(GamePhase),
    #[error("{0:?} has no uses left")]
    BudgetExhausted(Action),
    #[error("{0:?} is not available on this level")]
    Disabled(Action),
    #[error("{0:?} has nothing to act on")]
    NothingToDo(Action),
}

/// Returned by `Slot::add` when the slot is already at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("slot is full (capacity {capacity})")]
pub struct CapacityExceeded {
    pub capacity: usize,
}
