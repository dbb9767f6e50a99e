//! One level attempt: board, slot, buffer and remaining target idioms, plus the
//! player actions that move cards between them.
//!
//! Every action runs to completion before returning, including the idiom check,
//! and reports what happened as a list of [`SessionEvent`]s. Animation state is
//! kept alongside for the renderer but never delays a logical change.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::arrange::shuffle_by_difficulty;
use crate::board::occlusion::{hit_test, is_clickable};
use crate::board::{Board, Rect, TileId};
use crate::error::{ActionError, SessionError};
use crate::idioms::{IdiomLibrary, IdiomRecord};
use crate::levels::{ActionBudget, LevelConfig, MAX_TILES};
use crate::matcher::find_completion;
use crate::slot::{Buffer, Card, Slot};

pub const CARD_FLIGHT_MS: f64 = 500.0;
pub const COMPLETION_PULSE_MS: f64 = 550.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Loading,
    Playing,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Undo,
    MoveToBuffer,
    Shuffle,
    ReturnFromBuffer,
    /// Tapping a single slot card to set it aside in the buffer. Never budgeted.
    SetAside,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// Tapped with a full slot that completes nothing.
    SlotFull,
    BufferOverflow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Collected { tile_id: TileId, character: char },
    IdiomCompleted { idiom: String, tile_ids: Vec<TileId> },
    Undone { tile_id: TileId },
    MovedToBuffer { tile_ids: Vec<TileId> },
    ReturnedFromBuffer { tile_id: TileId },
    Shuffled,
    Won,
    Lost { reason: LossReason },
}

// --- Cosmetic tweens ---------------------------------------------------------

pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TweenKind {
    /// A tile flying from its board rectangle to its slot index.
    CardFlight { tile_id: TileId, from: Rect, slot_index: usize },
    CompletionPulse { idiom: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub kind: TweenKind,
    pub started_ms: f64,
    pub duration_ms: f64,
}

impl Tween {
    /// Eased progress in `0.0..=1.0`.
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ease_out_cubic((now_ms - self.started_ms) / self.duration_ms)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms - self.started_ms >= self.duration_ms
    }
}

// --- Renderer snapshot -------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct TileView {
    pub id: TileId,
    pub x: i32,
    pub y: i32,
    pub layer: u32,
    pub character: char,
    pub clickable: bool,
    pub rect: Rect,
}

#[derive(Clone, Debug, Serialize)]
pub struct BudgetView {
    pub undo: Option<u32>,
    pub move_to_buffer: Option<u32>,
    pub shuffle: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TweenView {
    #[serde(flatten)]
    pub kind: TweenKind,
    pub progress: f64,
}

/// Read-only view of a session for drawing.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub level: String,
    pub phase: GamePhase,
    pub tiles: Vec<TileView>,
    pub slot: Vec<char>,
    pub slot_capacity: usize,
    pub buffer: Vec<char>,
    pub buffer_capacity: Option<usize>,
    pub targets: Vec<String>,
    pub budgets: BudgetView,
    pub tweens: Vec<TweenView>,
}

// --- Session -----------------------------------------------------------------

#[derive(Clone, Debug)]
struct Budgets {
    undo: ActionBudget,
    move_to_buffer: ActionBudget,
    shuffle: ActionBudget,
}

impl Budgets {
    fn from_config(config: &LevelConfig) -> Self {
        Self {
            undo: config.undo,
            move_to_buffer: config.move_to_buffer,
            shuffle: config.shuffle,
        }
    }

    fn get_mut(&mut self, action: Action) -> Option<&mut ActionBudget> {
        match action {
            Action::Undo => Some(&mut self.undo),
            Action::MoveToBuffer => Some(&mut self.move_to_buffer),
            Action::Shuffle => Some(&mut self.shuffle),
            Action::ReturnFromBuffer | Action::SetAside => None,
        }
    }
}

pub struct LevelSession {
    config: LevelConfig,
    library: IdiomLibrary,
    rng: StdRng,
    board: Board,
    slot: Slot,
    buffer: Buffer,
    targets: Vec<IdiomRecord>,
    completed: Vec<TileId>,
    budgets: Budgets,
    phase: GamePhase,
    tweens: Vec<Tween>,
    now_ms: f64,
}

impl LevelSession {
    pub fn new(config: LevelConfig, library: IdiomLibrary, seed: u64) -> Result<Self, SessionError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (board, targets) = deal(&config, &library, &mut rng)?;
        log::info!(
            "level {:?} ready: {} tiles, {} idioms, difficulty {}",
            config.name,
            board.tiles().len(),
            targets.len(),
            config.difficulty
        );
        Ok(Self {
            slot: Slot::new(config.slot_capacity),
            buffer: Buffer::new(config.buffer_capacity),
            budgets: Budgets::from_config(&config),
            config,
            library,
            rng,
            board,
            targets,
            completed: Vec::new(),
            phase: GamePhase::Playing,
            tweens: Vec::new(),
            now_ms: 0.0,
        })
    }

    /// Discard this attempt and deal a fresh board from the current config.
    /// On failure the session stays in `Loading`.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.phase = GamePhase::Loading;
        let (board, targets) = deal(&self.config, &self.library, &mut self.rng)?;
        self.board = board;
        self.targets = targets;
        self.slot = Slot::new(self.config.slot_capacity);
        self.buffer = Buffer::new(self.config.buffer_capacity);
        self.budgets = Budgets::from_config(&self.config);
        self.completed.clear();
        self.tweens.clear();
        self.phase = GamePhase::Playing;
        log::info!("level {:?} reset", self.config.name);
        Ok(())
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Applies from the next [`LevelSession::reset`].
    pub fn config_mut(&mut self) -> &mut LevelConfig {
        &mut self.config
    }

    pub fn set_library(&mut self, library: IdiomLibrary) {
        self.library = library;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn targets(&self) -> &[IdiomRecord] {
        &self.targets
    }

    /// Tiles whose cards left play through a completed idiom.
    pub fn completed_tiles(&self) -> &[TileId] {
        &self.completed
    }

    pub fn budget(&self, action: Action) -> ActionBudget {
        match action {
            Action::Undo => self.budgets.undo,
            Action::MoveToBuffer => self.budgets.move_to_buffer,
            Action::Shuffle => self.budgets.shuffle,
            Action::ReturnFromBuffer | Action::SetAside => ActionBudget::Unlimited,
        }
    }

    /// Advance the animation clock and drop finished tweens.
    pub fn set_time(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.tweens.retain(|t| !t.is_finished(now_ms));
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    // --- Taps ----------------------------------------------------------------

    /// Collect a tile into the slot. Non-clickable or unknown tiles are ignored.
    pub fn tap(&mut self, tile_id: TileId) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }
        let Some(tile) = self.board.tile(tile_id) else {
            return events;
        };
        if !is_clickable(tile, &self.board) {
            log::debug!("tap on blocked tile {tile_id} ignored");
            return events;
        }
        let character = tile.character;
        let from = self.board.rect_of(tile);

        if self.slot.is_full() {
            self.apply_completion(&mut events);
            if self.slot.is_full() {
                self.lose(LossReason::SlotFull, &mut events);
                return events;
            }
        }

        self.board.mark_collected(tile_id);
        if let Err(err) = self.slot.add(Card::new(character, tile_id)) {
            log::warn!("collect of tile {tile_id} rejected: {err}");
            self.board.restore(tile_id);
            return events;
        }
        self.tweens.push(Tween {
            kind: TweenKind::CardFlight {
                tile_id,
                from,
                slot_index: self.slot.len() - 1,
            },
            started_ms: self.now_ms,
            duration_ms: CARD_FLIGHT_MS,
        });
        events.push(SessionEvent::Collected { tile_id, character });

        self.apply_completion(&mut events);
        self.check_won(&mut events);
        events
    }

    /// Tap at a pixel coordinate on the board.
    pub fn handle_tap(&mut self, px: f64, py: f64) -> Vec<SessionEvent> {
        match hit_test(&self.board, px, py).map(|t| t.id) {
            Some(id) => self.tap(id),
            None => Vec::new(),
        }
    }

    // --- Buttons -------------------------------------------------------------

    /// Send the most recently added slot card back to its tile.
    pub fn undo(&mut self) -> Result<Vec<SessionEvent>, ActionError> {
        self.ready(Action::Undo)?;
        let card = self.slot.pop_last().ok_or(ActionError::NothingToDo(Action::Undo))?;
        self.board.restore(card.tile_id);
        self.spend(Action::Undo);
        Ok(vec![SessionEvent::Undone { tile_id: card.tile_id }])
    }

    /// Move up to `buffer_batch` cards from the front of the slot into the buffer.
    pub fn move_to_buffer(&mut self) -> Result<Vec<SessionEvent>, ActionError> {
        self.ready(Action::MoveToBuffer)?;
        if self.slot.is_empty() {
            return Err(ActionError::NothingToDo(Action::MoveToBuffer));
        }
        let cards = self.slot.pop_first_n(self.config.buffer_batch.max(1));
        let tile_ids = cards.iter().map(|c| c.tile_id).collect();
        self.buffer.extend(cards);
        self.spend(Action::MoveToBuffer);

        let mut events = vec![SessionEvent::MovedToBuffer { tile_ids }];
        self.check_buffer(&mut events);
        Ok(events)
    }

    /// Move one slot card, by index, into the buffer. Free and unlimited; only the
    /// batch move is budgeted.
    pub fn move_slot_card_to_buffer(&mut self, index: usize) -> Result<Vec<SessionEvent>, ActionError> {
        self.ready(Action::SetAside)?;
        let card = self
            .slot
            .remove_at(index)
            .ok_or(ActionError::NothingToDo(Action::SetAside))?;
        self.buffer.add(card);

        let mut events = vec![SessionEvent::MovedToBuffer {
            tile_ids: vec![card.tile_id],
        }];
        self.check_buffer(&mut events);
        Ok(events)
    }

    /// Put a buffer card back into the slot if there is room.
    pub fn return_from_buffer(&mut self, index: usize) -> Result<Vec<SessionEvent>, ActionError> {
        self.ready(Action::ReturnFromBuffer)?;
        if self.slot.is_full() || index >= self.buffer.len() {
            return Err(ActionError::NothingToDo(Action::ReturnFromBuffer));
        }
        let card = self
            .buffer
            .remove_at(index)
            .ok_or(ActionError::NothingToDo(Action::ReturnFromBuffer))?;
        if let Err(err) = self.slot.add(card) {
            log::warn!("buffer card {} could not return: {err}", card.tile_id);
            self.buffer.add(card);
            return Err(ActionError::NothingToDo(Action::ReturnFromBuffer));
        }
        let mut events = vec![SessionEvent::ReturnedFromBuffer { tile_id: card.tile_id }];
        self.apply_completion(&mut events);
        self.check_won(&mut events);
        Ok(events)
    }

    /// Redistribute the characters of every visible tile.
    pub fn shuffle(&mut self) -> Result<Vec<SessionEvent>, ActionError> {
        self.ready(Action::Shuffle)?;
        let (ids, mut chars): (Vec<TileId>, Vec<char>) =
            self.board.visible_tiles().map(|t| (t.id, t.character)).unzip();
        if ids.len() < 2 {
            return Err(ActionError::NothingToDo(Action::Shuffle));
        }
        shuffle_by_difficulty(&mut chars, self.config.shuffle_difficulty, &mut self.rng);
        let assignment: HashMap<TileId, char> = ids.into_iter().zip(chars).collect();
        self.board.reshuffle_visible(&assignment);
        self.spend(Action::Shuffle);
        log::debug!("reshuffled {} visible tiles", assignment.len());
        Ok(vec![SessionEvent::Shuffled])
    }

    // --- Internals -----------------------------------------------------------

    fn ready(&self, action: Action) -> Result<(), ActionError> {
        if self.phase != GamePhase::Playing {
            return Err(ActionError::NotPlaying(self.phase));
        }
        match self.budget(action) {
            ActionBudget::Disabled => Err(ActionError::Disabled(action)),
            b if !b.is_available() => Err(ActionError::BudgetExhausted(action)),
            _ => Ok(()),
        }
    }

    fn spend(&mut self, action: Action) {
        if let Some(budget) = self.budgets.get_mut(action) {
            budget.spend();
        }
    }

    /// Complete at most one idiom against the current slot.
    fn apply_completion(&mut self, events: &mut Vec<SessionEvent>) -> bool {
        let Some(hit) = find_completion(&self.slot.characters(), &self.targets) else {
            return false;
        };
        let removed = self.slot.remove_indices(&hit.indices);
        let idiom = self.targets.remove(hit.idiom_index);
        let tile_ids: Vec<TileId> = removed.iter().map(|c| c.tile_id).collect();
        self.completed.extend(&tile_ids);
        log::info!("completed {} ({} idioms left)", idiom.idiom, self.targets.len());
        self.tweens.push(Tween {
            kind: TweenKind::CompletionPulse {
                idiom: idiom.idiom.clone(),
            },
            started_ms: self.now_ms,
            duration_ms: COMPLETION_PULSE_MS,
        });
        events.push(SessionEvent::IdiomCompleted {
            idiom: idiom.idiom,
            tile_ids,
        });
        true
    }

    fn check_won(&mut self, events: &mut Vec<SessionEvent>) {
        if self.targets.is_empty() && self.board.is_exhausted() && self.slot.is_empty() {
            self.phase = GamePhase::Won;
            log::info!("level {:?} won", self.config.name);
            events.push(SessionEvent::Won);
        }
    }

    fn check_buffer(&mut self, events: &mut Vec<SessionEvent>) {
        if self.buffer.is_overflowing() {
            self.lose(LossReason::BufferOverflow, events);
        }
    }

    fn lose(&mut self, reason: LossReason, events: &mut Vec<SessionEvent>) {
        self.phase = GamePhase::Lost;
        log::info!("level {:?} lost: {:?}", self.config.name, reason);
        events.push(SessionEvent::Lost { reason });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let tiles = self
            .board
            .visible_tiles()
            .map(|t| TileView {
                id: t.id,
                x: t.position.x,
                y: t.position.y,
                layer: t.layer,
                character: t.character,
                clickable: is_clickable(t, &self.board),
                rect: self.board.rect_of(t),
            })
            .collect();
        SessionSnapshot {
            level: self.config.name.clone(),
            phase: self.phase,
            tiles,
            slot: self.slot.characters(),
            slot_capacity: self.slot.capacity(),
            buffer: self.buffer.characters(),
            buffer_capacity: self.buffer.capacity(),
            targets: self.targets.iter().map(|r| r.idiom.clone()).collect(),
            budgets: BudgetView {
                undo: self.budgets.undo.remaining(),
                move_to_buffer: self.budgets.move_to_buffer.remaining(),
                shuffle: self.budgets.shuffle.remaining(),
            },
            tweens: self
                .tweens
                .iter()
                .map(|t| TweenView {
                    kind: t.kind.clone(),
                    progress: t.progress(self.now_ms),
                })
                .collect(),
        }
    }
}

/// Pick target idioms and build a board holding exactly their characters.
fn deal(
    config: &LevelConfig,
    library: &IdiomLibrary,
    rng: &mut StdRng,
) -> Result<(Board, Vec<IdiomRecord>), SessionError> {
    if library.is_empty() {
        return Err(SessionError::NoIdioms);
    }
    if config.idiom_count == 0 {
        return Err(SessionError::Config("idiom_count must be at least 1".to_string()));
    }
    if config.slot_capacity == 0 {
        return Err(SessionError::Config("slot_capacity must be at least 1".to_string()));
    }

    if library.len() < config.idiom_count {
        return Err(SessionError::NotEnoughIdioms {
            needed: config.idiom_count,
            available: library.len(),
        });
    }
    match config.shape.tile_count() {
        Some(n) if n <= MAX_TILES => {}
        _ => {
            return Err(SessionError::Config(format!(
                "board shape {:?} exceeds {MAX_TILES} tiles",
                config.shape
            )));
        }
    }

    let targets = library.sample(config.idiom_count, rng);
    let layout = config.shape.layout();
    let groups: Vec<Vec<char>> = targets.iter().map(IdiomRecord::characters).collect();
    let pool: Vec<char> = groups.concat();
    let board = Board::initialize(&layout, &pool, config.difficulty, &groups, rng)?;
    Ok((board, targets))
}
