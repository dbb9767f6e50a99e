//! Level configuration: everything the four stock levels differ by, as data.

use serde::{Deserialize, Serialize};

use crate::arrange::{MAX_DIFFICULTY, MIN_DIFFICULTY, clamp_difficulty};
use crate::board::{BoardLayout, diamond, pyramid, stacked};
use crate::slot::DEFAULT_SLOT_CAPACITY;

/// Board shape a level is built on. Each variant maps to one generator in `board/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardShape {
    StackedGrid { size: u32, layers: u32 },
    DiamondCorners { layers: u32 },
    Pyramid { rows: u32, cols: u32 },
}

impl BoardShape {
    pub fn layout(&self) -> BoardLayout {
        match *self {
            BoardShape::StackedGrid { size, layers } => stacked::stacked_grid(size, layers),
            BoardShape::DiamondCorners { layers } => diamond::diamond_with_corners(layers),
            BoardShape::Pyramid { rows, cols } => pyramid::pyramid(rows, cols),
        }
    }

    /// Number of tiles the layout would hold, or `None` if that overflows `usize`.
    /// Computed without building the layout.
    pub fn tile_count(&self) -> Option<usize> {
        match *self {
            BoardShape::StackedGrid { size, layers } => (size as usize)
                .checked_mul(size as usize)?
                .checked_mul(layers as usize),
            BoardShape::DiamondCorners { layers } => {
                diamond::CELL_COUNT.checked_mul(layers as usize)
            }
            BoardShape::Pyramid { rows, cols } => {
                let (rows, cols) = (rows as usize, cols as usize);
                rows.checked_mul(cols)?;
                (0..rows.min(cols)).try_fold(0usize, |acc, k| acc.checked_add((rows - k) * (cols - k)))
            }
        }
    }
}

/// Largest board a level may ask for.
pub const MAX_TILES: usize = 4096;

/// How often a player action may be used in one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionBudget {
    Unlimited,
    Limited(u32),
    Disabled,
}

impl ActionBudget {
    pub fn is_available(&self) -> bool {
        match self {
            ActionBudget::Unlimited => true,
            ActionBudget::Limited(n) => *n > 0,
            ActionBudget::Disabled => false,
        }
    }

    /// `None` for unlimited.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            ActionBudget::Unlimited => None,
            ActionBudget::Limited(n) => Some(*n),
            ActionBudget::Disabled => Some(0),
        }
    }

    pub fn spend(&mut self) {
        if let ActionBudget::Limited(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub name: String,
    pub shape: BoardShape,
    /// Arrangement difficulty, 1..=10.
    pub difficulty: u8,
    /// Difficulty used by the in-game reshuffle action.
    pub shuffle_difficulty: u8,
    pub idiom_count: usize,
    pub slot_capacity: usize,
    /// `None` = no buffer limit.
    pub buffer_capacity: Option<usize>,
    /// Cards moved per "move to buffer" action.
    pub buffer_batch: usize,
    pub undo: ActionBudget,
    pub move_to_buffer: ActionBudget,
    pub shuffle: ActionBudget,
}

impl Default for LevelConfig {
    fn default() -> Self {
        level(LevelId::One)
    }
}

impl LevelConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: LevelConfig = serde_json::from_str(text)?;
        config.difficulty = clamp_difficulty(config.difficulty);
        config.shuffle_difficulty = clamp_difficulty(config.shuffle_difficulty);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.set_difficulty(difficulty);
        self
    }

    pub fn with_shape(mut self, shape: BoardShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_idiom_count(mut self, count: usize) -> Self {
        self.idiom_count = count;
        self
    }

    pub fn with_slot_capacity(mut self, capacity: usize) -> Self {
        self.slot_capacity = capacity;
        self
    }

    pub fn with_buffer(mut self, capacity: Option<usize>, batch: usize) -> Self {
        self.buffer_capacity = capacity;
        self.buffer_batch = batch;
        self
    }

    pub fn with_budgets(mut self, undo: ActionBudget, move_to_buffer: ActionBudget, shuffle: ActionBudget) -> Self {
        self.undo = undo;
        self.move_to_buffer = move_to_buffer;
        self.shuffle = shuffle;
        self
    }

    pub fn with_shuffle_difficulty(mut self, difficulty: u8) -> Self {
        self.shuffle_difficulty = clamp_difficulty(difficulty);
        self
    }

    pub fn set_difficulty(&mut self, difficulty: u8) {
        self.difficulty = clamp_difficulty(difficulty);
    }

    pub fn increase_difficulty(&mut self) {
        self.difficulty = self.difficulty.saturating_add(1).min(MAX_DIFFICULTY);
    }

    pub fn decrease_difficulty(&mut self) {
        self.difficulty = self.difficulty.saturating_sub(1).max(MIN_DIFFICULTY);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelId {
    One,
    Two,
    Three,
    Four,
}

impl LevelId {
    pub const ALL: [LevelId; 4] = [LevelId::One, LevelId::Two, LevelId::Three, LevelId::Four];

    /// 1-based level number as shown in the menu.
    pub fn from_number(n: u32) -> Option<Self> {
        Self::ALL.get((n as usize).checked_sub(1)?).copied()
    }

    pub fn number(self) -> u32 {
        match self {
            LevelId::One => 1,
            LevelId::Two => 2,
            LevelId::Three => 3,
            LevelId::Four => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }
}

/// Stock configuration for one of the four levels.
pub fn level(id: LevelId) -> LevelConfig {
    use ActionBudget::*;
    match id {
        // 3x3 grid, four tiles per stack, nine idioms, undo only.
        LevelId::One => LevelConfig {
            name: "第一关".to_string(),
            shape: BoardShape::StackedGrid { size: 3, layers: 4 },
            difficulty: 1,
            shuffle_difficulty: 1,
            idiom_count: 9,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            buffer_capacity: None,
            buffer_batch: 4,
            undo: Unlimited,
            move_to_buffer: Disabled,
            shuffle: Disabled,
        },
        LevelId::Two => LevelConfig {
            name: "第二关".to_string(),
            shape: BoardShape::DiamondCorners { layers: 8 },
            difficulty: 3,
            shuffle_difficulty: 6,
            idiom_count: 56,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            buffer_capacity: Some(16),
            buffer_batch: 4,
            undo: Unlimited,
            move_to_buffer: Unlimited,
            shuffle: Unlimited,
        },
        LevelId::Three => LevelConfig {
            name: "第三关".to_string(),
            shape: BoardShape::Pyramid { rows: 7, cols: 8 },
            difficulty: 4,
            shuffle_difficulty: 8,
            idiom_count: 42,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            buffer_capacity: Some(10),
            buffer_batch: 4,
            undo: Limited(3),
            move_to_buffer: Limited(3),
            shuffle: Limited(3),
        },
        LevelId::Four => LevelConfig {
            name: "第四关".to_string(),
            shape: BoardShape::Pyramid { rows: 8, cols: 9 },
            difficulty: 2,
            shuffle_difficulty: 10,
            idiom_count: 60,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            buffer_capacity: Some(10),
            buffer_batch: 4,
            undo: Limited(3),
            move_to_buffer: Limited(3),
            shuffle: Limited(3),
        },
    }
}

pub fn levels() -> Vec<LevelConfig> {
    LevelId::ALL.iter().map(|&id| level(id)).collect()
}
