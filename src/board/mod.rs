//! Tile board model: stacked tiles, their positions and layers, and the shapes the
//! stock levels are built on.
//!
//! Occlusion is never stored. Whether a tile can be tapped is recomputed from the
//! set of visible tiles every time it is asked (see [`occlusion`]), so collecting or
//! restoring a tile needs no bookkeeping beyond flipping its status.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

pub mod diamond;
pub mod geometry;
pub mod occlusion;
pub mod pyramid;
pub mod stacked;

pub use geometry::{BoardGeometry, LayerShift, Rect};

pub type TileId = usize;

/// Semantic grid coordinate (not pixels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A position plus the stacking layer a tile occupies there (1 = bottom).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    pub position: Position,
    pub layer: u32,
}

impl Placement {
    pub const fn new(x: i32, y: i32, layer: u32) -> Self {
        Self {
            position: Position::new(x, y),
            layer,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStatus {
    Visible,
    Collected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub position: Position,
    pub layer: u32,
    pub character: char,
    pub status: TileStatus,
}

impl Tile {
    pub fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            layer: self.layer,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.status == TileStatus::Visible
    }
}

/// Every placement of a board shape plus the geometry used to draw and hit-test it.
#[derive(Clone, Debug)]
pub struct BoardLayout {
    pub placements: Vec<Placement>,
    pub geometry: BoardGeometry,
}

impl BoardLayout {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Positions grouped by layer, each group in layout order.
    pub fn positions_by_layer(&self) -> BTreeMap<u32, Vec<Position>> {
        let mut by_layer: BTreeMap<u32, Vec<Position>> = BTreeMap::new();
        for p in &self.placements {
            by_layer.entry(p.layer).or_default().push(p.position);
        }
        by_layer
    }

    pub fn max_layer(&self) -> u32 {
        self.placements.iter().map(|p| p.layer).max().unwrap_or(0)
    }

    fn validate(&self) -> Result<(), BoardError> {
        if self.placements.is_empty() {
            return Err(BoardError::EmptyLayout);
        }
        let mut seen = HashSet::with_capacity(self.placements.len());
        for p in &self.placements {
            if p.layer == 0 {
                return Err(BoardError::ZeroLayer {
                    x: p.position.x,
                    y: p.position.y,
                });
            }
            if !seen.insert(*p) {
                return Err(BoardError::DuplicateLayer {
                    x: p.position.x,
                    y: p.position.y,
                    layer: p.layer,
                });
            }
        }
        Ok(())
    }
}

/// Authoritative tile set for one level instance.
#[derive(Clone, Debug)]
pub struct Board {
    tiles: Vec<Tile>,
    geometry: BoardGeometry,
}

impl Board {
    /// Build a board from a layout, placing `pool` with the arrangement engine.
    pub fn initialize<R: rand::Rng + ?Sized>(
        layout: &BoardLayout,
        pool: &[char],
        difficulty: u8,
        idiom_groups: &[Vec<char>],
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        layout.validate()?;
        let assignment =
            crate::arrange::arrange(pool, &layout.positions_by_layer(), difficulty, idiom_groups, rng);
        Self::from_assignment(layout, &assignment)
    }

    /// Build a board from an explicit placement → character map.
    pub fn from_assignment(
        layout: &BoardLayout,
        assignment: &BTreeMap<Placement, char>,
    ) -> Result<Self, BoardError> {
        layout.validate()?;
        let mut tiles = Vec::with_capacity(layout.len());
        for (id, placement) in layout.placements.iter().enumerate() {
            let character =
                assignment
                    .get(placement)
                    .copied()
                    .ok_or(BoardError::Unassigned {
                        x: placement.position.x,
                        y: placement.position.y,
                        layer: placement.layer,
                    })?;
            tiles.push(Tile {
                id,
                position: placement.position,
                layer: placement.layer,
                character,
                status: TileStatus::Visible,
            });
        }
        log::debug!("board built with {} tiles", tiles.len());
        Ok(Self {
            tiles,
            geometry: layout.geometry.clone(),
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn visible_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.is_visible())
    }

    pub fn visible_count(&self) -> usize {
        self.visible_tiles().count()
    }

    pub fn is_exhausted(&self) -> bool {
        self.visible_tiles().next().is_none()
    }

    pub fn rect_of(&self, tile: &Tile) -> Rect {
        self.geometry.rect_for(tile.position, tile.layer)
    }

    /// Visible → collected. Returns false (and changes nothing) if the tile is
    /// unknown or already collected; callers check clickability first.
    pub fn mark_collected(&mut self, id: TileId) -> bool {
        match self.tiles.get_mut(id) {
            Some(tile) if tile.is_visible() => {
                tile.status = TileStatus::Collected;
                true
            }
            _ => false,
        }
    }

    /// Collected → visible (undo).
    pub fn restore(&mut self, id: TileId) -> bool {
        match self.tiles.get_mut(id) {
            Some(tile) if !tile.is_visible() => {
                tile.status = TileStatus::Visible;
                true
            }
            _ => false,
        }
    }

    /// Reassign characters of visible tiles. Entries for collected or unknown
    /// tiles are ignored.
    pub fn reshuffle_visible(&mut self, assignment: &HashMap<TileId, char>) {
        for (&id, &character) in assignment {
            if let Some(tile) = self.tiles.get_mut(id) {
                if tile.is_visible() {
                    tile.character = character;
                }
            }
        }
    }
}
