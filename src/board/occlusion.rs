//! Clickability queries. All pure; nothing here mutates the board.

use super::{Board, Position, Tile};

/// A tile is clickable iff it is visible and no visible tile on a strictly higher
/// layer has a rectangle overlapping its own with positive area.
pub fn is_clickable(tile: &Tile, board: &Board) -> bool {
    if !tile.is_visible() {
        return false;
    }
    let rect = board.rect_of(tile);
    !board
        .visible_tiles()
        .filter(|other| other.layer > tile.layer)
        .any(|other| board.rect_of(other).overlaps(&rect))
}

/// Highest clickable visible tile stacked at exactly `position`.
pub fn topmost_clickable_at(board: &Board, position: Position) -> Option<&Tile> {
    board
        .visible_tiles()
        .filter(|t| t.position == position)
        .filter(|t| is_clickable(t, board))
        .max_by_key(|t| t.layer)
}

/// Highest-layer clickable tile whose rectangle contains the pixel point.
pub fn hit_test(board: &Board, px: f64, py: f64) -> Option<&Tile> {
    let mut best: Option<&Tile> = None;
    for tile in board.visible_tiles() {
        if !board.rect_of(tile).contains(px, py) || !is_clickable(tile, board) {
            continue;
        }
        match best {
            Some(current) if current.layer == tile.layer => {
                log::warn!(
                    "tiles {} and {} share layer {} under ({px}, {py}); keeping {}",
                    current.id,
                    tile.id,
                    tile.layer,
                    current.id
                );
            }
            Some(current) if current.layer > tile.layer => {}
            _ => best = Some(tile),
        }
    }
    best
}
