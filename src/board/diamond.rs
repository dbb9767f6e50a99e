//! Diamond of stacks in the middle with a small triangle of stacks in each corner.
//! No layer shift: a stack only occludes itself.

use super::{BoardGeometry, BoardLayout, Placement, Position};

pub const CELL_SIZE: f64 = 35.0;
pub const SPACING: f64 = 1.0;

const CENTER: Position = Position::new(4, 4);

// Column offsets from the center for each diamond row, top to bottom.
const DIAMOND_ROWS: &[&[i32]] = &[
    &[0],
    &[-1, 1],
    &[-2, 0, 2],
    &[-3, -1, 1, 3],
    &[-2, 0, 2],
    &[-1, 1],
    &[0],
];

/// Stacks per layer: diamond cells plus corner cells.
pub const CELL_COUNT: usize = 16 + 12;

const CORNER_TRIANGLES: &[(i32, i32)] = &[
    // top left
    (0, 2),
    (1, 2),
    (0, 3),
    // top right
    (7, 2),
    (8, 2),
    (8, 3),
    // bottom left
    (0, 5),
    (0, 6),
    (1, 6),
    // bottom right
    (8, 5),
    (7, 6),
    (8, 6),
];

pub fn diamond_positions() -> Vec<Position> {
    let mut out = Vec::new();
    for (row_idx, offsets) in DIAMOND_ROWS.iter().enumerate() {
        let y = CENTER.y + row_idx as i32 - 3;
        for dx in offsets.iter() {
            out.push(Position::new(CENTER.x + dx, y));
        }
    }
    out
}

pub fn corner_positions() -> Vec<Position> {
    CORNER_TRIANGLES.iter().map(|&(x, y)| Position::new(x, y)).collect()
}

/// Every diamond and corner cell stacked `layers` deep.
pub fn diamond_with_corners(layers: u32) -> BoardLayout {
    let cells: Vec<Position> = diamond_positions().into_iter().chain(corner_positions()).collect();
    let mut placements = Vec::with_capacity(cells.len().checked_mul(layers as usize).unwrap_or(0));
    for pos in &cells {
        for layer in 1..=layers {
            placements.push(Placement::new(pos.x, pos.y, layer));
        }
    }
    BoardLayout {
        placements,
        geometry: BoardGeometry::new(CELL_SIZE, SPACING),
    }
}
