// Flat square grid where every cell holds the same number of stacked layers.
use super::{BoardGeometry, BoardLayout, Placement};

pub const CELL_SIZE: f64 = 60.0;
pub const SPACING: f64 = 10.0;

/// `size`×`size` cells, `layers` tiles per cell, listed cell by cell.
pub fn stacked_grid(size: u32, layers: u32) -> BoardLayout {
    let count = (size as usize)
        .checked_mul(size as usize)
        .and_then(|n| n.checked_mul(layers as usize));
    let mut placements = Vec::with_capacity(count.unwrap_or(0));
    for row in 0..size as i32 {
        for col in 0..size as i32 {
            for layer in 1..=layers {
                placements.push(Placement::new(col, row, layer));
            }
        }
    }
    BoardLayout {
        placements,
        geometry: BoardGeometry::new(CELL_SIZE, SPACING),
    }
}
