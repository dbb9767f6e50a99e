//! Pyramid: each layer is one row and one column smaller than the one below and
//! is centered on the base. Odd shrinkage leaves a layer half a cell off the grid,
//! which is carried as a layer shift so its tiles straddle the ones below.

use super::{BoardGeometry, BoardLayout, LayerShift, Placement, Position};

pub const CELL_SIZE: f64 = 35.0;
pub const SPACING: f64 = 1.0;

/// Base of `rows`×`cols`, shrinking by one per layer until a side reaches zero.
pub fn pyramid(rows: u32, cols: u32) -> BoardLayout {
    let (base_rows, base_cols) = (rows as i32, cols as i32);
    let mut placements = Vec::new();
    let mut geometry = BoardGeometry::new(CELL_SIZE, SPACING);

    let (mut r, mut c) = (base_rows, base_cols);
    let mut layer = 1u32;
    while r > 0 && c > 0 {
        let center_row = (base_rows - r) as f64 / 2.0;
        let center_col = (base_cols - c) as f64 / 2.0;
        let row_offset = center_row.floor();
        let col_offset = center_col.floor();
        geometry = geometry.with_layer_shift(
            layer,
            LayerShift {
                dx: center_col - col_offset,
                dy: center_row - row_offset,
            },
        );
        let (row_offset, col_offset) = (row_offset as i32, col_offset as i32);
        for y in row_offset..row_offset + r {
            for x in col_offset..col_offset + c {
                placements.push(Placement::new(x, y, layer));
            }
        }
        r -= 1;
        c -= 1;
        layer += 1;
    }

    let base: Vec<Position> = placements
        .iter()
        .filter(|p| p.layer == 1)
        .map(|p| p.position)
        .collect();
    let geometry = geometry.with_bounds_from(base.iter());
    BoardLayout { placements, geometry }
}
