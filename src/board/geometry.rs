//! Semantic board coordinates to pixel rectangles.
//!
//! Occlusion is decided on these rectangles, not on grid equality, so layouts whose
//! upper layers sit half a cell off (pyramids) block every tile they overlap.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Position;

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Positive-area intersection. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(other.x >= self.right()
            || other.right() <= self.x
            || other.y >= self.bottom()
            || other.bottom() <= self.y)
    }

    /// Inclusive point test (edges belong to the rectangle).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Slide this rectangle so it lies inside `bounds` where possible.
    fn clamp_within(self, bounds: &Rect) -> Rect {
        let x = self.x.max(bounds.x).min(bounds.right() - self.w);
        let y = self.y.max(bounds.y).min(bounds.bottom() - self.h);
        Rect { x, y, ..self }
    }
}

/// Per-layer offset in cell units (e.g. 0.5 centers a layer between two cells).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerShift {
    pub dx: f64,
    pub dy: f64,
}

/// Pixel geometry of one board shape.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_size: f64,
    pub spacing: f64,
    layer_shifts: BTreeMap<u32, LayerShift>,
    bounds: Option<Rect>,
}

impl BoardGeometry {
    pub fn new(cell_size: f64, spacing: f64) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size,
            spacing,
            layer_shifts: BTreeMap::new(),
            bounds: None,
        }
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        if let Some(b) = self.bounds.as_mut() {
            b.x += x - self.origin_x;
            b.y += y - self.origin_y;
        }
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn with_layer_shift(mut self, layer: u32, shift: LayerShift) -> Self {
        self.layer_shifts.insert(layer, shift);
        self
    }

    /// Clamp every tile rectangle to the footprint of `positions` (the bottom layer).
    pub fn with_bounds_from<'a>(mut self, positions: impl IntoIterator<Item = &'a Position>) -> Self {
        let mut iter = positions.into_iter();
        let Some(first) = iter.next() else {
            return self;
        };
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        let step = self.step();
        self.bounds = Some(Rect::new(
            self.origin_x + min_x as f64 * step,
            self.origin_y + min_y as f64 * step,
            (max_x - min_x) as f64 * step + self.cell_size,
            (max_y - min_y) as f64 * step + self.cell_size,
        ));
        self
    }

    pub fn step(&self) -> f64 {
        self.cell_size + self.spacing
    }

    pub fn layer_shift(&self, layer: u32) -> LayerShift {
        self.layer_shifts.get(&layer).copied().unwrap_or_default()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Rendered rectangle of a tile at `position` on `layer`.
    pub fn rect_for(&self, position: Position, layer: u32) -> Rect {
        let step = self.step();
        let shift = self.layer_shift(layer);
        let rect = Rect::new(
            self.origin_x + (position.x as f64 + shift.dx) * step,
            self.origin_y + (position.y as f64 + shift.dy) * step,
            self.cell_size,
            self.cell_size,
        );
        match &self.bounds {
            Some(bounds) => rect.clamp_within(bounds),
            None => rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn contains_is_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(10.0, 10.0));
        assert!(!r.contains(10.1, 5.0));
    }

    #[test]
    fn layer_shift_moves_rect_by_cell_fraction() {
        let geo = BoardGeometry::new(30.0, 10.0).with_layer_shift(2, LayerShift { dx: 0.5, dy: 0.5 });
        let base = geo.rect_for(Position::new(1, 1), 1);
        let shifted = geo.rect_for(Position::new(1, 1), 2);
        assert_eq!(base.x, 40.0);
        assert_eq!(shifted.x, 60.0);
        assert_eq!(shifted.y, 60.0);
    }

    #[test]
    fn shifted_rects_are_clamped_to_bottom_footprint() {
        let positions = [Position::new(0, 0), Position::new(1, 0)];
        let geo = BoardGeometry::new(10.0, 0.0)
            .with_bounds_from(positions.iter())
            .with_layer_shift(2, LayerShift { dx: 0.5, dy: 0.0 });
        // (1,0) shifted right by half a cell would leave the 20px footprint.
        let r = geo.rect_for(Position::new(1, 0), 2);
        assert_eq!(r.x, 10.0);
        assert_eq!(r.right(), 20.0);
    }

    #[test]
    fn origin_moves_bounds_along() {
        let positions = [Position::new(0, 0)];
        let geo = BoardGeometry::new(10.0, 0.0)
            .with_bounds_from(positions.iter())
            .with_origin(100.0, 50.0);
        assert_eq!(geo.bounds().map(|b| (b.x, b.y)), Some((100.0, 50.0)));
        assert_eq!(geo.rect_for(Position::new(0, 0), 1).x, 100.0);
    }
}
