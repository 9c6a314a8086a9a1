//! Panel placement relative to the pointer, kept inside the viewport where possible.

use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left corner for a panel of `panel` size shown next to `pointer`.
///
/// The panel goes below-right of the pointer by `offset`. Each axis flips to the
/// other side of the pointer on its own when the panel would cross the
/// right/bottom viewport edge. A flipped panel is not corrected further, so it
/// may end up past the left/top edge.
pub fn fit(pointer: Point, panel: Size, viewport: Size, offset: Point) -> Point {
    let left = if pointer.x + panel.width + offset.x > viewport.width {
        pointer.x - panel.width - offset.x
    } else {
        pointer.x + offset.x
    };
    let top = if pointer.y + panel.height + offset.y > viewport.height {
        pointer.y - panel.height - offset.y
    } else {
        pointer.y + offset.y
    };
    Point::new(left, top)
}
