//! Screen geometry value types and the `Positionable` capability.
//!
//! Placement and collision logic only ever sees these types. A rendering
//! layer (DOM, native window, terminal) supplies its own `Positionable`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from the top-left corner of the screen.
    pub fn distance_from_origin(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Visible screen area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

/// Axis-aligned bounding box of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn at(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Two rects overlap unless one lies strictly to one side of the other.
    /// Shared edges count as overlapping.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    /// Grow the rect by `by` on every side.
    pub fn inflate(&self, by: f64) -> Rect {
        Rect::new(
            self.x - by,
            self.y - by,
            self.width + 2.0 * by,
            self.height + 2.0 * by,
        )
    }

    /// Whether the rect sits inside the viewport with `margin` left on every side.
    pub fn within(&self, viewport: &Viewport, margin: f64) -> bool {
        self.left() >= margin
            && self.top() >= margin
            && self.right() <= viewport.width - margin
            && self.bottom() <= viewport.height - margin
    }
}

/// Something with an on-screen position that can be read and moved.
pub trait Positionable {
    /// Current bounding rectangle as laid out.
    fn bounding_rect(&self) -> Rect;

    /// Explicitly assigned position, if any. Falls back to the laid-out
    /// rect origin when unset.
    fn position(&self) -> Option<Point> {
        None
    }

    fn set_position(&mut self, position: Point);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(200.0, 200.0, 100.0, 100.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn intersecting_rects_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let c = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn touching_edges_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 100.0, 100.0);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn inflate_grows_all_sides() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 30.0, 30.0));
    }

    #[test]
    fn within_respects_margin() {
        let vp = Viewport::new(500.0, 400.0);
        assert!(Rect::new(10.0, 10.0, 100.0, 100.0).within(&vp, 10.0));
        assert!(!Rect::new(5.0, 10.0, 100.0, 100.0).within(&vp, 10.0));
        assert!(!Rect::new(400.0, 10.0, 100.0, 100.0).within(&vp, 10.0));
    }
}
