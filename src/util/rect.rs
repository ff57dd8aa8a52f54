//! Axis-aligned rectangles in screen space
//!
//! Every entity's hitbox is a `Rect` anchored at its top-left corner.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        debug_assert!(w >= 0.0 && h >= 0.0, "rect extents must be non-negative");
        Self { x, y, w, h }
    }

    /// Rectangle of the given size with its top-left corner at `origin`
    #[inline]
    pub fn at(origin: Vec2, w: f32, h: f32) -> Self {
        Self::new(origin.x, origin.y, w, h)
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right() > other.x
            && other.right() > self.x
            && self.bottom() > other.y
            && other.bottom() > self.y
    }
}

/// Free-function form used by the collision system
#[inline]
pub fn intersect(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let b = Rect::new(16.0, 16.0, 32.0, 32.0);
        assert!(intersect(&a, &b));
    }

    #[test]
    fn test_one_unit_overlap_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(intersect(&a, &b));
    }

    #[test]
    fn test_edge_touching_does_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // a.x + a.w == b.x
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        // a.y + a.h == b.y
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        // corner contact
        let corner = Rect::new(10.0, 10.0, 10.0, 10.0);

        assert!(!intersect(&a, &right));
        assert!(!intersect(&a, &below));
        assert!(!intersect(&a, &corner));
    }

    #[test]
    fn test_overlap_on_one_axis_only() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 50.0, 10.0, 10.0);
        assert!(!intersect(&a, &b));
    }

    #[test]
    fn test_containment_intersects() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 8.0, 16.0);
        assert!(intersect(&outer, &inner));
        assert!(intersect(&inner, &outer));
    }

    #[test]
    fn test_intersection_is_symmetric() {
        let rects = [
            Rect::new(0.0, 0.0, 32.0, 32.0),
            Rect::new(31.0, 0.0, 8.0, 16.0),
            Rect::new(32.0, 0.0, 8.0, 16.0),
            Rect::new(-5.0, -5.0, 6.0, 6.0),
            Rect::new(10.0, 10.0, 0.0, 0.0),
            Rect::new(100.0, 100.0, 20.0, 14.0),
            Rect::new(12.5, 30.25, 20.0, 14.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(intersect(a, b), intersect(b, a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_accessors() {
        let r = Rect::at(Vec2::new(10.0, 20.0), 32.0, 16.0);
        assert_eq!(r.origin(), Vec2::new(10.0, 20.0));
        assert_eq!(r.center_x(), 26.0);
        assert_eq!(r.right(), 42.0);
        assert_eq!(r.bottom(), 36.0);
    }
}
