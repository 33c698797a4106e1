//! Axis-aligned rectangle shared by every spatial entity
//!
//! Screen coordinates: x grows right, y grows down, so `top < bottom`.
//! A rect with non-positive width or height is an anchor (a bare reference
//! point such as a spawn marker) and never collides with anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_topleft_and_size(topleft: Vec2, size: Vec2) -> Self {
        Self {
            left: topleft.x,
            top: topleft.y,
            width: size.x,
            height: size.y,
        }
    }

    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// A zero-size rect marking a point
    pub fn anchor(point: Vec2) -> Self {
        Self::from_topleft_and_size(point, Vec2::ZERO)
    }

    /// Rect of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::from_topleft_and_size(center - size * 0.5, size)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn topleft(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn set_right(&mut self, right: f32) {
        self.left = right - self.width;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.top = bottom - self.height;
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.left = center.x - self.width / 2.0;
        self.top = center.y - self.height / 2.0;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.left += delta.x;
        self.top += delta.y;
    }

    /// True for zero-size or inverted rects (reference points only)
    #[inline]
    pub fn is_anchor(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Strict overlap test; anchors never collide
    pub fn collides(&self, other: &Rect) -> bool {
        if self.is_anchor() || other.is_anchor() {
            return false;
        }
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// True if `point` lies strictly inside this rect
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.left < point.x && point.x < self.right() && self.top < point.y && point.y < self.bottom()
    }

    /// Center-based hit test: does this rect's center lie inside `other`?
    ///
    /// Particles use this instead of full overlap so that small projectiles
    /// only register once they are visibly inside a target.
    pub fn center_inside(&self, other: &Rect) -> bool {
        other.contains_point(self.center())
    }

    /// Euclidean distance between centers
    pub fn distance_to(&self, other: &Rect) -> f32 {
        self.center().distance(other.center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_constructors_agree() {
        let a = Rect::from_edges(10.0, 20.0, 40.0, 80.0);
        let b = Rect::from_topleft_and_size(Vec2::new(10.0, 20.0), Vec2::new(30.0, 60.0));
        assert_eq!(a, b);
        assert_eq!(a.right(), 40.0);
        assert_eq!(a.bottom(), 80.0);
        assert_eq!(a.center(), Vec2::new(25.0, 50.0));
    }

    #[test]
    fn test_edge_setters_keep_size() {
        let mut r = Rect::from_edges(0.0, 0.0, 10.0, 20.0);
        r.set_bottom(100.0);
        assert_eq!(r.top, 80.0);
        r.set_right(50.0);
        assert_eq!(r.left, 40.0);
        assert_eq!(r.size(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_collides_is_strict() {
        let a = Rect::from_edges(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::from_edges(10.0, 0.0, 20.0, 10.0);
        let overlapping = Rect::from_edges(9.0, 9.0, 20.0, 20.0);
        assert!(!a.collides(&touching));
        assert!(a.collides(&overlapping));
    }

    #[test]
    fn test_anchor_never_collides() {
        let area = Rect::from_edges(0.0, 0.0, 100.0, 100.0);
        let anchor = Rect::anchor(Vec2::new(50.0, 50.0));
        assert!(anchor.is_anchor());
        assert!(!area.collides(&anchor));
        assert!(!anchor.collides(&area));

        let inverted = Rect::from_edges(60.0, 60.0, 40.0, 40.0);
        assert!(inverted.is_anchor());
        assert!(!area.collides(&inverted));
    }

    #[test]
    fn test_center_inside_uses_center_only() {
        let particle = Rect::centered(Vec2::new(15.0, 15.0), Vec2::new(40.0, 40.0));
        let targets = [
            Rect::from_edges(100.0, 100.0, 120.0, 120.0),
            Rect::from_edges(10.0, 10.0, 20.0, 20.0),
            Rect::from_edges(0.0, 0.0, 30.0, 30.0),
        ];
        let hits: Vec<usize> = targets
            .iter()
            .enumerate()
            .filter(|(_, r)| particle.center_inside(r))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![1, 2]);
        // Overlapping without containing the center is not a hit
        let edge = Rect::from_edges(30.0, 0.0, 60.0, 30.0);
        assert!(particle.collides(&edge));
        assert!(!particle.center_inside(&edge));
    }

    #[test]
    fn test_distance_between_centers() {
        let a = Rect::centered(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::centered(Vec2::new(3.0, 4.0), Vec2::splat(2.0));
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
    }
}
