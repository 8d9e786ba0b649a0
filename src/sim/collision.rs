//! Collision primitives for boxes and round pickups
//!
//! Collectibles and hazards are circles; the player is an axis-aligned box.
//! Pickup detection uses a cheap clamped-distance test rather than an exact
//! circle/rectangle intersection.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in canvas coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Box of a circle's bounding square
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(
            (self.right - self.left) / 2.0,
            (self.bottom - self.top) / 2.0,
        )
    }
}

/// Strict AABB overlap; boxes that only share an edge do not overlap
#[inline]
pub fn boxes_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.left < b.right && a.right > b.left && a.top < b.bottom && a.bottom > b.top
}

/// Approximate circle vs box proximity test
///
/// Rejects on the expanded box, accepts when the circle centre lies within
/// either slab of the box, and otherwise compares the squared distance to
/// the nearest corner with the squared radius.
pub fn circle_near_box(center: Vec2, radius: f32, aabb: &Aabb) -> bool {
    let half = aabb.half_extents();
    let box_center = aabb.center();

    let dx = (center.x - box_center.x).abs();
    let dy = (center.y - box_center.y).abs();

    if dx > half.x + radius || dy > half.y + radius {
        return false;
    }

    if dx <= half.x || dy <= half.y {
        return true;
    }

    let cx = dx - half.x;
    let cy = dy - half.y;
    cx * cx + cy * cy <= radius * radius
}
