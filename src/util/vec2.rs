use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// 2D point/offset in screen space (y grows downwards)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point on a circle of `radius` around `center` at `turns` (1.0 = full turn)
    #[inline]
    pub fn on_circle(center: Vec2, radius: f32, turns: f32) -> Self {
        let angle = std::f32::consts::TAU * turns;
        Self {
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
        }
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        let d = *self - other;
        (d.x * d.x + d.y * d.y).sqrt()
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
