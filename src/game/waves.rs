//! Wave library
//!
//! The ordered list of enemy formations. Each template is a closed parametric
//! curve, an enemy count and the time one lap of the curve takes. Templates
//! are immutable; a session clones one into a live [`Wave`] when it begins
//! that wave.

use crate::game::state::Wave;
use crate::util::vec2::Vec2;

/// Parametric formation path, `t` in [0, 1)
pub type PathFn = fn(f32) -> Vec2;

/// Immutable wave description
#[derive(Debug, Clone, Copy)]
pub struct WaveTemplate {
    pub enemy_count: usize,
    pub path: PathFn,
    /// Milliseconds for one full lap of `path`
    pub duration: f32,
}

impl WaveTemplate {
    /// Clone into an unpopulated live wave
    pub fn instantiate(&self) -> Wave {
        Wave {
            enemy_count: self.enemy_count,
            enemies: None,
            path: self.path,
            duration: self.duration,
        }
    }
}

fn circle(t: f32) -> Vec2 {
    Vec2::on_circle(Vec2::new(320.0, 180.0), 180.0, t)
}

fn triangle(t: f32) -> Vec2 {
    if t < 0.3 {
        Vec2::new(80.0 + 800.0 * t, 300.0 - 800.0 * t)
    } else if t < 0.6 {
        Vec2::new(80.0 + 800.0 * t, 60.0 + 800.0 * (t - 0.3))
    } else {
        Vec2::new(560.0 - 1200.0 * (t - 0.6), 300.0)
    }
}

fn figure_eight(t: f32) -> Vec2 {
    let angle = std::f32::consts::TAU * t;
    Vec2::new(
        320.0 + 240.0 * angle.sin(),
        180.0 + 240.0 * angle.cos() * angle.sin(),
    )
}

/// All waves, in the order they are played
pub static WAVES: [WaveTemplate; 3] = [
    WaveTemplate {
        enemy_count: 10,
        path: circle,
        duration: 5000.0,
    },
    WaveTemplate {
        enemy_count: 18,
        path: triangle,
        duration: 8000.0,
    },
    WaveTemplate {
        enemy_count: 24,
        path: figure_eight,
        duration: 8000.0,
    },
];

/// Number of defined waves
pub fn wave_count() -> usize {
    WAVES.len()
}

/// Template for wave `n` (0-based)
pub fn template(n: usize) -> Option<&'static WaveTemplate> {
    WAVES.get(n)
}
