//! Projectile motion and culling
//!
//! Bullets travel up, bombs fall down, both at the shared scroll speed.

use crate::game::constants::{bomb, bounds, bullet, tick};
use crate::game::state::GameState;

/// Distance covered in `dt_ms` at the scroll speed
#[inline]
pub fn scroll_step(dt_ms: f32) -> f32 {
    tick::SCROLL_SPEED * dt_ms / 1000.0
}

/// Move every projectile one tick and drop the ones that left the screen
pub fn update(state: &mut GameState, dt_ms: f32) {
    let step = scroll_step(dt_ms);

    for shot in state.bullets.iter_mut() {
        shot.position.y -= step;
    }
    for dropped in state.bombs.iter_mut() {
        dropped.position.y += step;
    }

    // Bullets are ordered oldest first, so only the front can be off screen
    while state
        .bullets
        .front()
        .is_some_and(|b| b.position.y < bullet::CULL_Y)
    {
        state.bullets.pop_front();
    }

    state
        .bombs
        .retain(|b| b.position.y <= bounds::HEIGHT + bomb::CULL_MARGIN);
}
