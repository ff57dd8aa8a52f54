//! Enemy formation movement and bomb firing
//!
//! Enemies ride their wave's path; a descending offset brings a fresh wave
//! down from above the screen.

use rand::Rng;

use crate::game::constants::enemy;
use crate::game::state::{Bomb, Enemy, GameState, Wave};
use crate::game::systems::projectile::scroll_step;

/// Random delay before an enemy starts charging its next bomb
pub fn random_fire_delay<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(enemy::FIRE_DELAY_MIN_MS..enemy::FIRE_DELAY_MAX_MS)
}

/// Fill `wave` with `enemy_count` enemies spaced evenly along its path
pub fn populate<R: Rng + ?Sized>(wave: &mut Wave, rng: &mut R) {
    let count = wave.enemy_count;
    let enemies = (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            Enemy::new((wave.path)(t), t, random_fire_delay(rng))
        })
        .collect();
    wave.enemies = Some(enemies);
}

/// Advance the descent and every enemy by one tick. Returns the number of
/// bombs dropped.
pub fn update<R: Rng + ?Sized>(state: &mut GameState, dt_ms: f32, rng: &mut R) -> usize {
    if state.enemy_offset < 0.0 {
        state.enemy_offset = (state.enemy_offset + scroll_step(dt_ms)).min(0.0);
    }

    let GameState {
        wave,
        bombs,
        enemy_offset,
        ..
    } = state;

    let Some(enemies) = wave.enemies.as_mut() else {
        return 0;
    };

    let mut dropped = 0;
    for e in enemies.iter_mut() {
        let path_point = (e.path_point + dt_ms / wave.duration) % 1.0;
        let pos = (wave.path)(path_point);
        e.position.x = pos.x;
        e.position.y = pos.y + *enemy_offset;
        e.path_point = path_point;

        if e.fire_delay <= 0.0 {
            e.charge += dt_ms * enemy::CHARGE_PER_MS;
        } else {
            e.fire_delay -= dt_ms;
        }

        if e.charge > enemy::CHARGE_THRESHOLD {
            e.charge = 0.0;
            e.fire_delay = random_fire_delay(rng);
            bombs.push(Bomb::dropped_by(e));
            dropped += 1;
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::waves::WAVES;
    use crate::util::vec2::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn populated_state(wave: usize) -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = GameState::new();
        state.wave = WAVES[wave].instantiate();
        populate(&mut state.wave, &mut rng);
        (state, rng)
    }

    #[test]
    fn test_fire_delay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let d = random_fire_delay(&mut rng);
            assert!((2000.0..4000.0).contains(&d));
        }
    }

    #[test]
    fn test_populate_spaces_enemies_evenly() {
        for (n, template) in WAVES.iter().enumerate() {
            let (state, _) = populated_state(n);
            let enemies = state.wave.enemies.as_ref().unwrap();
            assert_eq!(enemies.len(), template.enemy_count);
            for (i, e) in enemies.iter().enumerate() {
                let t = i as f32 / template.enemy_count as f32;
                assert_eq!(e.path_point, t);
                assert_eq!(e.charge, 0.0);
                assert!((2000.0..4000.0).contains(&e.fire_delay));
                assert!(e.position.origin().approx_eq((template.path)(t), 1e-4));
                assert_eq!((e.position.w, e.position.h), (32.0, 32.0));
            }
        }
    }

    #[test]
    fn test_unpopulated_wave_is_idle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GameState::new();
        assert_eq!(update(&mut state, 15.0, &mut rng), 0);
        assert!(state.bombs.is_empty());
        // descent still progresses
        assert!((state.enemy_offset - -472.8).abs() < 1e-3);
    }

    #[test]
    fn test_descent_clamps_at_zero() {
        let (mut state, mut rng) = populated_state(0);
        for _ in 0..100 {
            update(&mut state, 15.0, &mut rng);
        }
        assert_eq!(state.enemy_offset, 0.0);
    }

    #[test]
    fn test_enemy_follows_path_with_offset() {
        let (mut state, mut rng) = populated_state(0);
        update(&mut state, 15.0, &mut rng);

        let offset = state.enemy_offset;
        let first = &state.wave.enemies.as_ref().unwrap()[0];
        let t = 15.0 / 5000.0;
        assert!((first.path_point - t).abs() < 1e-6);
        let expected = (WAVES[0].path)(t) + Vec2::new(0.0, offset);
        assert!(first.position.origin().approx_eq(expected, 1e-3));
    }

    #[test]
    fn test_path_point_wraps() {
        let (mut state, mut rng) = populated_state(0);
        for _ in 0..1000 {
            update(&mut state, 15.0, &mut rng);
            for e in state.wave.enemies.as_ref().unwrap() {
                assert!((0.0..1.0).contains(&e.path_point));
            }
        }
    }

    #[test]
    fn test_enemy_drops_bomb_after_charging() {
        let (mut state, mut rng) = populated_state(0);
        {
            let enemies = state.wave.enemies.as_mut().unwrap();
            enemies.truncate(1);
            enemies[0].fire_delay = 0.0;
            enemies[0].charge = 3.9;
        }

        // 3.9 + 0.15 > 4
        assert_eq!(update(&mut state, 15.0, &mut rng), 1);
        let e = &state.wave.enemies.as_ref().unwrap()[0];
        assert_eq!(e.charge, 0.0);
        assert!((2000.0..4000.0).contains(&e.fire_delay));
        assert_eq!(state.bombs.len(), 1);
        assert_eq!(state.bombs[0].position.x, e.position.x + 6.0);
        assert_eq!(state.bombs[0].position.y, e.position.y + 18.0);
    }

    #[test]
    fn test_fire_delay_counts_down_before_charging() {
        let (mut state, mut rng) = populated_state(0);
        let before = state.wave.enemies.as_ref().unwrap()[0].fire_delay;
        update(&mut state, 15.0, &mut rng);
        let e = &state.wave.enemies.as_ref().unwrap()[0];
        assert!((e.fire_delay - (before - 15.0)).abs() < 1e-3);
        assert_eq!(e.charge, 0.0);
    }
}
