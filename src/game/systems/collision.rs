//! Collision detection
//!
//! Bullets against the live wave's enemies, bombs against players. Both
//! passes are brute force; entity counts per session stay small.

use smallvec::SmallVec;

use crate::game::state::{GameState, Player, PlayerId};
use crate::util::rect::{intersect, Rect};

/// Everything removed by one collision pass
#[derive(Debug, Default)]
pub struct Collisions {
    /// Hitboxes of destroyed enemies, in removal order
    pub explosions: SmallVec<[Rect; 4]>,
    /// Player records as they were just before removal
    pub deaths: SmallVec<[Player; 2]>,
}

impl Collisions {
    pub fn is_empty(&self) -> bool {
        self.explosions.is_empty() && self.deaths.is_empty()
    }
}

/// Run both collision passes against `state`
pub fn detect(state: &mut GameState) -> Collisions {
    let mut out = Collisions::default();
    bullets_vs_enemies(state, &mut out);
    bombs_vs_players(state, &mut out);
    out
}

/// Each bullet destroys at most the first live enemy it overlaps
fn bullets_vs_enemies(state: &mut GameState, out: &mut Collisions) {
    let Some(enemies) = state.wave.enemies.as_mut() else {
        return;
    };

    let mut i = 0;
    while i < state.bullets.len() {
        let shot = state.bullets[i].position;
        match enemies.iter().position(|e| intersect(&shot, &e.position)) {
            Some(hit) => {
                let destroyed = enemies.remove(hit);
                state.bullets.remove(i);
                out.explosions.push(destroyed.position);
            }
            None => i += 1,
        }
    }
}

/// A bomb kills every player it overlaps and is consumed
fn bombs_vs_players(state: &mut GameState, out: &mut Collisions) {
    let mut i = 0;
    while i < state.bombs.len() {
        let bomb = state.bombs[i].position;
        let victims: SmallVec<[PlayerId; 2]> = state
            .players
            .values()
            .filter(|p| intersect(&bomb, &p.position))
            .map(|p| p.id)
            .collect();

        if victims.is_empty() {
            i += 1;
            continue;
        }

        state.bombs.remove(i);
        for id in victims {
            if let Some(dead) = state.remove_player(id) {
                out.deaths.push(dead);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Bomb, Bullet, Enemy};
    use crate::util::vec2::Vec2;
    use uuid::Uuid;

    fn bullet_at(x: f32, y: f32) -> Bullet {
        Bullet {
            position: Rect::new(x, y, 8.0, 16.0),
            owner: Uuid::new_v4(),
        }
    }

    fn bomb_at(x: f32, y: f32) -> Bomb {
        Bomb {
            position: Rect::new(x, y, 20.0, 14.0),
        }
    }

    fn state_with_enemies(origins: &[(f32, f32)]) -> GameState {
        let mut state = GameState::new();
        state.wave.enemies = Some(
            origins
                .iter()
                .map(|&(x, y)| Enemy::new(Vec2::new(x, y), 0.0, 2000.0))
                .collect(),
        );
        state
    }

    #[test]
    fn test_no_enemies_no_explosions() {
        let mut state = GameState::new();
        state.bullets.push_back(bullet_at(0.0, 0.0));
        let hits = detect(&mut state);
        assert!(hits.is_empty());
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_destroys_enemy() {
        let mut state = state_with_enemies(&[(100.0, 100.0), (300.0, 100.0)]);
        state.bullets.push_back(bullet_at(110.0, 110.0));

        let hits = detect(&mut state);
        assert_eq!(hits.explosions.len(), 1);
        assert_eq!(hits.explosions[0], Rect::new(100.0, 100.0, 32.0, 32.0));
        assert!(state.bullets.is_empty());
        assert_eq!(state.wave.alive_count(), 1);
    }

    #[test]
    fn test_bullet_hits_only_first_overlapping_enemy() {
        // Two stacked enemies, one bullet
        let mut state = state_with_enemies(&[(100.0, 100.0), (104.0, 100.0)]);
        state.bullets.push_back(bullet_at(110.0, 110.0));

        let hits = detect(&mut state);
        assert_eq!(hits.explosions.len(), 1);
        assert_eq!(hits.explosions[0].x, 100.0);
        assert_eq!(state.wave.alive_count(), 1);
    }

    #[test]
    fn test_destroyed_enemy_not_matched_twice() {
        let mut state = state_with_enemies(&[(100.0, 100.0)]);
        state.bullets.push_back(bullet_at(110.0, 110.0));
        state.bullets.push_back(bullet_at(112.0, 112.0));

        let hits = detect(&mut state);
        assert_eq!(hits.explosions.len(), 1);
        assert_eq!(state.bullets.len(), 1);
        assert!(state.wave.is_cleared());
    }

    #[test]
    fn test_edge_touching_bullet_misses() {
        let mut state = state_with_enemies(&[(100.0, 100.0)]);
        state.bullets.push_back(bullet_at(132.0, 100.0));
        assert!(detect(&mut state).is_empty());
    }

    #[test]
    fn test_bomb_kills_player() {
        let mut state = GameState::new();
        let id = Uuid::new_v4();
        state.add_player(Player::spawn(id, 100.0, 0));
        state.bombs.push(bomb_at(105.0, 430.0));
        state.bombs.push(bomb_at(400.0, 430.0));

        let hits = detect(&mut state);
        assert_eq!(hits.deaths.len(), 1);
        assert_eq!(hits.deaths[0].id, id);
        assert_eq!(hits.deaths[0].position.x, 100.0);
        assert_eq!(state.player_count(), 0);
        assert_eq!(state.bombs.len(), 1);
        assert_eq!(state.bombs[0].position.x, 400.0);
    }

    #[test]
    fn test_bomb_kills_every_overlapping_player() {
        let mut state = GameState::new();
        state.add_player(Player::spawn(Uuid::new_v4(), 100.0, 0));
        state.add_player(Player::spawn(Uuid::new_v4(), 110.0, 1));
        let survivor = Uuid::new_v4();
        state.add_player(Player::spawn(survivor, 500.0, 2));
        state.bombs.push(bomb_at(115.0, 430.0));

        let hits = detect(&mut state);
        assert_eq!(hits.deaths.len(), 2);
        assert!(state.bombs.is_empty());
        assert_eq!(state.player_count(), 1);
        assert!(state.get_player(survivor).is_some());
    }

    #[test]
    fn test_second_bomb_on_dead_player_is_kept() {
        let mut state = GameState::new();
        state.add_player(Player::spawn(Uuid::new_v4(), 100.0, 0));
        state.bombs.push(bomb_at(105.0, 430.0));
        state.bombs.push(bomb_at(106.0, 431.0));

        let hits = detect(&mut state);
        assert_eq!(hits.deaths.len(), 1);
        assert_eq!(state.bombs.len(), 1);
    }
}
