//! Game state definitions and structures
//!
//! Contains all entities (players, bullets, bombs, enemies) and the live wave.

use std::collections::VecDeque;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::constants::{bomb, bullet, enemy, player};
use crate::game::waves::{self, PathFn};
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Unique player identifier (the transport's connection id)
pub type PlayerId = Uuid;

/// Six-letter session identifier
pub type SessionId = String;

/// Player state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    /// Hitbox, top-left anchored
    pub position: Rect,
    /// Palette index, the player count at join time
    pub color: u32,
    pub name: String,
    pub ready: bool,
}

impl Player {
    /// New player on the spawn row. `joined_before` is the number of players
    /// already in the session.
    pub fn spawn(id: PlayerId, x: f32, joined_before: usize) -> Self {
        Self {
            id,
            position: Rect::new(x, player::SPAWN_Y, player::SIZE, player::SIZE),
            color: joined_before as u32,
            name: format!("Player {}", joined_before + 1),
            ready: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bullet {
    pub position: Rect,
    pub owner: PlayerId,
}

impl Bullet {
    /// Bullet centred on the player's top edge
    pub fn fired_by(shooter: &Player) -> Self {
        let origin = shooter.position;
        Self {
            position: Rect::new(
                origin.center_x() - bullet::WIDTH / 2.0,
                origin.y,
                bullet::WIDTH,
                bullet::HEIGHT,
            ),
            owner: shooter.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bomb {
    pub position: Rect,
}

impl Bomb {
    pub fn dropped_by(source: &Enemy) -> Self {
        Self {
            position: Rect::new(
                source.position.x + bomb::SPAWN_OFFSET_X,
                source.position.y + bomb::SPAWN_OFFSET_Y,
                bomb::WIDTH,
                bomb::HEIGHT,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enemy {
    pub position: Rect,
    /// Accumulates once `fire_delay` has run out; a bomb drops past the threshold
    pub charge: f32,
    /// Milliseconds until the enemy starts charging
    pub fire_delay: f32,
    /// Parameter along the wave path, always in [0, 1)
    pub path_point: f32,
}

impl Enemy {
    pub fn new(origin: Vec2, path_point: f32, fire_delay: f32) -> Self {
        Self {
            position: Rect::at(origin, enemy::SIZE, enemy::SIZE),
            charge: 0.0,
            fire_delay,
            path_point,
        }
    }
}

/// Live wave: a template clone plus its enemies once populated
#[derive(Debug, Clone)]
pub struct Wave {
    pub enemy_count: usize,
    /// `None` until the wave begins
    pub enemies: Option<Vec<Enemy>>,
    pub path: PathFn,
    /// Milliseconds per lap of `path`
    pub duration: f32,
}

impl Wave {
    /// Populated and every enemy destroyed
    pub fn is_cleared(&self) -> bool {
        self.enemies.as_ref().is_some_and(|e| e.is_empty())
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.as_ref().map_or(0, Vec::len)
    }

    pub fn snapshot(&self) -> WaveSnapshot {
        WaveSnapshot {
            enemy_count: self.enemy_count as u32,
            enemies: self.enemies.clone(),
            duration: self.duration,
        }
    }
}

/// Wire form of a wave (the path function stays on the server)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaveSnapshot {
    pub enemy_count: u32,
    pub enemies: Option<Vec<Enemy>>,
    pub duration: f32,
}

/// Full entity state broadcast every tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    pub players: HashMap<PlayerId, Player>,
    pub bullets: Vec<Bullet>,
    pub wave: WaveSnapshot,
    pub bombs: Vec<Bomb>,
}

/// Entity state owned by one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub players: HashMap<PlayerId, Player>,
    /// Oldest first
    pub bullets: VecDeque<Bullet>,
    pub bombs: Vec<Bomb>,
    pub wave: Wave,
    /// Index of the next template to begin
    pub wave_index: usize,
    /// Vertical offset applied to every enemy while a wave descends
    pub enemy_offset: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            bullets: VecDeque::new(),
            bombs: Vec::new(),
            wave: waves::WAVES[0].instantiate(),
            wave_index: 0,
            enemy_offset: enemy::DESCENT_START,
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn all_ready(&self) -> bool {
        self.players.values().all(|p| p.ready)
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            players: self.players.clone(),
            bullets: self.bullets.iter().cloned().collect(),
            wave: self.wave.snapshot(),
            bombs: self.bombs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_spawn() {
        let id = Uuid::new_v4();
        let player = Player::spawn(id, 100.0, 2);
        assert_eq!(player.id, id);
        assert_eq!(player.position, Rect::new(100.0, 432.0, 32.0, 32.0));
        assert_eq!(player.color, 2);
        assert_eq!(player.name, "Player 3");
        assert!(!player.ready);
    }

    #[test]
    fn test_bullet_centred_on_player() {
        let player = Player::spawn(Uuid::new_v4(), 100.0, 0);
        let shot = Bullet::fired_by(&player);
        assert_eq!(shot.position, Rect::new(112.0, 432.0, 8.0, 16.0));
        assert_eq!(shot.owner, player.id);
    }

    #[test]
    fn test_bomb_offset_from_enemy() {
        let source = Enemy::new(Vec2::new(50.0, 60.0), 0.0, 2000.0);
        let dropped = Bomb::dropped_by(&source);
        assert_eq!(dropped.position, Rect::new(56.0, 78.0, 20.0, 14.0));
    }

    #[test]
    fn test_new_state_holds_unpopulated_first_wave() {
        let state = GameState::new();
        assert_eq!(state.wave.enemy_count, 10);
        assert!(state.wave.enemies.is_none());
        assert!(!state.wave.is_cleared());
        assert_eq!(state.wave_index, 0);
        assert_eq!(state.enemy_offset, -480.0);
    }

    #[test]
    fn test_wave_cleared_only_when_populated() {
        let mut wave = waves::WAVES[0].instantiate();
        assert!(!wave.is_cleared());
        wave.enemies = Some(vec![Enemy::new(Vec2::ZERO, 0.0, 2000.0)]);
        assert!(!wave.is_cleared());
        assert_eq!(wave.alive_count(), 1);
        wave.enemies = Some(Vec::new());
        assert!(wave.is_cleared());
    }

    #[test]
    fn test_all_ready() {
        let mut state = GameState::new();
        // vacuously true
        assert!(state.all_ready());

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        state.add_player(Player::spawn(a, 0.0, 0));
        state.add_player(Player::spawn(b, 0.0, 1));
        assert!(!state.all_ready());

        state.get_player_mut(a).unwrap().ready = true;
        assert!(!state.all_ready());
        state.get_player_mut(b).unwrap().ready = true;
        assert!(state.all_ready());
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = GameState::new();
        let id = Uuid::new_v4();
        state.add_player(Player::spawn(id, 10.0, 0));
        let shooter = state.get_player(id).unwrap().clone();
        state.bullets.push_back(Bullet::fired_by(&shooter));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[&id], shooter);
        assert_eq!(snapshot.bullets.len(), 1);
        assert!(snapshot.bombs.is_empty());
        assert_eq!(snapshot.wave.enemy_count, 10);
        assert!(snapshot.wave.enemies.is_none());
    }
}
