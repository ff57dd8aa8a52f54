//! A single match instance
//!
//! `Session` owns every entity of one match and is driven from two sides:
//! input handlers (`ready`, `click`, `mouse_move`) and the periodic `tick`.
//! It is a plain state machine with no I/O. Events are queued in an outbox
//! and drained by the owner after each mutation, so the caller decides how
//! and when they are published.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::game::constants::{bounds, enemy, player, tick};
use crate::game::handlers::HandlerTable;
use crate::game::state::{Bullet, EntitySnapshot, GameState, Player, PlayerId, SessionId};
use crate::game::systems::{collision, formation, projectile};
use crate::game::waves;
use crate::net::protocol::ServerMessage;

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Waiting for every player to be ready
    #[default]
    Lobby,
    /// A wave is in play
    WaveActive,
    /// Every player died
    GameOver,
}

pub struct Session {
    id: SessionId,
    state: GameState,
    phase: SessionPhase,
    tick_rate_ms: u64,
    tick_count: u64,
    handlers: HandlerTable,
    outbox: Vec<ServerMessage>,
    rng: StdRng,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self::with_tick_rate(id, tick::RATE_MS)
    }

    pub fn with_tick_rate(id: SessionId, tick_rate_ms: u64) -> Self {
        Self::build(id, tick_rate_ms, StdRng::from_entropy())
    }

    /// Deterministic session for tests and benchmarks
    pub fn with_seed(id: SessionId, tick_rate_ms: u64, seed: u64) -> Self {
        Self::build(id, tick_rate_ms, StdRng::seed_from_u64(seed))
    }

    fn build(id: SessionId, tick_rate_ms: u64, rng: StdRng) -> Self {
        Self {
            id,
            state: GameState::new(),
            phase: SessionPhase::Lobby,
            tick_rate_ms: tick_rate_ms.max(1),
            tick_count: 0,
            handlers: HandlerTable::new(),
            outbox: Vec::new(),
            rng,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of living players
    pub fn player_count(&self) -> usize {
        self.state.player_count()
    }

    /// Whether `id` has a living player here
    pub fn has_player(&self, id: PlayerId) -> bool {
        self.state.players.contains_key(&id)
    }

    /// Whether `id` is attached to this session, alive or not
    pub fn has_member(&self, id: PlayerId) -> bool {
        self.handlers.is_bound(id) || self.has_player(id)
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        self.state.snapshot()
    }

    /// Take every event queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, message: ServerMessage) {
        self.outbox.push(message);
    }

    fn emit_snapshot(&mut self) {
        let snapshot = self.state.snapshot();
        self.emit(ServerMessage::UpdateEntities(snapshot));
    }

    /// Attach a player: spawn it on the bottom row and bind its inputs.
    /// A member whose player was killed gets a fresh one.
    pub fn on_connect(&mut self, id: PlayerId) {
        if self.has_player(id) {
            debug!("Player {} already attached to session {}", id, self.id);
            return;
        }

        let joined_before = self.state.player_count();
        let x = (bounds::WIDTH * self.rng.gen::<f32>()).floor();
        self.state.add_player(Player::spawn(id, x, joined_before));
        self.handlers.register(id);

        debug!(
            "Player {} joined session {} ({} players)",
            id,
            self.id,
            self.state.player_count()
        );
        self.emit_snapshot();
    }

    /// Detach a player and drop its bindings. Returns whether anything was
    /// removed.
    pub fn on_disconnect(&mut self, id: PlayerId) -> bool {
        let unbound = self.handlers.unregister(id);
        let removed = self.state.remove_player(id).is_some();
        if !(unbound || removed) {
            return false;
        }

        debug!(
            "Player {} left session {} ({} players)",
            id,
            self.id,
            self.state.player_count()
        );
        self.emit(ServerMessage::RemovePlayer { player_id: id });
        true
    }

    pub fn ready(&mut self, id: PlayerId) {
        if !self.handlers.is_bound(id) {
            return;
        }
        let Some(p) = self.state.get_player_mut(id) else {
            return;
        };
        p.ready = true;

        if self.phase == SessionPhase::Lobby && self.state.all_ready() {
            let n = self.state.wave_index;
            self.state.wave_index += 1;
            self.begin_wave(n);
        }
    }

    pub fn click(&mut self, id: PlayerId) {
        if !self.handlers.is_bound(id) {
            return;
        }
        let Some(shooter) = self.state.get_player(id) else {
            return;
        };
        let shot = Bullet::fired_by(shooter);
        self.state.bullets.push_back(shot);
    }

    pub fn mouse_move(&mut self, id: PlayerId, dx: f32) {
        if !self.handlers.is_bound(id) {
            return;
        }
        let Some(p) = self.state.get_player_mut(id) else {
            return;
        };
        let max_x = bounds::X + bounds::WIDTH - player::SIZE;
        p.position.x = (p.position.x + dx).clamp(bounds::X, max_x);
    }

    /// Start wave `n` (0-based): reset the descent and spawn its enemies
    pub fn begin_wave(&mut self, n: usize) {
        let Some(template) = waves::template(n) else {
            warn!("Session {} asked for missing wave {}", self.id, n);
            return;
        };

        self.state.enemy_offset = enemy::DESCENT_START;
        let mut wave = template.instantiate();
        formation::populate(&mut wave, &mut self.rng);
        self.state.wave = wave;
        self.phase = SessionPhase::WaveActive;

        info!(
            "Session {} begins wave {} ({} enemies)",
            self.id,
            n + 1,
            template.enemy_count
        );
        self.emit(ServerMessage::BeginWave { wave: n as u32 + 1 });
    }

    /// Advance the simulation by one tick and queue the resulting events,
    /// ending with a full snapshot.
    pub fn tick(&mut self) {
        let dt = self.tick_rate_ms as f32;
        self.tick_count += 1;

        projectile::update(&mut self.state, dt);
        formation::update(&mut self.state, dt, &mut self.rng);

        let hits = collision::detect(&mut self.state);
        for position in hits.explosions {
            self.emit(ServerMessage::Explosion { position });
        }
        let anyone_died = !hits.deaths.is_empty();
        for dead in hits.deaths {
            debug!("Player {} died in session {}", dead.id, self.id);
            self.emit(ServerMessage::Death {
                id: dead.id,
                player: dead,
            });
        }
        if anyone_died && self.state.player_count() == 0 && self.phase != SessionPhase::GameOver {
            info!("Session {} game over", self.id);
            self.phase = SessionPhase::GameOver;
            self.emit(ServerMessage::Gameover);
        }

        if self.phase == SessionPhase::WaveActive
            && self.state.wave.is_cleared()
            && self.state.wave_index < waves::wave_count()
        {
            let n = self.state.wave_index;
            self.state.wave_index += 1;
            self.begin_wave(n);
        }

        self.emit_snapshot();
    }
}
