//! Registry of live sessions
//!
//! Owns every [`GameRoom`] keyed by its session id plus an index from player
//! to the session it is attached to. The registry itself is not synchronized;
//! the server shares it behind a `tokio::sync::RwLock` so creation and
//! deletion are serialized.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::game::session::Session;
use crate::game::state::{PlayerId, SessionId};
use crate::lobby::id;
use crate::lobby::room::GameRoom;
use crate::metrics::Metrics;
use crate::net::rooms::RoomTransport;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
}

pub struct SessionRegistry {
    sessions: HashMap<SessionId, GameRoom>,
    player_sessions: HashMap<PlayerId, SessionId>,
    transport: Arc<dyn RoomTransport>,
    tick_rate_ms: u64,
    metrics: Option<Arc<Metrics>>,
    rng: StdRng,
}

impl SessionRegistry {
    pub fn new(transport: Arc<dyn RoomTransport>, tick_rate_ms: u64) -> Self {
        Self {
            sessions: HashMap::new(),
            player_sessions: HashMap::new(),
            transport,
            tick_rate_ms,
            metrics: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Create a session under a fresh random id and start its tick task.
    /// Ids are not checked for collisions.
    pub fn create_session(&mut self) -> (SessionId, &GameRoom) {
        let id = id::generate(&mut self.rng);
        let session = Session::with_tick_rate(id.clone(), self.tick_rate_ms);
        let room = GameRoom::new(session, self.transport.clone(), self.metrics.clone());
        room.start();

        info!("Session {} created ({} live)", id, self.sessions.len() + 1);
        if let Some(metrics) = &self.metrics {
            metrics.sessions_created.fetch_add(1, Ordering::Relaxed);
            let live = self.sessions.len() + usize::from(!self.sessions.contains_key(&id));
            metrics.sessions_active.store(live as u64, Ordering::Relaxed);
        }

        let room = match self.sessions.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(room);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(room),
        };
        (id, room)
    }

    /// Look up a session, ignoring case
    pub fn join(&self, id: &str) -> Result<&GameRoom, RegistryError> {
        let id = id::normalize(id);
        self.sessions
            .get(&id)
            .ok_or(RegistryError::SessionNotFound(id))
    }

    /// Attach `player` to session `id`, leaving any other session first
    pub fn connect(&mut self, id: &str, player: PlayerId) -> Result<(), RegistryError> {
        let id = id::normalize(id);
        if !self.sessions.contains_key(&id) {
            return Err(RegistryError::SessionNotFound(id));
        }

        if let Some(previous) = self.player_sessions.get(&player).cloned() {
            if previous != id {
                debug!("Player {} switches from session {} to {}", player, previous, id);
                self.transport.leave(&previous, player);
                self.leave(&previous, player);
            }
        }

        let room = self
            .sessions
            .get(&id)
            .ok_or_else(|| RegistryError::SessionNotFound(id.clone()))?;
        room.apply(|s| s.on_connect(player));
        self.player_sessions.insert(player, id);
        self.update_player_gauge();
        Ok(())
    }

    /// Remove `player` from session `id`; delete the session once it has no
    /// players. Returns whether the session was deleted.
    pub fn leave(&mut self, id: &str, player: PlayerId) -> bool {
        let id = id::normalize(id);
        let Some(room) = self.sessions.get(&id) else {
            return false;
        };

        room.apply(|s| s.on_disconnect(player));
        let empty = room.player_count() == 0;

        if self.player_sessions.get(&player) == Some(&id) {
            self.player_sessions.remove(&player);
        }
        if empty {
            self.remove_session(&id);
        }
        self.update_player_gauge();
        empty
    }

    /// Remove a vanished connection from every session it is attached to and
    /// delete every session left without players. Returns the number of
    /// sessions deleted.
    pub fn handle_disconnect(&mut self, player: PlayerId) -> usize {
        let mut emptied = Vec::new();
        for (id, room) in self.sessions.iter() {
            room.apply(|s| {
                if s.has_member(player) {
                    s.on_disconnect(player);
                }
            });
            if room.player_count() == 0 {
                emptied.push(id.clone());
            }
        }

        self.player_sessions.remove(&player);
        for id in &emptied {
            self.remove_session(id);
        }
        self.update_player_gauge();
        emptied.len()
    }

    /// Session the player is attached to, if any
    pub fn session_of(&self, player: PlayerId) -> Option<&GameRoom> {
        let id = self.player_sessions.get(&player)?;
        self.sessions.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&GameRoom> {
        self.sessions.get(&id::normalize(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().cloned().collect()
    }

    /// Players attached to some session
    pub fn member_count(&self) -> usize {
        self.player_sessions.len()
    }

    /// Stop every tick task and forget every session
    pub fn shutdown_all(&mut self) {
        let count = self.sessions.len();
        for (id, room) in self.sessions.drain() {
            room.stop();
            self.transport.close(&id);
        }
        self.player_sessions.clear();
        if let Some(metrics) = &self.metrics {
            metrics.sessions_active.store(0, Ordering::Relaxed);
            metrics.players_active.store(0, Ordering::Relaxed);
        }
        info!("Shut down {} sessions", count);
    }

    fn remove_session(&mut self, id: &str) {
        let Some(room) = self.sessions.remove(id) else {
            return;
        };
        room.stop();
        self.transport.close(id);
        self.player_sessions.retain(|_, session| session.as_str() != id);

        info!(
            "Session {} deleted after {}s ({} live)",
            id,
            room.age_secs(),
            self.sessions.len()
        );
        if let Some(metrics) = &self.metrics {
            metrics.sessions_active.store(self.sessions.len() as u64, Ordering::Relaxed);
        }
    }

    fn update_player_gauge(&self) {
        if let Some(metrics) = &self.metrics {
            metrics
                .players_active
                .store(self.player_sessions.len() as u64, Ordering::Relaxed);
        }
    }
}
