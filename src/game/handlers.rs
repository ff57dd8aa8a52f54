//! Per-player input bindings
//!
//! A connection may drive a session only while it holds a binding here.
//! Bindings are created when the player connects and dropped when it
//! disconnects or leaves, both under the session lock. A player killed by a
//! bomb keeps its binding; its inputs then find no player and do nothing.

use hashbrown::HashSet;

use crate::game::state::PlayerId;

#[derive(Debug, Default)]
pub struct HandlerTable {
    bound: HashSet<PlayerId>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `player`; binding twice is harmless
    pub fn register(&mut self, player: PlayerId) {
        self.bound.insert(player);
    }

    /// Remove the binding, returning whether one existed
    pub fn unregister(&mut self, player: PlayerId) -> bool {
        self.bound.remove(&player)
    }

    /// Whether input from `player` may reach the session
    pub fn is_bound(&self, player: PlayerId) -> bool {
        self.bound.contains(&player)
    }
}
