//! Dispatch of decoded client messages
//!
//! Lobby messages take the registry write lock so creation and deletion are
//! serialized. In-game input only needs a read lock; the room's own mutex
//! orders it against the tick task.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::lobby::registry::SessionRegistry;
use crate::metrics::Metrics;
use crate::net::protocol::{ClientMessage, ServerMessage};
use crate::net::rooms::{ConnectionId, RoomHub, RoomTransport};
use crate::net::validation;

#[derive(Clone)]
pub struct Router {
    registry: Arc<RwLock<SessionRegistry>>,
    hub: Arc<RoomHub>,
    metrics: Option<Arc<Metrics>>,
}

impl Router {
    pub fn new(registry: Arc<RwLock<SessionRegistry>>, hub: Arc<RoomHub>) -> Self {
        Self {
            registry,
            hub,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn hub(&self) -> &Arc<RoomHub> {
        &self.hub
    }

    pub fn registry(&self) -> &Arc<RwLock<SessionRegistry>> {
        &self.registry
    }

    pub async fn handle(&self, conn: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::CreateGame => self.create_game(conn).await,
            ClientMessage::JoinGame { id } => self.join_game(conn, &id).await,
            ClientMessage::LeaveGame { id } => self.leave_game(conn, &id).await,
            ClientMessage::Ready => {
                let registry = self.registry.read().await;
                if let Some(room) = registry.session_of(conn) {
                    room.apply(|s| s.ready(conn));
                }
            }
            ClientMessage::Click => {
                let registry = self.registry.read().await;
                if let Some(room) = registry.session_of(conn) {
                    room.apply(|s| s.click(conn));
                }
            }
            ClientMessage::MouseMove { dx } => {
                let dx = match validation::mouse_delta(dx) {
                    Ok(dx) => dx,
                    Err(e) => {
                        self.reject(conn, &e);
                        return;
                    }
                };
                let registry = self.registry.read().await;
                if let Some(room) = registry.session_of(conn) {
                    room.apply(|s| s.mouse_move(conn, dx));
                }
            }
        }
    }

    async fn create_game(&self, conn: ConnectionId) {
        let mut registry = self.registry.write().await;
        let (id, _) = registry.create_session();
        self.hub.join(&id, conn);
        self.hub.send_to(conn, &ServerMessage::GameCreated { id: id.clone() });
        if let Err(e) = registry.connect(&id, conn) {
            warn!("Connection {} could not enter its new session: {}", conn, e);
            return;
        }
        info!("Connection {} created session {}", conn, id);
    }

    async fn join_game(&self, conn: ConnectionId, raw: &str) {
        let id = match validation::session_id(raw) {
            Ok(id) => id,
            Err(e) => {
                self.reject(conn, &e);
                self.hub.send_to(conn, &ServerMessage::JoinFailed { id: raw.to_string() });
                return;
            }
        };

        let mut registry = self.registry.write().await;
        if registry.join(&id).is_err() {
            debug!("Connection {} asked for unknown session {}", conn, id);
            self.hub.send_to(conn, &ServerMessage::JoinFailed { id });
            return;
        }

        self.hub.join(&id, conn);
        self.hub.send_to(conn, &ServerMessage::GameJoined { id: id.clone() });
        if let Err(e) = registry.connect(&id, conn) {
            warn!("Connection {} could not join session {}: {}", conn, id, e);
            return;
        }
        info!("Connection {} joined session {}", conn, id);
    }

    async fn leave_game(&self, conn: ConnectionId, raw: &str) {
        let id = match validation::session_id(raw) {
            Ok(id) => id,
            Err(e) => {
                self.reject(conn, &e);
                return;
            }
        };

        self.hub.leave(&id, conn);
        let mut registry = self.registry.write().await;
        if registry.leave(&id, conn) {
            info!("Session {} emptied by connection {}", id, conn);
        }
    }

    /// Forget a closed connection everywhere
    pub async fn disconnect(&self, conn: ConnectionId) {
        self.hub.unregister(conn);
        let deleted = self.registry.write().await.handle_disconnect(conn);
        debug!("Connection {} gone, {} sessions deleted", conn, deleted);
    }

    fn reject(&self, conn: ConnectionId, error: &validation::ValidationError) {
        warn!("Rejected message from {}: {}", conn, error);
        if let Some(metrics) = &self.metrics {
            metrics.messages_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
