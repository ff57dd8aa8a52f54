//! Room-scoped publish/subscribe
//!
//! Sessions publish through [`RoomTransport`] and never see connections.
//! [`RoomHub`] is the in-process implementation: each room is a set of
//! connection ids, each connection owns an unbounded queue of encoded frames
//! drained by its writer task. Messages are encoded once per emit and shared
//! between recipients.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::game::state::PlayerId;
use crate::metrics::Metrics;
use crate::net::protocol::{encode, ServerMessage};

/// Connection ids double as player ids
pub type ConnectionId = PlayerId;

/// One encoded message, shared by every recipient
pub type Frame = Arc<[u8]>;

pub type FrameSender = mpsc::UnboundedSender<Frame>;
pub type FrameReceiver = mpsc::UnboundedReceiver<Frame>;

/// Group messaging used by sessions and the router
pub trait RoomTransport: Send + Sync {
    fn join(&self, room: &str, conn: ConnectionId);
    fn leave(&self, room: &str, conn: ConnectionId);
    /// Send to every member of `room`
    fn emit(&self, room: &str, message: &ServerMessage);
    fn send_to(&self, conn: ConnectionId, message: &ServerMessage);
    /// Forget `room` and its memberships
    fn close(&self, _room: &str) {}
}

#[derive(Default)]
pub struct RoomHub {
    connections: RwLock<HashMap<ConnectionId, FrameSender>>,
    rooms: RwLock<HashMap<String, HashSet<ConnectionId>>>,
    metrics: Option<Arc<Metrics>>,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::default()
        }
    }

    /// Register a connection and hand back the receiving end of its queue
    pub fn register(&self, conn: ConnectionId) -> FrameReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().insert(conn, tx);
        rx
    }

    /// Drop a connection's queue and every room membership it holds
    pub fn unregister(&self, conn: ConnectionId) {
        self.connections.write().remove(&conn);
        let mut rooms = self.rooms.write();
        for members in rooms.values_mut() {
            members.remove(&conn);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    pub fn is_connected(&self, conn: ConnectionId) -> bool {
        self.connections.read().contains_key(&conn)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .read()
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    fn encode_frame(&self, message: &ServerMessage) -> Option<Frame> {
        match encode(message) {
            Ok(bytes) => Some(Arc::from(bytes)),
            Err(e) => {
                warn!("Failed to encode {}: {}", message.kind(), e);
                None
            }
        }
    }

    fn deliver(&self, senders: &HashMap<ConnectionId, FrameSender>, conn: ConnectionId, frame: &Frame) {
        let Some(tx) = senders.get(&conn) else {
            return;
        };
        if tx.send(frame.clone()).is_err() {
            debug!("Connection {} queue closed, dropping frame", conn);
            return;
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_sent(frame.len());
        }
    }
}

impl RoomTransport for RoomHub {
    fn join(&self, room: &str, conn: ConnectionId) {
        self.rooms
            .write()
            .entry(room.to_string())
            .or_default()
            .insert(conn);
    }

    fn leave(&self, room: &str, conn: ConnectionId) {
        let mut rooms = self.rooms.write();
        if let Some(members) = rooms.get_mut(room) {
            members.remove(&conn);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
    }

    fn emit(&self, room: &str, message: &ServerMessage) {
        let rooms = self.rooms.read();
        let Some(members) = rooms.get(room) else {
            return;
        };
        let Some(frame) = self.encode_frame(message) else {
            return;
        };
        let senders = self.connections.read();
        for &conn in members {
            self.deliver(&senders, conn, &frame);
        }
    }

    fn send_to(&self, conn: ConnectionId, message: &ServerMessage) {
        let Some(frame) = self.encode_frame(message) else {
            return;
        };
        let senders = self.connections.read();
        self.deliver(&senders, conn, &frame);
    }

    fn close(&self, room: &str) {
        self.rooms.write().remove(room);
    }
}
