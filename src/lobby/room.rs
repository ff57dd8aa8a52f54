//! A live session together with its tick task
//!
//! The session sits behind a mutex shared by the tick task and every input
//! handler, so exactly one mutation runs at a time. Events a mutation queues
//! are drained and published before the lock is released, which keeps their
//! order identical to the order of mutations.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::session::Session;
use crate::game::state::SessionId;
use crate::metrics::Metrics;
use crate::net::protocol::ServerMessage;
use crate::net::rooms::RoomTransport;

struct RoomCore {
    id: SessionId,
    session: Mutex<Session>,
    transport: Arc<dyn RoomTransport>,
    metrics: Option<Arc<Metrics>>,
}

impl RoomCore {
    /// Publish everything `session` queued. Called with the lock held.
    fn publish(&self, session: &mut Session) {
        for message in session.drain_events() {
            if let Some(metrics) = &self.metrics {
                match message {
                    ServerMessage::BeginWave { .. } => {
                        metrics.waves_started.fetch_add(1, Ordering::Relaxed);
                    }
                    ServerMessage::Gameover => {
                        metrics.games_over.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {}
                }
            }
            self.transport.emit(&self.id, &message);
        }
    }

    fn tick(&self) {
        let start = Instant::now();
        let mut session = self.session.lock();
        session.tick();
        self.publish(&mut session);
        drop(session);

        if let Some(metrics) = &self.metrics {
            metrics.record_tick_time(start.elapsed());
        }
    }
}

pub struct GameRoom {
    core: Arc<RoomCore>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    created_at: Instant,
}

impl GameRoom {
    /// Wrap `session`; the tick task is not running until [`GameRoom::start`]
    pub fn new(
        session: Session,
        transport: Arc<dyn RoomTransport>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            core: Arc::new(RoomCore {
                id: session.id().to_string(),
                session: Mutex::new(session),
                transport,
                metrics,
            }),
            ticker: Mutex::new(None),
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn age_secs(&self) -> u64 {
        self.created_at.elapsed().as_secs()
    }

    /// Spawn the periodic tick task. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock();
        if ticker.is_some() {
            return;
        }

        let period = self.core.session.lock().tick_interval();
        let core: Weak<RoomCore> = Arc::downgrade(&self.core);
        let id = self.core.id.clone();

        *ticker = Some(tokio::spawn(async move {
            // First tick one period after start
            let mut clock = interval_at(tokio::time::Instant::now() + period, period);
            clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("Session {} tick loop started every {:?}", id, period);

            loop {
                clock.tick().await;
                let Some(core) = core.upgrade() else {
                    break;
                };
                core.tick();
            }
            debug!("Session {} tick loop finished", id);
        }));
    }

    /// Abort the tick task. An in-flight tick runs to completion.
    pub fn stop(&self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
            info!("Session {} tick loop stopped", self.core.id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run `f` against the session under its lock, then publish what it
    /// queued
    pub fn apply<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.core.session.lock();
        let result = f(&mut *session);
        self.core.publish(&mut session);
        result
    }

    /// Read-only access under the lock
    pub fn inspect<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&*self.core.session.lock())
    }

    /// Run one tick immediately, outside the timer
    pub fn tick_now(&self) {
        self.core.tick();
    }

    pub fn player_count(&self) -> usize {
        self.inspect(Session::player_count)
    }
}

impl Drop for GameRoom {
    fn drop(&mut self) {
        self.stop();
    }
}
