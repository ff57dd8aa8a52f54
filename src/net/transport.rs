//! WebTransport server
//!
//! Each client opens one bidirectional stream after the session handshake.
//! Inbound frames are decoded and handed to the [`Router`]; outbound frames
//! arrive on the connection's hub queue and are written by a dedicated task,
//! so a slow client never stalls a session tick.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use wtransport::endpoint::IncomingSession;
use wtransport::{Endpoint, RecvStream, SendStream};

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::net::framing::{read_message, write_message, FramingError};
use crate::net::protocol::{decode, ClientMessage};
use crate::net::rooms::{ConnectionId, FrameReceiver};
use crate::net::router::Router;
use crate::net::tls::TlsConfig;

/// WebTransport server
pub struct WebTransportServer {
    config: ServerConfig,
    tls_config: TlsConfig,
    router: Router,
    metrics: Arc<Metrics>,
}

impl WebTransportServer {
    /// Create a new WebTransport server, loading or generating its identity
    pub async fn new(config: ServerConfig, router: Router, metrics: Arc<Metrics>) -> anyhow::Result<Self> {
        let tls_config =
            TlsConfig::load(config.tls_cert_path.as_deref(), config.tls_key_path.as_deref()).await?;

        Ok(Self {
            config,
            tls_config,
            router,
            metrics,
        })
    }

    /// Get the certificate hash for client configuration
    pub fn cert_hash(&self) -> &str {
        self.tls_config.cert_hash()
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.config.bind_address, self.config.port)
    }

    /// Accept connections until the task is cancelled
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.bind_addr();
        let server_config = wtransport::ServerConfig::builder()
            .with_bind_address(addr)
            .with_identity(self.tls_config.identity)
            .build();

        let server = Endpoint::server(server_config)?;
        info!("WebTransport server listening on {}", addr);

        loop {
            let incoming = server.accept().await;
            let router = self.router.clone();
            let metrics = self.metrics.clone();

            tokio::spawn(async move {
                if let Err(e) = handle_connection(incoming, router, metrics).await {
                    warn!("Connection error: {}", e);
                }
            });
        }
    }
}

/// Handle a single WebTransport connection from handshake to cleanup
async fn handle_connection(
    incoming: IncomingSession,
    router: Router,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    let session_request = incoming.await?;
    debug!(
        "New connection from {}, path {}",
        session_request.authority(),
        session_request.path()
    );

    let connection = session_request.accept().await?;
    let (send, recv) = connection.accept_bi().await?;

    let conn: ConnectionId = Uuid::new_v4();
    let queue = router.hub().register(conn);
    metrics.connections_active.fetch_add(1, Ordering::Relaxed);
    debug!("Connection {} ready", conn);

    let writer = tokio::spawn(write_loop(conn, send, queue));
    read_loop(conn, recv, &router, &metrics).await;

    router.disconnect(conn).await;
    // The peer is gone; frames still queued have nowhere to go
    writer.abort();
    metrics.connections_active.fetch_sub(1, Ordering::Relaxed);
    debug!("Connection {} closed", conn);
    Ok(())
}

async fn read_loop(conn: ConnectionId, mut recv: RecvStream, router: &Router, metrics: &Metrics) {
    loop {
        let payload = match read_message(&mut recv).await {
            Ok(payload) => payload,
            Err(FramingError::ConnectionClosed) => break,
            Err(FramingError::MessageTooLarge(len, max)) => {
                warn!("Connection {} sent an oversized message: {} bytes (max {})", conn, len, max);
                break;
            }
            Err(e) => {
                debug!("Stream read error on {}: {}", conn, e);
                break;
            }
        };
        metrics.record_received(payload.len());

        let message: ClientMessage = match decode(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to decode client message from {}: {}", conn, e);
                metrics.messages_dropped.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };
        router.handle(conn, message).await;
    }
}

async fn write_loop(conn: ConnectionId, mut send: SendStream, mut queue: FrameReceiver) {
    while let Some(frame) = queue.recv().await {
        match write_message(&mut send, &frame).await {
            Ok(()) => {}
            Err(FramingError::MessageTooLarge(len, max)) => {
                warn!("Skipping oversized frame for {}: {} bytes (max {})", conn, len, max);
            }
            Err(e) => {
                debug!("Stream write error on {}: {}", conn, e);
                break;
            }
        }
    }
}
