//! Prometheus-compatible metrics endpoint
//!
//! Exposes server metrics in Prometheus text format and as JSON.
//! Default endpoint: http://localhost:9090/metrics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

const TICK_HISTORY: usize = 1000;

/// Metrics registry for the server
#[derive(Debug)]
pub struct Metrics {
    // Sessions
    pub sessions_active: AtomicU64,
    pub sessions_created: AtomicU64,
    pub players_active: AtomicU64,
    pub waves_started: AtomicU64,
    pub games_over: AtomicU64,

    // Tick timing (microseconds), across every session
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    // Network stats
    pub connections_active: AtomicU64,
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub bytes_sent: AtomicU64,
    pub bytes_received: AtomicU64,
    pub messages_dropped: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sessions_active: AtomicU64::new(0),
            sessions_created: AtomicU64::new(0),
            players_active: AtomicU64::new(0),
            waves_started: AtomicU64::new(0),
            games_over: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us
                .store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    pub fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_received(&self, bytes: usize) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("wavefront_sessions_active", "Live sessions", "gauge",
            self.sessions_active.load(Ordering::Relaxed));
        metric!("wavefront_sessions_created_total", "Sessions created since start", "counter",
            self.sessions_created.load(Ordering::Relaxed));
        metric!("wavefront_players_active", "Players attached to a session", "gauge",
            self.players_active.load(Ordering::Relaxed));
        metric!("wavefront_waves_started_total", "Waves begun across all sessions", "counter",
            self.waves_started.load(Ordering::Relaxed));
        metric!("wavefront_games_over_total", "Sessions that reached game over", "counter",
            self.games_over.load(Ordering::Relaxed));

        metric!("wavefront_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("wavefront_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("wavefront_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("wavefront_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("wavefront_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        metric!("wavefront_connections_active", "Active WebTransport connections", "gauge",
            self.connections_active.load(Ordering::Relaxed));
        metric!("wavefront_messages_sent_total", "Total messages sent", "counter",
            self.messages_sent.load(Ordering::Relaxed));
        metric!("wavefront_messages_received_total", "Total messages received", "counter",
            self.messages_received.load(Ordering::Relaxed));
        metric!("wavefront_bytes_sent_total", "Total bytes sent", "counter",
            self.bytes_sent.load(Ordering::Relaxed));
        metric!("wavefront_bytes_received_total", "Total bytes received", "counter",
            self.bytes_received.load(Ordering::Relaxed));
        metric!("wavefront_messages_dropped_total", "Inbound messages rejected or undecodable", "counter",
            self.messages_dropped.load(Ordering::Relaxed));
        metric!("wavefront_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics
    pub fn to_json(&self) -> String {
        format!(r#"{{
  "sessions": {{
    "active": {},
    "created": {},
    "players": {},
    "waves_started": {},
    "games_over": {}
  }},
  "performance": {{
    "tick_time_us": {},
    "tick_time_p95_us": {},
    "tick_time_p99_us": {},
    "tick_time_max_us": {},
    "tick_count": {}
  }},
  "network": {{
    "connections": {},
    "messages_sent": {},
    "messages_received": {},
    "bytes_sent": {},
    "bytes_received": {},
    "messages_dropped": {}
  }},
  "uptime_seconds": {}
}}"#,
            self.sessions_active.load(Ordering::Relaxed),
            self.sessions_created.load(Ordering::Relaxed),
            self.players_active.load(Ordering::Relaxed),
            self.waves_started.load(Ordering::Relaxed),
            self.games_over.load(Ordering::Relaxed),
            self.tick_time_us.load(Ordering::Relaxed),
            self.tick_time_p95_us.load(Ordering::Relaxed),
            self.tick_time_p99_us.load(Ordering::Relaxed),
            self.tick_time_max_us.load(Ordering::Relaxed),
            self.tick_count.load(Ordering::Relaxed),
            self.connections_active.load(Ordering::Relaxed),
            self.messages_sent.load(Ordering::Relaxed),
            self.messages_received.load(Ordering::Relaxed),
            self.bytes_sent.load(Ordering::Relaxed),
            self.bytes_received.load(Ordering::Relaxed),
            self.messages_dropped.load(Ordering::Relaxed),
            self.uptime_seconds(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn http_response(content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        content_type,
        body.len(),
        body
    )
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);

                    // Longest prefix first
                    let response = if request.starts_with("GET /metrics/json")
                        || request.starts_with("GET /json")
                    {
                        http_response("application/json", &metrics.to_json())
                    } else if request.starts_with("GET /metrics") {
                        http_response("text/plain; version=0.0.4", &metrics.to_prometheus())
                    } else if request.starts_with("GET /health") || request.starts_with("GET / ") {
                        http_response("text/plain", "OK")
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    };

                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}
