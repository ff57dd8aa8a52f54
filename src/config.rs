use std::net::{IpAddr, Ipv4Addr};

use crate::game::constants::tick;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: IpAddr,
    /// Port to listen on (UDP, WebTransport)
    pub port: u16,
    /// Milliseconds between session ticks
    pub tick_rate_ms: u64,
    /// Port for the HTTP metrics endpoint
    pub metrics_port: u16,
    /// Path to TLS certificate file (if not using the bundled or self-signed one)
    pub tls_cert_path: Option<String>,
    /// Path to TLS key file
    pub tls_key_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5000,
            tick_rate_ms: tick::RATE_MS,
            metrics_port: 9090,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load config from an arbitrary key lookup, falling back to defaults on
    /// missing or malformed values
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(parsed) if parsed > 0 => config.port = parsed,
                Ok(_) => tracing::warn!("PORT must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid PORT '{}', using default", port),
            }
        }

        if let Some(rate) = lookup("TICK_RATE_MS") {
            match rate.parse::<u64>() {
                Ok(parsed) if (1..=1000).contains(&parsed) => config.tick_rate_ms = parsed,
                Ok(_) => tracing::warn!("TICK_RATE_MS must be 1-1000, using default"),
                Err(_) => tracing::warn!("Invalid TICK_RATE_MS '{}', using default", rate),
            }
        }

        if let Some(port) = lookup("METRICS_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) if parsed > 0 => config.metrics_port = parsed,
                Ok(_) => tracing::warn!("METRICS_PORT must be > 0, using default"),
                Err(_) => tracing::warn!("Invalid METRICS_PORT '{}', using default", port),
            }
        }

        if let Some(cert_path) = lookup("TLS_CERT_PATH") {
            config.tls_cert_path = Some(cert_path);
        }

        if let Some(key_path) = lookup("TLS_KEY_PATH") {
            config.tls_key_path = Some(key_path);
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.metrics_port == 0 {
            return Err("Metrics port cannot be 0".to_string());
        }
        if !(1..=1000).contains(&self.tick_rate_ms) {
            return Err("tick_rate_ms must be between 1 and 1000".to_string());
        }
        if self.tls_cert_path.is_some() != self.tls_key_path.is_some() {
            return Err("TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string());
        }
        Ok(())
    }
}
