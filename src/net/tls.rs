use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::digest::{digest, SHA256};
use std::path::Path;
use tracing::{info, warn};
use wtransport::Identity;

// Dev certificate paths
const DEV_CERT_FILE: &str = "certs/cert.pem";
const DEV_KEY_FILE: &str = "certs/key.pem";

/// Names the generated certificate is valid for
const SELF_SIGNED_NAMES: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// TLS configuration for the WebTransport endpoint
pub struct TlsConfig {
    /// The wtransport Identity containing certificate and key
    pub identity: Identity,
    /// Base64-encoded SHA-256 hash of the certificate (for browser pinning)
    pub cert_hash: String,
}

impl TlsConfig {
    /// Load the TLS identity
    ///
    /// Explicit paths win, then `certs/*.pem`, then a freshly generated
    /// self-signed certificate for local development.
    pub async fn load(cert_path: Option<&str>, key_path: Option<&str>) -> Result<Self> {
        if let (Some(cert), Some(key)) = (cert_path, key_path) {
            info!("Loading TLS certificate from {}", cert);
            return Self::load_from_paths(cert, key).await;
        }

        if Path::new(DEV_CERT_FILE).exists() && Path::new(DEV_KEY_FILE).exists() {
            info!("Loading dev certificate from certs/");
            return Self::load_from_paths(DEV_CERT_FILE, DEV_KEY_FILE).await;
        }

        warn!("No TLS certificate configured, generating a self-signed one");
        Self::generate_self_signed()
    }

    /// Load certificate from PEM file paths
    async fn load_from_paths(cert_path: &str, key_path: &str) -> Result<Self> {
        let identity = Identity::load_pemfiles(cert_path, key_path)
            .await
            .context("Failed to load certificate from PEM files")?;
        Ok(Self::from_identity(identity))
    }

    /// Generate a short-lived self-signed certificate for localhost
    pub fn generate_self_signed() -> Result<Self> {
        let identity = Identity::self_signed(SELF_SIGNED_NAMES)
            .map_err(|e| anyhow!("Failed to generate self-signed certificate: {e:?}"))?;
        Ok(Self::from_identity(identity))
    }

    fn from_identity(identity: Identity) -> Self {
        let cert_hash = Self::compute_cert_hash(&identity);
        Self::log_cert_info(&cert_hash);
        Self {
            identity,
            cert_hash,
        }
    }

    fn compute_cert_hash(identity: &Identity) -> String {
        identity
            .certificate_chain()
            .as_slice()
            .first()
            .map(|cert| {
                let hash = digest(&SHA256, cert.der());
                STANDARD.encode(hash.as_ref())
            })
            .unwrap_or_default()
    }

    fn log_cert_info(cert_hash: &str) {
        info!("Certificate hash: {}", cert_hash);
        info!(
            "Chrome flag: --ignore-certificate-errors-spki-list={}",
            cert_hash
        );
    }

    /// Get the certificate hash for client configuration
    pub fn cert_hash(&self) -> &str {
        &self.cert_hash
    }
}
