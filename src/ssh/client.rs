//! SSH transport establishment using russh.

use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use russh::client;
use russh::keys::PublicKey;
use tracing::{debug, info, warn};

use super::error::SshError;
use super::known_hosts::{get_known_hosts, HostKeyCheck};

/// Connect timeout; the original tool had none and would hang on a dead
/// host, so one is imposed here.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identity of one remote endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub hostname: String,
    pub port: u16,
    pub username: String,
}

impl Endpoint {
    pub fn label(&self) -> String {
        format!("{}@{}:{}", self.username, self.hostname, self.port)
    }
}

/// Open a transport to `endpoint` and authenticate.
///
/// With a password, password authentication is attempted; without one,
/// a `none` authentication request is sent (covers hosts that allow it),
/// and rejection surfaces as `AuthenticationFailed` so the caller can
/// prompt for a password and retry.
pub(crate) async fn open_transport(
    endpoint: &Endpoint,
    password: Option<&str>,
) -> Result<client::Handle<ClientHandler>, SshError> {
    let addr = format!("{}:{}", endpoint.hostname, endpoint.port);
    info!("Connecting to {}", addr);

    let socket_addr = addr
        .to_socket_addrs()
        .map_err(|e| SshError::ConnectionFailed(format!("failed to resolve {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| SshError::ConnectionFailed(format!("no address found for {}", addr)))?;

    let config = client::Config {
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    };

    let handler = ClientHandler::new(endpoint.hostname.clone(), endpoint.port);

    let mut handle = tokio::time::timeout(
        CONNECT_TIMEOUT,
        client::connect(Arc::new(config), socket_addr, handler),
    )
    .await
    .map_err(|_| SshError::Timeout(format!("connection to {} timed out", addr)))?
    .map_err(|e| SshError::ConnectionFailed(e.to_string()))?;

    debug!("SSH handshake completed for {}", addr);

    let auth = match password {
        Some(password) => handle
            .authenticate_password(&endpoint.username, password)
            .await
            .map_err(|e| SshError::AuthenticationFailed(e.to_string()))?,
        None => handle
            .authenticate_none(&endpoint.username)
            .await
            .map_err(|e| SshError::AuthenticationFailed(e.to_string()))?,
    };

    if !auth.success() {
        return Err(SshError::AuthenticationFailed(
            "rejected by server".to_string(),
        ));
    }

    info!("Authenticated as {} on {}", endpoint.username, addr);
    Ok(handle)
}

/// russh callback handler: verifies the server key against known_hosts.
///
/// Unknown keys are accepted and appended (the tool predates per-key
/// confirmation prompts); changed keys are always rejected.
pub struct ClientHandler {
    host: String,
    port: u16,
}

impl ClientHandler {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }
}

impl client::Handler for ClientHandler {
    type Error = SshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let known_hosts = get_known_hosts();
        match known_hosts.verify(&self.host, self.port, server_public_key) {
            HostKeyCheck::Verified => {
                info!("Host key verified for {}:{}", self.host, self.port);
                Ok(true)
            }
            HostKeyCheck::Unknown { fingerprint } => {
                info!(
                    "New host {}:{}, adding to known_hosts (fingerprint: {})",
                    self.host, self.port, fingerprint
                );
                if let Err(e) = known_hosts.add_host(&self.host, self.port, server_public_key) {
                    warn!("Failed to save host key: {}", e);
                }
                Ok(true)
            }
            HostKeyCheck::Changed {
                expected_fingerprint,
                actual_fingerprint,
            } => Err(SshError::ConnectionFailed(format!(
                "host key for {}:{} has changed (expected {}, got {}); \
                 possible MITM, remove the old key from ~/.ssh/known_hosts if legitimate",
                self.host, self.port, expected_fingerprint, actual_fingerprint
            ))),
        }
    }
}
