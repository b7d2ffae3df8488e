//! One live SSH + SFTP session per remote site.

use std::path::Path;
use std::time::Duration;

use russh::client::Handle;
use russh::{ChannelMsg, Disconnect};
use russh_sftp::client::SftpSession;
use tracing::{debug, info};

use super::client::{open_transport, ClientHandler, Endpoint};
use super::error::SshError;
use crate::transfer::{self, RemoteEntry, RemoteFs, RemoteKind};

/// Timeout for the remote listing command.
const LIST_TIMEOUT: Duration = Duration::from_secs(60);

/// Supplies a password when authentication needs one interactively.
/// Returning `None` cancels the connection attempt.
pub trait CredentialPrompt {
    fn password(&mut self, endpoint: &Endpoint, failure: &str) -> Option<String>;
}

/// A connection to one remote site: SSH transport plus an SFTP
/// subsystem channel derived from it.
///
/// Lives for the rest of the process once connected; it is only torn
/// down by an explicit [`RemoteSession::disconnect`] at shutdown, never
/// on a transfer error.
pub struct RemoteSession {
    endpoint: Endpoint,
    password: Option<String>,
    handle: Option<Handle<ClientHandler>>,
    sftp: Option<SftpSession>,
}

impl RemoteSession {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            password: None,
            handle: None,
            sftp: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Connect and authenticate; a no-op when already connected.
    ///
    /// Without a stored password the first attempt goes out as `none`
    /// authentication. On rejection the prompt is asked for a password
    /// and the attempt repeats, until success or the prompt cancels. A
    /// password that was already stored before the call fails fatally
    /// on rejection instead of re-prompting.
    pub async fn connect<P: CredentialPrompt>(&mut self, prompt: &mut P) -> Result<(), SshError> {
        if self.is_connected() {
            return Ok(());
        }

        let mut prompted = false;
        let handle = loop {
            match open_transport(&self.endpoint, self.password.as_deref()).await {
                Ok(handle) => break handle,
                Err(SshError::AuthenticationFailed(msg)) => {
                    if self.password.is_some() && !prompted {
                        return Err(SshError::AuthenticationFailed(format!(
                            "password authentication failed: {}",
                            msg
                        )));
                    }
                    match prompt.password(&self.endpoint, &msg) {
                        Some(password) => {
                            self.password = Some(password);
                            prompted = true;
                        }
                        None => {
                            return Err(SshError::AuthenticationFailed(
                                "password entry cancelled".to_string(),
                            ))
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        };

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| SshError::ChannelError(format!("SFTP subsystem: {}", e)))?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SshError::ChannelError(format!("SFTP subsystem: {}", e)))?;

        info!("Session established for {}", self.endpoint.label());
        self.handle = Some(handle);
        self.sftp = Some(sftp);
        Ok(())
    }

    /// Close the SFTP channel and the transport. Safe to call when
    /// already disconnected.
    pub async fn disconnect(&mut self) {
        // Dropping the SFTP session closes its channel.
        self.sftp.take();
        if let Some(handle) = self.handle.take() {
            debug!("Disconnecting from {}", self.endpoint.label());
            let _ = handle
                .disconnect(Disconnect::ByApplication, "Session closed", "en")
                .await;
        }
    }

    /// Run `ls -1` over all remote roots in one round trip and parse
    /// the output into an album -> source directory map. Stderr lines
    /// are returned for the caller to report; they never abort the
    /// listing.
    pub async fn list_albums(
        &mut self,
        roots: &[String],
    ) -> Result<(std::collections::HashMap<String, String>, Vec<String>), SshError> {
        let handle = self.handle.as_ref().ok_or(SshError::Disconnected)?;
        let command = format!("ls -1 {}", roots.join(" "));
        debug!("Running remote listing: {}", command);

        let mut channel = handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))?;
        channel
            .exec(true, command.as_str())
            .await
            .map_err(|e| SshError::ChannelError(format!("exec failed: {}", e)))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        tokio::time::timeout(LIST_TIMEOUT, async {
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Data { data }) => stdout.extend_from_slice(&data),
                    Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                        stderr.extend_from_slice(&data)
                    }
                    Some(ChannelMsg::ExitStatus { exit_status }) => {
                        debug!("Listing command exited with {}", exit_status);
                    }
                    Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => break,
                    _ => {}
                }
            }
        })
        .await
        .map_err(|_| SshError::Timeout("remote listing timed out".to_string()))?;

        let stdout = String::from_utf8_lossy(&stdout);
        let albums = transfer::listing::parse(stdout.lines(), roots);
        let errors = String::from_utf8_lossy(&stderr)
            .lines()
            .map(|l| l.trim_end().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        Ok((albums, errors))
    }

    /// Pull one album into the local save directory. See
    /// [`transfer::pull_album`] for the copy and failure policy.
    pub async fn pull_album(
        &mut self,
        remote_dir: &str,
        album: &str,
        save_dir: &str,
    ) -> Result<Vec<String>, SshError> {
        let sftp = self.sftp.as_ref().ok_or(SshError::Disconnected)?;
        transfer::pull_album(&SftpRemote { sftp }, remote_dir, album, save_dir).await
    }
}

/// [`RemoteFs`] over a live SFTP session.
struct SftpRemote<'a> {
    sftp: &'a SftpSession,
}

impl RemoteFs for SftpRemote<'_> {
    async fn stat(&self, path: &str) -> Result<RemoteKind, SshError> {
        let attrs = self
            .sftp
            .metadata(path)
            .await
            .map_err(|e| SshError::from_sftp(e, path))?;
        if attrs.is_dir() {
            Ok(RemoteKind::Directory)
        } else {
            Ok(RemoteKind::File)
        }
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, SshError> {
        let read_dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| SshError::from_sftp(e, path))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }
            let is_dir = entry.metadata().is_dir();
            entries.push(RemoteEntry { name, is_dir });
        }
        Ok(entries)
    }

    async fn fetch(&self, remote: &str, local: &Path) -> Result<(), SshError> {
        let content = self
            .sftp
            .read(remote)
            .await
            .map_err(|e| SshError::from_sftp(e, remote))?;
        tokio::fs::write(local, &content)
            .await
            .map_err(SshError::IoError)?;
        debug!("Copied {} ({} bytes)", remote, content.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_on_disconnected_session_fails() {
        let mut session = RemoteSession::new(Endpoint {
            hostname: "music.example.com".to_string(),
            port: 22,
            username: "dan".to_string(),
        });
        let result = session.list_albums(&["/music".to_string()]).await;
        assert!(matches!(result, Err(SshError::Disconnected)));
    }

    #[tokio::test]
    async fn pull_on_disconnected_session_fails() {
        let mut session = RemoteSession::new(Endpoint {
            hostname: "music.example.com".to_string(),
            port: 22,
            username: "dan".to_string(),
        });
        let result = session.pull_album("/music", "Album", "/tmp").await;
        assert!(matches!(result, Err(SshError::Disconnected)));
    }

    #[tokio::test]
    async fn disconnect_when_never_connected_is_a_noop() {
        let mut session = RemoteSession::new(Endpoint {
            hostname: "music.example.com".to_string(),
            port: 22,
            username: "dan".to_string(),
        });
        assert!(!session.is_connected());
        session.disconnect().await;
        assert!(!session.is_connected());
    }
}
