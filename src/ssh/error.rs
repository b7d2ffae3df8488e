//! SSH error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SshError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("SSH protocol error: {0}")]
    ProtocolError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Disconnected")]
    Disconnected,
}

impl From<russh::Error> for SshError {
    fn from(err: russh::Error) -> Self {
        SshError::ProtocolError(err.to_string())
    }
}

impl SshError {
    /// Map an SFTP protocol error onto the taxonomy, keeping the path
    /// in the message for not-found cases.
    pub fn from_sftp(err: russh_sftp::client::error::Error, path: &str) -> Self {
        let msg = err.to_string();
        if msg.contains("No such file") || msg.contains("not found") {
            SshError::FileNotFound(path.to_string())
        } else {
            SshError::ProtocolError(msg)
        }
    }
}
