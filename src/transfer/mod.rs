//! Remote-to-local album transfer: listing parse and recursive pull.

pub mod listing;
pub mod pull;

use std::path::Path;

use crate::ssh::SshError;

pub use pull::{pull_album, MAX_COPY_DEPTH};

/// What a remote path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    File,
    Directory,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Minimal remote filesystem surface needed by the pull routine.
///
/// Implemented over SFTP in `ssh::session`; tests substitute an
/// in-memory fake to exercise the recursion and failure policy.
pub trait RemoteFs {
    fn stat(&self, path: &str) -> impl std::future::Future<Output = Result<RemoteKind, SshError>>;

    fn read_dir(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<RemoteEntry>, SshError>>;

    /// Copy one remote file to a local destination path.
    fn fetch(
        &self,
        remote: &str,
        local: &Path,
    ) -> impl std::future::Future<Output = Result<(), SshError>>;
}

/// Join remote path components; remote paths always use `/`.
pub fn join_remote_path(base: &str, component: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_remote_path_handles_trailing_slash() {
        assert_eq!(join_remote_path("/music", "Album"), "/music/Album");
        assert_eq!(join_remote_path("/music/", "Album"), "/music/Album");
    }
}
