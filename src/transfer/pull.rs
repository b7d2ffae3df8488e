//! Recursive remote-to-local album copy.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{join_remote_path, RemoteFs, RemoteKind};
use crate::ssh::SshError;

/// Directory nesting levels copied below an album directory. Matches
/// the local scanner's depth policy.
pub const MAX_COPY_DEPTH: usize = 3;

/// Pull one album from `remote_dir` into `save_dir`.
///
/// A directory album is copied recursively (truncated at
/// [`MAX_COPY_DEPTH`]); a plain file is copied directly. Returns the
/// per-child failures encountered inside a directory copy - those do
/// not fail the album. An `Err` means the album itself could not be
/// transferred (stat failed, or its top-level copy aborted).
pub async fn pull_album<F: RemoteFs>(
    fs: &F,
    remote_dir: &str,
    album: &str,
    save_dir: &str,
) -> Result<Vec<String>, SshError> {
    let target = join_remote_path(remote_dir, album);
    let dest = PathBuf::from(save_dir.trim_end_matches('/')).join(album);
    debug!("Pulling {} -> {}", target, dest.display());

    let mut failures = Vec::new();
    match fs.stat(&target).await? {
        RemoteKind::Directory => copy_dir(fs, &target, &dest, 0, &mut failures).await?,
        RemoteKind::File => fs.fetch(&target, &dest).await?,
    }
    Ok(failures)
}

/// Copy the contents of `remote_dir` into a freshly created `dest`.
///
/// Failure to create `dest` or to list `remote_dir` aborts this subtree
/// with an error; a failing child is recorded in `failures` and its
/// siblings are still attempted.
async fn copy_dir<F: RemoteFs>(
    fs: &F,
    remote_dir: &str,
    dest: &Path,
    depth: usize,
    failures: &mut Vec<String>,
) -> Result<(), SshError> {
    if depth >= MAX_COPY_DEPTH {
        debug!("Depth limit reached, not descending into {}", remote_dir);
        return Ok(());
    }

    tokio::fs::create_dir(dest).await.map_err(|e| {
        SshError::IoError(std::io::Error::new(
            e.kind(),
            format!("failed to create {}: {}", dest.display(), e),
        ))
    })?;

    for entry in fs.read_dir(remote_dir).await? {
        let child_remote = join_remote_path(remote_dir, &entry.name);
        let child_dest = dest.join(&entry.name);

        let result = if entry.is_dir {
            Box::pin(copy_dir(fs, &child_remote, &child_dest, depth + 1, failures)).await
        } else {
            fs.fetch(&child_remote, &child_dest).await
        };

        if let Err(e) = result {
            warn!("Failed to copy {}: {}", child_remote, e);
            failures.push(format!("Failed to copy {}: {}", child_remote, e));
        }
    }

    Ok(())
}
