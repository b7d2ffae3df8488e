//! Local album discovery.

use tracing::debug;
use walkdir::WalkDir;

/// Directory nesting levels searched below each library root.
pub const MAX_SCAN_DEPTH: usize = 3;

/// Collect album names under the given roots.
///
/// Every directory down to [`MAX_SCAN_DEPTH`] levels counts as an album,
/// identified by its base name. Order is depth-first discovery order.
/// Unreadable or vanished directories contribute nothing and do not
/// stop the scan of their siblings.
pub fn scan(roots: &[String]) -> Vec<String> {
    let mut albums = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(MAX_SCAN_DEPTH)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", root, e);
                    None
                }
            })
        {
            if entry.file_type().is_dir() {
                albums.push(entry.file_name().to_string_lossy().to_string());
            }
        }
    }

    albums
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn mkdirs(base: &std::path::Path, rel: &str) {
        fs::create_dir_all(base.join(rel)).unwrap();
    }

    #[test]
    fn records_directories_down_to_depth_three() {
        let dir = tempfile::tempdir().unwrap();
        mkdirs(dir.path(), "artist/album/disc1/deep/deeper");
        fs::write(dir.path().join("artist/notes.txt"), "x").unwrap();

        let albums = scan(&[dir.path().to_string_lossy().to_string()]);

        assert_eq!(albums, vec!["artist", "album", "disc1"]);
    }

    #[test]
    fn depth_first_parent_precedes_children() {
        let dir = tempfile::tempdir().unwrap();
        mkdirs(dir.path(), "a/nested");
        mkdirs(dir.path(), "b");

        let albums = scan(&[dir.path().to_string_lossy().to_string()]);

        assert_eq!(albums.len(), 3);
        let a = albums.iter().position(|n| n == "a").unwrap();
        let nested = albums.iter().position(|n| n == "nested").unwrap();
        assert!(a < nested);
    }

    #[test]
    fn missing_root_yields_nothing_and_other_roots_continue() {
        let dir = tempfile::tempdir().unwrap();
        mkdirs(dir.path(), "album");

        let albums = scan(&[
            "/nonexistent/media/mover/root".to_string(),
            dir.path().to_string_lossy().to_string(),
        ]);

        assert_eq!(albums, vec!["album"]);
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_directory_is_skipped_and_siblings_survive() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        mkdirs(dir.path(), "locked/secret");
        mkdirs(dir.path(), "open");

        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Privileged users bypass permission bits; nothing to observe.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let albums = scan(&[dir.path().to_string_lossy().to_string()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(albums.contains(&"locked".to_string()));
        assert!(!albums.contains(&"secret".to_string()));
        assert!(albums.contains(&"open".to_string()));
    }

    #[test]
    fn non_directories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stray.mp3"), "x").unwrap();

        let albums = scan(&[dir.path().to_string_lossy().to_string()]);
        assert!(albums.is_empty());
    }

    #[test]
    fn empty_roots_scan_to_empty() {
        assert!(scan(&[]).is_empty());
    }
}
