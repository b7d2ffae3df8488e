//! Parser for the remote `ls -1 <dir>...` listing.
//!
//! Listing multiple directories interleaves a header line per directory
//! (`/path/to/dir:`) with the entries inside it. A single-directory
//! listing has no header at all, so entries seen before any header are
//! attributed to the first queried root.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static DIR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\w").expect("directory header pattern"));

/// Parse listing lines into a map of album name -> containing remote
/// directory. A later duplicate album name overwrites the earlier one.
pub fn parse<S: AsRef<str>>(
    lines: impl IntoIterator<Item = S>,
    roots: &[String],
) -> HashMap<String, String> {
    let mut cursor = roots.first().cloned().unwrap_or_default();
    let mut albums = HashMap::new();

    for line in lines {
        let line = line.as_ref().trim_end();
        if line.is_empty() {
            continue;
        }
        if DIR_HEADER.is_match(line) {
            cursor = line.trim_end_matches(':').to_string();
            continue;
        }
        albums.insert(line.to_string(), cursor.clone());
    }

    albums
}
