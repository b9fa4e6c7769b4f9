//! Local path resolution for remote repositories
//!
//! Maps a qualified name (`owner/name`) onto a directory under the
//! destination base path. Segments are lower-cased so that the same
//! repository never lands in two directories on case-sensitive and
//! case-insensitive filesystems.

use path_clean::PathClean;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve the local checkout path of `qualified_name`
///
/// With `omit_root_segment`, the first segment equal to the lower-cased
/// `target_qualifier` is dropped, so `MyOrg/Repo1` under `/repos` becomes
/// `/repos/repo1` instead of `/repos/myorg/repo1`. Only one occurrence is
/// removed: `myorg/myorg` still resolves to `/repos/myorg`.
///
/// Pure: no filesystem access, never fails.
pub fn resolve(
    qualified_name: &str,
    base_path: &Path,
    target_qualifier: &str,
    omit_root_segment: bool,
) -> PathBuf {
    let mut segments: Vec<String> = qualified_name
        .split('/')
        .map(|segment| segment.trim().to_lowercase())
        .collect();

    if omit_root_segment {
        let target = target_qualifier.to_lowercase();
        if let Some(pos) = segments.iter().position(|segment| *segment == target) {
            segments.remove(pos);
        }
    }

    let mut path = base_path.to_path_buf();
    for segment in &segments {
        path.push(segment);
    }

    path.clean()
}

/// Create every missing parent directory of `path`
///
/// Idempotent: succeeds when the directories already exist, including when
/// another worker created them concurrently.
pub fn ensure_parent_directories(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Hidden sibling a clone of `local_path` is staged in
///
/// A clone only appears at `local_path` once it has completed, so an
/// interrupted clone can never be mistaken for an existing checkout.
pub fn staging_path(local_path: &Path) -> PathBuf {
    let name = local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    local_path.with_file_name(format!(".{}.partial", name))
}
