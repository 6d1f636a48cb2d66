//! Directory reading operations.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;

/// Reads the immediate contents of a directory and returns them as [`FileEntry`] values.
///
/// Entries are sorted by name in case-sensitive byte order, so repeated
/// reads of an unchanged directory always produce the same sequence.
/// Entries whose metadata cannot be read are skipped with a warning.
///
/// # Errors
///
/// - [`CoreError::NotFound`]: the path does not exist.
/// - [`CoreError::NotADirectory`]: the path is not a directory.
/// - [`CoreError::PermissionDenied`]: read access is denied.
/// - [`CoreError::Io`]: any other I/O error.
///
/// # Examples
///
/// ```no_run
/// use aurex_core::read_directory;
/// use std::path::Path;
///
/// let entries = read_directory(Path::new("/games/nwn")).unwrap();
/// for entry in &entries {
///     println!("{}", entry.name());
/// }
/// ```
pub fn read_directory(path: &Path) -> CoreResult<Vec<FileEntry>> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CoreError::NotADirectory(path.to_path_buf()));
    }

    let mut entries = Vec::new();

    let read_dir = std::fs::read_dir(path).map_err(|e| CoreError::from_io(e, path))?;

    for dir_entry in read_dir {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry in {}: {e}", path.display());
                continue;
            }
        };
        let entry_path = dir_entry.path();
        // Follow symlinks so a linked game directory expands like a real one.
        let metadata = match std::fs::metadata(&entry_path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("skipping {}: {e}", entry_path.display());
                continue;
            }
        };
        entries.push(FileEntry::new(entry_path, &metadata));
    }

    entries.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(entries)
}

/// Resolves `relative` beneath `base`, matching each component without
/// regard to ASCII case when the exact spelling does not exist.
///
/// Both `/` and `\` separate components. Components with no match on disk
/// are appended verbatim, so the result can be handed to `File::open`
/// for a proper not-found error.
pub fn find_case_insensitive(base: &Path, relative: &str) -> PathBuf {
    let mut current = base.to_path_buf();
    for component in relative.split(['/', '\\']).filter(|c| !c.is_empty()) {
        let exact = current.join(component);
        if exact.exists() {
            current = exact;
            continue;
        }

        let matched = std::fs::read_dir(&current).ok().and_then(|entries| {
            entries
                .filter_map(|e| e.ok())
                .find(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(component))
                .map(|e| e.path())
        });
        current = matched.unwrap_or(exact);
    }
    current
}
