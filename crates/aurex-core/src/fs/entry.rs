//! File entry representation.

use std::path::{Path, PathBuf};

use crate::types::{file_type_from_name, FileType, ResourceType};

/// A single file or directory found on disk, already classified.
///
/// `FileEntry` is immutable; create new instances via [`FileEntry::new`].
/// Directory sizes are reported as `None`.
///
/// # Examples
///
/// ```no_run
/// use aurex_core::FileEntry;
/// use std::fs;
///
/// let metadata = fs::metadata("chitin.key").unwrap();
/// let entry = FileEntry::new("chitin.key".into(), &metadata);
/// assert_eq!(entry.name(), "chitin.key");
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    name: String,
    size: Option<u64>,
    is_dir: bool,
    is_hidden: bool,
    file_type: FileType,
}

impl FileEntry {
    /// Creates a new `FileEntry` from a path and its metadata.
    ///
    /// Hidden files are detected by a leading `.` in the file name.
    /// Directories always classify as [`FileType::None`].
    pub fn new(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| crate::nfc_string(&n.to_string_lossy()))
            .unwrap_or_default();
        let is_hidden = name.starts_with('.');
        let is_dir = metadata.is_dir();
        let file_type = if is_dir {
            FileType::None
        } else {
            file_type_from_name(&name)
        };

        Self {
            path,
            name,
            size: if is_dir { None } else { Some(metadata.len()) },
            is_dir,
            is_hidden,
            file_type,
        }
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file or directory name (last component of the path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file size in bytes, or `None` for directories.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn resource_type(&self) -> ResourceType {
        self.file_type.resource_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn file_entry_from_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("test.txt");
        fs::write(&file_path, "hello").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path.clone(), &metadata);

        assert_eq!(entry.name(), "test.txt");
        assert_eq!(entry.size(), Some(5));
        assert!(!entry.is_dir());
        assert!(!entry.is_hidden());
        assert_eq!(entry.path(), file_path);
        assert_eq!(entry.file_type(), FileType::Txt);
        assert_eq!(entry.resource_type(), ResourceType::None);
    }

    #[test]
    fn file_entry_from_directory() {
        let tmp = TempDir::new().unwrap();
        let dir_path = tmp.path().join("override.tga");
        fs::create_dir(&dir_path).unwrap();

        let metadata = fs::metadata(&dir_path).unwrap();
        let entry = FileEntry::new(dir_path, &metadata);

        assert!(entry.is_dir());
        assert_eq!(entry.size(), None);
        assert_eq!(entry.file_type(), FileType::None, "directories are never typed");
    }

    #[test]
    fn file_entry_classifies_archives() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("Chitin.KEY");
        fs::write(&file_path, b"KEY V1  ").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path, &metadata);

        assert_eq!(entry.file_type(), FileType::Key);
    }

    #[test]
    fn file_entry_hidden_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join(".hidden");
        fs::write(&file_path, "secret").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path, &metadata);

        assert!(entry.is_hidden());
        assert_eq!(entry.name(), ".hidden");
        assert_eq!(entry.file_type(), FileType::None);
    }

    #[test]
    fn file_entry_unicode_name() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("한글파일.txt");
        fs::write(&file_path, "내용").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path, &metadata);

        assert_eq!(entry.name(), "한글파일.txt");
    }

    #[test]
    fn file_entry_empty_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("empty.wav");
        fs::write(&file_path, "").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = FileEntry::new(file_path, &metadata);

        assert_eq!(entry.size(), Some(0));
        assert_eq!(entry.resource_type(), ResourceType::Sound);
    }
}
