//! Cache of opened archives and data files.
//!
//! The registry owns every opened handle for the lifetime of a resource
//! tree. Items refer to archives by [`ArchiveId`] only, so dropping the
//! registry is the single point where handles are released.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Archive, ArchiveOpener, ArchiveSource, DataFile};
use crate::error::{CoreResult, ResultExt};
use crate::fs::ops::find_case_insensitive;
use crate::types::{file_type_from_name, FileType};

/// Handle to an archive owned by an [`ArchiveRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveId(usize);

/// Handle to a data file owned by an [`ArchiveRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataFileId(usize);

/// Cache key for archives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArchiveKey {
    /// An archive file on disk, by path.
    File(PathBuf),
    /// An archive stored inside another archive, by its slot in that archive.
    /// Member names are not unique, so the logical path is not a key.
    Member { archive: ArchiveId, index: u32 },
}

/// Cache key for data files: the directory the referencing KEY lives in
/// plus the KEY's name for the file, lowercased with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataFileKey {
    dir: PathBuf,
    name: String,
}

impl DataFileKey {
    pub fn new(dir: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            dir: dir.into(),
            name: name.replace('\\', "/").to_ascii_lowercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Opened data files, addressed by [`DataFileId`].
#[derive(Default)]
pub struct DataFiles {
    files: Vec<Box<dyn DataFile>>,
}

impl DataFiles {
    pub fn get(&self, id: DataFileId) -> Option<&dyn DataFile> {
        self.files.get(id.0).map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn push(&mut self, file: Box<dyn DataFile>) -> DataFileId {
        self.files.push(file);
        DataFileId(self.files.len() - 1)
    }
}

/// Path- and key-indexed cache of opened archives and data files.
pub struct ArchiveRegistry {
    opener: Box<dyn ArchiveOpener>,
    archives: Vec<Box<dyn Archive>>,
    archive_index: HashMap<ArchiveKey, ArchiveId>,
    data_files: DataFiles,
    data_file_index: HashMap<DataFileKey, DataFileId>,
    case_insensitive: bool,
}

impl ArchiveRegistry {
    /// Creates an empty registry that opens archives with `opener`.
    pub fn new(opener: Box<dyn ArchiveOpener>) -> Self {
        Self {
            opener,
            archives: Vec::new(),
            archive_index: HashMap::new(),
            data_files: DataFiles::default(),
            data_file_index: HashMap::new(),
            case_insensitive: true,
        }
    }

    /// Controls whether KEY data file names are matched case-insensitively on disk.
    pub fn with_case_insensitive_lookup(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Returns the cached archive for `key`, opening it on first use.
    ///
    /// Data files named by the archive are opened and bound right after
    /// it is parsed; ones that fail to load are logged and left unbound.
    /// A failed open is not cached, so a later call retries.
    pub fn get_archive(
        &mut self,
        key: ArchiveKey,
        file_type: FileType,
        source: ArchiveSource,
    ) -> CoreResult<ArchiveId> {
        if let Some(id) = self.archive_index.get(&key) {
            tracing::debug!(?key, "archive cache hit");
            return Ok(*id);
        }

        let mut archive = self.opener.open_archive(file_type, source)?;
        if !archive.data_file_names().is_empty() {
            self.load_data_files(&key, archive.as_mut());
        }

        self.archives.push(archive);
        let id = ArchiveId(self.archives.len() - 1);
        tracing::debug!(?key, ?id, "opened archive");
        self.archive_index.insert(key, id);
        Ok(id)
    }

    /// Returns the cached data file for `key`, opening `path` on first use.
    pub fn get_data_file(
        &mut self,
        key: DataFileKey,
        file_type: FileType,
        path: &Path,
    ) -> CoreResult<DataFileId> {
        if let Some(id) = self.data_file_index.get(&key) {
            return Ok(*id);
        }

        let file = self
            .opener
            .open_data_file(file_type, ArchiveSource::File(path.to_path_buf()))?;
        let id = self.data_files.push(file);
        tracing::debug!(name = key.name(), path = %path.display(), "opened data file");
        self.data_file_index.insert(key, id);
        Ok(id)
    }

    pub fn archive(&self, id: ArchiveId) -> Option<&dyn Archive> {
        self.archives.get(id.0).map(|a| a.as_ref())
    }

    pub fn data_files(&self) -> &DataFiles {
        &self.data_files
    }

    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    pub fn data_file_count(&self) -> usize {
        self.data_files.len()
    }

    pub fn contains_archive(&self, key: &ArchiveKey) -> bool {
        self.archive_index.contains_key(key)
    }

    fn load_data_files(&mut self, key: &ArchiveKey, archive: &mut dyn Archive) {
        let base = match key {
            ArchiveKey::File(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
            ArchiveKey::Member { .. } => PathBuf::new(),
        };

        let names: Vec<String> = archive.data_file_names().to_vec();
        for (slot, name) in names.iter().enumerate() {
            let path = if self.case_insensitive {
                find_case_insensitive(&base, name)
            } else {
                base.join(name)
            };
            let data_key = DataFileKey::new(&base, name);
            let result = self
                .get_data_file(data_key, file_type_from_name(name), &path)
                .with_context(|| format!("failed to load KEY data file \"{name}\""));
            match result {
                Ok(id) => archive.bind_data_file(slot, id),
                Err(e) => tracing::warn!("{}", e.chain_message()),
            }
        }
    }
}

impl std::fmt::Debug for ArchiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveRegistry")
            .field("archives", &self.archive_index)
            .field("data_files", &self.data_file_index)
            .finish()
    }
}
