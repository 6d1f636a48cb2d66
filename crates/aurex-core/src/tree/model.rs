//! The lazily populated resource tree.
//!
//! [`ResourceTree`] owns every [`Item`] in an arena and is the only thing
//! that changes the tree's shape. Directories and archives are scanned
//! the first time a view asks for their children ([`ResourceTree::fetch_more`]);
//! opened archives stay in the tree's [`ArchiveRegistry`] until the tree
//! is dropped.
//!
//! The addressing methods (`index`, `parent`, `row_count`, `has_children`)
//! follow the usual item-model contract: `None` as a parent means the
//! invisible top level, whose rows are the root directory's children.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::{
    ArchiveKey, ArchiveOpener, ArchiveRegistry, ArchiveSource, AuroraOpener,
};
use crate::config::settings::Config;
use crate::error::{CoreError, CoreResult, ResultExt};
use crate::fs::ops::read_directory;
use crate::sound::{AudioDecoder, SoundSniffer};
use crate::tree::item::{Expansion, Item, ItemRef, NodeId, Source};

/// Behaviour switches for a [`ResourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Include entries whose name starts with `.`.
    pub show_hidden: bool,
    /// Offer archive files as expandable nodes.
    pub expand_archives: bool,
    /// Match KEY data file names against the disk without regard to case.
    pub case_insensitive_lookup: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            show_hidden: true,
            expand_archives: true,
            case_insensitive_lookup: true,
        }
    }
}

impl TreeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            show_hidden: config.tree.show_hidden,
            expand_archives: config.archives.expand,
            case_insensitive_lookup: config.archives.case_insensitive_lookup,
        }
    }
}

/// The pluggable parts of a tree.
pub struct Backends {
    pub opener: Box<dyn ArchiveOpener>,
    pub audio: Box<dyn AudioDecoder>,
    pub options: TreeOptions,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            opener: Box::new(AuroraOpener),
            audio: Box::new(SoundSniffer),
            options: TreeOptions::default(),
        }
    }
}

/// A resource tree rooted at one directory.
///
/// Opening a different root means building a new tree; dropping a tree
/// releases every item and every archive it opened.
pub struct ResourceTree {
    // Field order is drop order: items go before the archives they index.
    nodes: Vec<Item>,
    root: NodeId,
    registry: ArchiveRegistry,
    audio: Box<dyn AudioDecoder>,
    options: TreeOptions,
}

impl std::fmt::Debug for ResourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTree")
            .field("root", &self.root_path())
            .field("nodes", &self.nodes.len())
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}

impl ResourceTree {
    /// Opens `root` with the built-in archive readers and sound sniffer.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] or [`CoreError::NotADirectory`] if `root` is
    /// not a directory, or any error from listing it.
    pub fn open(root: &Path) -> CoreResult<Self> {
        Self::open_with(root, Backends::default())
    }

    /// Opens `root` with caller-supplied backends.
    ///
    /// The root's immediate entries are listed before this returns.
    pub fn open_with(root: &Path, backends: Backends) -> CoreResult<Self> {
        let Backends {
            opener,
            audio,
            options,
        } = backends;

        let mut tree = Self {
            nodes: vec![Item::root(root)],
            root: NodeId(0),
            registry: ArchiveRegistry::new(opener)
                .with_case_insensitive_lookup(options.case_insensitive_lookup),
            audio,
            options,
        };
        let count = tree.fetch_more(tree.root)?;
        tracing::debug!(root = %root.display(), count, "opened resource tree");
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        self.nodes[self.root.0].path()
    }

    pub fn options(&self) -> TreeOptions {
        self.options
    }

    pub fn registry(&self) -> &ArchiveRegistry {
        &self.registry
    }

    pub(crate) fn audio(&self) -> &dyn AudioDecoder {
        self.audio.as_ref()
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Item> {
        self.nodes.get(id.0)
    }

    /// Total number of items loaded so far, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A view of item `id`, or `None` if the id is not from this tree.
    pub fn item(&self, id: NodeId) -> Option<ItemRef<'_>> {
        self.node(id).map(|item| ItemRef::new(self, id, item))
    }

    /// `true` while `id` is a directory or archive whose children have not
    /// been loaded yet.
    pub fn can_fetch_more(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|item| item.expansion == Expansion::Unexpanded)
    }

    /// Loads the children of `id` and returns how many were added.
    ///
    /// Items are expanded at most once; later calls return `Ok(0)`. When
    /// listing a directory or opening an archive fails the item stays
    /// unexpanded, so the call can be retried.
    pub fn fetch_more(&mut self, id: NodeId) -> CoreResult<usize> {
        let Some(item) = self.node(id) else {
            return Ok(0);
        };
        if item.expansion != Expansion::Unexpanded {
            return Ok(0);
        }

        let children = match item.source() {
            Source::Directory => self.scan_directory(id)?,
            Source::File | Source::ArchiveMember { .. } => self.scan_archive(id)?,
        };

        let count = children.len();
        let first = self.nodes.len();
        self.nodes.extend(children);
        let item = &mut self.nodes[id.0];
        item.children = (first..first + count).map(NodeId).collect();
        item.expansion = Expansion::Expanded;
        tracing::debug!(path = %item.path().display(), count, "fetched children");
        Ok(count)
    }

    fn scan_directory(&self, id: NodeId) -> CoreResult<Vec<Item>> {
        let path = self.nodes[id.0].path();
        let entries = read_directory(path)?;
        Ok(entries
            .iter()
            .filter(|entry| self.options.show_hidden || !entry.is_hidden())
            .map(|entry| Item::from_entry(entry, Some(id), self.options.expand_archives))
            .collect())
    }

    fn scan_archive(&mut self, id: NodeId) -> CoreResult<Vec<Item>> {
        let item = &self.nodes[id.0];
        let name = item.name().to_string();
        let path = item.path().to_path_buf();
        let file_type = item.file_type();

        let (key, source) = match item.source() {
            Source::File => (ArchiveKey::File(path.clone()), ArchiveSource::File(path.clone())),
            Source::ArchiveMember { archive, index } => {
                let bytes = self.member_bytes(id)?;
                (ArchiveKey::Member { archive, index }, ArchiveSource::Memory(bytes))
            }
            Source::Directory => {
                return Err(CoreError::UnsupportedOperation(
                    "directories are not archives".to_string(),
                ))
            }
        };

        let archive_id = self
            .registry
            .get_archive(key, file_type, source)
            .with_context(|| format!("failed to open archive \"{name}\""))?;
        let archive = self.registry.archive(archive_id).ok_or(CoreError::NoArchive)?;
        let data_files = self.registry.data_files();

        Ok(archive
            .members()
            .iter()
            .map(|member| {
                let size = match archive.resource_size(member.index, data_files) {
                    Ok(size) => Some(size),
                    Err(e) => {
                        tracing::debug!("unknown size for {}: {e}", member.name);
                        None
                    }
                };
                Item::from_member(
                    archive_id,
                    &path,
                    member,
                    size,
                    Some(id),
                    self.options.expand_archives,
                )
            })
            .collect())
    }

    /// Reads a nested archive member fully into memory.
    fn member_bytes(&self, id: NodeId) -> CoreResult<Arc<[u8]>> {
        let mut stream = ItemRef::new(self, id, &self.nodes[id.0]).resource_data()?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(bytes.into())
    }

    /// The child at `row` of `parent` (the root when `None`).
    ///
    /// Only column 0 exists.
    pub fn index(&self, row: usize, column: usize, parent: Option<NodeId>) -> Option<NodeId> {
        if column != 0 {
            return None;
        }
        let parent = parent.unwrap_or(self.root);
        self.node(parent)?.children.get(row).copied()
    }

    /// The parent of `id`, or `None` for top-level rows and the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent.filter(|&parent| parent != self.root)
    }

    /// Number of loaded children of `parent` (the root when `None`).
    pub fn row_count(&self, parent: Option<NodeId>) -> usize {
        self.node(parent.unwrap_or(self.root))
            .map_or(0, |item| item.children.len())
    }

    pub fn column_count(&self) -> usize {
        1
    }

    /// Whether `parent` (the root when `None`) has or may have children.
    pub fn has_children(&self, parent: Option<NodeId>) -> bool {
        self.item(parent.unwrap_or(self.root))
            .is_some_and(|item| item.has_children())
    }

    /// Follows a `/`-separated path of item names from the root, loading
    /// children on the way.
    ///
    /// Names are matched exactly first, then without regard to ASCII case.
    pub fn resolve(&mut self, relative: &str) -> CoreResult<NodeId> {
        let mut current = self.root;
        for component in relative.split(['/', '\\']).filter(|c| !c.is_empty()) {
            self.fetch_more(current)?;
            let children = &self.nodes[current.0].children;
            let find = |exact: bool| {
                children.iter().copied().find(|&child| {
                    let name = self.nodes[child.0].name();
                    if exact {
                        name == component
                    } else {
                        name.eq_ignore_ascii_case(component)
                    }
                })
            };
            current = find(true)
                .or_else(|| find(false))
                .ok_or_else(|| CoreError::NotFound(self.root_path().join(relative)))?;
        }
        Ok(current)
    }

    /// Number of ancestors between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).and_then(|item| item.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent).and_then(|item| item.parent);
        }
        depth
    }

    /// Loaded descendants of `id` in depth-first order, `id` excluded.
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(id)
            .map(|item| item.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(item) = self.node(next) {
                stack.extend(item.children.iter().rev().copied());
            }
        }
        out
    }

    /// Expands `id` and its descendants down to `max_depth` levels below it.
    ///
    /// Items that fail to expand are skipped; their errors are returned
    /// alongside the paths that caused them.
    pub fn fetch_recursive(&mut self, id: NodeId, max_depth: usize) -> Vec<(PathBuf, CoreError)> {
        let mut errors = Vec::new();
        let mut pending = vec![(id, 0)];
        while let Some((next, level)) = pending.pop() {
            if level >= max_depth {
                continue;
            }
            if let Err(e) = self.fetch_more(next) {
                errors.push((self.nodes[next.0].path().to_path_buf(), e));
                continue;
            }
            if let Some(item) = self.node(next) {
                pending.extend(item.children.iter().rev().map(|&c| (c, level + 1)));
            }
        }
        errors
    }
}
