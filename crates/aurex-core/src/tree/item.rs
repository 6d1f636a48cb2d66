//! Resource nodes and the borrowed item view.
//!
//! An [`Item`] is plain data stored in the tree's arena. Operations that
//! need the archive registry or the audio backend go through [`ItemRef`],
//! which pairs an item with the [`ResourceTree`] that owns it.

use std::cell::OnceCell;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive::{ArchiveId, Member, ResourceStream};
use crate::error::{CoreError, CoreResult, ResultExt};
use crate::fs::entry::FileEntry;
use crate::fs::preview::{ItemLabels, PreviewKind, TextPreview};
use crate::images::{decode_image, ImageDecoder};
use crate::sound::AudioStream;
use crate::tree::model::ResourceTree;
use crate::types::{compose_filename, ArchiveKind, FileType, ResourceType};

/// Index of an item in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where an item's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Directory,
    File,
    /// Member `index` of an archive held by the tree's registry.
    ArchiveMember { archive: ArchiveId, index: u32 },
}

/// Child population state.
///
/// `Unexpanded` moves to `Expanded` exactly once; leaves never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Leaf,
    Unexpanded,
    Expanded,
}

/// A node in a [`ResourceTree`]: a directory, a file or an archive member.
#[derive(Debug)]
pub struct Item {
    name: String,
    path: PathBuf,
    source: Source,
    file_type: FileType,
    resource_type: ResourceType,
    size: Option<u64>,
    pub(crate) expansion: Expansion,
    /// Set once a duration lookup has been attempted.
    duration: OnceCell<Option<Duration>>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Item {
    /// The directory a tree is opened on.
    pub(crate) fn root(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| crate::nfc_string(&n.to_string_lossy()))
            .unwrap_or_else(|| path.display().to_string());
        Self::new(
            name,
            path.to_path_buf(),
            Source::Directory,
            FileType::None,
            None,
            Expansion::Unexpanded,
            None,
        )
    }

    /// An item for a directory entry on disk.
    ///
    /// Archive files start unexpanded when `expand_archives` is set.
    pub fn from_entry(entry: &FileEntry, parent: Option<NodeId>, expand_archives: bool) -> Self {
        let (source, expansion) = if entry.is_dir() {
            (Source::Directory, Expansion::Unexpanded)
        } else if expand_archives && entry.file_type().archive_kind().is_some() {
            (Source::File, Expansion::Unexpanded)
        } else {
            (Source::File, Expansion::Leaf)
        };
        Self::new(
            entry.name().to_string(),
            entry.path().to_path_buf(),
            source,
            entry.file_type(),
            entry.size(),
            expansion,
            parent,
        )
    }

    /// An item for one member of an opened archive.
    ///
    /// The name is the member's resource name plus the extension for its
    /// type tag, and the path continues through the archive's own path.
    /// Nested ERF and RIM containers start unexpanded when
    /// `expand_archives` is set.
    pub fn from_member(
        archive: ArchiveId,
        parent_path: &Path,
        member: &Member,
        size: Option<u64>,
        parent: Option<NodeId>,
        expand_archives: bool,
    ) -> Self {
        let name = compose_filename(&member.name, member.type_id);
        let file_type = FileType::from_id(member.type_id);
        let nested = matches!(
            file_type.archive_kind(),
            Some(ArchiveKind::Erf | ArchiveKind::Rim)
        );
        let expansion = if expand_archives && nested {
            Expansion::Unexpanded
        } else {
            Expansion::Leaf
        };
        Self::new(
            name.clone(),
            parent_path.join(name),
            Source::ArchiveMember {
                archive,
                index: member.index,
            },
            file_type,
            size,
            expansion,
            parent,
        )
    }

    fn new(
        name: String,
        path: PathBuf,
        source: Source,
        file_type: FileType,
        size: Option<u64>,
        expansion: Expansion,
        parent: Option<NodeId>,
    ) -> Self {
        let resource_type = file_type.resource_type();
        // Only sounds have a duration worth looking up.
        let duration = if resource_type == ResourceType::Sound {
            OnceCell::new()
        } else {
            OnceCell::from(None)
        };
        Self {
            name,
            path,
            source,
            file_type,
            resource_type,
            size,
            expansion,
            duration,
            parent,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical path; for archive members this runs through the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Byte size, or `None` for directories and members whose size is unknown.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    pub fn is_dir(&self) -> bool {
        self.source == Source::Directory
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An [`Item`] together with the tree that owns it.
#[derive(Clone, Copy)]
pub struct ItemRef<'a> {
    tree: &'a ResourceTree,
    id: NodeId,
    item: &'a Item,
}

impl std::fmt::Debug for ItemRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemRef")
            .field("id", &self.id)
            .field("item", self.item)
            .finish()
    }
}

impl<'a> ItemRef<'a> {
    pub(crate) fn new(tree: &'a ResourceTree, id: NodeId, item: &'a Item) -> Self {
        Self { tree, id, item }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying arena item.
    pub fn item(&self) -> &'a Item {
        self.item
    }

    pub fn name(&self) -> &'a str {
        self.item.name()
    }

    pub fn path(&self) -> &'a Path {
        self.item.path()
    }

    pub fn size(&self) -> Option<u64> {
        self.item.size()
    }

    pub fn source(&self) -> Source {
        self.item.source()
    }

    pub fn file_type(&self) -> FileType {
        self.item.file_type()
    }

    pub fn resource_type(&self) -> ResourceType {
        self.item.resource_type()
    }

    /// The owning node; `None` only for the tree root.
    pub fn parent(&self) -> Option<NodeId> {
        self.item.parent
    }

    pub fn child_at(&self, row: usize) -> Option<NodeId> {
        self.item.children.get(row).copied()
    }

    pub fn child_count(&self) -> usize {
        self.item.children.len()
    }

    /// Position among the parent's children; 0 for the root.
    pub fn row(&self) -> usize {
        self.item
            .parent
            .and_then(|parent| self.tree.node(parent))
            .and_then(|parent| parent.children.iter().position(|&c| c == self.id))
            .unwrap_or(0)
    }

    /// Whether a view should offer to expand this item.
    ///
    /// Unexpanded containers report `true` before their contents are known.
    pub fn has_children(&self) -> bool {
        match self.item.expansion {
            Expansion::Leaf => false,
            Expansion::Unexpanded => true,
            Expansion::Expanded => !self.item.children.is_empty(),
        }
    }

    /// Opens the raw bytes of this item as a stream positioned at 0.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in a [`CoreError::Context`] naming the item:
    ///
    /// - [`CoreError::UnsupportedOperation`] for directories.
    /// - [`CoreError::NotFound`] or [`CoreError::PermissionDenied`] for files.
    /// - [`CoreError::NoArchive`] if the member's archive is not open.
    /// - [`CoreError::Format`] or [`CoreError::Io`] from archive extraction.
    pub fn resource_data(&self) -> CoreResult<ResourceStream> {
        self.open_data().with_context(|| {
            format!("failed to get resource data for resource \"{}\"", self.name())
        })
    }

    fn open_data(&self) -> CoreResult<ResourceStream> {
        match self.item.source {
            Source::Directory => Err(CoreError::UnsupportedOperation(
                "directories have no resource data".to_string(),
            )),
            Source::File => {
                let path = self.path();
                let file = File::open(path).map_err(|e| CoreError::from_io(e, path))?;
                Ok(Box::new(BufReader::new(file)))
            }
            Source::ArchiveMember { archive, index } => {
                let registry = self.tree.registry();
                let archive = registry.archive(archive).ok_or(CoreError::NoArchive)?;
                archive.resource(index, registry.data_files())
            }
        }
    }

    /// Decodes this item as an image.
    ///
    /// # Errors
    ///
    /// [`CoreError::TypeMismatch`] if the item is not an image; otherwise
    /// resource or decoder errors wrapped with the item name.
    pub fn image(&self) -> CoreResult<Box<dyn ImageDecoder>> {
        if self.resource_type() != ResourceType::Image {
            return Err(CoreError::TypeMismatch {
                name: self.name().to_string(),
                expected: ResourceType::Image,
            });
        }
        let decode = || -> CoreResult<Box<dyn ImageDecoder>> {
            let mut stream = self.resource_data()?;
            decode_image(stream.as_mut(), self.file_type())
        };
        decode().with_context(|| format!("failed to get image from \"{}\"", self.name()))
    }

    /// Hands this item to the tree's audio decoder.
    ///
    /// # Errors
    ///
    /// [`CoreError::TypeMismatch`] if the item is not a sound; otherwise
    /// resource or decoder errors wrapped with the item name.
    pub fn audio_stream(&self) -> CoreResult<Box<dyn AudioStream>> {
        if self.resource_type() != ResourceType::Sound {
            return Err(CoreError::TypeMismatch {
                name: self.name().to_string(),
                expected: ResourceType::Sound,
            });
        }
        let open = || -> CoreResult<Box<dyn AudioStream>> {
            let stream = self.resource_data()?;
            self.tree.audio().make_audio_stream(stream)
        };
        open().with_context(|| format!("failed to get audio stream from \"{}\"", self.name()))
    }

    /// The play time of a sound, looked up once and remembered.
    ///
    /// Errors are logged and reported as an unknown duration; later calls
    /// return the remembered result without touching the resource again.
    pub fn sound_duration(&self) -> Option<Duration> {
        *self.item.duration.get_or_init(|| match self.audio_stream() {
            Ok(stream) => stream.duration(),
            Err(e) => {
                tracing::debug!("no duration for {}: {}", self.name(), e.chain_message());
                None
            }
        })
    }

    /// Reads the first `max_lines` lines of this item as text.
    pub fn text_preview(&self, max_lines: usize) -> CoreResult<TextPreview> {
        let stream = self.resource_data()?;
        TextPreview::read(stream, max_lines)
            .with_context(|| format!("failed to preview \"{}\" as text", self.name()))
    }

    /// The attribute labels a view shows for this item.
    pub fn labels(&self) -> ItemLabels {
        if self.item.is_dir() {
            ItemLabels::directory(self.name())
        } else {
            ItemLabels::resource(
                self.name(),
                self.size(),
                self.file_type(),
                self.resource_type(),
            )
        }
    }

    /// The preview panel a view should show for this item.
    pub fn preview_kind(&self) -> PreviewKind {
        if self.item.is_dir() {
            PreviewKind::Empty
        } else {
            PreviewKind::for_types(self.resource_type(), self.file_type())
        }
    }
}
