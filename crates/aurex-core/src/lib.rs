//! aurex core library: a lazily populated resource tree over BioWare
//! Aurora game data.
//!
//! `aurex-core` lists a game directory, expands the archive containers it
//! finds (KEY/BIF, ERF and its relatives, RIM) into virtual children, and
//! resolves any node to its raw bytes, a header-level image decode or an
//! audio stream description. It has no UI; front ends drive it through
//! the item-model style addressing on [`ResourceTree`].
//!
//! # Modules
//!
//! - [`tree`]: The resource tree ([`ResourceTree`]) and its items.
//! - [`archive`]: Archive readers and the per-tree handle registry.
//! - [`images`]: Image decoders and the type-keyed dispatch.
//! - [`sound`]: Audio stream sniffing.
//! - [`fs`]: Directory listing, [`FileEntry`] and preview helpers.
//! - [`types`]: File type and resource type classification tables.
//! - [`config`]: TOML settings.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod archive;
pub mod config;
pub mod error;
pub mod fs;
pub mod images;
pub mod sound;
pub mod tree;
pub mod types;

pub use archive::{Archive, ArchiveOpener, AuroraOpener, DataFile, ResourceStream};
pub use config::settings::Config;
pub use error::{CoreError, CoreResult};
pub use fs::entry::FileEntry;
pub use fs::ops::read_directory;
pub use fs::{ItemLabels, PreviewKind, TextPreview};
pub use images::{decode_image, ImageDecoder, PixelFormat};
pub use sound::{AudioDecoder, AudioStream, SoundSniffer};
pub use tree::{Backends, ItemRef, NodeId, ResourceTree, Source, TreeOptions};
pub use types::{FileType, ResourceType};

/// Normalises a string to NFC (composed) form.
///
/// macOS stores filenames in NFD (decomposed), which splits accented and
/// Hangul characters into separate code points. This helper re-composes them.
pub fn nfc_string(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    s.nfc().collect()
}
