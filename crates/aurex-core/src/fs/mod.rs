//! File system abstractions for aurex.
//!
//! This module provides the classified directory entry type
//! ([`entry::FileEntry`]), directory reads ([`ops::read_directory`]),
//! and the preview-selection contract a display layer consumes
//! ([`preview::PreviewKind`], [`preview::ItemLabels`], [`preview::TextPreview`]).

pub mod entry;
pub mod ops;
pub mod preview;

pub use preview::{ItemLabels, PreviewKind, TextPreview};
