//! Preview selection and text previews.
//!
//! A display layer picks one of a fixed set of preview panels per item
//! ([`PreviewKind`]) and shows a few attribute labels ([`ItemLabels`]).
//! Text items are rendered from a truncated [`TextPreview`].

use std::io::{BufRead, BufReader, Read};

use crate::error::{CoreError, CoreResult};
use crate::types::{FileType, ResourceType};

/// The number of bytes to inspect for binary (null-byte) detection.
const BINARY_CHECK_SIZE: usize = 8192;

/// Which preview panel a selected item should be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    Empty,
    Image,
    Sound,
    Text,
}

impl PreviewKind {
    /// Chooses the panel from an item's classification.
    ///
    /// The resource category wins; uncategorised items fall back to a
    /// few specific file types.
    pub fn for_types(resource_type: ResourceType, file_type: FileType) -> Self {
        match resource_type {
            ResourceType::Image => PreviewKind::Image,
            ResourceType::Sound => PreviewKind::Sound,
            ResourceType::None | ResourceType::Video => match file_type {
                FileType::Ico => PreviewKind::Image,
                FileType::Ini | FileType::Txt => PreviewKind::Text,
                _ => PreviewKind::Empty,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PreviewKind::Empty => "empty",
            PreviewKind::Image => "image",
            PreviewKind::Sound => "sound",
            PreviewKind::Text => "text",
        }
    }
}

/// The attribute labels shown next to the tree for a selected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLabels {
    pub name: String,
    pub size: String,
    pub file_type: String,
    pub resource_type: String,
}

impl ItemLabels {
    /// Labels for a directory: no size and no types.
    pub fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: "-".to_string(),
            file_type: "Directory".to_string(),
            resource_type: "Directory".to_string(),
        }
    }

    /// Labels for a file or archive member.
    pub fn resource(
        name: &str,
        size: Option<u64>,
        file_type: FileType,
        resource_type: ResourceType,
    ) -> Self {
        let resource_label = match resource_type {
            ResourceType::None => "none".to_string(),
            other => format!("{} ({})", other as u8, other.description()),
        };
        Self {
            name: name.to_string(),
            size: size_label(size),
            file_type: file_type.to_string(),
            resource_type: resource_label,
        }
    }
}

/// Formats a byte count: exact below 1 KiB, otherwise human-readable
/// followed by the exact count. Unknown sizes render as `-`.
pub fn size_label(size: Option<u64>) -> String {
    match size {
        None => "-".to_string(),
        Some(n) if n < 1024 => n.to_string(),
        Some(n) => format!("{} ({n})", human_readable_size(n)),
    }
}

/// Formats a byte count with binary prefixes and two decimals.
pub fn human_readable_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// A truncated text preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreview {
    /// The preview lines (up to `max_lines`).
    pub lines: Vec<String>,
    /// Total number of lines in the resource.
    pub total_lines: usize,
    /// `true` when the resource has more lines than were kept.
    pub is_truncated: bool,
}

impl TextPreview {
    /// Reads a text preview from `reader`, keeping at most `max_lines`.
    ///
    /// Bytes are decoded lossily; game text files are rarely valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Format`] if the content looks binary (a null
    /// byte in the first 8 KB), [`CoreError::Io`] on read failures.
    pub fn read(reader: impl Read, max_lines: usize) -> CoreResult<Self> {
        let mut reader = BufReader::new(reader);

        let head = reader.fill_buf()?;
        if head[..head.len().min(BINARY_CHECK_SIZE)].contains(&0) {
            return Err(CoreError::Format(
                "binary content cannot be previewed as text".to_string(),
            ));
        }

        let mut lines = Vec::with_capacity(max_lines.min(256));
        let mut total_lines: usize = 0;
        let mut is_truncated = false;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            total_lines += 1;
            if lines.len() < max_lines {
                lines.push(sanitize_line(&String::from_utf8_lossy(&buf)));
            } else {
                is_truncated = true;
            }
        }

        Ok(TextPreview {
            lines,
            total_lines,
            is_truncated,
        })
    }
}

/// Drops the line terminator, expands tabs and removes control characters.
fn sanitize_line(line: &str) -> String {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if c == '\t' {
            out.push_str("    ");
        } else if !c.is_control() {
            out.push(c);
        }
    }
    out
}
