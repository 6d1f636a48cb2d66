//! Subcommand implementations.
//!
//! Each command renders into a `String` so it can be checked without
//! capturing stdout.

use std::fmt::Write as _;
use std::path::PathBuf;

use aurex_core::{CoreError, NodeId, PreviewKind, ResourceTree};
use serde::Serialize;

/// Expands `tree` down to `depth` levels and renders it as an indented listing.
///
/// Containers that still hold unloaded children are marked with `[+]`.
/// Expansion errors do not stop the listing; they are returned next to it.
pub fn render_tree(tree: &mut ResourceTree, depth: usize) -> (String, Vec<(PathBuf, CoreError)>) {
    let root = tree.root();
    let errors = tree.fetch_recursive(root, depth);

    let mut out = String::new();
    let _ = writeln!(out, "{}", tree.root_path().display());
    for id in tree.walk(root) {
        let level = tree.depth(id);
        if level > depth {
            continue;
        }
        let Some(item) = tree.item(id) else { continue };
        let indent = "  ".repeat(level);
        let marker = if tree.can_fetch_more(id) { " [+]" } else { "" };
        let slash = if item.item().is_dir() || item.has_children() { "/" } else { "" };
        let _ = writeln!(out, "{indent}{}{slash}{marker}", item.name());
    }
    (out, errors)
}

/// Everything `aurex info` reports about one item.
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub name: String,
    pub path: PathBuf,
    pub size: String,
    pub file_type: String,
    pub resource_type: String,
    pub preview: &'static str,
    pub children: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<SoundInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextInfo>,
    /// Why the preview could not be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageInfo {
    pub format: &'static str,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    pub mip_maps: usize,
}

#[derive(Debug, Serialize)]
pub struct SoundInfo {
    pub codec: String,
    pub channels: u16,
    pub sample_rate: u32,
    /// Play time in seconds.
    pub duration: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TextInfo {
    pub lines: Vec<String>,
    pub total_lines: usize,
    pub truncated: bool,
}

/// Builds the report for `id`, decoding its preview once.
///
/// Preview failures are reported in [`InfoReport::error`] instead of
/// failing the command.
pub fn info_report(tree: &mut ResourceTree, id: NodeId, text_max_lines: usize) -> Option<InfoReport> {
    // Loading children first gives containers a real child count.
    if let Err(e) = tree.fetch_more(id) {
        tracing::debug!("could not expand item: {}", e.chain_message());
    }
    let item = tree.item(id)?;
    let labels = item.labels();
    let preview = item.preview_kind();
    let mut report = InfoReport {
        name: labels.name,
        path: item.path().to_path_buf(),
        size: labels.size,
        file_type: labels.file_type,
        resource_type: labels.resource_type,
        preview: preview.label(),
        children: item.child_count(),
        image: None,
        sound: None,
        text: None,
        error: None,
    };

    let outcome = match preview {
        PreviewKind::Empty => Ok(()),
        PreviewKind::Image => item.image().map(|image| {
            report.image = Some(ImageInfo {
                format: image.format_name(),
                width: image.width(),
                height: image.height(),
                pixel_format: format!("{:?}", image.pixel_format()),
                mip_maps: image.mip_map_count(),
            });
        }),
        PreviewKind::Sound => item.audio_stream().map(|stream| {
            report.sound = Some(SoundInfo {
                codec: stream.codec().to_string(),
                channels: stream.channels(),
                sample_rate: stream.sample_rate(),
                duration: stream.duration().map(|d| d.as_secs_f64()),
            });
        }),
        PreviewKind::Text => item.text_preview(text_max_lines).map(|text| {
            report.text = Some(TextInfo {
                lines: text.lines,
                total_lines: text.total_lines,
                truncated: text.is_truncated,
            });
        }),
    };
    if let Err(e) = outcome {
        report.error = Some(e.chain_message());
    }
    Some(report)
}

/// Human-readable rendering of an [`InfoReport`].
pub fn render_info(report: &InfoReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "name:          {}", report.name);
    let _ = writeln!(out, "path:          {}", report.path.display());
    let _ = writeln!(out, "size:          {}", report.size);
    let _ = writeln!(out, "file type:     {}", report.file_type);
    let _ = writeln!(out, "resource type: {}", report.resource_type);
    let _ = writeln!(out, "preview:       {}", report.preview);
    if report.children > 0 {
        let _ = writeln!(out, "children:      {}", report.children);
    }
    if let Some(image) = &report.image {
        let _ = writeln!(
            out,
            "image:         {} {}x{} {} ({} mip maps)",
            image.format, image.width, image.height, image.pixel_format, image.mip_maps
        );
    }
    if let Some(sound) = &report.sound {
        let duration = match sound.duration {
            Some(secs) => format!("{secs:.3}s"),
            None => "unknown".to_string(),
        };
        let _ = writeln!(
            out,
            "sound:         {}, {} ch, {} Hz, {duration}",
            sound.codec, sound.channels, sound.sample_rate
        );
    }
    if let Some(text) = &report.text {
        let _ = writeln!(out);
        for line in &text.lines {
            let _ = writeln!(out, "{line}");
        }
        if text.truncated {
            let _ = writeln!(out, "... ({} lines total)", text.total_lines);
        }
    }
    if let Some(error) = &report.error {
        let _ = writeln!(out, "error:         {error}");
    }
    out
}
