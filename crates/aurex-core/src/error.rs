//! Error types for `aurex-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::path::PathBuf;

use crate::types::{FileType, ResourceType};

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message. Errors raised while resolving or decoding an
/// item are wrapped in [`CoreError::Context`]; use [`CoreError::root`]
/// to match on the underlying kind.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested operation does not apply to this kind of item.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Archive or codec content could not be parsed.
    #[error("format error: {0}")]
    Format(String),

    /// An image or sound was requested from an item of another category.
    #[error("\"{name}\" is not {} resource", expected.with_article())]
    TypeMismatch {
        name: String,
        expected: ResourceType,
    },

    /// An archive member whose archive handle is not (or no longer) open.
    #[error("no archive opened")]
    NoArchive,

    /// No decoder or archive reader exists for this file type.
    #[error("unsupported type: {0}")]
    UnsupportedType(FileType),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An error annotated with the operation that was being attempted.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<CoreError>,
    },

    /// Two decode attempts that both failed; the first is the primary cause.
    #[error("{first}; {second}")]
    Fallback {
        #[source]
        first: Box<CoreError>,
        second: Box<CoreError>,
    },

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Wraps `self` with a context message.
    pub fn context(self, context: impl Into<String>) -> Self {
        CoreError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error beneath any [`CoreError::Context`] layers.
    pub fn root(&self) -> &CoreError {
        let mut current = self;
        while let CoreError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Renders the full chain, outermost first, one cause per line.
    pub fn chain_message(&self) -> String {
        let mut lines = Vec::new();
        let mut current = Some(self);
        while let Some(err) = current {
            match err {
                CoreError::Context { context, source } => {
                    lines.push(context.clone());
                    current = Some(source);
                }
                CoreError::Fallback { first, second } => {
                    lines.push(format!(
                        "{}; {}",
                        first.chain_message(),
                        second.chain_message()
                    ));
                    current = None;
                }
                other => {
                    lines.push(other.to_string());
                    current = None;
                }
            }
        }
        lines.join("\n    because: ")
    }

    /// Maps an I/O error on `path` to the most specific variant.
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(err),
        }
    }
}

/// Convenience alias used throughout `aurex-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Adds context to the error side of a [`CoreResult`].
pub trait ResultExt<T> {
    /// Wraps an error with a lazily built context message.
    fn with_context<F, S>(self, f: F) -> CoreResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for CoreResult<T> {
    fn with_context<F, S>(self, f: F) -> CoreResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}
