//! Error types carried inside conversion outcomes.
//!
//! [`ConvertError`] is what a failed [`crate::convert::ConversionOutcome`]
//! holds. [`RenderError`] is what a [`crate::render::DocumentRenderer`]
//! returns; the converter folds it into a `ConvertError`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvertError {
    /// Source path does not exist.
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    /// Source exists but does not carry the expected extension.
    #[error("{} is not a .{expected} file", path.display())]
    InvalidExtension { path: PathBuf, expected: String },

    /// Destination exists and overwriting is disabled.
    #[error("{} already exists (overwrite disabled)", path.display())]
    DestinationExists { path: PathBuf },

    /// The rendering backend cannot run at all.
    #[error("dependency missing: {dependency} ({hint})")]
    DependencyMissing { dependency: String, hint: String },

    /// Anything else that went wrong while reading, rendering or writing.
    #[error("conversion failed: {message}")]
    Conversion { message: String },
}

impl ConvertError {
    pub fn conversion(message: impl Into<String>) -> Self {
        ConvertError::Conversion {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{dependency} is not available: {hint}")]
    DependencyMissing { dependency: String, hint: String },

    #[error("renderer exceeded timeout of {secs}s")]
    Timeout { secs: u64 },

    #[error("{message}")]
    Failed { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn failed(message: impl Into<String>) -> Self {
        RenderError::Failed {
            message: message.into(),
        }
    }
}

impl From<RenderError> for ConvertError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::DependencyMissing { dependency, hint } => {
                ConvertError::DependencyMissing { dependency, hint }
            }
            other => ConvertError::conversion(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_path() {
        let e = ConvertError::NotFound {
            path: "missing.docx".into(),
        };
        assert_eq!(e.to_string(), "missing.docx not found");
    }

    #[test]
    fn missing_dependency_survives_conversion() {
        let e: ConvertError = RenderError::DependencyMissing {
            dependency: "mammoth".into(),
            hint: "pip install mammoth".into(),
        }
        .into();
        assert!(matches!(e, ConvertError::DependencyMissing { .. }));
        assert_eq!(
            e.to_string(),
            "dependency missing: mammoth (pip install mammoth)"
        );
    }

    #[test]
    fn other_render_errors_collapse_to_conversion() {
        let e: ConvertError = RenderError::Timeout { secs: 5 }.into();
        assert!(matches!(e, ConvertError::Conversion { .. }));
        assert!(e.to_string().contains("5s"));
    }
}
