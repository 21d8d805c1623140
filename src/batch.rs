use crate::{
    convert::{ConversionOutcome, Converter},
    error::ConvertError,
    paths::{self, DOCUMENT_EXTENSION},
    render::DocumentRenderer,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub file_name: String,
    pub outcome: ConversionOutcome,
}

/// Per-directory result, one entry per matched file in listing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub directory: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<BatchEntry>,
    /// Informational note, set when there was nothing to convert.
    pub notice: Option<String>,
}

impl BatchSummary {
    fn empty(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            total: 0,
            succeeded: 0,
            failed: 0,
            outcomes: Vec::new(),
            notice: None,
        }
    }

    fn push(&mut self, file_name: String, outcome: ConversionOutcome) {
        if outcome.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.total += 1;
        self.outcomes.push(BatchEntry { file_name, outcome });
    }
}

/// Regular files directly inside `dir` with a `.docx` extension, in the
/// order the filesystem lists them.
pub fn list_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && paths::has_document_extension(&path) {
            out.push(path);
        }
    }
    Ok(out)
}

impl<R: DocumentRenderer> Converter<R> {
    /// Converts every `.docx` directly inside `directory`. Output goes to
    /// `output_dir` when given, otherwise next to each source. A failed file
    /// is recorded and the batch moves on.
    ///
    /// Only failing to list `directory` itself is an error.
    pub fn convert_all(
        &self,
        directory: &Path,
        output_dir: Option<&Path>,
    ) -> Result<BatchSummary, ConvertError> {
        let documents = list_documents(directory).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::NotFound {
                path: directory.to_path_buf(),
            },
            _ => ConvertError::conversion(format!("read_dir {}: {e}", directory.display())),
        })?;

        let mut summary = BatchSummary::empty(directory);
        if documents.is_empty() {
            let notice = format!(
                "no .{DOCUMENT_EXTENSION} files found in {}",
                directory.display()
            );
            info!("{notice}");
            summary.notice = Some(notice);
            return Ok(summary);
        }

        info!(
            "batch {} files={} output_dir={:?}",
            directory.display(),
            documents.len(),
            output_dir
        );

        for source in documents {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let destination = match output_dir {
                Some(dir) => paths::batch_destination(&source, dir),
                None => paths::batch_destination(&source, directory),
            };
            let outcome = self.convert(&source, Some(&destination));
            summary.push(file_name, outcome);
        }

        info!(
            "batch done total={} succeeded={} failed={}",
            summary.total, summary.succeeded, summary.failed
        );
        Ok(summary)
    }
}
