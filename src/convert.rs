use crate::{
    config::Config,
    error::ConvertError,
    paths::{self, DOCUMENT_EXTENSION},
    postprocess,
    render::DocumentRenderer,
    util::{format_kib, hash_file, preview},
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::io::{self, Write};
use tracing::{debug, info};

/// A file that was converted and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedFile {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub source_size_bytes: u64,
    pub destination_size_bytes: u64,
    pub message: String,
    pub warnings: Vec<String>,
    pub preview: String,
    pub source_sha256: Option<String>,
}

/// Result of one conversion attempt. Built once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Succeeded(ConvertedFile),
    Failed {
        source_path: PathBuf,
        error: ConvertError,
    },
}

impl ConversionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ConversionOutcome::Succeeded(_))
    }

    pub fn source_path(&self) -> &Path {
        match self {
            ConversionOutcome::Succeeded(f) => &f.source_path,
            ConversionOutcome::Failed { source_path, .. } => source_path,
        }
    }

    pub fn destination_path(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Succeeded(f) => Some(&f.destination_path),
            ConversionOutcome::Failed { .. } => None,
        }
    }

    pub fn source_size_bytes(&self) -> u64 {
        match self {
            ConversionOutcome::Succeeded(f) => f.source_size_bytes,
            ConversionOutcome::Failed { .. } => 0,
        }
    }

    pub fn destination_size_bytes(&self) -> u64 {
        match self {
            ConversionOutcome::Succeeded(f) => f.destination_size_bytes,
            ConversionOutcome::Failed { .. } => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConversionOutcome::Succeeded(f) => f.message.clone(),
            ConversionOutcome::Failed { error, .. } => error.to_string(),
        }
    }

    pub fn error(&self) -> Option<&ConvertError> {
        match self {
            ConversionOutcome::Succeeded(_) => None,
            ConversionOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Sequential DOCX → Markdown converter over a chosen renderer.
pub struct Converter<R: DocumentRenderer> {
    cfg: Config,
    renderer: R,
}

impl<R: DocumentRenderer> Converter<R> {
    pub fn new(cfg: &Config, renderer: R) -> Self {
        Self {
            cfg: cfg.clone(),
            renderer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Converts one document. Every failure is returned as
    /// [`ConversionOutcome::Failed`]; nothing is written in that case.
    pub fn convert(&self, source: &Path, destination: Option<&Path>) -> ConversionOutcome {
        match self.try_convert(source, destination) {
            Ok(file) => {
                info!(
                    "converted {} -> {} ({})",
                    file.source_path.display(),
                    file.destination_path.display(),
                    file.message
                );
                ConversionOutcome::Succeeded(file)
            }
            Err(error) => {
                // Callers print the failure themselves; keep the log quiet at the default level.
                info!("{}: {}", source.display(), error);
                ConversionOutcome::Failed {
                    source_path: source.to_path_buf(),
                    error,
                }
            }
        }
    }

    fn try_convert(
        &self,
        source: &Path,
        destination: Option<&Path>,
    ) -> Result<ConvertedFile, ConvertError> {
        if !source.exists() {
            return Err(ConvertError::NotFound {
                path: source.to_path_buf(),
            });
        }
        if !paths::has_document_extension(source) {
            return Err(ConvertError::InvalidExtension {
                path: source.to_path_buf(),
                expected: DOCUMENT_EXTENSION.to_string(),
            });
        }

        let destination = paths::resolve_destination(source, destination);
        if !self.cfg.output.overwrite && destination.exists() {
            return Err(ConvertError::DestinationExists { path: destination });
        }

        debug!(
            "render {} with {}",
            source.display(),
            self.renderer.name()
        );
        let rendered = {
            let mut file = File::open(source).map_err(|e| io_failure("open", source, e))?;
            self.renderer.render(&mut file)?
        };
        for w in &rendered.warnings {
            debug!("{}: renderer warning: {}", source.display(), w);
        }

        let markdown = postprocess::clean_markdown(&self.cfg, &rendered.markdown)
            .map_err(|e| ConvertError::conversion(format!("{e:#}")))?;

        // Everything that can fail on the source side happens before the write.
        let source_size_bytes = file_size(source)?;
        let source_sha256 = if self.cfg.output.hash_sources {
            Some(hash_file(source).map_err(|e| ConvertError::conversion(format!("{e:#}")))?)
        } else {
            None
        };

        write_output(&destination, markdown.as_bytes(), |p| File::create(p))
            .map_err(|e| io_failure("write", &destination, e))?;
        let destination_size_bytes = file_size(&destination)?;

        Ok(ConvertedFile {
            message: format!(
                "DOCX: {} → MD: {}",
                format_kib(source_size_bytes),
                format_kib(destination_size_bytes)
            ),
            preview: preview(&markdown, self.cfg.output.preview_chars),
            source_path: source.to_path_buf(),
            destination_path: destination,
            source_size_bytes,
            destination_size_bytes,
            warnings: rendered.warnings,
            source_sha256,
        })
    }
}

/// Writes `bytes` to the writer `open` returns for `path`. If the write fails
/// after the file was opened, the partial file is removed.
fn write_output<W: Write>(
    path: &Path,
    bytes: &[u8],
    open: impl FnOnce(&Path) -> io::Result<W>,
) -> io::Result<()> {
    let mut out = open(path)?;
    if let Err(err) = out.write_all(bytes).and_then(|()| out.flush()) {
        drop(out);
        let _ = std::fs::remove_file(path);
        return Err(err);
    }
    Ok(())
}

fn file_size(path: &Path) -> Result<u64, ConvertError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| io_failure("stat", path, e))
}

fn io_failure(op: &str, path: &Path, err: std::io::Error) -> ConvertError {
    ConvertError::conversion(format!("{op} {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `room` bytes, then fails like a full disk.
    struct FullDisk {
        inner: File,
        room: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.room == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = buf.len().min(self.room);
            self.room -= n;
            self.inner.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    #[test]
    fn failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.md");

        let err = write_output(&dest, b"# Heading\n\nbody text", |p| {
            File::create(p).map(|inner| FullDisk { inner, room: 4 })
        })
        .unwrap_err();

        assert!(err.to_string().contains("no space left"));
        assert!(!dest.exists());
    }

    #[test]
    fn failed_open_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.md");
        std::fs::write(&dest, "keep me").unwrap();

        let res = write_output(&dest, b"new", |_| -> io::Result<File> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        });

        assert!(res.is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "keep me");
    }

    #[test]
    fn successful_write_lands_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.md");

        write_output(&dest, "héllo\n".as_bytes(), |p| File::create(p)).unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "héllo\n");
    }
}
