use std::path::{Path, PathBuf};

pub const DOCUMENT_EXTENSION: &str = "docx";
pub const MARKDOWN_EXTENSION: &str = "md";

/// Destination for `source`: the explicit one if given, otherwise the same
/// directory and stem with a `.md` extension. Does not touch the filesystem.
pub fn resolve_destination(source: &Path, destination: Option<&Path>) -> PathBuf {
    if let Some(p) = destination {
        return p.to_path_buf();
    }
    source.with_extension(MARKDOWN_EXTENSION)
}

/// Destination for `source` when batch output goes to `output_dir`.
pub fn batch_destination(source: &Path, output_dir: &Path) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    // Stems may contain dots ("report.v2"), so append rather than with_extension.
    name.push(".");
    name.push(MARKDOWN_EXTENSION);
    output_dir.join(name)
}

pub fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}
