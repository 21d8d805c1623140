#![allow(dead_code)]

use anyhow::Result;
use docx2md::{
    RenderError,
    render::{DocumentRenderer, Rendered, RendererDiag},
};
use std::cell::Cell;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Echoes the document text back as Markdown; any input containing
/// `CORRUPT` is rejected the way a real renderer rejects a broken archive.
#[derive(Default)]
pub struct FakeRenderer {
    pub calls: Cell<usize>,
}

impl DocumentRenderer for FakeRenderer {
    fn name(&self) -> &str {
        "fake"
    }

    fn doctor(&self) -> Result<RendererDiag> {
        Ok(RendererDiag {
            backend: "fake".into(),
            executable: "builtin".into(),
            version: None,
            ok: true,
            error: None,
        })
    }

    fn render(&self, source: &mut dyn Read) -> Result<Rendered, RenderError> {
        self.calls.set(self.calls.get() + 1);
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        let text = String::from_utf8_lossy(&bytes);
        if text.contains("CORRUPT") {
            return Err(RenderError::failed("File is not a zip file"));
        }
        Ok(Rendered {
            markdown: format!("# Document\n\n{}\n", text.trim()),
            warnings: Vec::new(),
        })
    }
}

/// Behaves like a backend whose library is not installed.
pub struct MissingRenderer;

impl DocumentRenderer for MissingRenderer {
    fn name(&self) -> &str {
        "missing"
    }

    fn doctor(&self) -> Result<RendererDiag> {
        anyhow::bail!("not installed")
    }

    fn render(&self, _source: &mut dyn Read) -> Result<Rendered, RenderError> {
        Err(RenderError::DependencyMissing {
            dependency: "mammoth".into(),
            hint: "install it with: pip install mammoth".into(),
        })
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
