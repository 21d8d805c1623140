pub mod mammoth;
pub mod pandoc;
pub mod process;
pub mod types;

use crate::config::{Config, RendererBackend};
use crate::error::RenderError;
use anyhow::Result;
use std::io::Read;
use std::time::Duration;

pub use mammoth::MammothRenderer;
pub use pandoc::PandocRenderer;
pub use types::{Rendered, RendererDiag};

/// Turns the raw bytes of a `.docx` into Markdown.
pub trait DocumentRenderer {
    fn name(&self) -> &str;
    fn doctor(&self) -> Result<RendererDiag>;
    fn render(&self, source: &mut dyn Read) -> Result<Rendered, RenderError>;
}

impl<R: DocumentRenderer + ?Sized> DocumentRenderer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn doctor(&self) -> Result<RendererDiag> {
        (**self).doctor()
    }

    fn render(&self, source: &mut dyn Read) -> Result<Rendered, RenderError> {
        (**self).render(source)
    }
}

/// Builds the backend named by `renderer.backend`.
pub fn from_config(cfg: &Config) -> Box<dyn DocumentRenderer> {
    match cfg.renderer.backend {
        RendererBackend::Mammoth => Box::new(MammothRenderer::new(cfg)),
        RendererBackend::Pandoc => Box::new(PandocRenderer::new(cfg)),
    }
}

fn timeout(cfg: &Config) -> Option<Duration> {
    if cfg.renderer.timeout_seconds > 0 {
        Some(Duration::from_secs(cfg.renderer.timeout_seconds))
    } else {
        None
    }
}
