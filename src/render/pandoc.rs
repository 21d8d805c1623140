use super::{
    DocumentRenderer,
    process::run_piped,
    types::{Rendered, RendererDiag},
};
use crate::config::Config;
use crate::error::RenderError;
use anyhow::{Result, anyhow};
use std::io::Read;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

const PANDOC_HINT: &str = "install pandoc (https://pandoc.org/installing.html) or set pandoc.pandoc_exe";

/// Renders by piping the document through `pandoc --from=docx`.
pub struct PandocRenderer {
    cfg: Config,
}

impl PandocRenderer {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.cfg.pandoc.pandoc_exe);
        cmd.arg("--from=docx");
        cmd.arg(format!("--to={}", self.cfg.pandoc.to_format));
        cmd.args(&self.cfg.pandoc.extra_args);
        cmd
    }
}

impl DocumentRenderer for PandocRenderer {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn doctor(&self) -> Result<RendererDiag> {
        let mut cmd = Command::new(&self.cfg.pandoc.pandoc_exe);
        cmd.arg("--version");
        let timeout = Duration::from_secs(self.cfg.renderer.doctor_timeout_seconds.max(1));
        let output = run_piped(&mut cmd, Vec::new(), Some(timeout), PANDOC_HINT)?;
        if !output.status.success() {
            return Err(anyhow!(
                "pandoc --version failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|l| l.trim().to_string());
        Ok(RendererDiag {
            backend: self.name().to_string(),
            executable: self.cfg.pandoc.pandoc_exe.clone(),
            version,
            ok: true,
            error: None,
        })
    }

    fn render(&self, source: &mut dyn Read) -> Result<Rendered, RenderError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;

        let output = run_piped(&mut self.command(), bytes, super::timeout(&self.cfg), PANDOC_HINT)?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(RenderError::failed(format!(
                "pandoc exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if self.cfg.debug.keep_renderer_stderr && !stderr.trim().is_empty() {
            debug!("pandoc stderr: {}", stderr.trim());
        }

        let markdown = String::from_utf8(output.stdout)
            .map_err(|e| RenderError::failed(format!("pandoc produced invalid UTF-8: {e}")))?;
        // pandoc reports recoverable problems as `[WARNING] ...` lines.
        let warnings = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Rendered { markdown, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_pandoc_is_a_missing_dependency() {
        let mut cfg = Config::default();
        cfg.pandoc.pandoc_exe = "docx2md-no-such-pandoc".into();
        let renderer = PandocRenderer::new(&cfg);
        let err = renderer.render(&mut &b"PK"[..]).unwrap_err();
        assert!(matches!(err, RenderError::DependencyMissing { .. }));
    }

    #[test]
    fn command_carries_target_format() {
        let mut cfg = Config::default();
        cfg.pandoc.to_format = "commonmark".into();
        cfg.pandoc.extra_args = vec!["--wrap=none".into()];
        let cmd = PandocRenderer::new(&cfg).command();
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["--from=docx", "--to=commonmark", "--wrap=none"]);
    }
}
