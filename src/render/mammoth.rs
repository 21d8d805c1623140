use super::{
    DocumentRenderer,
    process::run_piped,
    types::{Rendered, RendererDiag, RunnerDiag, RunnerReply},
};
use crate::config::Config;
use crate::error::RenderError;
use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

const RUNNER_SCRIPT: &str = "mammoth_runner.py";
const PYTHON_HINT: &str = "install Python 3, or point mammoth.python_exe / DOCX2MD_PYTHON at an interpreter";
const MAMMOTH_HINT: &str = "install it with: pip install mammoth";

/// Renders through the `mammoth` Python package. Each call runs
/// `scripts/mammoth_runner.py` with the document on stdin and reads a JSON
/// reply from stdout.
pub struct MammothRenderer {
    cfg: Config,
    scripts_dir: PathBuf,
    python_exe: PathBuf,
}

impl MammothRenderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            scripts_dir: PathBuf::from(&cfg.mammoth.scripts_dir),
            python_exe: resolve_python_exe(&cfg.mammoth.python_exe),
        }
    }

    fn runner(&self) -> PathBuf {
        self.scripts_dir.join(RUNNER_SCRIPT)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.python_exe);
        cmd.arg(self.runner());
        cmd.env("PYTHONIOENCODING", "utf-8");
        for (k, v) in &self.cfg.mammoth.env {
            cmd.env(k, v);
        }
        cmd
    }

    fn ensure_runner(&self) -> Result<(), RenderError> {
        let runner = self.runner();
        if runner.is_file() {
            return Ok(());
        }
        Err(RenderError::DependencyMissing {
            dependency: runner.display().to_string(),
            hint: "set mammoth.scripts_dir to the directory holding mammoth_runner.py".into(),
        })
    }

    fn log_stderr(&self, stderr: &[u8]) {
        if self.cfg.debug.keep_renderer_stderr && !stderr.is_empty() {
            debug!("mammoth stderr: {}", String::from_utf8_lossy(stderr).trim());
        }
    }
}

impl DocumentRenderer for MammothRenderer {
    fn name(&self) -> &str {
        "mammoth"
    }

    fn doctor(&self) -> Result<RendererDiag> {
        self.ensure_runner()?;
        let mut cmd = self.command();
        cmd.arg("--doctor");
        let timeout = Duration::from_secs(self.cfg.renderer.doctor_timeout_seconds.max(1));
        let output = run_piped(&mut cmd, Vec::new(), Some(timeout), PYTHON_HINT)?;
        self.log_stderr(&output.stderr);
        if !output.status.success() {
            return Err(anyhow!(
                "runner --doctor failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        let diag: RunnerDiag = serde_json::from_slice(&output.stdout)
            .with_context(|| "parsing runner --doctor output")?;
        Ok(RendererDiag {
            backend: self.name().to_string(),
            executable: diag.python_exe,
            version: diag
                .mammoth_version
                .map(|v| format!("mammoth {v} (python {})", diag.python_version)),
            ok: diag.ok,
            error: diag.error,
        })
    }

    fn render(&self, source: &mut dyn Read) -> Result<Rendered, RenderError> {
        self.ensure_runner()?;

        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;

        let mut cmd = self.command();
        let output = run_piped(&mut cmd, bytes, super::timeout(&self.cfg), PYTHON_HINT)?;
        self.log_stderr(&output.stderr);

        let reply: RunnerReply = match serde_json::from_slice(&output.stdout) {
            Ok(reply) => reply,
            Err(_) if !output.status.success() => {
                return Err(RenderError::failed(format!(
                    "mammoth runner exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            Err(err) => {
                return Err(RenderError::failed(format!(
                    "unreadable mammoth runner reply: {err}"
                )));
            }
        };

        if reply.missing_dependency {
            return Err(RenderError::DependencyMissing {
                dependency: "mammoth".into(),
                hint: MAMMOTH_HINT.into(),
            });
        }
        if !reply.ok {
            return Err(RenderError::failed(
                reply
                    .error
                    .unwrap_or_else(|| "mammoth reported failure".to_string()),
            ));
        }

        Ok(Rendered {
            markdown: reply.markdown,
            warnings: reply.messages,
        })
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("DOCX2MD_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from(if cfg!(windows) { "python" } else { "python3" });
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_python_is_kept() {
        assert_eq!(resolve_python_exe("/opt/py/bin/python"), PathBuf::from("/opt/py/bin/python"));
    }

    #[test]
    fn missing_runner_is_a_missing_dependency() {
        let mut cfg = Config::default();
        cfg.mammoth.scripts_dir = "/nonexistent/docx2md-scripts".into();
        let renderer = MammothRenderer::new(&cfg);
        let err = renderer.render(&mut &b"PK"[..]).unwrap_err();
        assert!(matches!(err, RenderError::DependencyMissing { .. }));
    }
}
