use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub renderer: Renderer,
    #[serde(default)]
    pub mammoth: Mammoth,
    #[serde(default)]
    pub pandoc: Pandoc,
    #[serde(default)]
    pub postprocess: Postprocess,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

/// Which backend turns DOCX bytes into Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    Mammoth,
    Pandoc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Renderer {
    pub backend: RendererBackend,
    /// 0 disables the timeout.
    pub timeout_seconds: u64,
    pub doctor_timeout_seconds: u64,
}
impl Default for Renderer {
    fn default() -> Self {
        Self {
            backend: RendererBackend::Mammoth,
            timeout_seconds: 300,
            doctor_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Mammoth {
    pub python_exe: String,
    pub scripts_dir: String,
    pub env: BTreeMap<String, String>,
}
impl Default for Mammoth {
    fn default() -> Self {
        Self {
            python_exe: "auto".into(),
            scripts_dir: "scripts".into(),
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Pandoc {
    pub pandoc_exe: String,
    pub to_format: String,
    pub extra_args: Vec<String>,
}
impl Default for Pandoc {
    fn default() -> Self {
        Self {
            pandoc_exe: "pandoc".into(),
            to_format: "gfm".into(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postprocess {
    pub normalize_newlines: bool,
    pub normalize_unicode: bool,
    pub trim_trailing_whitespace: bool,
    pub collapse_blank_lines: bool,
    pub max_blank_lines: u32,
    pub control_chars_to_sanitize: Vec<u8>,
}
impl Default for Postprocess {
    fn default() -> Self {
        Self {
            normalize_newlines: true,
            normalize_unicode: false,
            trim_trailing_whitespace: false,
            collapse_blank_lines: false,
            max_blank_lines: 2,
            control_chars_to_sanitize: default_control_chars(),
        }
    }
}

fn default_control_chars() -> Vec<u8> {
    // C0 controls minus \t \n \r, plus DEL.
    (0u8..=0x1f)
        .filter(|c| !matches!(c, b'\t' | b'\n' | b'\r'))
        .chain(std::iter::once(0x7f))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Replace an existing destination file without asking.
    pub overwrite: bool,
    pub preview_chars: usize,
    pub print_preview: bool,
    pub hash_sources: bool,
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            overwrite: true,
            preview_chars: 500,
            print_preview: true,
            hash_sources: true,
            write_report_json: false,
            report_filename: "docx2md-report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "docx2md.log".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Debug {
    pub keep_renderer_stderr: bool,
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            keep_renderer_stderr: true,
            dump_effective_config: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}
