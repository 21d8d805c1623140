use serde::{Deserialize, Serialize};

/// Markdown produced by a renderer, plus whatever it complained about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rendered {
    pub markdown: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererDiag {
    pub backend: String,
    pub executable: String,
    pub version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply written by `scripts/mammoth_runner.py` on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerReply {
    pub ok: bool,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub missing_dependency: bool,
}

/// `--doctor` reply from the runner script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerDiag {
    pub python_exe: String,
    pub python_version: String,
    pub mammoth_version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
