use crate::{batch::BatchSummary, convert::ConversionOutcome, util::ensure_dir};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunResult {
    Single { outcome: ConversionOutcome },
    Batch { summary: BatchSummary },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub renderer: String,
    pub started: String,
    pub finished: String,
    #[serde(flatten)]
    pub result: RunResult,
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("write report: {}", path.display()))
}
