use crate::{
    batch::BatchSummary,
    config::{Config, RendererBackend},
    convert::{ConversionOutcome, Converter},
    render::{self, DocumentRenderer},
    report::{RunReport, RunResult, write_report},
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "docx2md.toml";

#[derive(Parser, Debug)]
#[command(name = "docx2md")]
#[command(about = "Convert DOCX documents to Markdown")]
pub struct Args {
    /// Input .docx file, or a directory with --batch.
    #[arg(required_unless_present = "doctor")]
    pub input: Option<PathBuf>,

    /// Output file, or output directory with --batch.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Convert every .docx directly inside INPUT.
    #[arg(short, long)]
    pub batch: bool,

    /// Path to config TOML. If omitted, uses ./docx2md.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override renderer.backend.
    #[arg(long, value_enum)]
    pub renderer: Option<RendererBackend>,

    /// Refuse to replace existing .md files.
    #[arg(long)]
    pub no_overwrite: bool,

    /// Print the outcome or batch summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Write a JSON report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Check that the renderer can run, then exit.
    #[arg(long)]
    pub doctor: bool,
}

/// Runs one command. A failed single-file conversion has already been
/// reported on stdout, so it comes back as `ExitCode::FAILURE` rather than
/// an error.
pub fn dispatch(args: Args) -> Result<ExitCode> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let mut cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    apply_overrides(&args, &mut cfg);

    let _guard = init_logging(&args, &cfg)?;
    debug!("config={:?}", cfg_path);

    if cfg.debug.dump_effective_config {
        debug!("effective config:\n{}", toml::to_string(&cfg).unwrap_or_default());
    }

    let renderer = render::from_config(&cfg);
    if args.doctor {
        return doctor(&renderer, args.json).map(|()| ExitCode::SUCCESS);
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("missing INPUT"))?;
    validate_input(&cfg, input, args.batch)?;

    let converter = Converter::new(&cfg, renderer);
    let started = now_rfc3339();

    let result = if args.batch {
        println_unless(args.json, format!("Batch converting directory: {}", input.display()));
        let summary = converter
            .convert_all(input, args.output.as_deref())
            .with_context(|| format!("batch conversion of {}", input.display()))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }
        RunResult::Batch { summary }
    } else {
        println_unless(args.json, format!("Converting file: {}", input.display()));
        let outcome = converter.convert(input, args.output.as_deref());
        if args.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            print_outcome(&outcome, cfg.output.print_preview);
        }
        RunResult::Single { outcome }
    };

    if let Some(path) = report_path(&args, &cfg) {
        let report = RunReport {
            renderer: converter.renderer().name().to_string(),
            started,
            finished: now_rfc3339(),
            result: result.clone(),
        };
        write_report(&path, &report)?;
        info!("report written to {}", path.display());
    }

    match &result {
        RunResult::Single { outcome } if !outcome.succeeded() => Ok(ExitCode::FAILURE),
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    default.exists().then_some(default)
}

fn apply_overrides(args: &Args, cfg: &mut Config) {
    if let Some(backend) = args.renderer {
        cfg.renderer.backend = backend;
    }
    if args.no_overwrite {
        cfg.output.overwrite = false;
    }
}

fn report_path(args: &Args, cfg: &Config) -> Option<PathBuf> {
    if let Some(p) = &args.report {
        return Some(p.clone());
    }
    cfg.output
        .write_report_json
        .then(|| PathBuf::from(&cfg.output.report_filename))
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the conversion results, so logs go to stderr.
    let console_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(renderer: &dyn DocumentRenderer, json: bool) -> Result<()> {
    let diag = renderer.doctor()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&diag)?);
    } else {
        let mark = if diag.ok { "✅" } else { "❌" };
        println!(
            "{mark} {} via {} {}",
            diag.backend,
            diag.executable,
            diag.version.as_deref().unwrap_or("(version unknown)")
        );
        if let Some(err) = &diag.error {
            println!("   {err}");
        }
    }
    if !diag.ok {
        bail!("renderer {} is not usable", diag.backend);
    }
    Ok(())
}

fn validate_input(cfg: &Config, input: &Path, batch: bool) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        bail!("URL inputs are not supported: {input_str}");
    }

    if batch {
        if !input.is_dir() {
            bail!("{} is not a directory", input.display());
        }
    } else if !input.is_file() {
        bail!("{} is not a file", input.display());
    }
    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

fn println_unless(quiet: bool, line: String) {
    if !quiet {
        println!("{line}");
    }
}

fn print_outcome(outcome: &ConversionOutcome, with_preview: bool) {
    match outcome {
        ConversionOutcome::Succeeded(file) => {
            println!("✅ {}", file.message);
            println!("📄 Output file: {}", file.destination_path.display());
            if with_preview && !file.preview.is_empty() {
                println!("\nPreview:\n{}", file.preview);
            }
        }
        ConversionOutcome::Failed { error, .. } => println!("❌ {error}"),
    }
}

fn print_summary(summary: &BatchSummary) {
    if let Some(notice) = &summary.notice {
        println!("{notice}");
        return;
    }
    println!(
        "\nDone: {} files, {} succeeded, {} failed",
        summary.total, summary.succeeded, summary.failed
    );
    for entry in &summary.outcomes {
        let mark = if entry.outcome.succeeded() { "✅" } else { "❌" };
        println!("  {mark} {}: {}", entry.file_name, entry.outcome.message());
    }
}
