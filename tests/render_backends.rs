//! Backends driven against shell stand-ins for the mammoth runner.
#![cfg(unix)]

use docx2md::{
    ConvertError, Converter, RenderError,
    config::Config,
    render::{DocumentRenderer, MammothRenderer},
};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::tempdir;

/// Config whose mammoth "interpreter" is `sh`, so the runner script in
/// `scripts_dir` can be plain shell.
fn shell_runner(scripts_dir: &Path, body: &str) -> Config {
    std::fs::write(scripts_dir.join("mammoth_runner.py"), body).unwrap();
    let mut cfg = Config::default();
    cfg.mammoth.python_exe = "sh".into();
    cfg.mammoth.scripts_dir = scripts_dir.display().to_string();
    cfg
}

#[test]
fn import_error_reply_is_missing_dependency() {
    let dir = tempdir().unwrap();
    let cfg = shell_runner(
        dir.path(),
        r#"cat >/dev/null; printf '%s' '{"ok":false,"error":"No module named mammoth","missing_dependency":true}'"#,
    );

    let err = MammothRenderer::new(&cfg).render(&mut &b"PK"[..]).unwrap_err();

    match err {
        RenderError::DependencyMissing { dependency, hint } => {
            assert_eq!(dependency, "mammoth");
            assert!(hint.contains("pip install mammoth"));
        }
        other => panic!("expected DependencyMissing, got {other:?}"),
    }
}

#[test]
fn not_ok_reply_is_a_failed_render() {
    let dir = tempdir().unwrap();
    let cfg = shell_runner(
        dir.path(),
        r#"cat >/dev/null; printf '%s' '{"ok":false,"error":"BadZipFile: File is not a zip file"}'"#,
    );

    let err = MammothRenderer::new(&cfg).render(&mut &b"junk"[..]).unwrap_err();

    assert!(matches!(err, RenderError::Failed { .. }));
    assert!(err.to_string().contains("not a zip file"));
}

#[test]
fn ok_reply_carries_markdown_and_messages() {
    let dir = tempdir().unwrap();
    let cfg = shell_runner(
        dir.path(),
        r##"cat >/dev/null; printf '%s' '{"ok":true,"markdown":"# Title\n","messages":["unrecognised style"]}'"##,
    );

    let rendered = MammothRenderer::new(&cfg).render(&mut &b"PK"[..]).unwrap();

    assert_eq!(rendered.markdown, "# Title\n");
    assert_eq!(rendered.warnings, ["unrecognised style"]);
}

#[test]
fn failed_reply_through_converter_writes_nothing() {
    let dir = tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    std::fs::create_dir(&scripts).unwrap();
    let cfg = shell_runner(
        &scripts,
        r#"cat >/dev/null; printf '%s' '{"ok":false,"missing_dependency":true}'"#,
    );
    let src = dir.path().join("a.docx");
    std::fs::write(&src, "junk").unwrap();

    let outcome = Converter::new(&cfg, MammothRenderer::new(&cfg)).convert(&src, None);

    assert!(matches!(
        outcome.error(),
        Some(ConvertError::DependencyMissing { .. })
    ));
    assert!(!outcome.message().contains('\n'));
    assert!(!dir.path().join("a.md").exists());
}

#[test]
fn slow_renderer_times_out() {
    let dir = tempdir().unwrap();
    let mut cfg = shell_runner(dir.path(), "exec sleep 5\n");
    cfg.renderer.timeout_seconds = 1;

    let started = Instant::now();
    let err = MammothRenderer::new(&cfg).render(&mut &b"PK"[..]).unwrap_err();

    assert!(matches!(err, RenderError::Timeout { secs: 1 }), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn timeout_does_not_wait_for_grandchildren() {
    let dir = tempdir().unwrap();
    // `sh` forks `sleep`, which inherits stdout/stderr and outlives the kill.
    let mut cfg = shell_runner(dir.path(), "sleep 5\necho done\n");
    cfg.renderer.timeout_seconds = 1;

    let started = Instant::now();
    let err = MammothRenderer::new(&cfg).render(&mut &b"PK"[..]).unwrap_err();

    assert!(matches!(err, RenderError::Timeout { .. }), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}
