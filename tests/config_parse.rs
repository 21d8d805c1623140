use docx2md::config::{Config, RendererBackend};

#[test]
fn parse_example_config() {
    let raw = include_str!("../docx2md.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.renderer.backend, RendererBackend::Mammoth);
    assert!(cfg.output.overwrite);
    assert_eq!(cfg.pandoc.extra_args, ["--wrap=none"]);
}

#[test]
fn partial_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[renderer]\nbackend = \"pandoc\"\n").expect("parse TOML");
    assert_eq!(cfg.renderer.backend, RendererBackend::Pandoc);
    assert_eq!(cfg.renderer.timeout_seconds, 300);
    assert_eq!(cfg.output.preview_chars, 500);
    assert_eq!(cfg.mammoth.scripts_dir, "scripts");
}

#[test]
fn unknown_backend_is_rejected() {
    let res: Result<Config, _> = toml::from_str("[renderer]\nbackend = \"word\"\n");
    assert!(res.is_err());
}
