use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.render.page_size = Some("a4".to_string());

    raw.apply_logging_overrides(&LoggingOverrides {
        log_level: Some("debug".to_string()),
        ..Default::default()
    });
    raw.apply_render_overrides(&RenderOverrides {
        page_size: Some(PageSize::Letter),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.render.page_size, PageSize::Letter);
}

#[test]
fn defaults_render_into_current_directory_on_a4() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(settings.render.output_dir, PathBuf::from("."));
    assert_eq!(settings.render.page_size, PageSize::A4);
    assert!(settings.render.organization.is_none());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_logging_overrides(&LoggingOverrides {
        log_json: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn unknown_page_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.render.page_size = Some("tabloid".to_string());
    let error = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        error,
        LoadError::Invalid {
            key: "render.page_size",
            ..
        }
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn blank_organization_is_dropped() {
    let mut raw = RawSettings::default();
    raw.render.organization = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.render.options().organization.is_none());
}

#[test]
fn render_options_carry_configured_organization() {
    let mut raw = RawSettings::default();
    raw.render.organization = Some(" Acme Research ".to_string());
    raw.render.page_size = Some("letter".to_string());
    let options = Settings::from_raw(raw).expect("valid settings").render.options();
    assert_eq!(options.organization.as_deref(), Some("Acme Research"));
    assert_eq!(options.page_size, PageSize::Letter);
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "studydoc",
        "render",
        "a.json",
        "b.json",
        "--format",
        "pptx",
        "--kind",
        "brief",
        "--output-dir",
        "/tmp/out",
        "--log-level",
        "warn",
    ]);

    assert_eq!(args.logging.log_level.as_deref(), Some("warn"));
    match args.command {
        Command::Render(render) => {
            assert_eq!(render.inputs.len(), 2);
            assert_eq!(render.format, crate::application::render::ExportFormat::Pptx);
            assert_eq!(render.kind, RecordKind::Brief);
            assert_eq!(
                render.overrides.output_dir.as_deref(),
                Some(std::path::Path::new("/tmp/out"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn render_kind_defaults_to_auto() {
    let args = CliArgs::parse_from(["studydoc", "render", "a.json", "-f", "pdf"]);
    match args.command {
        Command::Render(render) => assert_eq!(render.kind, RecordKind::Auto),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn render_requires_known_format() {
    let result = CliArgs::try_parse_from(["studydoc", "render", "a.json", "--format", "odt"]);
    assert!(result.is_err());
}

#[test]
fn parse_preview_and_sanitize_arguments() {
    let args = CliArgs::parse_from(["studydoc", "preview", "brief.json", "-o", "out.html"]);
    match args.command {
        Command::Preview(preview) => {
            assert_eq!(preview.input, PathBuf::from("brief.json"));
            assert_eq!(preview.output, Some(PathBuf::from("out.html")));
        }
        _ => panic!("wrong command parsed"),
    }

    let args = CliArgs::parse_from(["studydoc", "sanitize"]);
    assert!(matches!(args.command, Command::Sanitize(SanitizeArgs { input: None })));

    let args = CliArgs::parse_from(["studydoc", "registry"]);
    assert!(matches!(args.command, Command::Registry));
}
