use std::{
    path::{Path, PathBuf},
    process,
};

use futures::future::join_all;
use serde_json::Value;
use studydoc::{
    application::{
        error::AppError,
        preview::{brief_preview_html, registry_snapshot_json},
        render::{ExportFormat, RenderError, RenderOptions, render_brief_json, render_protocol_json},
        sanitize::sanitize_fragment,
    },
    config::{self, Command, PreviewArgs, RecordKind, RenderArgs, SanitizeArgs},
    domain::Brief,
    infra::{
        error::InfraError,
        output::{OutputDir, write_file},
        telemetry,
    },
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{Dispatch, Instrument, Level, dispatcher, error, info, info_span};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.chain();
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Command::Render(args) => run_render(&settings, args).await,
        Command::Preview(args) => run_preview(&settings, args).await,
        Command::Sanitize(args) => run_sanitize(args).await,
        Command::Registry => {
            let json = registry_snapshot_json()
                .map_err(|err| AppError::unexpected(format!("registry snapshot: {err}")))?;
            write_stdout(format!("{json}\n").as_bytes()).await
        }
    }
}

async fn run_render(settings: &config::Settings, args: RenderArgs) -> Result<(), AppError> {
    let output = OutputDir::new(settings.render.output_dir.clone());
    let options = settings.render.options();
    let total = args.inputs.len();

    let results = join_all(args.inputs.iter().map(|input| {
        let span = info_span!("input", path = %input.display());
        render_input(input, args.format, args.kind, &options, &output).instrument(span)
    }))
    .await;

    let mut failed = 0;
    for (input, result) in args.inputs.iter().zip(results) {
        match result {
            Ok(path) => info!(input = %input.display(), output = %path.display(), "wrote document"),
            Err(err) => {
                failed += 1;
                error!(input = %input.display(), error = %err, chain = ?err.chain(), "render failed");
            }
        }
    }

    if failed > 0 {
        return Err(AppError::Batch { failed, total });
    }
    Ok(())
}

async fn render_input(
    input: &Path,
    format: ExportFormat,
    kind: RecordKind,
    options: &RenderOptions,
    output: &OutputDir,
) -> Result<PathBuf, AppError> {
    let label = input.display().to_string();
    let json = read_input(input).await?;

    let (title, kind) = inspect(&json, kind).map_err(|err| AppError::render(&label, err))?;
    let document = match kind {
        RecordKind::Brief => render_brief_json(&json, format, options).await,
        RecordKind::Protocol | RecordKind::Auto => render_protocol_json(&json, format, options).await,
    }
    .map_err(|err| AppError::render(&label, err))?;

    Ok(output.write(&title, &document).await?)
}

/// Title for the output file name, and the record kind with `auto`
/// resolved: briefs are the records carrying a `slides` array.
fn inspect(json: &str, kind: RecordKind) -> Result<(String, RecordKind), RenderError> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| RenderError::malformed("record", err.to_string()))?;
    let kind = match kind {
        RecordKind::Auto if value.get("slides").is_some_and(Value::is_array) => RecordKind::Brief,
        RecordKind::Auto => RecordKind::Protocol,
        explicit => explicit,
    };
    let title = value
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok((title, kind))
}

async fn run_preview(settings: &config::Settings, args: PreviewArgs) -> Result<(), AppError> {
    let label = args.input.display().to_string();
    let json = read_input(&args.input).await?;
    let brief: Brief = serde_json::from_str(&json)
        .map_err(|err| AppError::render(&label, RenderError::malformed("brief", err.to_string())))?;
    let html = brief_preview_html(&brief, &settings.render.options())
        .map_err(|err| AppError::render(&label, err))?;

    match args.output {
        Some(path) => {
            write_file(&path, html.as_bytes()).await?;
            info!(output = %path.display(), "wrote preview");
            Ok(())
        }
        None => write_stdout(html.as_bytes()).await,
    }
}

async fn run_sanitize(args: SanitizeArgs) -> Result<(), AppError> {
    let markup = match args.input {
        Some(path) => read_input(&path).await?,
        None => {
            let mut markup = String::new();
            tokio::io::stdin()
                .read_to_string(&mut markup)
                .await
                .map_err(|err| InfraError::io("<stdin>", err))?;
            markup
        }
    };
    write_stdout(sanitize_fragment(&markup).as_bytes()).await
}

async fn read_input(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| InfraError::io(path.display().to_string(), err).into())
}

async fn write_stdout(bytes: &[u8]) -> Result<(), AppError> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(bytes)
        .await
        .map_err(|err| InfraError::io("<stdout>", err))?;
    stdout
        .flush()
        .await
        .map_err(|err| InfraError::io("<stdout>", err).into())
}
