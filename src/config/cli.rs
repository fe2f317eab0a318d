use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

use crate::application::render::{ExportFormat, PageSize};

/// Command-line arguments for the studydoc binary.
#[derive(Debug, Parser)]
#[command(
    name = "studydoc",
    version,
    about = "Render research protocols and stakeholder briefs to DOCX, PDF and PPTX"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "STUDYDOC_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render record files into documents.
    Render(RenderArgs),
    /// Write the browser preview of a brief.
    Preview(PreviewArgs),
    /// Sanitize a markup fragment read from a file or stdin.
    Sanitize(SanitizeArgs),
    /// Print every type-label registry as JSON.
    Registry,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

/// Which record shape the input files hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecordKind {
    Protocol,
    Brief,
    /// Briefs are recognized by their `slides` array.
    #[default]
    Auto,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Record files in JSON.
    #[arg(required = true, value_name = "INPUT", value_hint = ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Output format.
    #[arg(long, short = 'f', value_parser = parse_format)]
    pub format: ExportFormat,

    #[arg(long, value_enum, default_value_t = RecordKind::Auto)]
    pub kind: RecordKind,

    #[command(flatten)]
    pub overrides: RenderOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Override the directory documents are written into.
    #[arg(long = "output-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Override the paper size of paged formats.
    #[arg(long = "page-size", value_name = "SIZE", value_parser = parse_page_size)]
    pub page_size: Option<PageSize>,

    /// Override the organization printed on covers.
    #[arg(long = "organization", value_name = "NAME")]
    pub organization: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct PreviewArgs {
    /// Brief file in JSON.
    #[arg(value_name = "BRIEF_JSON", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Destination HTML file; stdout when absent.
    #[arg(long, short = 'o', value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SanitizeArgs {
    /// Markup file; stdin when absent.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse()
}

fn parse_page_size(value: &str) -> Result<PageSize, String> {
    value.parse()
}
