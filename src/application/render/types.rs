use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Container formats the renderer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// WordprocessingML package.
    Docx,
    Pdf,
    /// PresentationML package.
    Pptx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Docx, ExportFormat::Pdf, ExportFormat::Pptx];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Pptx => "pptx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| format!("unknown export format `{value}` (expected docx, pdf or pptx)"))
    }
}

/// Paper size of the paged formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
        }
    }

    /// Portrait width and height in PDF points.
    pub fn points(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
        }
    }

    /// Portrait width and height in twentieths of a point.
    pub fn twips(self) -> (u32, u32) {
        match self {
            PageSize::A4 => (11906, 16838),
            PageSize::Letter => (12240, 15840),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(format!("unknown page size `{other}` (expected a4 or letter)")),
        }
    }
}

/// Caller-controlled inputs that are not part of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Date printed on covers. Defaults to the current UTC date; fix it for
    /// byte-identical output across runs.
    pub generated_on: Option<Date>,
    pub page_size: PageSize,
    /// Printed as "Prepared by" on covers when set.
    pub organization: Option<String>,
}

impl RenderOptions {
    pub fn with_generated_on(mut self, date: Date) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        let organization = organization.into();
        let trimmed = organization.trim();
        if !trimmed.is_empty() {
            self.organization = Some(trimmed.to_string());
        }
        self
    }

    /// Cover date in long form, e.g. `March 4, 2025`.
    pub fn generated_on_label(&self) -> String {
        let date = self
            .generated_on
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());
        format!("{} {}, {}", date.month(), date.day(), date.year())
    }
}

/// Bytes of one rendered container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `<slug>.<ext>`, falling back to `document` for titles without any
    /// sluggable characters.
    pub fn suggested_filename(&self, title: &str) -> String {
        let slug = slug::slugify(title);
        let stem = if slug.is_empty() { "document" } else { slug.as_str() };
        format!("{stem}.{}", self.format.extension())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Structured errors surfaced by the renderer. Every variant is fatal; no
/// partially assembled document is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no renderer for {discriminant} `{value}`")]
    UnsupportedVariant { discriminant: String, value: String },
    #[error("malformed record at `{path}`: {message}")]
    MalformedRecord { path: String, message: String },
    #[error("document serialization failed: {message}")]
    Serialization { message: String },
}

impl RenderError {
    pub fn unsupported(discriminant: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnsupportedVariant {
            discriminant: discriminant.into(),
            value: value.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::UnsupportedVariant { .. } => "unsupported_variant",
            RenderError::MalformedRecord { .. } => "malformed_record",
            RenderError::Serialization { .. } => "serialization",
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(error: std::io::Error) -> Self {
        RenderError::serialization(error.to_string())
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(error: zip::result::ZipError) -> Self {
        RenderError::serialization(format!("zip: {error}"))
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(error: lopdf::Error) -> Self {
        RenderError::serialization(format!("pdf: {error}"))
    }
}
