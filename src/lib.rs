//! Deterministic DOCX, PDF and PPTX rendering for research protocols and
//! stakeholder briefs.
//!
//! Start with [`render_protocol`] or [`render_brief`]; the `_json` variants
//! parse the record first.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::{
    preview::{brief_preview_html, registry_snapshot_json},
    registry::snapshot as registry_snapshot,
    render::{
        ExportFormat, PageSize, RenderError, RenderOptions, RenderedDocument, render_brief,
        render_brief_json, render_protocol, render_protocol_json,
    },
    sanitize::{sanitize_fragment, sanitize_record, sanitize_text},
};
