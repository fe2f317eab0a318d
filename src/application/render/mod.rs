//! Document rendering.
//!
//! The pipeline is pure: a validated record goes in, container bytes come
//! out, and failures surface as [`RenderError`]. Nothing is cached between
//! calls, so any number of renders may run side by side.

pub mod docx;
pub mod export;
pub mod fragment;
pub mod layout;
pub mod ooxml;
pub mod pdf;
pub mod pptx;
mod types;
pub mod validate;

pub use export::{
    parse_protocol, render_brief, render_brief_json, render_protocol, render_protocol_json,
};
pub use fragment::{BlockKind, FragmentBlock, extract_blocks};
pub use types::{ExportFormat, PageSize, RenderError, RenderOptions, RenderedDocument};
