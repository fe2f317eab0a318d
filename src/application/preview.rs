//! Browser preview helpers: a static HTML page for a brief and the registry
//! tables as JSON.
//!
//! Slide fragments come from upstream and are untrusted; each one passes the
//! markup sanitizer before it reaches the page.

use askama::Template;

use crate::{
    application::{
        registry::{self, RegistryTag},
        render::{RenderError, RenderOptions, layout::brief::brief_cover, validate::validate_brief},
        sanitize::sanitize_fragment,
    },
    domain::Brief,
};

struct SlideView {
    number: usize,
    caption: String,
    title: String,
    accent: String,
    content: String,
    notes: Option<String>,
}

#[derive(Template)]
#[template(path = "preview/brief.html")]
struct BriefPreviewTemplate {
    title: String,
    subtitle: Option<String>,
    metadata: Vec<(String, String)>,
    generated_on: String,
    slides: Vec<SlideView>,
}

/// Full HTML document previewing `brief`, one card per slide.
pub fn brief_preview_html(brief: &Brief, options: &RenderOptions) -> Result<String, RenderError> {
    validate_brief(brief)?;
    let cover = brief_cover(brief, options);

    let slides = brief
        .slides
        .iter()
        .enumerate()
        .map(|(index, slide)| SlideView {
            number: index + 1,
            caption: slide.slide_type.label().into_owned(),
            title: slide.title.clone(),
            accent: slide.slide_type.color().css(),
            content: sanitize_fragment(&slide.content_html),
            notes: {
                let notes = slide.presenter_notes.trim();
                (!notes.is_empty()).then(|| notes.to_string())
            },
        })
        .collect();

    BriefPreviewTemplate {
        title: cover.title,
        subtitle: cover.subtitle,
        metadata: cover.metadata,
        generated_on: cover.generated_on,
        slides,
    }
    .render()
    .map_err(|err| RenderError::serialization(format!("preview template: {err}")))
}

/// Every type-label registry, pretty-printed.
pub fn registry_snapshot_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&registry::snapshot())
}
