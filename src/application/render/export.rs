//! Export dispatcher: picks a renderer by format, then study type, then
//! test design.
//!
//! Composition is synchronous and cheap. Zipping or writing the PDF runs as
//! one blocking task so large documents never stall the async runtime.

use std::time::Instant;

use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::{
    application::{
        numbering::NumberingPlan,
        projection::ProjectToBase,
        sanitize::{sanitize_record, sanitize_text},
    },
    domain::{Brief, Protocol, StudyType, TestDesign},
};

use super::{
    docx::{self, DocxComposer, DocxDocument},
    fragment::{FragmentBlock, extract_blocks},
    layout::{self, PageComposer},
    pdf::{PdfComposer, PdfDocument},
    pptx::{Deck, slides},
    types::{ExportFormat, RenderError, RenderOptions, RenderedDocument},
    validate::{validate_brief, validate_protocol},
};

pub const METRIC_RENDER_TOTAL: &str = "studydoc_render_total";
pub const METRIC_RENDER_FAILURES: &str = "studydoc_render_failures_total";
pub const METRIC_RENDER_MS: &str = "studydoc_render_ms";

/// A composed document waiting to be serialized.
enum Composed {
    Docx(DocxDocument),
    Pdf(PdfDocument),
    Pptx(Deck),
}

impl Composed {
    fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        match self {
            Composed::Docx(document) => document.into_bytes(),
            Composed::Pdf(document) => document.into_bytes(),
            Composed::Pptx(deck) => deck.into_bytes(),
        }
    }
}

/// Render a protocol into `format`.
pub async fn render_protocol(
    protocol: &Protocol,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    let study_type = protocol.study_type();
    let span = info_span!(
        "render_protocol",
        format = %format,
        study_type = %study_type,
        test_design = tracing::field::Empty,
    );
    if let Protocol::UnmoderatedUsability(unmoderated) = protocol {
        span.record("test_design", unmoderated.design.test_design().as_str());
    }

    let started_at = Instant::now();
    let composed = span.in_scope(|| {
        validate_protocol(protocol)?;
        compose_protocol(protocol, format, options)
    });
    finish("protocol", format, composed, started_at, &span).await
}

/// Render a stakeholder brief into `format`.
pub async fn render_brief(
    brief: &Brief,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    let span = info_span!("render_brief", format = %format, slides = brief.slides.len());
    let started_at = Instant::now();
    let composed = span.in_scope(|| {
        validate_brief(brief)?;
        compose_brief(brief, format, options)
    });
    finish("brief", format, composed, started_at, &span).await
}

/// Parse `json` as a protocol, then render it. Unknown `study_type` or
/// `test_design` values are reported as unsupported variants; any other
/// parse failure is a malformed record.
pub async fn render_protocol_json(
    json: &str,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    let protocol = parse_protocol(json)?;
    render_protocol(&protocol, format, options).await
}

pub async fn render_brief_json(
    json: &str,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    let brief: Brief =
        serde_json::from_str(json).map_err(|error| RenderError::malformed("brief", error.to_string()))?;
    render_brief(&brief, format, options).await
}

pub fn parse_protocol(json: &str) -> Result<Protocol, RenderError> {
    let value: Value =
        serde_json::from_str(json).map_err(|error| RenderError::malformed("protocol", error.to_string()))?;

    let study_type = discriminant(&value, "study_type")?;
    let Some(study_type) = StudyType::parse(study_type) else {
        return Err(RenderError::unsupported("study_type", study_type));
    };
    if study_type == StudyType::UnmoderatedUsability {
        let test_design = discriminant(&value, "test_design")?;
        if TestDesign::parse(test_design).is_none() {
            return Err(RenderError::unsupported("test_design", test_design));
        }
    }

    serde_json::from_value(value)
        .map_err(|error| RenderError::malformed("protocol", error.to_string()))
}

fn discriminant<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, RenderError> {
    match value.get(field) {
        Some(Value::String(tag)) => Ok(tag.as_str()),
        Some(_) => Err(RenderError::malformed(field, "must be a string")),
        None => Err(RenderError::malformed(field, "is required")),
    }
}

async fn finish(
    kind: &'static str,
    format: ExportFormat,
    composed: Result<Composed, RenderError>,
    started_at: Instant,
    span: &tracing::Span,
) -> Result<RenderedDocument, RenderError> {
    counter!(METRIC_RENDER_TOTAL, "kind" => kind, "format" => format.as_str()).increment(1);

    let result = match composed {
        Ok(composed) => serialize(composed).await,
        Err(error) => Err(error),
    };
    let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_RENDER_MS, "kind" => kind, "format" => format.as_str()).record(elapsed_ms);

    let _entered = span.enter();
    match result {
        Ok(bytes) => {
            info!(bytes = bytes.len(), elapsed_ms, "document rendered");
            Ok(RenderedDocument { format, bytes })
        }
        Err(error) => {
            counter!(
                METRIC_RENDER_FAILURES,
                "kind" => kind,
                "format" => format.as_str(),
                "error" => error.kind()
            )
            .increment(1);
            warn!(error = %error, "render failed");
            Err(error)
        }
    }
}

async fn serialize(composed: Composed) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || composed.into_bytes())
        .await
        .map_err(|error| RenderError::serialization(format!("serialization task failed: {error}")))?
}

fn compose_protocol(
    protocol: &Protocol,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<Composed, RenderError> {
    let plan = NumberingPlan::for_protocol(protocol);
    debug!(questions = plan.total(), "numbering plan ready");
    let title = protocol.title();

    match format {
        ExportFormat::Docx => match protocol {
            Protocol::DiaryStudy(base) => {
                docx::generic::compose(base, StudyType::DiaryStudy, &plan, options).map(Composed::Docx)
            }
            _ => {
                let mut composer = DocxComposer::new(title, options);
                paged(&mut composer, protocol, &plan, options);
                Ok(Composed::Docx(composer.finish()))
            }
        },
        ExportFormat::Pdf => {
            let mut composer = PdfComposer::new(title, options);
            paged(&mut composer, protocol, &plan, options);
            Ok(Composed::Pdf(composer.finish()))
        }
        ExportFormat::Pptx => {
            let protocol = sanitize_record(protocol)
                .map_err(|error| RenderError::serialization(format!("sanitize: {error}")))?;
            let options = &narrowed(options);
            let deck = match &protocol {
                Protocol::ExploratoryInterview(exploratory) => {
                    slides::exploratory(exploratory, &plan, options)
                }
                Protocol::ModeratedUsability(moderated) => slides::moderated(moderated, &plan, options),
                Protocol::UnmoderatedUsability(_) | Protocol::Survey(_) | Protocol::DiaryStudy(_) => {
                    let base = protocol.to_base();
                    let plan = NumberingPlan::for_base(&base);
                    slides::generic(&base, protocol.study_type(), &plan, options)
                }
            };
            Ok(Composed::Pptx(deck))
        }
    }
}

/// Paged layouts shared by the word-processing and PDF composers.
fn paged<C: PageComposer>(
    composer: &mut C,
    protocol: &Protocol,
    plan: &NumberingPlan,
    options: &RenderOptions,
) {
    match protocol {
        Protocol::ExploratoryInterview(exploratory) => {
            layout::exploratory::compose(composer, exploratory, plan, options);
        }
        Protocol::ModeratedUsability(moderated) => {
            layout::moderated::compose(composer, moderated, plan, options);
        }
        Protocol::UnmoderatedUsability(unmoderated) => {
            layout::unmoderated::compose(composer, unmoderated, plan, options);
        }
        Protocol::Survey(survey) => layout::survey::compose(composer, survey, plan, options),
        Protocol::DiaryStudy(base) => {
            layout::generic::compose(composer, base, StudyType::DiaryStudy, plan, options);
        }
    }
}

fn compose_brief(
    brief: &Brief,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<Composed, RenderError> {
    match format {
        ExportFormat::Docx => {
            let fragments = brief_fragments(brief)?;
            let mut composer = DocxComposer::new(brief.title.as_str(), options);
            layout::brief::compose(&mut composer, brief, &fragments, options);
            Ok(Composed::Docx(composer.finish()))
        }
        ExportFormat::Pdf => {
            let fragments = brief_fragments(brief)?;
            let mut composer = PdfComposer::new(brief.title.as_str(), options);
            layout::brief::compose(&mut composer, brief, &fragments, options);
            Ok(Composed::Pdf(composer.finish()))
        }
        ExportFormat::Pptx => {
            let brief = sanitize_record(brief)
                .map_err(|error| RenderError::serialization(format!("sanitize: {error}")))?;
            // Markup decoding can reintroduce wide characters.
            let fragments: Vec<Vec<FragmentBlock>> = brief_fragments(&brief)?
                .into_iter()
                .map(|blocks| {
                    blocks
                        .into_iter()
                        .map(|block| FragmentBlock {
                            text: sanitize_text(&block.text).into_owned(),
                            ..block
                        })
                        .collect()
                })
                .collect();
            Ok(Composed::Pptx(slides::brief(&brief, &fragments, &narrowed(options))))
        }
    }
}

/// Options with caller-supplied text narrowed for the slide-deck encoder.
fn narrowed(options: &RenderOptions) -> RenderOptions {
    RenderOptions {
        organization: options
            .organization
            .as_deref()
            .map(|organization| sanitize_text(organization).into_owned()),
        ..options.clone()
    }
}

fn brief_fragments(brief: &Brief) -> Result<Vec<Vec<FragmentBlock>>, RenderError> {
    brief
        .slides
        .iter()
        .enumerate()
        .map(|(index, slide)| {
            extract_blocks(&slide.content_html, &format!("slides[{index}].content_html"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn options() -> RenderOptions {
        RenderOptions::default().with_generated_on(date!(2025 - 03 - 04))
    }

    fn moderated() -> String {
        json!({
            "study_type": "moderated_usability",
            "title": "Checkout \u{2014} round 2",
            "objective": "Observe checkout",
            "sections": [{"section_type": "introduction", "title": "Welcome", "questions": ["Ready?"]}],
            "tasks": [{"title": "Pay", "scenario": "Pay for it", "success_criteria": "Order placed",
                       "post_task_questions": ["Confident?"]}]
        })
        .to_string()
    }

    fn zip_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut part).unwrap();
        part
    }

    #[tokio::test]
    async fn unknown_study_type_is_unsupported() {
        let json = json!({"study_type": "card_sort", "title": "x", "objective": "y"}).to_string();
        let error = render_protocol_json(&json, ExportFormat::Pdf, &options())
            .await
            .unwrap_err();
        assert_eq!(error, RenderError::unsupported("study_type", "card_sort"));
    }

    #[tokio::test]
    async fn unknown_test_design_is_unsupported() {
        let json = json!({
            "study_type": "unmoderated_usability", "test_design": "tree_test",
            "title": "x", "objective": "y"
        })
        .to_string();
        let error = render_protocol_json(&json, ExportFormat::Docx, &options())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "unsupported_variant");
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let error = render_protocol_json("{", ExportFormat::Pptx, &options())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "malformed_record");
    }

    #[tokio::test]
    async fn pdf_output_starts_with_header() {
        let document = render_protocol_json(&moderated(), ExportFormat::Pdf, &options())
            .await
            .unwrap();
        assert!(document.bytes.starts_with(b"%PDF-1.7"));
        assert_eq!(document.mime_type(), "application/pdf");
    }

    #[tokio::test]
    async fn deck_text_is_narrowed_to_single_byte_range() {
        let document = render_protocol_json(&moderated(), ExportFormat::Pptx, &options())
            .await
            .unwrap();
        let cover = zip_part(&document.bytes, "ppt/slides/slide1.xml");
        assert!(cover.contains("Checkout -- round 2"));
        assert!(!cover.contains('\u{2014}'));
    }

    fn brief_with_context(context_html: &str) -> String {
        let slides: Vec<serde_json::Value> = [
            "cover", "context", "objectives", "methodology", "participants", "timeline",
            "deliverables", "insights", "next_steps",
        ]
        .iter()
        .map(|slide_type| {
            let content = if *slide_type == "context" { context_html } else { "<p>Body</p>" };
            json!({"slide_type": slide_type, "title": slide_type, "content_html": content})
        })
        .collect();
        json!({"title": "Launch plan", "slides": slides}).to_string()
    }

    fn wide_chars(text: &str) -> Vec<char> {
        text.chars().filter(|ch| u32::from(*ch) > 0xFF).collect()
    }

    #[tokio::test]
    async fn deck_narrows_entities_decoded_from_brief_markup() {
        let json = brief_with_context("<p>Launch &mdash; soon &#x1F600; &#8364;</p>");
        let options = options().with_organization("R\u{00E9}search \u{2013} Ops");
        let document = render_brief_json(&json, ExportFormat::Pptx, &options)
            .await
            .unwrap();

        let context = zip_part(&document.bytes, "ppt/slides/slide2.xml");
        assert!(context.contains("Launch -- soon [U+1F600] [U+20AC]"));
        assert_eq!(wide_chars(&context), Vec::<char>::new());

        let cover = zip_part(&document.bytes, "ppt/slides/slide1.xml");
        assert!(cover.contains("R\u{00E9}search - Ops"));
        assert_eq!(wide_chars(&cover), Vec::<char>::new());
    }

    #[tokio::test]
    async fn deck_narrows_configured_organization_on_protocol_covers() {
        let options = options().with_organization("Studio \u{2014} \u{4E2D}");
        let document = render_protocol_json(&moderated(), ExportFormat::Pptx, &options)
            .await
            .unwrap();
        let cover = zip_part(&document.bytes, "ppt/slides/slide1.xml");
        assert!(cover.contains("Studio -- [U+4E2D]"));
        assert_eq!(wide_chars(&cover), Vec::<char>::new());
    }

    #[tokio::test]
    async fn word_output_keeps_original_punctuation() {
        let document = render_protocol_json(&moderated(), ExportFormat::Docx, &options())
            .await
            .unwrap();
        let body = zip_part(&document.bytes, "word/document.xml");
        assert!(body.contains("Checkout \u{2014} round 2"));
        assert_eq!(document.suggested_filename("Checkout \u{2014} round 2"), "checkout-round-2.docx");
    }

    #[tokio::test]
    async fn identical_input_yields_identical_bytes() {
        for format in ExportFormat::ALL {
            let first = render_protocol_json(&moderated(), format, &options()).await.unwrap();
            let second = render_protocol_json(&moderated(), format, &options()).await.unwrap();
            assert_eq!(first.bytes, second.bytes, "{format}");
        }
    }
}
