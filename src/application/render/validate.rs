//! Checks the renderers rely on.
//!
//! Serde already rejects absent required fields and unknown discriminants.
//! What remains are the constraints that depend on a tag value: which survey
//! fields a question type needs, how many variants or products a test design
//! takes, and the fixed slide order of a brief.

use crate::domain::{
    BenchmarkDesign, Brief, Protocol, QuestionType, SlideType, SurveyProtocol, SurveyQuestion,
    UnmoderatedDesign,
};

use super::types::RenderError;

const LIKERT_POINTS: std::ops::RangeInclusive<i32> = 2..=11;
const CSAT_POINTS: std::ops::RangeInclusive<i32> = 2..=10;
const BENCHMARK_PRODUCTS: std::ops::RangeInclusive<usize> = 2..=5;

pub fn validate_protocol(protocol: &Protocol) -> Result<(), RenderError> {
    if protocol.title().trim().is_empty() {
        return Err(RenderError::malformed("title", "must not be empty"));
    }

    match protocol {
        Protocol::UnmoderatedUsability(unmoderated) => match &unmoderated.design {
            UnmoderatedDesign::Ab(ab) if ab.variants.len() != 2 => Err(RenderError::malformed(
                "variants",
                format!("an A/B design takes exactly 2 variants, found {}", ab.variants.len()),
            )),
            UnmoderatedDesign::Benchmark(benchmark)
                if !BENCHMARK_PRODUCTS.contains(&benchmark.products.len()) =>
            {
                Err(RenderError::malformed(
                    "products",
                    format!(
                        "a benchmark takes 2 to 5 products, found {}",
                        benchmark.products.len()
                    ),
                ))
            }
            UnmoderatedDesign::Benchmark(benchmark) => validate_benchmark(benchmark),
            _ => Ok(()),
        },
        Protocol::Survey(survey) => validate_survey(survey),
        Protocol::ExploratoryInterview(_)
        | Protocol::ModeratedUsability(_)
        | Protocol::DiaryStudy(_) => Ok(()),
    }
}

/// Post-product questions are drawn as Likert strips.
fn validate_benchmark(benchmark: &BenchmarkDesign) -> Result<(), RenderError> {
    for (product_index, product) in benchmark.products.iter().enumerate() {
        for (question_index, question) in product.post_product_questions.iter().enumerate() {
            check_points(
                question.scale_min,
                question.scale_max,
                LIKERT_POINTS,
                &format!("products[{product_index}].post_product_questions[{question_index}].scale_max"),
                "a post-product scale",
            )?;
        }
    }
    Ok(())
}

fn validate_survey(survey: &SurveyProtocol) -> Result<(), RenderError> {
    for (block_index, block) in survey.blocks.iter().enumerate() {
        for (question_index, question) in block.questions.iter().enumerate() {
            let path = format!("blocks[{block_index}].questions[{question_index}]");
            validate_question(question, &path)?;
        }
    }
    Ok(())
}

fn validate_question(question: &SurveyQuestion, path: &str) -> Result<(), RenderError> {
    let field = |name: &str| format!("{path}.{name}");

    match &question.question_type {
        QuestionType::Likert => {
            let (min, max) = scale_bounds(question, path)?;
            check_points(min, max, LIKERT_POINTS, &field("scale_max"), "a Likert scale")
        }
        QuestionType::Csat => {
            let (min, max) = scale_bounds(question, path)?;
            check_points(min, max, CSAT_POINTS, &field("scale_max"), "a CSAT scale")
        }
        QuestionType::Nps => {
            let (min, max) = scale_bounds(question, path)?;
            if min != 0 {
                return Err(RenderError::malformed(
                    field("scale_min"),
                    format!("an NPS scale starts at 0, found {min}"),
                ));
            }
            if max != 10 {
                return Err(RenderError::malformed(
                    field("scale_max"),
                    format!("an NPS scale ends at 10, found {max}"),
                ));
            }
            Ok(())
        }
        QuestionType::Slider => {
            let (min, max) = scale_bounds(question, path)?;
            if min >= max {
                return Err(RenderError::malformed(
                    field("scale_max"),
                    format!("slider bounds must increase, found {min} to {max}"),
                ));
            }
            Ok(())
        }
        QuestionType::SingleChoice
        | QuestionType::MultipleChoice
        | QuestionType::Ranking
        | QuestionType::Demographic => require_list(question.options.as_deref(), &field("options")),
        QuestionType::Matrix => {
            require_list(question.options.as_deref(), &field("options"))?;
            require_list(question.matrix_rows.as_deref(), &field("matrix_rows"))
        }
        QuestionType::OpenShort | QuestionType::OpenLong | QuestionType::Unknown(_) => Ok(()),
    }
}

fn scale_bounds(question: &SurveyQuestion, path: &str) -> Result<(i32, i32), RenderError> {
    let label = question.question_type.as_str();
    let min = question.scale_min.ok_or_else(|| {
        RenderError::malformed(format!("{path}.scale_min"), format!("required for `{label}`"))
    })?;
    let max = question.scale_max.ok_or_else(|| {
        RenderError::malformed(format!("{path}.scale_max"), format!("required for `{label}`"))
    })?;
    Ok((min, max))
}

fn check_points(
    min: i32,
    max: i32,
    allowed: std::ops::RangeInclusive<i32>,
    path: &str,
    what: &str,
) -> Result<(), RenderError> {
    let points = max.saturating_sub(min).saturating_add(1);
    if allowed.contains(&points) {
        Ok(())
    } else {
        Err(RenderError::malformed(
            path,
            format!(
                "{what} takes {} to {} points, found {points}",
                allowed.start(),
                allowed.end()
            ),
        ))
    }
}

/// `Some(empty)` counts as absent.
fn require_list(values: Option<&[String]>, path: &str) -> Result<(), RenderError> {
    match values {
        Some(values) if !values.is_empty() => Ok(()),
        _ => Err(RenderError::malformed(path, "at least one entry is required")),
    }
}

pub fn validate_brief(brief: &Brief) -> Result<(), RenderError> {
    if brief.title.trim().is_empty() {
        return Err(RenderError::malformed("title", "must not be empty"));
    }

    if brief.slides.len() != SlideType::CANONICAL_ORDER.len() {
        return Err(RenderError::malformed(
            "slides",
            format!(
                "a brief has exactly {} slides, found {}",
                SlideType::CANONICAL_ORDER.len(),
                brief.slides.len()
            ),
        ));
    }

    for (index, (slide, expected)) in brief
        .slides
        .iter()
        .zip(SlideType::CANONICAL_ORDER)
        .enumerate()
    {
        if slide.slide_type != expected {
            return Err(RenderError::malformed(
                format!("slides[{index}].slide_type"),
                format!("expected `{expected}`, found `{}`", slide.slide_type),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn survey(question: serde_json::Value) -> Protocol {
        serde_json::from_value(json!({
            "study_type": "survey",
            "title": "Pulse",
            "objective": "Measure",
            "blocks": [{"block_type": "satisfaction", "title": "Block", "questions": [question]}]
        }))
        .unwrap()
    }

    #[test]
    fn likert_without_bounds_names_the_field() {
        let error = validate_protocol(&survey(json!({"question_type": "likert", "text": "Agree?"})))
            .unwrap_err();
        assert_eq!(
            error,
            RenderError::malformed("blocks[0].questions[0].scale_min", "required for `likert`")
        );
    }

    #[test]
    fn nps_must_span_zero_to_ten() {
        let error = validate_protocol(&survey(json!({
            "question_type": "nps", "text": "Recommend?", "scale_min": 1, "scale_max": 10
        })))
        .unwrap_err();
        assert!(matches!(error, RenderError::MalformedRecord { ref path, .. } if path.ends_with("scale_min")));

        assert!(
            validate_protocol(&survey(json!({
                "question_type": "nps", "text": "Recommend?", "scale_min": 0, "scale_max": 10
            })))
            .is_ok()
        );
    }

    #[test]
    fn empty_options_count_as_absent() {
        let error = validate_protocol(&survey(json!({
            "question_type": "single_choice", "text": "Pick one", "options": []
        })))
        .unwrap_err();
        assert!(matches!(error, RenderError::MalformedRecord { ref path, .. } if path == "blocks[0].questions[0].options"));
    }

    #[test]
    fn matrix_needs_rows() {
        let error = validate_protocol(&survey(json!({
            "question_type": "matrix", "text": "Rate", "options": ["Bad", "Good"]
        })))
        .unwrap_err();
        assert!(matches!(error, RenderError::MalformedRecord { ref path, .. } if path.ends_with("matrix_rows")));
    }

    #[test]
    fn unknown_question_types_pass() {
        assert!(
            validate_protocol(&survey(json!({"question_type": "card_sort", "text": "Sort"}))).is_ok()
        );
    }

    #[test]
    fn ab_requires_two_variants() {
        let protocol: Protocol = serde_json::from_value(json!({
            "study_type": "unmoderated_usability",
            "title": "AB",
            "objective": "Compare",
            "test_design": "ab",
            "assignment": "within",
            "variants": [{"label": "A", "description": "Only", "tasks": []}]
        }))
        .unwrap();
        let error = validate_protocol(&protocol).unwrap_err();
        assert!(matches!(error, RenderError::MalformedRecord { ref path, .. } if path == "variants"));
    }

    fn benchmark_with_scale(min: i32, max: i32) -> Protocol {
        let mut record: serde_json::Value = serde_json::from_str(include_str!(
            "../../../tests/fixtures/unmoderated_benchmark.json"
        ))
        .unwrap();
        let question = &mut record["products"][1]["post_product_questions"][0];
        question["scale_min"] = json!(min);
        question["scale_max"] = json!(max);
        serde_json::from_value(record).unwrap()
    }

    #[test]
    fn post_product_scales_are_bounded() {
        assert!(validate_protocol(&benchmark_with_scale(1, 7)).is_ok());

        for (min, max) in [(5, 1), (3, 3), (0, 1_000_000), (i32::MIN, i32::MAX)] {
            let error = validate_protocol(&benchmark_with_scale(min, max)).unwrap_err();
            assert!(
                matches!(error, RenderError::MalformedRecord { ref path, .. }
                    if path == "products[1].post_product_questions[0].scale_max"),
                "{min}..{max}: {error}"
            );
        }
    }
}
