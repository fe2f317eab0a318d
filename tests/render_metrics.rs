use std::{collections::HashSet, sync::OnceLock};

use metrics_util::{
    MetricKind,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use serial_test::serial;
use studydoc::{ExportFormat, RenderOptions, render_brief_json, render_protocol_json};
use time::macros::date;

fn snapshotter() -> &'static Snapshotter {
    static SNAPSHOTTER: OnceLock<Snapshotter> = OnceLock::new();
    SNAPSHOTTER.get_or_init(|| {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        recorder
            .install()
            .expect("debug metrics recorder should install in this test process");
        snapshotter
    })
}

/// Sum of every counter named `name` whose labels include `labels`.
fn counter(name: &str, labels: &[(&str, &str)]) -> u64 {
    snapshotter()
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            labels.iter().all(|(label, value)| {
                key.key()
                    .labels()
                    .any(|candidate| candidate.key() == *label && candidate.value() == *value)
            })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}

/// Samples of every histogram named `name` whose labels include `labels`.
fn histogram_samples(name: &str, labels: &[(&str, &str)]) -> usize {
    snapshotter()
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            labels.iter().all(|(label, value)| {
                key.key()
                    .labels()
                    .any(|candidate| candidate.key() == *label && candidate.value() == *value)
            })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Histogram(samples) => samples.len(),
            _ => 0,
        })
        .sum()
}

fn options() -> RenderOptions {
    RenderOptions::default().with_generated_on(date!(2025 - 03 - 04))
}

#[tokio::test]
#[serial]
async fn successful_renders_emit_count_and_latency() {
    snapshotter();

    render_protocol_json(include_str!("fixtures/survey.json"), ExportFormat::Pdf, &options())
        .await
        .expect("survey renders");
    render_brief_json(include_str!("fixtures/brief.json"), ExportFormat::Pptx, &options())
        .await
        .expect("brief renders");

    let names: HashSet<String> = snapshotter()
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(key, _, _, _)| key.key().name().to_string())
        .collect();
    for metric in ["studydoc_render_total", "studydoc_render_ms"] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    assert!(counter("studydoc_render_total", &[("kind", "protocol"), ("format", "pdf")]) >= 1);
    assert!(counter("studydoc_render_total", &[("kind", "brief"), ("format", "pptx")]) >= 1);
}

#[tokio::test]
#[serial]
async fn failures_are_labelled_by_error_kind() {
    snapshotter();

    let unknown = r#"{"study_type": "card_sort", "title": "Nav", "objective": "Sort"}"#;
    render_protocol_json(unknown, ExportFormat::Docx, &options())
        .await
        .expect_err("card sorts have no renderer");

    let mut brief: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/brief.json")).unwrap();
    brief["slides"].as_array_mut().unwrap().swap(0, 1);
    render_brief_json(&brief.to_string(), ExportFormat::Docx, &options())
        .await
        .expect_err("slides out of order");

    assert_eq!(
        counter(
            "studydoc_render_failures_total",
            &[("kind", "brief"), ("error", "malformed_record")]
        ),
        1
    );
}

#[tokio::test]
#[serial]
async fn latency_covers_renders_that_fail_validation() {
    snapshotter();

    let mut protocol: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/unmoderated_benchmark.json")).unwrap();
    protocol["products"][0]["post_product_questions"][0]["scale_max"] = serde_json::json!(0);
    render_protocol_json(&protocol.to_string(), ExportFormat::Pptx, &options())
        .await
        .expect_err("inverted scale");

    assert!(
        histogram_samples("studydoc_render_ms", &[("kind", "protocol"), ("format", "pptx")]) >= 1
    );
    assert!(
        counter(
            "studydoc_render_failures_total",
            &[("kind", "protocol"), ("error", "malformed_record")]
        ) >= 1
    );
}
