use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn studydoc() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("studydoc"));
    cmd.env_remove("STUDYDOC_CONFIG_FILE")
        .env("STUDYDOC__LOGGING__JSON", "false")
        .env("STUDYDOC__LOGGING__LEVEL", "info");
    cmd
}

#[test]
fn render_writes_slugged_files_into_output_dir() {
    let output = TempDir::new().expect("tmp dir");

    studydoc()
        .arg("render")
        .arg("tests/fixtures/moderated.json")
        .arg("tests/fixtures/brief.json")
        .args(["--format", "pptx", "--output-dir"])
        .arg(output.path())
        .assert()
        .success();

    let deck = output.path().join("checkout-redesign-round-2.pptx");
    let brief = output.path().join("onboarding-research-brief.pptx");
    assert!(deck.is_file(), "missing {}", deck.display());
    assert!(brief.is_file(), "missing {}", brief.display());
    let bytes = std::fs::read(deck).expect("read deck");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn failed_inputs_fail_the_batch_but_keep_the_rest() {
    let output = TempDir::new().expect("tmp dir");
    let broken = output.path().join("card-sort.json");
    std::fs::write(
        &broken,
        r#"{"study_type": "card_sort", "title": "Nav", "objective": "Sort"}"#,
    )
    .expect("write fixture");

    studydoc()
        .arg("render")
        .arg("tests/fixtures/survey.json")
        .arg(&broken)
        .args(["-f", "pdf", "--output-dir"])
        .arg(output.path())
        .assert()
        .failure()
        .stderr(contains("card_sort"))
        .stderr(contains("1 of 2"));

    assert!(output.path().join("customer-pulse.pdf").is_file());
}

#[test]
fn sanitize_reads_stdin() {
    studydoc()
        .arg("sanitize")
        .write_stdin(r#"<p onclick="x()">Hello</p><script>alert(1)</script>"#)
        .assert()
        .success()
        .stdout("<p>Hello</p>");
}

#[test]
fn registry_prints_every_study_type() {
    studydoc()
        .arg("registry")
        .assert()
        .success()
        .stdout(contains("exploratory_interview"))
        .stdout(contains("diary_study"));
}

#[test]
fn preview_writes_html_file() {
    let output = TempDir::new().expect("tmp dir");
    let page = output.path().join("brief.html");

    studydoc()
        .arg("preview")
        .arg("tests/fixtures/brief.json")
        .arg("-o")
        .arg(&page)
        .assert()
        .success();

    let html = std::fs::read_to_string(page).expect("read preview");
    assert!(html.contains("Onboarding research brief"));
    assert!(!html.contains("alert(1)"));
}
