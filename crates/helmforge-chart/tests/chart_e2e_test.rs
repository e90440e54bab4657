//! End-to-end tests for the compose-to-chart pipeline.
//!
//! These tests drive the full run from composition text to files on disk:
//! 1. Parse the composition document
//! 2. Classify, normalize, aggregate, and render components
//! 3. Write the chart directory atomically

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use helmforge_chart::{ChartAssembler, write_chart};
use helmforge_common::config::ChartOptions;
use helmforge_common::error::ChartError;
use helmforge_compose::CompositionDocument;

const WEB_AND_DB: &str = r#"
services:
  web:
    image: "nginx:1.25"
    ports:
      - "80:80"
    environment:
      ENV: prod
  mydb:
    image: "postgres:15"
"#;

fn convert(yaml: &str, out: &Path) -> Result<std::path::PathBuf, ChartError> {
    let composition = CompositionDocument::parse(yaml)?;
    let set = ChartAssembler::new(ChartOptions::default()).assemble(&composition, "app")?;
    write_chart(&set, out, false)
}

// ── Layout ───────────────────────────────────────────────────────────

#[test]
fn pipeline_writes_expected_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = convert(WEB_AND_DB, dir.path()).expect("convert");

    assert_eq!(root, dir.path().join("app-chart"));
    assert!(root.join("Chart.yaml").is_file());
    assert!(root.join("values.yaml").is_file());
    assert!(root.join("templates/deployment-web.yaml").is_file());
    assert!(root.join("templates/service-web.yaml").is_file());
    assert!(!root.join("templates/deployment-mydb.yaml").exists());
    assert!(!root.join("templates/service-mydb.yaml").exists());
}

// ── Values ───────────────────────────────────────────────────────────

#[test]
fn pipeline_values_carry_web_and_not_db() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = convert(WEB_AND_DB, dir.path()).expect("convert");

    let values: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(root.join("values.yaml")).expect("read"))
            .expect("yaml");
    assert_eq!(values["web"]["image"]["repository"].as_str(), Some("nginx"));
    assert_eq!(values["web"]["image"]["tag"].as_str(), Some("1.25"));
    assert_eq!(values["web"]["ports"][0].as_u64(), Some(80));
    assert_eq!(values["web"]["env"]["ENV"].as_str(), Some("prod"));
    assert!(values.get("mydb").is_none());
    assert_eq!(values["replicaCount"].as_u64(), Some(1));
    assert!(values["imagePullSecrets"].as_sequence().is_some_and(Vec::is_empty));
}

#[test]
fn pipeline_values_are_byte_identical_across_runs() {
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");
    let a = convert(WEB_AND_DB, first.path()).expect("convert");
    let b = convert(WEB_AND_DB, second.path()).expect("convert");

    assert_eq!(
        std::fs::read(a.join("values.yaml")).expect("read"),
        std::fs::read(b.join("values.yaml")).expect("read")
    );
}

// ── Manifests ────────────────────────────────────────────────────────

#[test]
fn pipeline_manifests_have_no_template_control() {
    let yaml = r#"
services:
  api:
    image: api
    environment:
      - DATABASE_URL=postgres://db:5432/app
      - "TEMPLATE={{ if .x }}"
  worker:
    image: worker:2
"#;
    let dir = tempfile::tempdir().expect("tempdir");
    let root = convert(yaml, dir.path()).expect("convert");

    for entry in std::fs::read_dir(root.join("templates")).expect("templates") {
        let text = std::fs::read_to_string(entry.expect("entry").path()).expect("read");
        for marker in ["{{-", "-}}", "{{ range", "{{ if", "{{ end", "${"] {
            assert!(!text.contains(marker), "found {marker} in:\n{text}");
        }
    }
}

// ── Failure ──────────────────────────────────────────────────────────

#[test]
fn pipeline_malformed_env_writes_nothing() {
    let yaml = r#"
services:
  web:
    image: nginx
  api:
    image: api
    environment:
      - NOVALUE
"#;
    let dir = tempfile::tempdir().expect("tempdir");
    let err = convert(yaml, dir.path()).unwrap_err();

    assert!(matches!(
        err,
        ChartError::MalformedEnvironmentEntry { ref component, ref entry }
            if component == "api" && entry == "NOVALUE"
    ));
    assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 0);
}

#[test]
fn pipeline_second_run_collides_without_overwrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _ = convert(WEB_AND_DB, dir.path()).expect("first run");
    let err = convert(WEB_AND_DB, dir.path()).unwrap_err();
    assert!(matches!(err, ChartError::OutputWriteFailure { .. }));
}
