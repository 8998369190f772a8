//! End-to-end CLI behaviour: commands, exit codes, config and artifacts.

#![allow(deprecated)]

use assert_cmd::Command;
use brandcheck_types::scene::{
    ElementId, ElementKind, Geometry, ImagePayload, Payload, SceneDocument, SceneElement, Style,
    TextPayload,
};
use brandcheck_types::vision::VisionObservation;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn brandcheck() -> Command {
    Command::cargo_bin("brandcheck").expect("brandcheck binary")
}

fn image(id: &str, geometry: Geometry) -> SceneElement {
    SceneElement {
        id: ElementId::new(id),
        name: Some(id.to_string()),
        role: None,
        kind: ElementKind::Image,
        geometry,
        style: Style::default(),
        payload: Payload::Image(ImagePayload {
            src: format!("{id}.png"),
        }),
        bounds: None,
    }
}

fn text(id: &str, font: &str, geometry: Geometry) -> SceneElement {
    SceneElement {
        id: ElementId::new(id),
        name: Some(id.to_string()),
        role: None,
        kind: ElementKind::Text,
        geometry,
        style: Style {
            fill: Some("#000000".to_string()),
            ..Style::default()
        },
        payload: Payload::Text(TextPayload {
            content: format!("{id} copy"),
            font_family: font.to_string(),
            font_size: 40.0,
            font_weight: None,
        }),
        bounds: None,
    }
}

fn document(elements: Vec<SceneElement>) -> SceneDocument {
    let mut doc = SceneDocument::new("creative", 1080.0, 1080.0);
    doc.elements = elements;
    doc
}

fn tidy() -> SceneDocument {
    document(vec![
        image("logo", Geometry::new(40.0, 40.0, 200.0, 100.0)),
        text("headline", "Inter", Geometry::new(40.0, 400.0, 400.0, 60.0)),
    ])
}

fn without_logo() -> SceneDocument {
    document(vec![text(
        "headline",
        "Inter",
        Geometry::new(100.0, 100.0, 400.0, 60.0),
    )])
}

fn small_logo() -> SceneDocument {
    document(vec![
        image("logo", Geometry::new(40.0, 40.0, 40.0, 20.0)),
        text("headline", "Inter", Geometry::new(40.0, 400.0, 400.0, 60.0)),
    ])
}

fn write_doc(dir: &Path, name: &str, doc: &SceneDocument) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
    path
}

#[test]
fn list_rules_shows_the_catalog() {
    brandcheck()
        .arg("list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ruleset 2025.1"))
        .stdout(predicate::str::contains("`logo-min-size`"))
        .stdout(predicate::str::contains("retail-uk"));
}

#[test]
fn list_rules_json_filters_by_policy_set() {
    let out = brandcheck()
        .args(["list-rules", "--policy-set", "default", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let rules: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let ids: Vec<&str> = rules
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 13);
    assert_eq!(ids.iter().filter(|id| **id == "safe-zone").count(), 1);
}

#[test]
fn list_rules_rejects_unknown_policy_set() {
    brandcheck()
        .args(["list-rules", "--policy-set", "mars"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown policy set"));
}

#[test]
fn explain_prints_rule_and_guidance() {
    brandcheck()
        .args(["explain", "logo-min-size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Minimum logo size (`logo-min-size`)"))
        .stdout(predicate::str::contains("## Guidance"))
        .stdout(predicate::str::contains("applied by `brandcheck fix`"));
}

#[test]
fn explain_unknown_rule_fails() {
    brandcheck()
        .args(["explain", "does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown rule id"));
}

#[test]
fn check_passing_document_exits_zero() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "tidy.json", &tidy());

    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("# brandcheck report"));
}

#[test]
fn check_failing_document_is_a_policy_block() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "bare.json", &without_logo());

    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("logo-min-size"))
        .stdout(predicate::str::contains("No logo found"));
}

#[test]
fn check_json_and_artifacts() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "bare.json", &without_logo());
    let out_dir = temp.path().join("out");

    let out = brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .args(["--format", "json", "--out-dir"])
        .arg(&out_dir)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["schema"], "brandcheck.report.v1");
    assert_eq!(report["overall_status"], "fail");
    assert!(out_dir.join("report.json").exists());
    assert!(out_dir.join("report.md").exists());
}

#[test]
fn disabling_the_failing_rules_unblocks_the_check() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "bare.json", &without_logo());

    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .args([
            "--disable-rule",
            "logo-min-size",
            "--disable-rule",
            "mandatory-elements",
        ])
        .assert()
        .success();
}

#[test]
fn config_file_selects_the_policy_set() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "tidy.json", &tidy());
    fs::write(
        temp.path().join("brandcheck.toml"),
        "[engine]\npolicy_set = \"nowhere\"\n",
    )
    .unwrap();

    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown policy set 'nowhere'"));

    // The command line wins over the file.
    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .args(["--policy-set", "retail-uk"])
        .assert()
        .success();
}

#[test]
fn fix_is_a_dry_run_by_default() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "small.json", &small_logo());
    let before = fs::read_to_string(&doc).unwrap();

    brandcheck()
        .current_dir(temp.path())
        .arg("fix")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("fixes applied"));

    assert_eq!(fs::read_to_string(&doc).unwrap(), before);
}

#[test]
fn fix_write_updates_the_document_and_artifacts() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "small.json", &small_logo());
    let out_dir = temp.path().join("out");

    brandcheck()
        .current_dir(temp.path())
        .arg("fix")
        .arg(&doc)
        .arg("--write")
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let fixed: SceneDocument = serde_json::from_str(&fs::read_to_string(&doc).unwrap()).unwrap();
    let logo = &fixed.elements[0];
    assert!((logo.geometry.scale_x - 1.42).abs() < 0.01, "{:?}", logo.geometry);
    assert!(out_dir.join("remediation.json").exists());
    let patch = fs::read_to_string(out_dir.join("patch.diff")).unwrap();
    assert!(patch.contains("scale_x"));

    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .assert()
        .success();
}

#[test]
fn certify_refuses_a_failing_document() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "bare.json", &without_logo());

    brandcheck()
        .current_dir(temp.path())
        .arg("certify")
        .arg(&doc)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("brandcheck certificate").not());
}

#[test]
fn certify_issues_and_audits() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "tidy.json", &tidy());
    let audit = temp.path().join("audit.jsonl");

    let out = brandcheck()
        .current_dir(temp.path())
        .arg("certify")
        .arg(&doc)
        .args(["--format", "json", "--audit-log"])
        .arg(&audit)
        .output()
        .unwrap();
    assert!(out.status.success());

    let certificate: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(certificate["schema"], "brandcheck.certificate.v1");
    assert_eq!(certificate["document_id"], "creative");
    assert_eq!(certificate["ruleset_version"], "2025.1");

    let actions: Vec<String> = fs::read_to_string(&audit)
        .unwrap()
        .lines()
        .map(|l| {
            let entry: serde_json::Value = serde_json::from_str(l).unwrap();
            entry["action"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(actions, vec!["check", "certify"]);
}

#[test]
fn vision_observation_is_fused_into_the_report() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "tidy.json", &tidy());
    let vision = temp.path().join("vision.json");
    let observation = VisionObservation {
        image_width: 1080.0,
        image_height: 1080.0,
        ocr_blocks: vec![],
        logos: vec![],
        dominant_colors: vec![],
    };
    fs::write(&vision, serde_json::to_string(&observation).unwrap()).unwrap();

    let out = brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .args(["--format", "json", "--vision"])
        .arg(&vision)
        .output()
        .unwrap();

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["enhancements"]["vision_applied"], true);
    let sources: Vec<&str> = report["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["source"].as_str().unwrap_or("rule"))
        .collect();
    assert!(sources.contains(&"vision"), "{sources:?}");
}

#[test]
fn check_with_advice_lists_each_failure() {
    let temp = TempDir::new().unwrap();
    let doc = write_doc(temp.path(), "bare.json", &without_logo());

    brandcheck()
        .current_dir(temp.path())
        .arg("check")
        .arg(&doc)
        .arg("--advise")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("## Advice"))
        .stdout(predicate::str::contains("- `logo-min-size`:"));
}
