//! Properties that hold for every catalog policy set and any generated document.

use brandcheck_domain::{
    EvalContext, Registry, ReportHeader, Synthesizer, aggregate, evaluate_all,
};
use brandcheck_types::report::OverallStatus;
use brandcheck_types::rule::Severity;
use brandcheck_types::scene::{
    ElementId, ElementKind, Geometry, ImagePayload, Payload, SceneDocument, SceneElement, Style,
    TextPayload,
};
use chrono::Utc;
use proptest::prelude::*;

const FONTS: &[&str] = &["Inter", "Georgia", "Arial", "Helvetica"];
const FILLS: &[&str] = &["#000000", "#ffffff", "#e30613", "#3366cc", "#bbbbbb", "#ffd100"];

fn element(i: usize, kind: u8, geometry: Geometry, font: usize, fill: usize) -> SceneElement {
    let id = ElementId::new(format!("e{i}"));
    let (kind, payload, name) = match kind % 3 {
        0 => (
            ElementKind::Text,
            Payload::Text(TextPayload {
                content: format!("copy {i}"),
                font_family: FONTS[font % FONTS.len()].to_string(),
                font_size: 6.0 + (i % 5) as f64 * 8.0,
                font_weight: None,
            }),
            if i % 4 == 0 { "legal" } else { "headline" },
        ),
        1 => (
            ElementKind::Image,
            Payload::Image(ImagePayload {
                src: format!("e{i}.png"),
            }),
            if i % 2 == 0 { "logo" } else { "photo" },
        ),
        _ => (ElementKind::Shape, Payload::None, "panel"),
    };
    SceneElement {
        id,
        name: Some(format!("{name}-{i}")),
        role: None,
        kind,
        geometry,
        style: Style {
            fill: Some(FILLS[fill % FILLS.len()].to_string()),
            ..Style::default()
        },
        payload,
        bounds: None,
    }
}

fn any_document() -> impl Strategy<Value = SceneDocument> {
    let el = (
        any::<u8>(),
        -50.0f64..1050.0,
        -50.0f64..1050.0,
        1.0f64..400.0,
        1.0f64..300.0,
        0usize..8,
        0usize..8,
    );
    (prop::collection::vec(el, 0..10), prop::sample::select(vec![1080.0, 1200.0, 1920.0]))
        .prop_map(|(els, width)| {
            let mut doc = SceneDocument::new("generated", width, 1080.0);
            doc.elements = els
                .into_iter()
                .enumerate()
                .map(|(i, (kind, left, top, w, h, font, fill))| {
                    element(i, kind, Geometry::new(left, top, w, h), font, fill)
                })
                .collect();
            doc
        })
}

fn header() -> ReportHeader {
    ReportHeader {
        document_id: "generated".to_string(),
        ruleset_version: "2025.1".to_string(),
        policy_set: "default".to_string(),
        timestamp: Utc::now(),
    }
}

proptest! {
    #[test]
    fn one_result_per_enabled_rule_in_registry_order(doc in any_document()) {
        let registry = Registry::builtin();
        for set in registry.policy_sets() {
            let rules = registry.list_enabled(&set);
            let results = evaluate_all(&rules, &doc, &EvalContext::default());
            prop_assert_eq!(results.len(), rules.len());
            for (rule, result) in rules.iter().zip(&results) {
                prop_assert_eq!(&rule.id, &result.rule_id);
            }
        }
    }

    #[test]
    fn score_and_status_follow_the_results(doc in any_document()) {
        let rules = Registry::builtin().list_enabled("default");
        let report = aggregate(evaluate_all(&rules, &doc, &EvalContext::default()), header());

        prop_assert!(report.score <= 100);
        let expected = (100.0 * report.summary.passed as f64 / report.summary.total as f64).round();
        prop_assert_eq!(report.score as f64, expected);

        let failed_error = report.failed_results().any(|r| r.severity == Severity::Error);
        let failed_warning = report.failed_results().any(|r| r.severity == Severity::Warning);
        let status = match (failed_error, failed_warning) {
            (true, _) => OverallStatus::Fail,
            (false, true) => OverallStatus::Warning,
            (false, false) => OverallStatus::Pass,
        };
        prop_assert_eq!(report.overall_status, status);
    }

    #[test]
    fn applying_synthesized_fixes_twice_converges(doc in any_document()) {
        let rules = Registry::builtin().list_enabled("default");
        let ctx = EvalContext::default();
        let report = aggregate(evaluate_all(&rules, &doc, &ctx), header());
        let synthesis = Synthesizer::new(rules, ctx).synthesize_report(&report, &doc);

        let mut once = doc.clone();
        brandcheck_edit::apply_all(&synthesis.fixes, &mut once);
        let mut twice = once.clone();
        brandcheck_edit::apply_all(&synthesis.fixes, &mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_proposed_fix_targets_one_existing_element(doc in any_document()) {
        let rules = Registry::builtin().list_enabled("default");
        let ctx = EvalContext::default();
        let report = aggregate(evaluate_all(&rules, &doc, &ctx), header());
        let synthesis = Synthesizer::new(rules, ctx).synthesize_report(&report, &doc);
        for fix in &synthesis.fixes {
            prop_assert_eq!(doc.find_all(&fix.target.element_id).len(), 1);
        }
    }
}
