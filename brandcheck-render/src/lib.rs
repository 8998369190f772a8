//! Rendering helpers (markdown) for human-readable artifacts.

use brandcheck_types::audit::{Advice, Certificate};
use brandcheck_types::fix::{FixStatus, RemediationOutcome, TargetResolution};
use brandcheck_types::report::ComplianceReport;
use brandcheck_types::result::{ResultSource, ValidationResult};
use brandcheck_types::rule::Rule;

pub fn render_report_md(report: &ComplianceReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# brandcheck report: {}\n\n", report.document_id));
    out.push_str(&format!(
        "- Status: `{}`\n- Score: {}/100\n",
        report.overall_status.as_str(),
        report.score
    ));
    out.push_str(&format!(
        "- Rules: {} (passed {}, errors {}, warnings {}, info {})\n",
        report.summary.total,
        report.summary.passed,
        report.summary.failed,
        report.summary.warnings,
        report.summary.info
    ));
    out.push_str(&format!(
        "- Policy set: `{}` (ruleset {})\n",
        report.policy_set, report.ruleset_version
    ));
    if let Some(enh) = &report.enhancements
        && enh.vision_applied
    {
        let checks: Vec<&str> = enh.vision_checks.iter().map(|c| c.as_str()).collect();
        out.push_str(&format!("- Vision: {}\n", checks.join(", ")));
    }
    out.push('\n');

    let failed: Vec<&ValidationResult> = report.failed_results().collect();
    out.push_str("## Findings\n\n");
    if failed.is_empty() {
        out.push_str("_No findings._\n");
    } else {
        for (i, r) in failed.iter().enumerate() {
            push_finding(&mut out, i + 1, r);
        }
    }

    let passed: Vec<&ValidationResult> = report.results.iter().filter(|r| r.passed).collect();
    if !passed.is_empty() {
        out.push_str("\n## Passed\n\n");
        for r in passed {
            out.push_str(&format!("- `{}` {}\n", r.rule_id, r.message));
        }
    }
    out
}

fn push_finding(out: &mut String, n: usize, r: &ValidationResult) {
    let source = match r.source {
        ResultSource::Rule => "",
        ResultSource::Vision => " (vision)",
    };
    out.push_str(&format!("### {}. {}{}\n\n", n, r.rule_name, source));
    out.push_str(&format!(
        "- Rule: `{}` ({}, {})\n",
        r.rule_id,
        r.category.as_str(),
        r.severity.as_str()
    ));
    out.push_str(&format!("- {}\n", r.message));
    if let Some(s) = &r.suggestion {
        out.push_str(&format!("- Suggestion: {}\n", s));
    }
    if !r.affected_elements.is_empty() {
        let ids: Vec<String> = r
            .affected_elements
            .iter()
            .map(|e| format!("`{e}`"))
            .collect();
        out.push_str(&format!("- Elements: {}\n", ids.join(", ")));
    }
    out.push('\n');
}

pub fn render_remediation_md(outcome: &RemediationOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("# brandcheck fix: {}\n\n", outcome.document_id));
    out.push_str(&format!("- {}\n", outcome.summary.headline()));
    out.push_str(&format!(
        "- Skipped: {}\n- Unresolved: {}\n",
        outcome.summary.skipped, outcome.summary.unresolved
    ));
    out.push_str(&format!(
        "- Score: {} → {} (`{}` → `{}`)\n\n",
        outcome.before.score,
        outcome.after.score,
        outcome.before.overall_status.as_str(),
        outcome.after.overall_status.as_str()
    ));

    out.push_str("## Fixes\n\n");
    if outcome.fixes.is_empty() {
        out.push_str("_No fixes proposed._\n");
    }
    for (i, fix) in outcome.fixes.iter().enumerate() {
        let status = outcome
            .outcomes
            .iter()
            .find(|o| o.fix_id == fix.id)
            .map(|o| o.status);
        out.push_str(&format!("### {}. {}\n\n", i + 1, fix.description));
        out.push_str(&format!(
            "- Rule: `{}`\n- Target: `{}`{}\n- Kind: `{}`\n",
            fix.rule_id,
            fix.target.element_id,
            match &fix.target.resolution {
                TargetResolution::Explicit => String::new(),
                TargetResolution::Heuristic { strategy } => format!(" (heuristic: {strategy})"),
            },
            fix.kind.type_name()
        ));
        out.push_str(&format!("- Status: `{}`\n", status_label(status)));
        if let Some(reason) = outcome
            .outcomes
            .iter()
            .find(|o| o.fix_id == fix.id)
            .and_then(|o| o.reason.as_deref())
        {
            out.push_str(&format!("- Reason: {}\n", reason));
        }
        out.push('\n');
    }

    if !outcome.unresolved.is_empty() {
        out.push_str("## Unresolved\n\n");
        for u in &outcome.unresolved {
            out.push_str(&format!("- `{}`: {}", u.rule_id, u.reason));
            if !u.candidates.is_empty() {
                let ids: Vec<String> = u.candidates.iter().map(|c| format!("`{c}`")).collect();
                out.push_str(&format!(" (candidates: {})", ids.join(", ")));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !outcome.patch.is_empty() {
        out.push_str("## Patch\n\n```diff\n");
        out.push_str(&outcome.patch);
        if !outcome.patch.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n");
    }
    out
}

pub fn render_certificate_md(cert: &Certificate) -> String {
    format!(
        "# brandcheck certificate\n\n\
         - Certificate: `{}`\n\
         - Document: `{}`\n\
         - Score: {}/100 (`{}`)\n\
         - Ruleset: {}\n\
         - Issued: {}\n\
         - Digest: `{}`\n",
        cert.certificate_id,
        cert.document_id,
        cert.score,
        cert.status.as_str(),
        cert.ruleset_version,
        cert.issued_at.to_rfc3339(),
        cert.digest
    )
}

/// One table row per rule, in registry order.
pub fn render_rules_md(rules: &[Rule]) -> String {
    let mut out = String::new();
    out.push_str("| id | category | severity | validator | policy sets |\n");
    out.push_str("|---|---|---|---|---|\n");
    for r in rules {
        let sets = if r.policy_sets.is_empty() {
            "all".to_string()
        } else {
            r.policy_sets.join(", ")
        };
        out.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            r.id,
            r.category.as_str(),
            r.severity.as_str(),
            r.validator.type_name(),
            sets
        ));
    }
    out
}

pub fn render_explanation_md(rule: &Rule, advice: Option<&Advice>) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} (`{}`)\n\n", rule.name, rule.id));
    out.push_str(&format!("{}\n\n", rule.description));
    out.push_str(&format!(
        "- Category: {}\n- Severity: {}\n- Validator: `{}`\n",
        rule.category.as_str(),
        rule.severity.as_str(),
        rule.validator.type_name()
    ));
    if let Some(a) = advice {
        out.push_str(&format!("\n## Guidance\n\n{}\n", a.explanation));
        if let Some(fix) = &a.suggested_fix {
            out.push_str(&format!("\nSuggested fix: {}\n", fix));
        }
    }
    out
}

fn status_label(s: Option<FixStatus>) -> &'static str {
    match s {
        Some(FixStatus::Applied) => "applied",
        Some(FixStatus::Skipped) => "skipped",
        None => "not attempted",
    }
}
