//! Report aggregation: counts, score and overall status.
//!
//! Status precedence is error > warning > pass across all results, independent of the score. A
//! creative that passes six of seven rules still fails if the seventh is an error.

use brandcheck_types::report::{ComplianceReport, OverallStatus, ReportSummary};
use brandcheck_types::result::ValidationResult;
use brandcheck_types::rule::Severity;
use brandcheck_types::schema::BRANDCHECK_REPORT_V1;
use chrono::{DateTime, Utc};

/// Everything a report carries besides its results.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    pub document_id: String,
    pub ruleset_version: String,
    pub policy_set: String,
    pub timestamp: DateTime<Utc>,
}

pub fn aggregate(results: Vec<ValidationResult>, header: ReportHeader) -> ComplianceReport {
    let mut report = ComplianceReport {
        schema: BRANDCHECK_REPORT_V1.to_string(),
        document_id: header.document_id,
        timestamp: header.timestamp,
        ruleset_version: header.ruleset_version,
        policy_set: header.policy_set,
        overall_status: OverallStatus::Pass,
        score: 100,
        results,
        summary: ReportSummary::default(),
        enhancements: None,
    };
    rescore(&mut report);
    report
}

/// Recompute summary, score and status from `report.results`.
pub fn rescore(report: &mut ComplianceReport) {
    let summary = summarize(&report.results);
    report.score = score(&summary);
    report.overall_status = status(&report.results);
    report.summary = summary;
}

fn summarize(results: &[ValidationResult]) -> ReportSummary {
    let mut summary = ReportSummary {
        total: results.len() as u64,
        ..ReportSummary::default()
    };
    for r in results {
        if r.passed {
            summary.passed += 1;
            continue;
        }
        match r.severity {
            Severity::Error => summary.failed += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.info += 1,
        }
    }
    summary
}

/// `round(100 * passed / total)`; an empty rule set scores 100.
fn score(summary: &ReportSummary) -> u8 {
    if summary.total == 0 {
        return 100;
    }
    let pct = (100.0 * summary.passed as f64 / summary.total as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

fn status(results: &[ValidationResult]) -> OverallStatus {
    let failed = || results.iter().filter(|r| !r.passed);
    if failed().any(|r| r.severity == Severity::Error) {
        OverallStatus::Fail
    } else if failed().any(|r| r.severity == Severity::Warning) {
        OverallStatus::Warning
    } else {
        OverallStatus::Pass
    }
}
