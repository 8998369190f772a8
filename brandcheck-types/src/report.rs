use crate::result::ValidationResult;
use crate::vision::VisionCheck;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pass,
    Warning,
    Fail,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Pass => "pass",
            OverallStatus::Warning => "warning",
            OverallStatus::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: u64,
    pub passed: u64,
    /// Failed results with error severity.
    pub failed: u64,
    /// Failed results with warning severity.
    pub warnings: u64,
    /// Failed results with info severity.
    #[serde(default)]
    pub info: u64,
}

/// Which optional enhancements contributed to the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportEnhancements {
    #[serde(default)]
    pub vision_applied: bool,

    /// Vision checks that produced results, in merge order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vision_checks: Vec<VisionCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub schema: String,
    pub document_id: String,
    pub timestamp: DateTime<Utc>,
    pub ruleset_version: String,
    pub policy_set: String,
    pub overall_status: OverallStatus,
    /// 0..=100
    pub score: u8,

    #[serde(default)]
    pub results: Vec<ValidationResult>,

    pub summary: ReportSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancements: Option<ReportEnhancements>,
}

impl ComplianceReport {
    pub fn failed_results(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn result(&self, rule_id: &str) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.rule_id == rule_id)
    }
}
