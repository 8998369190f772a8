use crate::report::OverallStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Check,
    Fix,
    Certify,
}

/// One immutable audit record per check, fix or certify action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    /// Rule id for fixes, action type otherwise.
    pub subject: String,
    pub document_id: String,
    pub timestamp: DateTime<Utc>,
    pub actor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

/// Binds a document to the score it achieved under a given rule-set version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub schema: String,
    pub certificate_id: Uuid,
    pub document_id: String,
    pub score: u8,
    pub status: OverallStatus,
    pub ruleset_version: String,
    pub issued_at: DateTime<Utc>,
    /// sha256 (hex) over the bound fields.
    pub digest: String,
}

/// Best-effort explanation from the advisory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub rule_id: String,
    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}
