//! Shared DTOs (schemas-as-code) for the brandcheck workspace.
//!
//! # Design constraints
//! - Scene types mirror the host editor's document; brandcheck reads and mutates them
//!   but never owns their lifecycle.
//! - Reports, remediation outcomes and certificates are serialized for external storage.
//! - Prefer adding optional fields over changing semantics.

pub mod audit;
pub mod fix;
pub mod report;
pub mod result;
pub mod rule;
pub mod scene;
pub mod vision;

/// Schema identifiers.
pub mod schema {
    pub const BRANDCHECK_REPORT_V1: &str = "brandcheck.report.v1";
    pub const BRANDCHECK_REMEDIATION_V1: &str = "brandcheck.remediation.v1";
    pub const BRANDCHECK_CERTIFICATE_V1: &str = "brandcheck.certificate.v1";
}
