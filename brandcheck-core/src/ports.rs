//! Port traits abstracting all I/O and external services away from the pipeline.

use crate::error::ExternalServiceError;
use async_trait::async_trait;
use brandcheck_types::audit::{Advice, AuditEntry, Certificate};
use brandcheck_types::report::ComplianceReport;
use brandcheck_types::result::ValidationResult;
use brandcheck_types::scene::SceneDocument;
use brandcheck_types::vision::VisionObservation;
use camino::Utf8Path;
use chrono::{DateTime, Utc};

/// Image analysis of a rendered document (OCR, logo detection, colour histogram).
///
/// Calls cross the network. The engine bounds every call with a timeout.
#[async_trait]
pub trait VisionPort: Send + Sync {
    async fn analyze(&self, doc: &SceneDocument) -> Result<VisionObservation, ExternalServiceError>;
}

/// Human explanation of one failed result. Best-effort only.
#[async_trait]
pub trait AdvisoryPort: Send + Sync {
    async fn advise(&self, result: &ValidationResult) -> Result<Advice, ExternalServiceError>;
}

/// Receives one immutable entry per check, fix and certify action.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> anyhow::Result<()>;
}

/// Binds a passing or warning report to a certificate.
pub trait CertificateIssuer: Send + Sync {
    fn issue(
        &self,
        report: &ComplianceReport,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<Certificate>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
