//! Default port implementations: filesystem, in-memory and offline stand-ins.

use crate::error::ExternalServiceError;
use crate::ports::{AdvisoryPort, AuditSink, CertificateIssuer, VisionPort, WritePort};
use anyhow::Context;
use async_trait::async_trait;
use brandcheck_types::audit::{Advice, AuditEntry, Certificate};
use brandcheck_types::report::ComplianceReport;
use brandcheck_types::result::ValidationResult;
use brandcheck_types::scene::SceneDocument;
use brandcheck_types::schema;
use brandcheck_types::vision::VisionObservation;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Keeps entries in memory, in arrival order. For embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: AuditEntry) -> anyhow::Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("audit sink lock poisoned"))?
            .push(entry);
        Ok(())
    }
}

/// Emits each entry as a structured `info!` event.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) -> anyhow::Result<()> {
        info!(
            target: "brandcheck::audit",
            action = ?entry.action,
            subject = %entry.subject,
            document = %entry.document_id,
            actor = %entry.actor,
            score = ?entry.score,
            "audit"
        );
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    path: Utf8PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesAuditSink {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, entry: AuditEntry) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(&entry).context("serialize audit entry")?;
        line.push('\n');

        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("audit log lock poisoned"))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_str().is_empty()
        {
            fs_err::create_dir_all(parent)?;
        }
        let mut file = fs_err::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_std_path())?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append to {}", self.path))
    }
}

/// Returns a fixed observation or a fixed failure, optionally after a delay.
///
/// Stands in for a real image-analysis service when the observation was computed elsewhere
/// (for example loaded from a file next to the document).
#[derive(Debug, Clone)]
pub struct StaticVisionPort {
    answer: Result<VisionObservation, ExternalServiceError>,
    delay: Option<Duration>,
}

impl StaticVisionPort {
    pub fn observation(observation: VisionObservation) -> Self {
        Self {
            answer: Ok(observation),
            delay: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(ExternalServiceError::failed("vision", message)),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl VisionPort for StaticVisionPort {
    async fn analyze(&self, _doc: &SceneDocument) -> Result<VisionObservation, ExternalServiceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone()
    }
}

/// Offline advisor: explains a result from its own message and suggestion.
#[derive(Debug, Clone, Default)]
pub struct RuleTextAdvisor;

#[async_trait]
impl AdvisoryPort for RuleTextAdvisor {
    async fn advise(&self, result: &ValidationResult) -> Result<Advice, ExternalServiceError> {
        Ok(Advice {
            rule_id: result.rule_id.clone(),
            explanation: format!(
                "{} ({} severity): {}",
                result.rule_name,
                result.severity.as_str(),
                result.message
            ),
            suggested_fix: result.suggestion.clone(),
        })
    }
}

/// Issues certificates locally with a sha256 digest over the bound fields.
///
/// The certificate id is a v5 uuid of the digest, so the same report and timestamp always
/// yield the same certificate.
#[derive(Debug, Clone, Default)]
pub struct DigestCertificateIssuer;

impl DigestCertificateIssuer {
    pub fn digest(report: &ComplianceReport, issued_at: DateTime<Utc>) -> String {
        let fields = [
            report.document_id.clone(),
            report.score.to_string(),
            report.overall_status.as_str().to_string(),
            report.ruleset_version.clone(),
            issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ];
        let mut hasher = Sha256::new();
        for field in &fields {
            hasher.update(field.as_bytes());
            hasher.update(b"|");
        }
        hex::encode(hasher.finalize())
    }
}

impl CertificateIssuer for DigestCertificateIssuer {
    fn issue(
        &self,
        report: &ComplianceReport,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<Certificate> {
        let digest = Self::digest(report, issued_at);
        Ok(Certificate {
            schema: schema::BRANDCHECK_CERTIFICATE_V1.to_string(),
            certificate_id: Uuid::new_v5(&Uuid::NAMESPACE_OID, digest.as_bytes()),
            document_id: report.document_id.clone(),
            score: report.score,
            status: report.overall_status,
            ruleset_version: report.ruleset_version.clone(),
            issued_at,
            digest,
        })
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs_err::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs_err::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs_err::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
