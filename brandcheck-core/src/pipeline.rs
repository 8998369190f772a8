//! Check, fix and certify pipelines over a shared scene document.
//!
//! These entry points are I/O-agnostic: external services, audit and certificate issuance go
//! through the port traits, and artifact writes go through [`WritePort`].
//!
//! Concurrency model:
//! - Rules are evaluated concurrently on a bounded pool and re-assembled in registry order.
//! - A check holds the document's read lock until its report is complete.
//! - A remediation pass holds the write lock for the whole pass and applies fixes one at a time.
//! - Vision and advisory calls are bounded by timeouts; any failure falls back to the report
//!   computed without them.

use crate::adapters::{DigestCertificateIssuer, TracingAuditSink};
use crate::error::{CertifyError, ExternalServiceError};
use crate::ports::{AdvisoryPort, AuditSink, CertificateIssuer, VisionPort, WritePort};
use crate::settings::EngineSettings;
use anyhow::Context;
use brandcheck_domain::{
    FusionConfig, Registry, ReportHeader, Synthesizer, aggregate, enhance, evaluate,
};
use brandcheck_render::{render_certificate_md, render_remediation_md, render_report_md};
use brandcheck_types::audit::{Advice, AuditAction, AuditEntry, Certificate};
use brandcheck_types::fix::{RemediationOutcome, RemediationSummary};
use brandcheck_types::report::{ComplianceReport, OverallStatus};
use brandcheck_types::result::{ResultDetails, ValidationResult};
use brandcheck_types::rule::Rule;
use brandcheck_types::scene::SceneDocument;
use brandcheck_types::schema;
use brandcheck_types::vision::VisionObservation;
use camino::Utf8Path;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const VISION: &str = "vision";
const ADVISORY: &str = "advisory";

/// A document shared with the host editor. Readers check, one writer remediates.
pub type SharedDocument = Arc<RwLock<SceneDocument>>;

pub fn share(doc: SceneDocument) -> SharedDocument {
    Arc::new(RwLock::new(doc))
}

/// Owns the registry, settings and every collaborator. No global state.
pub struct Engine {
    registry: Arc<Registry>,
    settings: EngineSettings,
    vision: Option<Arc<dyn VisionPort>>,
    advisor: Option<Arc<dyn AdvisoryPort>>,
    audit: Arc<dyn AuditSink>,
    issuer: Arc<dyn CertificateIssuer>,
}

impl Engine {
    /// Fails when the configured policy set is not in the registry.
    pub fn new(registry: Registry, settings: EngineSettings) -> anyhow::Result<Self> {
        if !registry.knows_policy_set(&settings.policy_set) {
            anyhow::bail!(
                "unknown policy set '{}' (known: {})",
                settings.policy_set,
                registry.policy_sets().join(", ")
            );
        }
        Ok(Self {
            registry: Arc::new(registry),
            settings,
            vision: None,
            advisor: None,
            audit: Arc::new(TracingAuditSink),
            issuer: Arc::new(DigestCertificateIssuer),
        })
    }

    pub fn with_vision(mut self, port: Arc<dyn VisionPort>) -> Self {
        self.vision = Some(port);
        self
    }

    pub fn with_advisor(mut self, port: Arc<dyn AdvisoryPort>) -> Self {
        self.advisor = Some(port);
        self
    }

    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn with_issuer(mut self, issuer: Arc<dyn CertificateIssuer>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Enabled rules for the configured policy set, in registry order.
    pub fn rules(&self) -> Vec<Rule> {
        self.registry
            .list_enabled_with(&self.settings.policy_set, &self.settings.overrides)
    }

    /// Validate the document and, when a vision port is configured, fuse its observation.
    ///
    /// Always yields a complete report.
    pub async fn check(&self, doc: &SharedDocument) -> ComplianceReport {
        let guard = doc.read().await;
        let snapshot = Arc::new(guard.clone());
        let base = self.rule_report(Arc::clone(&snapshot)).await;
        let observation = self.observe(&snapshot).await;
        let report = enhance(base, observation.as_ref(), &snapshot, &self.fusion_config());
        drop(guard);

        info!(
            document = %report.document_id,
            score = report.score,
            status = report.overall_status.as_str(),
            results = report.results.len(),
            "check complete"
        );
        self.record(AuditAction::Check, "check", &report.document_id, Some(report.score));
        report
    }

    /// Check, synthesize fixes, apply them in order, re-check.
    ///
    /// Holds the document's write lock for the whole pass. Before and after reports are
    /// rule-based only, so the score delta reflects the applied fixes.
    pub async fn remediate(&self, doc: &SharedDocument) -> anyhow::Result<RemediationOutcome> {
        let mut guard = doc.write().await;
        let original = guard.clone();

        let before = self.rule_report(Arc::new(original.clone())).await;
        let synthesizer = Synthesizer::new(self.rules(), self.settings.eval_context());
        let synthesis = synthesizer.synthesize_report(&before, &original);
        for unresolved in &synthesis.unresolved {
            warn!(rule = unresolved.rule_id(), reason = %unresolved, "fix target unresolved");
        }

        let outcomes = brandcheck_edit::apply_all(&synthesis.fixes, &mut guard);
        let after = self.rule_report(Arc::new(guard.clone())).await;
        let patch = brandcheck_edit::render_patch(&original, &guard).context("render patch")?;
        drop(guard);

        let applied = outcomes.iter().filter(|o| o.applied()).count() as u64;
        let summary = RemediationSummary {
            proposed: synthesis.fixes.len() as u64,
            applied,
            skipped: outcomes.len() as u64 - applied,
            unresolved: synthesis.unresolved.len() as u64,
        };

        for outcome in outcomes.iter().filter(|o| o.applied()) {
            self.record(
                AuditAction::Fix,
                &outcome.rule_id,
                &after.document_id,
                Some(after.score),
            );
        }
        info!(
            document = %after.document_id,
            before = before.score,
            after = after.score,
            "{}",
            summary.headline()
        );

        Ok(RemediationOutcome {
            schema: schema::BRANDCHECK_REMEDIATION_V1.to_string(),
            document_id: after.document_id.clone(),
            fixes: synthesis.fixes,
            outcomes,
            unresolved: synthesis
                .unresolved
                .iter()
                .map(|u| u.to_unresolved())
                .collect(),
            before,
            after,
            summary,
            patch,
        })
    }

    /// Issue a certificate for a report that does not fail.
    pub fn certify(&self, report: &ComplianceReport) -> Result<Certificate, CertifyError> {
        if report.overall_status == OverallStatus::Fail {
            warn!(document = %report.document_id, score = report.score, "certification refused");
            return Err(CertifyError::Failing {
                document_id: report.document_id.clone(),
                score: report.score,
            });
        }
        let certificate = self
            .issuer
            .issue(report, Utc::now())
            .map_err(CertifyError::Issuer)?;
        info!(
            document = %certificate.document_id,
            certificate = %certificate.certificate_id,
            "certificate issued"
        );
        self.record(
            AuditAction::Certify,
            "certify",
            &report.document_id,
            Some(report.score),
        );
        Ok(certificate)
    }

    /// Ask the advisory port about each failed result. Best-effort: advice that fails or
    /// times out is left out. Output follows the report's result order.
    pub async fn advise(&self, report: &ComplianceReport) -> Vec<Advice> {
        let Some(port) = &self.advisor else {
            return Vec::new();
        };
        let failed: Vec<ValidationResult> = report.failed_results().cloned().collect();
        let budget = self.settings.advisory_timeout();
        let after_ms = self.settings.advisory_timeout_ms;
        let sem = Arc::new(Semaphore::new(self.settings.permits()));

        let mut join_set = JoinSet::new();
        for (idx, result) in failed.iter().cloned().enumerate() {
            let port = Arc::clone(port);
            let sem = Arc::clone(&sem);
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                let outcome = match tokio::time::timeout(budget, port.advise(&result)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ExternalServiceError::Timeout {
                        service: ADVISORY,
                        after_ms,
                    }),
                };
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<Advice>> = vec![None; failed.len()];
        while let Some(joined) = join_set.join_next().await {
            let (idx, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    let err = if e.is_cancelled() {
                        ExternalServiceError::Cancelled { service: ADVISORY }
                    } else {
                        ExternalServiceError::failed(ADVISORY, e.to_string())
                    };
                    warn!(error = %err, "advisory task ended early");
                    continue;
                }
            };
            match outcome {
                Ok(advice) => slots[idx] = Some(advice),
                Err(err) => warn!(rule = %failed[idx].rule_id, error = %err, "advice unavailable"),
            }
        }
        slots.into_iter().flatten().collect()
    }

    fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            reference_width_mm: self.settings.reference_width_mm,
            ..self.settings.fusion.clone()
        }
    }

    async fn rule_report(&self, doc: Arc<SceneDocument>) -> ComplianceReport {
        let rules = self.rules();
        let header = ReportHeader {
            document_id: doc.id.clone(),
            ruleset_version: self.registry.version().to_string(),
            policy_set: self.settings.policy_set.clone(),
            timestamp: Utc::now(),
        };
        let results = self.evaluate_rules(&rules, doc).await;
        aggregate(results, header)
    }

    /// One result per rule, in `rules` order, whatever order the workers finish in.
    async fn evaluate_rules(&self, rules: &[Rule], doc: Arc<SceneDocument>) -> Vec<ValidationResult> {
        let ctx = self.settings.eval_context();
        let sem = Arc::new(Semaphore::new(self.settings.permits()));

        let mut join_set = JoinSet::new();
        for (idx, rule) in rules.iter().cloned().enumerate() {
            let doc = Arc::clone(&doc);
            let sem = Arc::clone(&sem);
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                (idx, evaluate(&rule, &doc, &ctx))
            });
        }

        let mut slots: Vec<Option<ValidationResult>> = vec![None; rules.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => warn!(error = %e, "rule evaluation task ended early"),
            }
        }

        rules
            .iter()
            .zip(slots)
            .map(|(rule, slot)| {
                slot.unwrap_or_else(|| {
                    ValidationResult::for_rule(rule, false, "Rule evaluation did not complete")
                        .with_details(ResultDetails::Error {
                            error: "evaluation task ended early".to_string(),
                        })
                })
            })
            .collect()
    }

    async fn observe(&self, doc: &SceneDocument) -> Option<VisionObservation> {
        let port = self.vision.as_ref()?;
        let budget = self.settings.vision_timeout();
        let outcome = match tokio::time::timeout(budget, port.analyze(doc)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExternalServiceError::Timeout {
                service: VISION,
                after_ms: self.settings.vision_timeout_ms,
            }),
        };
        match outcome {
            Ok(observation) => {
                debug!(
                    document = %doc.id,
                    logos = observation.logos.len(),
                    ocr_blocks = observation.ocr_blocks.len(),
                    "vision observation received"
                );
                Some(observation)
            }
            Err(err) => {
                warn!(document = %doc.id, error = %err, "vision unavailable; keeping rule-based report");
                None
            }
        }
    }

    fn record(&self, action: AuditAction, subject: &str, document_id: &str, score: Option<u8>) {
        let entry = AuditEntry {
            action,
            subject: subject.to_string(),
            document_id: document_id.to_string(),
            timestamp: Utc::now(),
            actor: self.settings.actor.clone(),
            score,
        };
        if let Err(err) = self.audit.record(entry) {
            warn!(error = %err, subject, "audit entry dropped");
        }
    }
}

/// Write `report.json` and `report.md`.
pub fn write_check_artifacts(
    report: &ComplianceReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;

    let md = render_report_md(report);
    writer.write_file(&out_dir.join("report.md"), md.as_bytes())?;
    Ok(())
}

/// Write `remediation.json`, `remediation.md` and `patch.diff`.
pub fn write_fix_artifacts(
    outcome: &RemediationOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(outcome).context("serialize remediation")?;
    writer.write_file(&out_dir.join("remediation.json"), json.as_bytes())?;

    let md = render_remediation_md(outcome);
    writer.write_file(&out_dir.join("remediation.md"), md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

/// Write `certificate.json` and `certificate.md`.
pub fn write_certificate_artifacts(
    certificate: &Certificate,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(certificate).context("serialize certificate")?;
    writer.write_file(&out_dir.join("certificate.json"), json.as_bytes())?;

    let md = render_certificate_md(certificate);
    writer.write_file(&out_dir.join("certificate.md"), md.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingWriter {
        files: Mutex<Vec<String>>,
    }

    impl WritePort for RecordingWriter {
        fn write_file(&self, path: &Utf8Path, _contents: &[u8]) -> anyhow::Result<()> {
            self.files.lock().unwrap().push(path.file_name().unwrap_or_default().to_string());
            Ok(())
        }

        fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unknown_policy_set_is_rejected() {
        let settings = EngineSettings {
            policy_set: "nope".to_string(),
            ..EngineSettings::default()
        };
        let err = Engine::new(Registry::builtin(), settings).err().expect("rejected");
        assert!(err.to_string().contains("unknown policy set 'nope'"));
    }

    #[tokio::test]
    async fn check_artifacts_are_json_and_markdown() {
        let engine = Engine::new(Registry::builtin(), EngineSettings::default()).unwrap();
        let report = engine
            .check(&share(SceneDocument::new("blank", 1080.0, 1080.0)))
            .await;
        let writer = RecordingWriter::default();
        write_check_artifacts(&report, Utf8Path::new("out"), &writer).unwrap();
        assert_eq!(
            *writer.files.lock().unwrap(),
            vec!["report.json".to_string(), "report.md".to_string()]
        );
    }
}
