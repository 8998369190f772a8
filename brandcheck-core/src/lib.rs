//! Embeddable core library for brandcheck.
//!
//! Provides a clap-free, I/O-abstracted engine suitable for linking into a host editor
//! process or the `brandcheck` CLI.
//!
//! # Port traits
//!
//! External collaborators sit behind port traits in [`ports`]:
//! - [`VisionPort`](ports::VisionPort): image analysis of a rendered document
//! - [`AdvisoryPort`](ports::AdvisoryPort): human explanation of a failed result
//! - [`AuditSink`](ports::AuditSink): one entry per check, fix and certify action
//! - [`CertificateIssuer`](ports::CertificateIssuer): certificates for non-failing reports
//! - [`WritePort`](ports::WritePort): write files and create directories
//!
//! The [`adapters`] module provides default in-memory, filesystem and offline implementations.
//!
//! # Entry points
//!
//! - [`Engine::check`](pipeline::Engine::check): validate, score, fuse vision
//! - [`Engine::remediate`](pipeline::Engine::remediate): synthesize and apply fixes, re-check
//! - [`Engine::certify`](pipeline::Engine::certify): certify a passing or warning report
//! - [`Engine::advise`](pipeline::Engine::advise): best-effort advice per failed result

pub mod adapters;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::{CertifyError, ExternalServiceError, ToolError};
pub use pipeline::{Engine, SharedDocument, share};
pub use settings::EngineSettings;

// Re-export the domain's registry so callers don't need brandcheck-domain directly.
pub use brandcheck_domain::{FusionConfig, RULESET_VERSION, Registry, RuleOverrides};
