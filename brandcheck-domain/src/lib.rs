//! Domain logic: evaluate a creative against a rule set, score it, and propose fixes.
//!
//! This crate owns *what* is wrong and *what* should change. It does not own *how* changes are
//! applied to a document; that's the `brandcheck-edit` crate. Nothing in here performs I/O.

pub mod color;
mod error;
pub mod fusion;
pub mod registry;
pub mod resolve;
mod scoring;
mod synthesizer;
pub mod units;
mod validators;

pub use error::{FixResolutionError, RuleEvaluationError};
pub use fusion::{enhance, FusionConfig};
pub use registry::{Registry, RuleOverrides, RULESET_VERSION};
pub use scoring::{aggregate, rescore, ReportHeader};
pub use synthesizer::{builtin_generators, FixGenerator, FixInput, Synthesis, Synthesizer};
pub use units::{EvalContext, Units, EPSILON, MM_PER_PT};
pub use validators::{evaluate, evaluate_all};
