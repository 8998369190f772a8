//! Clap-free settings for the engine.

use brandcheck_domain::units::DEFAULT_REFERENCE_WIDTH_MM;
use brandcheck_domain::{EvalContext, FusionConfig, RuleOverrides};
use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const DEFAULT_VISION_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_ADVISORY_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_ACTOR: &str = "brandcheck";

/// Settings for check, fix and certify passes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub policy_set: String,
    pub reference_width_mm: f64,

    // Concurrency
    /// Upper bound on rule evaluations running at once. Zero is treated as one.
    pub max_concurrency: usize,

    // External calls
    pub vision_timeout_ms: u64,
    pub advisory_timeout_ms: u64,

    // Audit
    pub actor: String,

    // Rule selection
    pub overrides: RuleOverrides,

    pub fusion: FusionConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            policy_set: "default".to_string(),
            reference_width_mm: DEFAULT_REFERENCE_WIDTH_MM,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            vision_timeout_ms: DEFAULT_VISION_TIMEOUT_MS,
            advisory_timeout_ms: DEFAULT_ADVISORY_TIMEOUT_MS,
            actor: DEFAULT_ACTOR.to_string(),
            overrides: RuleOverrides::default(),
            fusion: FusionConfig::default(),
        }
    }
}

impl EngineSettings {
    pub fn eval_context(&self) -> EvalContext {
        EvalContext {
            reference_width_mm: self.reference_width_mm,
        }
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_millis(self.vision_timeout_ms)
    }

    pub fn advisory_timeout(&self) -> Duration {
        Duration::from_millis(self.advisory_timeout_ms)
    }

    pub(crate) fn permits(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
