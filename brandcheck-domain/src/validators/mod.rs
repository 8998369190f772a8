//! Validator dispatch: one pure function per `Validator` variant.

use crate::error::RuleEvaluationError;
use crate::units::EvalContext;
use brandcheck_types::result::{ResultDetails, ValidationResult};
use brandcheck_types::rule::{DeferredParams, Rule, Validator};
use brandcheck_types::scene::{SceneDocument, SceneElement};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

pub(crate) mod aggregate;
mod membership;
mod size;
pub(crate) mod spatial;
pub(crate) mod visual;

type Outcome = Result<ValidationResult, RuleEvaluationError>;

/// Evaluate one rule. Never fails: validator errors and panics become a failed result.
pub fn evaluate(rule: &Rule, doc: &SceneDocument, ctx: &EvalContext) -> ValidationResult {
    guarded(rule, || dispatch(rule, doc, ctx))
}

fn guarded(rule: &Rule, validate: impl FnOnce() -> Outcome) -> ValidationResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(validate))
        .unwrap_or_else(|payload| Err(RuleEvaluationError::Panicked(panic_message(&*payload))));

    match outcome {
        Ok(result) => {
            debug!(rule = %rule.id, passed = result.passed, "rule evaluated");
            result
        }
        Err(err) => {
            warn!(rule = %rule.id, error = %err, "rule evaluation failed");
            ValidationResult::for_rule(rule, false, format!("Rule could not be evaluated: {err}"))
                .with_details(ResultDetails::Error {
                    error: err.to_string(),
                })
        }
    }
}

/// Evaluate rules sequentially, in order. One result per rule.
pub fn evaluate_all(rules: &[Rule], doc: &SceneDocument, ctx: &EvalContext) -> Vec<ValidationResult> {
    rules.iter().map(|r| evaluate(r, doc, ctx)).collect()
}

fn dispatch(rule: &Rule, doc: &SceneDocument, ctx: &EvalContext) -> Outcome {
    match &rule.validator {
        Validator::LogoMinSize(p) => size::logo_min_size(rule, p, doc, ctx),
        Validator::TextMinSize(p) => size::text_min_size(rule, p, doc, ctx),
        Validator::MandatoryElements(p) => membership::mandatory_elements(rule, p, doc),
        Validator::ApprovedPalette(p) => membership::approved_palette(rule, p, doc),
        Validator::SafeZone(p) => spatial::safe_zone(rule, p, doc, ctx),
        Validator::DisclaimerPosition(p) => spatial::disclaimer_position(rule, p, doc, ctx),
        Validator::LogoClearSpace(p) => spatial::logo_clear_space(rule, p, doc, ctx),
        Validator::ElementPositioning(p) => spatial::element_positioning(rule, p, doc),
        Validator::MaxFontFamilies(p) => aggregate::max_font_families(rule, p, doc),
        Validator::MaxColors(p) => aggregate::max_colors(rule, p, doc),
        Validator::ContrastRatio(p) => visual::contrast_ratio(rule, p, doc),
        Validator::AspectRatio(p) => visual::aspect_ratio(rule, p, doc),
        Validator::VisionDeferred(p) => Ok(deferred(rule, p)),
    }
}

/// Placeholder that passes until vision analysis supersedes it.
fn deferred(rule: &Rule, p: &DeferredParams) -> ValidationResult {
    ValidationResult::for_rule(
        rule,
        true,
        format!("Awaiting vision analysis ({})", p.check.as_str()),
    )
    .with_details(ResultDetails::Deferred { check: p.check })
}

fn is_exempt(el: &SceneElement, keywords: &[String]) -> bool {
    keywords.iter().any(|k| el.matches_keyword(k))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
