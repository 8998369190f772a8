//! Auto-fix synthesis: failed result -> minimal corrective `FixAction`s.
//!
//! Generators are keyed by rule id, separately from validators, so a rule can be checkable
//! without being fixable. Each generator reads the producing result's `details` first and only
//! falls back to heuristic resolution when no explicit element reference is available.

use crate::error::FixResolutionError;
use crate::resolve::{self, Resolved};
use crate::units::{EvalContext, Units};
use brandcheck_types::fix::{FixAction, FixKind, FixTarget, TargetResolution};
use brandcheck_types::report::ComplianceReport;
use brandcheck_types::result::ValidationResult;
use brandcheck_types::rule::{ElementMatcher, Rule};
use brandcheck_types::scene::{ElementId, SceneDocument, SceneElement};
use tracing::{debug, warn};
use uuid::Uuid;

mod color;
mod layout;
mod size;
mod text;

/// Everything a generator may look at.
pub struct FixInput<'a> {
    pub rule: &'a Rule,
    pub result: &'a ValidationResult,
    pub doc: &'a SceneDocument,
    pub units: Units,
}

pub type Proposal = Result<FixAction, FixResolutionError>;

pub trait FixGenerator: Send + Sync {
    fn rule_id(&self) -> &'static str;

    /// One proposal per violating element.
    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal>;
}

pub fn builtin_generators() -> Vec<Box<dyn FixGenerator>> {
    vec![
        Box::new(size::LogoMinSize),
        Box::new(text::TextMinSize),
        Box::new(layout::Reposition::SAFE_ZONE),
        Box::new(layout::Reposition::DISCLAIMER),
        Box::new(layout::Reposition::LOGO_POSITION),
        Box::new(color::ApprovedPalette),
        Box::new(text::MaxFontFamilies),
        Box::new(color::MaxColors),
        Box::new(color::TextContrast),
    ]
}

/// Fixes proposed for one result or one report, plus targets that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    pub fixes: Vec<FixAction>,
    pub unresolved: Vec<FixResolutionError>,
}

impl Synthesis {
    fn extend(&mut self, other: Synthesis) {
        self.fixes.extend(other.fixes);
        self.unresolved.extend(other.unresolved);
    }
}

pub struct Synthesizer {
    generators: Vec<Box<dyn FixGenerator>>,
    rules: Vec<Rule>,
    ctx: EvalContext,
}

impl Synthesizer {
    /// `rules` are the rules the report was produced with; generators read their params.
    pub fn new(rules: Vec<Rule>, ctx: EvalContext) -> Self {
        Self::with_generators(builtin_generators(), rules, ctx)
    }

    pub fn with_generators(
        generators: Vec<Box<dyn FixGenerator>>,
        rules: Vec<Rule>,
        ctx: EvalContext,
    ) -> Self {
        Self {
            generators,
            rules,
            ctx,
        }
    }

    pub fn is_fixable(&self, rule_id: &str) -> bool {
        self.generators.iter().any(|g| g.rule_id() == rule_id)
    }

    pub fn synthesize(&self, result: &ValidationResult, doc: &SceneDocument) -> Synthesis {
        if result.passed {
            return Synthesis::default();
        }
        let Some(generator) = self.generators.iter().find(|g| g.rule_id() == result.rule_id)
        else {
            debug!(rule = %result.rule_id, "rule is not auto-fixable");
            return Synthesis::default();
        };
        let Some(rule) = self.rules.iter().find(|r| r.id == result.rule_id) else {
            debug!(rule = %result.rule_id, "no rule definition for result");
            return Synthesis::default();
        };
        let units = match self.ctx.units(doc) {
            Ok(u) => u,
            Err(err) => {
                return Synthesis {
                    fixes: vec![],
                    unresolved: vec![FixResolutionError::Unfixable {
                        rule_id: rule.id.clone(),
                        reason: err.to_string(),
                    }],
                };
            }
        };

        let input = FixInput {
            rule,
            result,
            doc,
            units,
        };
        let mut out = Synthesis::default();
        for proposal in generator.generate(&input) {
            match proposal {
                Ok(fix) => {
                    debug!(rule = %fix.rule_id, element = %fix.target.element_id, kind = fix.kind.type_name(), "fix proposed");
                    out.fixes.push(fix);
                }
                Err(err) => {
                    warn!(rule = %rule.id, error = %err, "fix target unresolved");
                    out.unresolved.push(err);
                }
            }
        }
        out
    }

    /// Synthesize for every failed result, in report order.
    pub fn synthesize_report(&self, report: &ComplianceReport, doc: &SceneDocument) -> Synthesis {
        let mut out = Synthesis::default();
        for result in report.failed_results() {
            out.extend(self.synthesize(result, doc));
        }
        out
    }
}

const FIX_NAMESPACE: Uuid = Uuid::from_bytes([
    0x2f, 0x8a, 0x61, 0x0e, 0x9b, 0x47, 0x4d, 0x1c, 0xa3, 0x05, 0x7e, 0x52, 0xc4, 0x19, 0xb6,
    0x3d,
]);

/// Deterministic id: v5(namespace, rule|element|mutation).
fn fix_id(rule_id: &str, element: &ElementId, kind: &FixKind) -> String {
    let kind_key = serde_json::to_string(kind).unwrap_or_default();
    let stable_key = format!("{rule_id}|{element}|{kind_key}");
    Uuid::new_v5(&FIX_NAMESPACE, stable_key.as_bytes()).to_string()
}

fn action(input: &FixInput<'_>, target: FixTarget, kind: FixKind, description: String) -> FixAction {
    FixAction {
        id: fix_id(&input.rule.id, &target.element_id, &kind),
        rule_id: input.rule.id.clone(),
        target,
        kind,
        description,
    }
}

fn unfixable(input: &FixInput<'_>, reason: impl Into<String>) -> FixResolutionError {
    FixResolutionError::Unfixable {
        rule_id: input.rule.id.clone(),
        reason: reason.into(),
    }
}

fn into_target<'a>(
    input: &FixInput<'a>,
    resolved: Resolved<'a>,
    what: &str,
) -> Result<(&'a SceneElement, FixTarget), FixResolutionError> {
    match resolved {
        Resolved::One { element, strategy } => {
            let resolution = match strategy {
                resolve::Strategy::Explicit => TargetResolution::Explicit,
                other => TargetResolution::Heuristic {
                    strategy: other.as_str().to_string(),
                },
            };
            Ok((
                element,
                FixTarget {
                    element_id: element.id.clone(),
                    resolution,
                },
            ))
        }
        ambiguous @ Resolved::Ambiguous { .. } => Err(FixResolutionError::Ambiguous {
            rule_id: input.rule.id.clone(),
            what: what.to_string(),
            candidates: ambiguous.candidate_ids(),
        }),
        Resolved::None => Err(FixResolutionError::Missing {
            rule_id: input.rule.id.clone(),
            what: what.to_string(),
        }),
    }
}

/// Tier one: the element named by the result.
fn explicit_target<'a>(
    input: &FixInput<'a>,
    id: &ElementId,
) -> Result<(&'a SceneElement, FixTarget), FixResolutionError> {
    into_target(input, resolve::explicit(input.doc, id), &format!("element '{id}'"))
}

/// Tier two: keyword match, then optionally the smallest image.
fn heuristic_target<'a>(
    input: &FixInput<'a>,
    matcher: &ElementMatcher,
    fallback_smallest_image: bool,
) -> Result<(&'a SceneElement, FixTarget), FixResolutionError> {
    let resolved = resolve::logo_target(input.doc, matcher, fallback_smallest_image);
    into_target(input, resolved, &matcher.label)
}
