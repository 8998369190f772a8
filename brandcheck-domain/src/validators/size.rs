use super::Outcome;
use crate::error::RuleEvaluationError;
use crate::resolve::{self, Resolved, Strategy};
use crate::units::{EPSILON, EvalContext};
use brandcheck_types::result::{
    ResolutionNote, ResultDetails, SizeUnit, SizeViolation, ValidationResult,
};
use brandcheck_types::rule::{LogoSizeParams, Rule, TextSizeParams};
use brandcheck_types::scene::{ElementKind, SceneDocument, SceneElement};

pub(super) fn logo_min_size(
    rule: &Rule,
    p: &LogoSizeParams,
    doc: &SceneDocument,
    ctx: &EvalContext,
) -> Outcome {
    let units = ctx.units(doc)?;
    if !(p.min_width_mm > 0.0) {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "min_width_mm must be positive, got {}",
            p.min_width_mm
        )));
    }

    let (logos, resolution): (Vec<&SceneElement>, Option<ResolutionNote>) =
        match resolve::logo_target(doc, &p.logo, p.fallback_smallest_image) {
            Resolved::None => {
                return Ok(ValidationResult::for_rule(rule, false, "No logo found")
                    .with_suggestion(format!(
                        "Add the brand logo at least {} mm wide",
                        p.min_width_mm
                    ))
                    .with_details(ResultDetails::Size {
                        violations: vec![],
                        resolution: None,
                    }));
            }
            Resolved::One { element, strategy } => {
                let note = (strategy != Strategy::KeywordMatch).then(|| ResolutionNote {
                    strategy: strategy.as_str().to_string(),
                    ambiguous_candidates: vec![],
                });
                (vec![element], note)
            }
            Resolved::Ambiguous {
                candidates,
                strategy,
            } => {
                let note = (strategy == Strategy::SmallestImage).then(|| ResolutionNote {
                    strategy: strategy.as_str().to_string(),
                    ambiguous_candidates: candidates.iter().map(|e| e.id.clone()).collect(),
                });
                (candidates, note)
            }
        };

    let required_px = units.mm_to_px(p.min_width_mm);
    let mut violations = Vec::new();
    for logo in &logos {
        let current_px = logo.rendered_bounds().width;
        let current = units.px_to_mm(current_px);
        if current + EPSILON < p.min_width_mm {
            violations.push(SizeViolation {
                element_id: logo.id.clone(),
                label: logo.label().to_string(),
                unit: SizeUnit::Millimetres,
                current,
                required: p.min_width_mm,
                current_px,
                required_px,
            });
        }
    }

    let passed = violations.is_empty();
    let message = match violations.first() {
        None => format!(
            "Logo meets the {} mm minimum width ({} checked)",
            p.min_width_mm,
            logos.len()
        ),
        Some(v) => format!(
            "Logo '{}' is {:.2} mm wide; minimum is {} mm",
            v.label, v.current, p.min_width_mm
        ),
    };
    let affected = violations.iter().map(|v| v.element_id.clone()).collect();

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_affected(affected)
        .with_details(ResultDetails::Size {
            violations,
            resolution,
        });
    if !passed {
        result = result.with_suggestion(format!(
            "Scale the logo up to at least {} mm wide",
            p.min_width_mm
        ));
    }
    Ok(result)
}

pub(super) fn text_min_size(
    rule: &Rule,
    p: &TextSizeParams,
    doc: &SceneDocument,
    ctx: &EvalContext,
) -> Outcome {
    let units = ctx.units(doc)?;
    if !(p.min_font_size_pt > 0.0) {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "min_font_size_pt must be positive, got {}",
            p.min_font_size_pt
        )));
    }

    let required_px = units.pt_to_px(p.min_font_size_pt);
    let mut checked = 0usize;
    let mut violations = Vec::new();
    for el in doc.elements_of_kind(ElementKind::Text) {
        let Some(text) = el.text() else {
            continue;
        };
        checked += 1;
        let current_px = text.font_size * el.geometry.scale_y;
        let current = units.px_to_pt(current_px);
        if current + EPSILON < p.min_font_size_pt {
            violations.push(SizeViolation {
                element_id: el.id.clone(),
                label: el.label().to_string(),
                unit: SizeUnit::Points,
                current,
                required: p.min_font_size_pt,
                current_px,
                required_px,
            });
        }
    }

    let passed = violations.is_empty();
    let message = if checked == 0 {
        "No text elements to check".to_string()
    } else if passed {
        format!(
            "All {checked} text elements are at least {} pt",
            p.min_font_size_pt
        )
    } else {
        format!(
            "{} of {checked} text elements are smaller than {} pt",
            violations.len(),
            p.min_font_size_pt
        )
    };
    let affected = violations.iter().map(|v| v.element_id.clone()).collect();

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_affected(affected)
        .with_details(ResultDetails::Size {
            violations,
            resolution: None,
        });
    if !passed {
        result = result.with_suggestion(format!(
            "Increase font size to at least {} pt",
            p.min_font_size_pt
        ));
    }
    Ok(result)
}
