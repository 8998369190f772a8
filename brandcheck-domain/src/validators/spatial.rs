use super::{Outcome, is_exempt};
use crate::error::RuleEvaluationError;
use crate::resolve::{self, Resolved, Strategy};
use crate::units::{EvalContext, Units};
use brandcheck_types::result::{
    BoundsViolation, ClearSpaceViolation, ResolutionNote, ResultDetails, ValidationResult,
};
use brandcheck_types::rule::{
    ClearSpaceParams, DisclaimerParams, PositioningParams, Region, Rule, SafeZoneParams,
};
use brandcheck_types::scene::{ElementId, Rect, SceneDocument, SceneElement};

/// Canvas inset by `margin_mm` on every side.
pub(crate) fn safe_area(doc: &SceneDocument, units: &Units, margin_mm: f64) -> Rect {
    let m = units.mm_to_px(margin_mm);
    Rect::new(m, m, doc.width - 2.0 * m, doc.height - 2.0 * m)
}

/// Bottom band of height `bottom_band * doc.height`, inset by the margin.
pub(crate) fn disclaimer_area(doc: &SceneDocument, units: &Units, p: &DisclaimerParams) -> Rect {
    let m = units.mm_to_px(p.margin_mm);
    let top = (doc.height * (1.0 - p.bottom_band)).max(m);
    Rect::new(m, top, doc.width - 2.0 * m, doc.height - m - top)
}

/// A fractional region scaled onto the document.
pub(crate) fn region_area(doc: &SceneDocument, region: &Region) -> Rect {
    Rect::new(
        region.left * doc.width,
        region.top * doc.height,
        (region.right - region.left) * doc.width,
        (region.bottom - region.top) * doc.height,
    )
}

/// `subject` names what was checked, `area` where it must sit.
fn bounds_result(
    rule: &Rule,
    allowed: Rect,
    checked: Vec<&SceneElement>,
    subject: &str,
    area: &str,
) -> ValidationResult {
    let violations: Vec<BoundsViolation> = checked
        .iter()
        .filter_map(|el| {
            let bounds = el.rendered_bounds();
            (!allowed.contains(&bounds)).then(|| BoundsViolation {
                element_id: el.id.clone(),
                label: el.label().to_string(),
                bounds,
                allowed,
            })
        })
        .collect();

    let passed = violations.is_empty();
    let message = if checked.is_empty() {
        format!("No {subject} to check")
    } else if passed {
        format!("All {} {subject} elements sit inside the {area}", checked.len())
    } else {
        let labels: Vec<&str> = violations.iter().map(|v| v.label.as_str()).collect();
        format!("Outside the {area}: {}", labels.join(", "))
    };
    let affected = violations.iter().map(|v| v.element_id.clone()).collect();

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_affected(affected)
        .with_details(ResultDetails::Bounds { violations });
    if !passed {
        result = result.with_suggestion(format!("Move the listed elements into the {area}"));
    }
    result
}

pub(super) fn safe_zone(
    rule: &Rule,
    p: &SafeZoneParams,
    doc: &SceneDocument,
    ctx: &EvalContext,
) -> Outcome {
    let units = ctx.units(doc)?;
    let allowed = safe_area(doc, &units, p.margin_mm);
    if allowed.width <= 0.0 || allowed.height <= 0.0 {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "a {} mm margin leaves no safe area",
            p.margin_mm
        )));
    }

    let checked = doc
        .elements
        .iter()
        .filter(|e| !is_exempt(e, &p.exempt_keywords))
        .collect();
    Ok(bounds_result(rule, allowed, checked, "layout", "safe zone"))
}

pub(super) fn disclaimer_position(
    rule: &Rule,
    p: &DisclaimerParams,
    doc: &SceneDocument,
    ctx: &EvalContext,
) -> Outcome {
    if !(p.bottom_band > 0.0 && p.bottom_band <= 1.0) {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "bottom_band must be in (0, 1], got {}",
            p.bottom_band
        )));
    }
    let units = ctx.units(doc)?;
    let allowed = disclaimer_area(doc, &units, p);
    if allowed.width <= 0.0 || allowed.height <= 0.0 {
        return Err(RuleEvaluationError::InvalidParams(
            "disclaimer band is empty after applying the margin".to_string(),
        ));
    }

    let checked = doc
        .elements
        .iter()
        .filter(|e| p.disclaimer.matches(e))
        .collect();
    Ok(bounds_result(
        rule,
        allowed,
        checked,
        &p.disclaimer.label,
        "disclaimer band",
    ))
}

pub(super) fn element_positioning(
    rule: &Rule,
    p: &PositioningParams,
    doc: &SceneDocument,
) -> Outcome {
    let r = &p.region;
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    if !(in_unit(r.left) && in_unit(r.top) && in_unit(r.right) && in_unit(r.bottom))
        || r.left >= r.right
        || r.top >= r.bottom
    {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "region {r:?} is not a non-empty fraction of the canvas"
        )));
    }

    let allowed = region_area(doc, r);
    let checked = doc.elements.iter().filter(|e| p.target.matches(e)).collect();
    Ok(bounds_result(
        rule,
        allowed,
        checked,
        &p.target.label,
        "allowed region",
    ))
}

pub(super) fn logo_clear_space(
    rule: &Rule,
    p: &ClearSpaceParams,
    doc: &SceneDocument,
    ctx: &EvalContext,
) -> Outcome {
    let units = ctx.units(doc)?;
    if !(p.clearance_mm >= 0.0) {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "clearance_mm must not be negative, got {}",
            p.clearance_mm
        )));
    }

    // Every candidate is checked; several candidates are noted rather than picked between.
    let (logos, resolution): (Vec<&SceneElement>, Option<ResolutionNote>) =
        match resolve::logo_target(doc, &p.logo, p.fallback_smallest_image) {
            Resolved::None => {
                return Ok(ValidationResult::for_rule(
                    rule,
                    true,
                    "No logo to check clear space for",
                ));
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
                let note = ResolutionNote {
                    strategy: strategy.as_str().to_string(),
                    ambiguous_candidates: candidates.iter().map(|e| e.id.clone()).collect(),
                };
                (candidates, Some(note))
            }
        };

    let clearance_px = units.mm_to_px(p.clearance_mm);
    let mut violations = Vec::new();
    for logo in &logos {
        let logo_bounds = logo.rendered_bounds();
        let zone = logo_bounds.expand(clearance_px);
        for e in &doc.elements {
            if logos.iter().any(|l| l.id == e.id) || is_exempt(e, &p.exempt_keywords) {
                continue;
            }
            let bounds = e.rendered_bounds();
            // Backdrops the logo sits on don't crowd it.
            if bounds.contains(&logo_bounds) || !zone.intersects(&bounds) {
                continue;
            }
            violations.push(ClearSpaceViolation {
                logo_id: logo.id.clone(),
                element_id: e.id.clone(),
                label: e.label().to_string(),
                bounds,
                gap_mm: units.px_to_mm(logo_bounds.gap(&bounds)),
            });
        }
    }

    let subject = match logos.as_slice() {
        [only] => format!("logo '{}'", only.label()),
        many => format!("{} logos", many.len()),
    };
    let mut affected: Vec<ElementId> = Vec::new();
    for v in &violations {
        if !affected.contains(&v.element_id) {
            affected.push(v.element_id.clone());
        }
    }

    let passed = violations.is_empty();
    let message = if passed {
        format!("Nothing within {} mm of the {subject}", p.clearance_mm)
    } else {
        let labels: Vec<String> = violations
            .iter()
            .map(|v| format!("{} (near '{}')", v.label, v.logo_id))
            .collect();
        format!(
            "Within {} mm of the {subject}: {}",
            p.clearance_mm,
            labels.join(", ")
        )
    };

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_affected(affected)
        .with_details(ResultDetails::ClearSpace {
            logos: logos.iter().map(|l| l.id.clone()).collect(),
            clearance_mm: p.clearance_mm,
            violations,
            resolution,
        });
    if !passed {
        result = result.with_suggestion("Move neighbouring elements away from the logo");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::units::EvalContext;
    use crate::validators::evaluate;
    use brandcheck_types::result::ResultDetails;
    use brandcheck_types::rule::{
        ClearSpaceParams, DisclaimerParams, ElementMatcher, PositioningParams, Region, Rule,
        SafeZoneParams, Severity, Validator,
    };
    use brandcheck_types::scene::{ElementKind, Geometry};

    // 285 px wide document: 1 px == 1 mm.
    fn ctx() -> EvalContext {
        EvalContext {
            reference_width_mm: 285.0,
        }
    }

    #[test]
    fn safe_zone_flags_elements_in_the_margin_and_skips_backgrounds() {
        let r = rule(
            "safe-zone",
            Severity::Error,
            Validator::SafeZone(SafeZoneParams {
                margin_mm: 10.0,
                exempt_keywords: vec!["background".to_string()],
            }),
        );
        let d = doc(
            285.0,
            285.0,
            vec![
                shape("background", "#ffffff", Geometry::new(0.0, 0.0, 285.0, 285.0)),
                text("inside", "Inter", 20.0, Geometry::new(10.0, 10.0, 100.0, 30.0)),
                text("edge", "Inter", 20.0, Geometry::new(5.0, 100.0, 100.0, 30.0)),
            ],
        );
        let result = evaluate(&r, &d, &ctx());
        assert!(!result.passed);
        let ResultDetails::Bounds { violations } = &result.details else {
            panic!("expected bounds details");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].element_id.as_str(), "edge");
        assert_eq!(violations[0].allowed.left, 10.0);
    }

    #[test]
    fn disclaimer_must_sit_in_bottom_band() {
        let r = rule(
            "disclaimer-position",
            Severity::Warning,
            Validator::DisclaimerPosition(DisclaimerParams {
                disclaimer: ElementMatcher::new("disclaimer", &["disclaimer"], &[ElementKind::Text]),
                bottom_band: 0.2,
                margin_mm: 5.0,
            }),
        );
        let high = doc(
            285.0,
            500.0,
            vec![text("disclaimer", "Inter", 10.0, Geometry::new(20.0, 100.0, 200.0, 20.0))],
        );
        assert!(!evaluate(&r, &high, &ctx()).passed);

        let low = doc(
            285.0,
            500.0,
            vec![text("disclaimer", "Inter", 10.0, Geometry::new(20.0, 450.0, 200.0, 20.0))],
        );
        assert!(evaluate(&r, &low, &ctx()).passed);

        let none = doc(285.0, 500.0, vec![]);
        let result = evaluate(&r, &none, &ctx());
        assert!(result.passed);
        assert!(result.message.contains("No disclaimer to check"));
    }

    #[test]
    fn clear_space_ignores_backdrop_and_flags_neighbour() {
        let r = rule(
            "logo-clear-space",
            Severity::Warning,
            Validator::LogoClearSpace(ClearSpaceParams {
                logo: ElementMatcher::new("logo", &["logo"], &[ElementKind::Image]),
                clearance_mm: 5.0,
                fallback_smallest_image: false,
                exempt_keywords: vec![],
            }),
        );
        let d = doc(
            285.0,
            285.0,
            vec![
                shape("panel", "#f5f5f5", Geometry::new(0.0, 0.0, 200.0, 200.0)),
                image("logo", "logo", Geometry::new(50.0, 50.0, 40.0, 20.0)),
                text("tagline", "Inter", 10.0, Geometry::new(93.0, 50.0, 60.0, 20.0)),
                text("far", "Inter", 10.0, Geometry::new(150.0, 150.0, 20.0, 20.0)),
            ],
        );
        let result = evaluate(&r, &d, &ctx());
        assert!(!result.passed);
        let ResultDetails::ClearSpace { violations, .. } = &result.details else {
            panic!("expected clear-space details");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].element_id.as_str(), "tagline");
        assert!((violations[0].gap_mm - 3.0).abs() < 1e-9);
    }

    fn clear_space_rule(fallback_smallest_image: bool) -> Rule {
        rule(
            "logo-clear-space",
            Severity::Warning,
            Validator::LogoClearSpace(ClearSpaceParams {
                logo: ElementMatcher::new("logo", &["logo"], &[ElementKind::Image]),
                clearance_mm: 3.0,
                fallback_smallest_image,
                exempt_keywords: vec!["background".to_string()],
            }),
        )
    }

    #[test]
    fn clear_space_checks_every_matching_logo() {
        // 1080 px wide: 3 mm is about 11.4 px.
        let d = doc(
            1080.0,
            1080.0,
            vec![
                image("logo-a", "logo-a", Geometry::new(100.0, 100.0, 100.0, 50.0)),
                image("logo-b", "logo-b", Geometry::new(700.0, 100.0, 100.0, 50.0)),
                shape("badge", "#e30613", Geometry::new(805.0, 100.0, 40.0, 40.0)),
            ],
        );
        let result = evaluate(&clear_space_rule(false), &d, &EvalContext::default());

        assert!(!result.passed, "{}", result.message);
        assert_eq!(result.affected_elements.len(), 1);
        assert_eq!(result.affected_elements[0].as_str(), "badge");
        let ResultDetails::ClearSpace {
            logos,
            violations,
            resolution,
            ..
        } = &result.details
        else {
            panic!("expected clear-space details, got {:?}", result.details);
        };
        let logo_ids: Vec<&str> = logos.iter().map(|l| l.as_str()).collect();
        assert_eq!(logo_ids, vec!["logo-a", "logo-b"]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].logo_id.as_str(), "logo-b");
        assert_eq!(violations[0].element_id.as_str(), "badge");

        let note = resolution.as_ref().expect("ambiguous logos are noted");
        assert_eq!(note.strategy, "keyword_match");
        let candidates: Vec<&str> = note.ambiguous_candidates.iter().map(|c| c.as_str()).collect();
        assert_eq!(candidates, vec!["logo-a", "logo-b"]);
    }

    #[test]
    fn clear_space_falls_back_to_smallest_image() {
        let d = doc(
            1080.0,
            1080.0,
            vec![
                image("hero", "hero", Geometry::new(0.0, 400.0, 1080.0, 600.0)),
                image("mark", "brandmark", Geometry::new(100.0, 100.0, 60.0, 60.0)),
                text("tagline", "Inter", 20.0, Geometry::new(165.0, 100.0, 200.0, 30.0)),
            ],
        );

        let without = evaluate(&clear_space_rule(false), &d, &EvalContext::default());
        assert!(without.passed);
        assert!(without.message.contains("No logo"));

        let with = evaluate(&clear_space_rule(true), &d, &EvalContext::default());
        assert!(!with.passed, "{}", with.message);
        let ResultDetails::ClearSpace {
            logos, resolution, ..
        } = &with.details
        else {
            panic!("expected clear-space details, got {:?}", with.details);
        };
        assert_eq!(logos[0].as_str(), "mark");
        let note = resolution.as_ref().expect("heuristic pick is noted");
        assert_eq!(note.strategy, "smallest_image");
        assert!(note.ambiguous_candidates.is_empty());
        assert_eq!(with.affected_elements[0].as_str(), "tagline");
    }

    #[test]
    fn positioning_checks_region_fraction() {
        let r = rule(
            "logo-position",
            Severity::Info,
            Validator::ElementPositioning(PositioningParams {
                target: ElementMatcher::new("logo", &["logo"], &[]),
                region: Region {
                    left: 0.0,
                    top: 0.0,
                    right: 1.0,
                    bottom: 0.25,
                },
            }),
        );
        let d = doc(
            400.0,
            400.0,
            vec![image("logo", "logo", Geometry::new(10.0, 200.0, 50.0, 50.0))],
        );
        let result = evaluate(&r, &d, &ctx());
        assert!(!result.passed);
        assert_eq!(result.affected_elements[0].as_str(), "logo");

        let bad = rule(
            "logo-position",
            Severity::Info,
            Validator::ElementPositioning(PositioningParams {
                target: ElementMatcher::new("logo", &["logo"], &[]),
                region: Region {
                    left: 0.5,
                    top: 0.0,
                    right: 0.5,
                    bottom: 1.0,
                },
            }),
        );
        assert!(matches!(
            evaluate(&bad, &d, &ctx()).details,
            ResultDetails::Error { .. }
        ));
    }
}
