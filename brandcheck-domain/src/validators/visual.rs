use super::Outcome;
use crate::color::{Rgb, WHITE};
use crate::error::RuleEvaluationError;
use brandcheck_types::result::{ContrastViolation, ResultDetails, ValidationResult};
use brandcheck_types::rule::{AspectRatioParams, ContrastParams, Rule};
use brandcheck_types::scene::{ElementKind, SceneDocument};

/// Colour beneath the centre of the element at `index`: the topmost filled non-text element
/// below it that covers the centre, else the canvas background, else white.
pub(crate) fn backdrop_color(doc: &SceneDocument, index: usize) -> Rgb {
    let Some(el) = doc.elements.get(index) else {
        return canvas_color(doc);
    };
    let (cx, cy) = el.rendered_bounds().center();
    doc.elements[..index]
        .iter()
        .rev()
        .filter(|e| e.kind != ElementKind::Text)
        .filter(|e| e.rendered_bounds().contains_point(cx, cy))
        .find_map(|e| e.style.fill.as_deref().and_then(Rgb::parse))
        .unwrap_or_else(|| canvas_color(doc))
}

fn canvas_color(doc: &SceneDocument) -> Rgb {
    doc.background
        .as_deref()
        .and_then(Rgb::parse)
        .unwrap_or(WHITE)
}

pub(super) fn contrast_ratio(rule: &Rule, p: &ContrastParams, doc: &SceneDocument) -> Outcome {
    if !(p.min_ratio >= 1.0) {
        return Err(RuleEvaluationError::InvalidParams(format!(
            "min_ratio must be at least 1, got {}",
            p.min_ratio
        )));
    }

    let mut checked = 0usize;
    let mut violations = Vec::new();
    for (index, el) in doc.elements.iter().enumerate() {
        if el.kind != ElementKind::Text {
            continue;
        }
        let Some(fg) = el.style.fill.as_deref().and_then(Rgb::parse) else {
            continue;
        };
        checked += 1;
        let bg = backdrop_color(doc, index);
        let ratio = fg.contrast_ratio(bg);
        if ratio < p.min_ratio {
            violations.push(ContrastViolation {
                element_id: el.id.clone(),
                foreground: fg.to_hex(),
                background: bg.to_hex(),
                ratio,
                required: p.min_ratio,
            });
        }
    }

    let passed = violations.is_empty();
    let message = match violations.first() {
        None if checked == 0 => "No coloured text to check".to_string(),
        None => format!("All {checked} text elements reach {}:1 contrast", p.min_ratio),
        Some(v) => format!(
            "{} text elements below {}:1 contrast ({} is {:.2}:1)",
            violations.len(),
            p.min_ratio,
            v.element_id,
            v.ratio
        ),
    };
    let affected = violations.iter().map(|v| v.element_id.clone()).collect();

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_affected(affected)
        .with_details(ResultDetails::Contrast { violations });
    if !passed {
        result = result.with_suggestion("Darken or lighten the text against its background");
    }
    Ok(result)
}

pub(super) fn aspect_ratio(rule: &Rule, p: &AspectRatioParams, doc: &SceneDocument) -> Outcome {
    if !(doc.width > 0.0 && doc.height > 0.0) {
        return Err(RuleEvaluationError::InvalidDocument(format!(
            "canvas must have positive size, got {}x{}",
            doc.width, doc.height
        )));
    }
    if p.allowed.iter().any(|r| r.width == 0 || r.height == 0) {
        return Err(RuleEvaluationError::InvalidParams(
            "aspect ratios must have non-zero terms".to_string(),
        ));
    }

    let actual = doc.width / doc.height;
    let matched = p
        .allowed
        .iter()
        .find(|r| ((actual - r.value()) / r.value()).abs() <= p.tolerance);
    let allowed: Vec<String> = p.allowed.iter().map(|r| r.label()).collect();

    let (passed, message) = match matched {
        Some(r) => (true, format!("Canvas is {}", r.label())),
        None => (
            false,
            format!(
                "Canvas ratio {actual:.3} matches none of {}",
                allowed.join(", ")
            ),
        ),
    };

    let mut result = ValidationResult::for_rule(rule, passed, message).with_details(
        ResultDetails::AspectRatio {
            actual,
            allowed,
            tolerance: p.tolerance,
        },
    );
    if !passed {
        result = result.with_suggestion("Resize the canvas to a supported placement format");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::units::EvalContext;
    use crate::validators::evaluate;
    use brandcheck_types::rule::{AspectRatio, Severity, Validator};
    use brandcheck_types::scene::Geometry;

    fn contrast_rule() -> Rule {
        rule(
            "text-contrast",
            Severity::Error,
            Validator::ContrastRatio(ContrastParams { min_ratio: 4.5 }),
        )
    }

    #[test]
    fn text_is_measured_against_the_shape_beneath_it() {
        let mut grey = text("grey", "Inter", 20.0, Geometry::new(20.0, 20.0, 40.0, 10.0));
        grey.style.fill = Some("#777777".to_string());
        let mut outside = text("outside", "Inter", 20.0, Geometry::new(200.0, 200.0, 40.0, 10.0));
        outside.style.fill = Some("#777777".to_string());

        let d = doc(
            300.0,
            300.0,
            vec![
                shape("panel", "#000000", Geometry::new(0.0, 0.0, 100.0, 100.0)),
                grey,
                outside,
            ],
        );
        let result = evaluate(&contrast_rule(), &d, &EvalContext::default());
        assert!(!result.passed);
        let ResultDetails::Contrast { violations } = &result.details else {
            panic!("expected contrast details");
        };
        // #777 on black is about 4.7:1; on white about 4.48:1.
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].element_id.as_str(), "outside");
        assert_eq!(violations[0].background, "#ffffff");
    }

    #[test]
    fn square_canvas_matches_one_to_one() {
        let r = rule(
            "canvas-aspect-ratio",
            Severity::Warning,
            Validator::AspectRatio(AspectRatioParams {
                allowed: vec![AspectRatio {
                    width: 1,
                    height: 1,
                }],
                tolerance: 0.01,
            }),
        );
        assert!(evaluate(&r, &doc(1080.0, 1080.0, vec![]), &EvalContext::default()).passed);

        let wide = evaluate(&r, &doc(1200.0, 628.0, vec![]), &EvalContext::default());
        assert!(!wide.passed);
        assert!(wide.message.contains("1:1"));
    }
}
