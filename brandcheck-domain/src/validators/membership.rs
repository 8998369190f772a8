use super::Outcome;
use crate::color::Rgb;
use crate::error::RuleEvaluationError;
use brandcheck_types::result::{ColorProperty, ColorViolation, ResultDetails, ValidationResult};
use brandcheck_types::rule::{MandatoryParams, PaletteParams, Rule};
use brandcheck_types::scene::SceneDocument;
use tracing::debug;

pub(super) fn mandatory_elements(rule: &Rule, p: &MandatoryParams, doc: &SceneDocument) -> Outcome {
    let (present, missing): (Vec<_>, Vec<_>) = p
        .required
        .iter()
        .partition(|m| doc.elements.iter().any(|e| m.matches(e)));

    let present: Vec<String> = present.iter().map(|m| m.label.clone()).collect();
    let missing: Vec<String> = missing.iter().map(|m| m.label.clone()).collect();

    let passed = missing.is_empty();
    let message = if passed {
        format!("All {} mandatory elements present", present.len())
    } else {
        format!("Missing mandatory elements: {}", missing.join(", "))
    };

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_details(ResultDetails::Missing { missing, present });
    if !passed {
        result = result.with_suggestion("Add the missing elements to the creative");
    }
    Ok(result)
}

pub(super) fn approved_palette(rule: &Rule, p: &PaletteParams, doc: &SceneDocument) -> Outcome {
    let palette: Vec<Rgb> = p
        .colors
        .iter()
        .map(|c| {
            Rgb::parse(c).ok_or_else(|| {
                RuleEvaluationError::InvalidParams(format!("palette colour '{c}' is not a colour"))
            })
        })
        .collect::<Result<_, _>>()?;
    if palette.is_empty() {
        return Err(RuleEvaluationError::InvalidParams(
            "palette must not be empty".to_string(),
        ));
    }

    let mut violations = Vec::new();
    for el in &doc.elements {
        let props = [
            (ColorProperty::Fill, el.style.fill.as_deref()),
            (ColorProperty::Stroke, el.style.stroke.as_deref()),
        ];
        for (property, value) in props {
            let Some(value) = value else {
                continue;
            };
            let Some(rgb) = Rgb::parse(value) else {
                debug!(element = %el.id, value, "skipping non-solid colour");
                continue;
            };
            let Some((idx, distance)) = rgb.nearest(&palette) else {
                continue;
            };
            if distance > p.tolerance {
                violations.push(ColorViolation {
                    element_id: el.id.clone(),
                    property,
                    color: rgb.to_hex(),
                    nearest: palette[idx].to_hex(),
                    distance,
                });
            }
        }
    }

    let passed = violations.is_empty();
    let message = if passed {
        "All colours are within the approved palette".to_string()
    } else {
        let mut off: Vec<&str> = violations.iter().map(|v| v.color.as_str()).collect();
        off.sort_unstable();
        off.dedup();
        format!("Colours outside the approved palette: {}", off.join(", "))
    };
    let mut affected: Vec<_> = violations.iter().map(|v| v.element_id.clone()).collect();
    affected.dedup();

    let mut result = ValidationResult::for_rule(rule, passed, message)
        .with_affected(affected)
        .with_details(ResultDetails::Palette {
            violations,
            palette: palette.iter().map(|c| c.to_hex()).collect(),
        });
    if !passed {
        result = result.with_suggestion("Swap off-palette colours for the nearest brand colour");
    }
    Ok(result)
}
