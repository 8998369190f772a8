use super::Outcome;
use crate::color;
use brandcheck_types::result::{ResultDetails, Usage, ValidationResult};
use brandcheck_types::rule::{CardinalityParams, Rule};
use brandcheck_types::scene::{ElementId, SceneDocument};

/// Group `(value, element)` pairs by value, keeping first-seen order.
fn tally<'a>(pairs: impl Iterator<Item = (String, &'a ElementId)>) -> Vec<Usage> {
    let mut usage: Vec<Usage> = Vec::new();
    for (value, id) in pairs {
        match usage.iter_mut().find(|u| u.value == value) {
            Some(u) => {
                u.count += 1;
                u.elements.push(id.clone());
            }
            None => usage.push(Usage {
                value,
                count: 1,
                elements: vec![id.clone()],
            }),
        }
    }
    usage
}

/// Font families of text elements in z-order. Families differing only in case are one family.
pub(crate) fn font_usage(doc: &SceneDocument) -> Vec<Usage> {
    let mut canonical: Vec<String> = Vec::new();
    let pairs = doc.elements.iter().filter_map(|el| {
        let family = el.text()?.font_family.trim();
        let spelled = match canonical
            .iter()
            .find(|c| c.eq_ignore_ascii_case(family))
        {
            Some(c) => c.clone(),
            None => {
                canonical.push(family.to_string());
                family.to_string()
            }
        };
        Some((spelled, &el.id))
    });
    tally(pairs)
}

/// Solid fill colours in z-order, canonicalised to `#rrggbb`.
pub(crate) fn fill_usage(doc: &SceneDocument) -> Vec<Usage> {
    let pairs = doc.elements.iter().filter_map(|el| {
        let fill = color::normalize(el.style.fill.as_deref()?)?;
        Some((fill, &el.id))
    });
    tally(pairs)
}

pub(super) fn max_font_families(
    rule: &Rule,
    p: &CardinalityParams,
    doc: &SceneDocument,
) -> Outcome {
    let usage = font_usage(doc);
    let fonts: Vec<String> = usage.iter().map(|u| u.value.clone()).collect();
    let passed = fonts.len() <= p.max;
    let message = if passed {
        format!("{} font families in use (limit {})", fonts.len(), p.max)
    } else {
        format!(
            "{} font families in use, limit is {}: {}",
            fonts.len(),
            p.max,
            fonts.join(", ")
        )
    };

    let mut result = ValidationResult::for_rule(rule, passed, message);
    if !passed {
        result = result
            .with_affected(usage.iter().flat_map(|u| u.elements.clone()).collect())
            .with_suggestion("Consolidate text onto fewer font families");
    }
    Ok(result.with_details(ResultDetails::Fonts {
        fonts,
        usage,
        max: p.max,
    }))
}

pub(super) fn max_colors(rule: &Rule, p: &CardinalityParams, doc: &SceneDocument) -> Outcome {
    let usage = fill_usage(doc);
    let colors: Vec<String> = usage.iter().map(|u| u.value.clone()).collect();
    let passed = colors.len() <= p.max;
    let message = if passed {
        format!("{} fill colours in use (limit {})", colors.len(), p.max)
    } else {
        format!(
            "{} fill colours in use, limit is {}",
            colors.len(),
            p.max
        )
    };

    let mut result = ValidationResult::for_rule(rule, passed, message);
    if !passed {
        result = result.with_suggestion("Merge rarely used colours into the main palette");
    }
    Ok(result.with_details(ResultDetails::Colors {
        colors,
        usage,
        max: p.max,
    }))
}
