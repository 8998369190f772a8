use super::{FixGenerator, FixInput, Proposal, action, explicit_target, unfixable};
use crate::color::{Rgb, best_text_color};
use brandcheck_types::fix::FixKind;
use brandcheck_types::result::{ColorProperty, ResultDetails, Usage};

/// Recolour to the nearest approved colour.
pub(super) struct ApprovedPalette;

impl FixGenerator for ApprovedPalette {
    fn rule_id(&self) -> &'static str {
        "approved-palette"
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let ResultDetails::Palette { violations, .. } = &input.result.details else {
            return vec![];
        };
        violations
            .iter()
            .map(|v| {
                let (el, target) = explicit_target(input, &v.element_id)?;
                let kind = FixKind::Recolor {
                    property: v.property,
                    color: v.nearest.clone(),
                };
                let description = format!(
                    "Recolour {} of '{}' from {} to {}",
                    property_name(v.property),
                    el.label(),
                    v.color,
                    v.nearest
                );
                Ok(action(input, target, kind, description))
            })
            .collect()
    }
}

/// Fold the least used fills into the nearest of the `max` most used ones.
pub(super) struct MaxColors;

impl MaxColors {
    /// Usage split into (kept, dropped); kept is the `max` most used, first-seen wins ties.
    fn split(usage: &[Usage], max: usize) -> (Vec<&Usage>, Vec<&Usage>) {
        let mut ranked: Vec<&Usage> = usage.iter().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        let dropped = ranked.split_off(max.min(ranked.len()));
        (ranked, dropped)
    }
}

impl FixGenerator for MaxColors {
    fn rule_id(&self) -> &'static str {
        "max-colors"
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let ResultDetails::Colors { usage, max, .. } = &input.result.details else {
            return vec![];
        };
        if *max == 0 {
            return vec![Err(unfixable(input, "a limit of zero colours cannot be met"))];
        }

        let (kept, dropped) = Self::split(usage, *max);
        let palette: Vec<Rgb> = kept.iter().filter_map(|u| Rgb::parse(&u.value)).collect();

        dropped
            .iter()
            .flat_map(|u| u.elements.iter().map(move |id| (*u, id)))
            .map(|(u, id)| {
                let (el, target) = explicit_target(input, id)?;
                let nearest = Rgb::parse(&u.value)
                    .and_then(|c| c.nearest(&palette))
                    .map(|(i, _)| palette[i])
                    .ok_or_else(|| unfixable(input, format!("no kept colour for {}", u.value)))?;
                let kind = FixKind::Recolor {
                    property: ColorProperty::Fill,
                    color: nearest.to_hex(),
                };
                let description = format!(
                    "Recolour fill of '{}' from {} to {}",
                    el.label(),
                    u.value,
                    nearest
                );
                Ok(action(input, target, kind, description))
            })
            .collect()
    }
}

/// Set text fill to black or white, whichever contrasts more with the backdrop.
pub(super) struct TextContrast;

impl FixGenerator for TextContrast {
    fn rule_id(&self) -> &'static str {
        "text-contrast"
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let ResultDetails::Contrast { violations } = &input.result.details else {
            return vec![];
        };
        violations
            .iter()
            .map(|v| {
                let (el, target) = explicit_target(input, &v.element_id)?;
                let background = Rgb::parse(&v.background).ok_or_else(|| {
                    unfixable(input, format!("unreadable background {}", v.background))
                })?;
                let color = best_text_color(background);
                let ratio = color.contrast_ratio(background);
                if ratio < v.required {
                    return Err(unfixable(
                        input,
                        format!(
                            "no text colour reaches {}:1 on {} (best {ratio:.2}:1)",
                            v.required, v.background
                        ),
                    ));
                }
                let kind = FixKind::Recolor {
                    property: ColorProperty::Fill,
                    color: color.to_hex(),
                };
                let description = format!(
                    "Recolour text '{}' to {color} for {ratio:.2}:1 contrast",
                    el.label()
                );
                Ok(action(input, target, kind, description))
            })
            .collect()
    }
}

fn property_name(property: ColorProperty) -> &'static str {
    match property {
        ColorProperty::Fill => "fill",
        ColorProperty::Stroke => "stroke",
    }
}
