use super::{FixGenerator, FixInput, Proposal, action, explicit_target, unfixable};
use brandcheck_types::fix::{FixKind, PropertyChange};
use brandcheck_types::result::{ResultDetails, Usage};

/// Raise font size to exactly the minimum.
pub(super) struct TextMinSize;

impl FixGenerator for TextMinSize {
    fn rule_id(&self) -> &'static str {
        "text-min-size"
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let ResultDetails::Size { violations, .. } = &input.result.details else {
            return vec![];
        };
        violations
            .iter()
            .map(|v| {
                let (el, target) = explicit_target(input, &v.element_id)?;
                if el.text().is_none() {
                    return Err(unfixable(input, format!("'{}' is not a text node", el.label())));
                }
                let scale_y = el.geometry.scale_y;
                if !(scale_y > 0.0) {
                    return Err(unfixable(input, format!("'{}' has zero vertical scale", el.label())));
                }
                let font_size = v.required_px / scale_y;
                let kind = FixKind::AdjustProperty {
                    change: PropertyChange::FontSize(font_size),
                };
                let description = format!(
                    "Set font size of '{}' to {font_size:.2} so it renders at {} pt",
                    el.label(),
                    v.required
                );
                Ok(action(input, target, kind, description))
            })
            .collect()
    }
}

/// Most used family; ties go to the family seen first in z-order.
fn dominant(usage: &[Usage]) -> Option<&Usage> {
    usage
        .iter()
        .fold(None, |best: Option<&Usage>, u| match best {
            Some(b) if b.count >= u.count => Some(b),
            _ => Some(u),
        })
}

/// Move every text node onto the most frequent family.
pub(super) struct MaxFontFamilies;

impl FixGenerator for MaxFontFamilies {
    fn rule_id(&self) -> &'static str {
        "max-font-families"
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let ResultDetails::Fonts { usage, .. } = &input.result.details else {
            return vec![];
        };
        let Some(keep) = dominant(usage) else {
            return vec![];
        };

        usage
            .iter()
            .filter(|u| u.value != keep.value)
            .flat_map(|u| u.elements.iter().map(move |id| (u, id)))
            .map(|(u, id)| {
                let (el, target) = explicit_target(input, id)?;
                let kind = FixKind::AdjustProperty {
                    change: PropertyChange::FontFamily(keep.value.clone()),
                };
                let description = format!(
                    "Change font of '{}' from {} to {}",
                    el.label(),
                    u.value,
                    keep.value
                );
                Ok(action(input, target, kind, description))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandcheck_types::scene::ElementId;

    fn usage(value: &str, count: usize) -> Usage {
        Usage {
            value: value.to_string(),
            count,
            elements: (0..count).map(|i| ElementId::new(format!("{value}-{i}"))).collect(),
        }
    }

    #[test]
    fn dominant_prefers_first_seen_on_tie() {
        let u = vec![usage("Inter", 2), usage("Georgia", 2), usage("Arial", 1)];
        assert_eq!(dominant(&u).map(|u| u.value.as_str()), Some("Inter"));

        let u = vec![usage("Inter", 1), usage("Georgia", 3)];
        assert_eq!(dominant(&u).map(|u| u.value.as_str()), Some("Georgia"));
        assert!(dominant(&[]).is_none());
    }
}
