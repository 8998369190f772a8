use super::{FixGenerator, FixInput, Proposal, action, explicit_target, unfixable};
use brandcheck_types::fix::FixKind;
use brandcheck_types::result::ResultDetails;
use brandcheck_types::scene::Rect;

/// Move an element the shortest distance that puts it inside the allowed area.
///
/// Returns the new origin, or `None` when the element is larger than the area.
fn clamp_into(bounds: &Rect, allowed: &Rect) -> Option<(f64, f64)> {
    const EPS: f64 = 1e-9;
    if bounds.width > allowed.width + EPS || bounds.height > allowed.height + EPS {
        return None;
    }
    let left = bounds
        .left
        .min(allowed.right() - bounds.width)
        .max(allowed.left);
    let top = bounds
        .top
        .min(allowed.bottom() - bounds.height)
        .max(allowed.top);
    Some((left, top))
}

/// Shared generator for every rule that reports `Bounds` violations.
pub(super) struct Reposition {
    rule_id: &'static str,
    area: &'static str,
}

impl Reposition {
    pub(super) const SAFE_ZONE: Self = Self {
        rule_id: "safe-zone",
        area: "safe zone",
    };
    pub(super) const DISCLAIMER: Self = Self {
        rule_id: "disclaimer-position",
        area: "disclaimer band",
    };
    pub(super) const LOGO_POSITION: Self = Self {
        rule_id: "logo-position",
        area: "logo region",
    };
}

impl FixGenerator for Reposition {
    fn rule_id(&self) -> &'static str {
        self.rule_id
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let ResultDetails::Bounds { violations } = &input.result.details else {
            return vec![];
        };
        violations
            .iter()
            .map(|v| {
                let (el, target) = explicit_target(input, &v.element_id)?;
                // Applying a fix recomputes the cached bounds from geometry, so place the
                // geometry, not a possibly stale cache.
                let bounds = el.geometry.bounds();
                let Some((left, top)) = clamp_into(&bounds, &v.allowed) else {
                    return Err(unfixable(
                        input,
                        format!("'{}' is larger than the {}", el.label(), self.area),
                    ));
                };
                let kind = FixKind::Reposition { left, top };
                let description = format!(
                    "Move '{}' into the {} ({left:.1}, {top:.1})",
                    el.label(),
                    self.area
                );
                Ok(action(input, target, kind, description))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_moves_only_the_violating_axis() {
        let allowed = Rect::new(10.0, 10.0, 80.0, 80.0);
        let bounds = Rect::new(85.0, 40.0, 20.0, 10.0);
        assert_eq!(clamp_into(&bounds, &allowed), Some((70.0, 40.0)));
    }

    #[test]
    fn clamp_refuses_oversized_elements() {
        let allowed = Rect::new(10.0, 10.0, 80.0, 80.0);
        assert_eq!(clamp_into(&Rect::new(0.0, 0.0, 100.0, 10.0), &allowed), None);
    }
}
