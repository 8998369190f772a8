use super::{FixGenerator, FixInput, Proposal, action, explicit_target, heuristic_target, unfixable};
use crate::error::FixResolutionError;
use crate::units::EPSILON;
use brandcheck_types::fix::{FixKind, FixTarget, TargetResolution};
use brandcheck_types::result::ResultDetails;
use brandcheck_types::rule::Validator;
use brandcheck_types::scene::SceneElement;

/// Scale the logo by exactly the factor needed to reach the minimum width.
pub(super) struct LogoMinSize;

impl LogoMinSize {
    fn resize(input: &FixInput<'_>, el: &SceneElement, target: FixTarget, required_px: f64) -> Proposal {
        // Scale from geometry; the applier recomputes the cached bounds from it.
        let current_px = el.geometry.bounds().width;
        if !(el.geometry.width > 0.0 && current_px > 0.0) {
            return Err(unfixable(input, format!("'{}' has no width to scale", el.label())));
        }
        let factor = required_px / current_px;
        let kind = FixKind::Resize {
            scale_x: el.geometry.scale_x * factor,
            scale_y: el.geometry.scale_y * factor,
        };
        let description = format!(
            "Scale '{}' by {factor:.2}x to {:.1} mm wide",
            el.label(),
            input.units.px_to_mm(required_px)
        );
        Ok(action(input, target, kind, description))
    }
}

impl FixGenerator for LogoMinSize {
    fn rule_id(&self) -> &'static str {
        "logo-min-size"
    }

    fn generate(&self, input: &FixInput<'_>) -> Vec<Proposal> {
        let Validator::LogoMinSize(p) = &input.rule.validator else {
            return vec![Err(unfixable(input, "rule does not carry logo size parameters"))];
        };

        if let ResultDetails::Size {
            violations,
            resolution,
        } = &input.result.details
        {
            if let Some(note) = resolution
                && !note.ambiguous_candidates.is_empty()
            {
                return vec![Err(FixResolutionError::Ambiguous {
                    rule_id: input.rule.id.clone(),
                    what: format!("{} ({})", p.logo.label, note.strategy),
                    candidates: note.ambiguous_candidates.clone(),
                })];
            }
            if !violations.is_empty() {
                return violations
                    .iter()
                    .map(|v| {
                        let (el, mut target) = explicit_target(input, &v.element_id)?;
                        // The validator itself picked this element heuristically.
                        if let Some(note) = resolution {
                            target.resolution = TargetResolution::Heuristic {
                                strategy: note.strategy.clone(),
                            };
                        }
                        Self::resize(input, el, target, v.required_px)
                    })
                    .collect();
            }
        }

        let required_px = input.units.mm_to_px(p.min_width_mm);
        let (el, target) = match heuristic_target(input, &p.logo, p.fallback_smallest_image) {
            Ok(found) => found,
            Err(err) => return vec![Err(err)],
        };
        if el.rendered_bounds().width + EPSILON >= required_px {
            return vec![];
        }
        vec![Self::resize(input, el, target, required_px)]
    }
}
