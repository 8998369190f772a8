//! Fix applier for brandcheck scene documents.
//!
//! Responsibilities:
//! - Resolve a fix target to exactly one element.
//! - Validate the mutation, then apply it (never partially).
//! - Render a unified diff of the document before and after.
//!
//! Callers own sequencing. Fixes for one document must be applied one at a time by a single
//! writer; nothing in here locks.

use anyhow::Context;
use brandcheck_types::fix::{FixAction, FixKind, FixOutcome, FixStatus, PropertyChange};
use brandcheck_types::result::ColorProperty;
use brandcheck_types::scene::{ElementKind, SceneDocument, SceneElement};
use diffy::PatchFormatter;
use tracing::{debug, warn};

mod error;

pub use error::ApplyError;

/// Apply one fix. Never fails: an unresolvable or invalid fix is reported as skipped and
/// leaves `doc` untouched.
pub fn apply(fix: &FixAction, doc: &mut SceneDocument) -> FixOutcome {
    let mut outcome = FixOutcome {
        fix_id: fix.id.clone(),
        rule_id: fix.rule_id.clone(),
        element_id: fix.target.element_id.clone(),
        status: FixStatus::Applied,
        reason: None,
    };

    match try_apply(fix, doc) {
        Ok(()) => {
            debug!(fix = %fix.id, element = %fix.target.element_id, kind = fix.kind.type_name(), "fix applied");
        }
        Err(err) => {
            warn!(fix = %fix.id, element = %fix.target.element_id, error = %err, "fix skipped");
            outcome.status = FixStatus::Skipped;
            outcome.reason = Some(err.to_string());
        }
    }
    outcome
}

/// Apply fixes in order against one document.
pub fn apply_all(fixes: &[FixAction], doc: &mut SceneDocument) -> Vec<FixOutcome> {
    fixes.iter().map(|fix| apply(fix, doc)).collect()
}

/// Resolve, validate, mutate, recompute. `doc` is only touched once every check has passed.
pub fn try_apply(fix: &FixAction, doc: &mut SceneDocument) -> Result<(), ApplyError> {
    let id = &fix.target.element_id;
    let index = match doc.find_all(id).as_slice() {
        [] => return Err(ApplyError::TargetMissing(id.clone())),
        [(index, _)] => *index,
        many => {
            return Err(ApplyError::TargetAmbiguous {
                id: id.clone(),
                count: many.len(),
            });
        }
    };

    validate(&fix.kind, &doc.elements[index])?;
    mutate(&fix.kind, &mut doc.elements[index]);
    doc.recompute_geometry(id);
    Ok(())
}

fn validate(kind: &FixKind, el: &SceneElement) -> Result<(), ApplyError> {
    match kind {
        FixKind::Resize { scale_x, scale_y } => {
            positive("scale_x", *scale_x)?;
            positive("scale_y", *scale_y)?;
        }
        FixKind::Reposition { left, top } => {
            finite("left", *left)?;
            finite("top", *top)?;
        }
        FixKind::Recolor { color, .. } => {
            if !is_hex_color(color) {
                return Err(ApplyError::InvalidValue {
                    what: "color",
                    value: color.clone(),
                });
            }
        }
        FixKind::AdjustProperty { change } => {
            match change {
                PropertyChange::FontSize(size) => positive("font_size", *size)?,
                PropertyChange::FontFamily(family) | PropertyChange::FontWeight(family) => {
                    if family.trim().is_empty() {
                        return Err(ApplyError::InvalidValue {
                            what: change.name(),
                            value: family.clone(),
                        });
                    }
                }
                PropertyChange::Opacity(opacity) => {
                    if !(0.0..=1.0).contains(opacity) {
                        return Err(ApplyError::InvalidValue {
                            what: "opacity",
                            value: opacity.to_string(),
                        });
                    }
                }
            }
            let text_only = !matches!(change, PropertyChange::Opacity(_));
            if text_only && (el.kind != ElementKind::Text || el.text().is_none()) {
                return Err(ApplyError::Unsupported {
                    id: el.id.clone(),
                    kind: el.kind.as_str(),
                    change: change.name(),
                });
            }
        }
    }
    Ok(())
}

fn mutate(kind: &FixKind, el: &mut SceneElement) {
    match kind {
        FixKind::Resize { scale_x, scale_y } => {
            el.geometry.scale_x = *scale_x;
            el.geometry.scale_y = *scale_y;
        }
        FixKind::Reposition { left, top } => {
            el.geometry.left = *left;
            el.geometry.top = *top;
        }
        FixKind::Recolor { property, color } => {
            let slot = match property {
                ColorProperty::Fill => &mut el.style.fill,
                ColorProperty::Stroke => &mut el.style.stroke,
            };
            *slot = Some(color.clone());
        }
        FixKind::AdjustProperty { change } => {
            if let PropertyChange::Opacity(opacity) = change {
                el.style.opacity = *opacity;
                return;
            }
            // Checked by `validate`.
            let Some(text) = el.text_mut() else {
                return;
            };
            match change {
                PropertyChange::FontSize(size) => text.font_size = *size,
                PropertyChange::FontFamily(family) => text.font_family = family.clone(),
                PropertyChange::FontWeight(weight) => text.font_weight = Some(weight.clone()),
                PropertyChange::Opacity(_) => {}
            }
        }
    }
}

/// `#rrggbb`, either case.
fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn finite(what: &'static str, v: f64) -> Result<(), ApplyError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ApplyError::InvalidValue {
            what,
            value: v.to_string(),
        })
    }
}

fn positive(what: &'static str, v: f64) -> Result<(), ApplyError> {
    finite(what, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(ApplyError::InvalidValue {
            what,
            value: v.to_string(),
        })
    }
}

/// Apply `fixes` to a copy of `doc` and return the outcomes with a patch preview.
pub fn preview_patch(
    fixes: &[FixAction],
    doc: &SceneDocument,
) -> anyhow::Result<(Vec<FixOutcome>, String)> {
    let mut after = doc.clone();
    let outcomes = apply_all(fixes, &mut after);
    let patch = render_patch(doc, &after)?;
    Ok((outcomes, patch))
}

/// Unified diff of the pretty-printed document JSON. Empty when nothing changed.
pub fn render_patch(before: &SceneDocument, after: &SceneDocument) -> anyhow::Result<String> {
    let old = serde_json::to_string_pretty(before).context("serialize document before fixes")?;
    let new = serde_json::to_string_pretty(after).context("serialize document after fixes")?;
    if old == new {
        return Ok(String::new());
    }

    let path = format!("{}.json", before.id);
    let mut out = String::new();
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(&old, &new);
    let formatter = PatchFormatter::new();
    let body = formatter.fmt_patch(&patch).to_string();
    // diffy repeats its own ---/+++ header; keep ours with the document name.
    let hunks = body
        .split_once("\n@@")
        .map(|(_, rest)| format!("@@{rest}"))
        .unwrap_or(body);
    out.push_str(&hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandcheck_types::fix::{FixTarget, TargetResolution};
    use brandcheck_types::scene::{ElementId, Geometry, Payload, Style, TextPayload};

    fn headline() -> SceneElement {
        SceneElement {
            id: ElementId::new("headline"),
            name: Some("headline".to_string()),
            role: None,
            kind: ElementKind::Text,
            geometry: Geometry::new(10.0, 10.0, 200.0, 40.0),
            style: Style::default(),
            payload: Payload::Text(TextPayload {
                content: "Big sale".to_string(),
                font_family: "Georgia".to_string(),
                font_size: 24.0,
                font_weight: None,
            }),
            bounds: None,
        }
    }

    fn fix(kind: FixKind) -> FixAction {
        FixAction {
            id: "f1".to_string(),
            rule_id: "r".to_string(),
            target: FixTarget {
                element_id: ElementId::new("headline"),
                resolution: TargetResolution::Explicit,
            },
            kind,
            description: String::new(),
        }
    }

    #[test]
    fn invalid_value_is_rejected_before_mutation() {
        let el = headline();
        let err = validate(
            &FixKind::Resize {
                scale_x: 0.0,
                scale_y: 1.0,
            },
            &el,
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::InvalidValue { what: "scale_x", .. }));
    }

    #[test]
    fn resize_refreshes_cached_bounds() {
        let mut doc = SceneDocument::new("d", 100.0, 100.0);
        doc.elements.push(headline());
        try_apply(
            &fix(FixKind::Resize {
                scale_x: 2.0,
                scale_y: 2.0,
            }),
            &mut doc,
        )
        .expect("apply");
        let bounds = doc.elements[0].bounds.expect("bounds recomputed");
        assert_eq!(bounds.width, 400.0);
        assert_eq!(bounds.height, 80.0);
    }

    #[test]
    fn patch_is_empty_when_nothing_changes() {
        let doc = SceneDocument::new("d", 100.0, 100.0);
        assert_eq!(render_patch(&doc, &doc).expect("patch"), "");
    }
}
