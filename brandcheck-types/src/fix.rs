use crate::report::ComplianceReport;
use crate::result::ColorProperty;
use crate::scene::ElementId;
use serde::{Deserialize, Serialize};

/// A generic property write, for changes that are not geometry or colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum PropertyChange {
    FontSize(f64),
    FontFamily(String),
    FontWeight(String),
    Opacity(f64),
}

impl PropertyChange {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyChange::FontSize(_) => "font_size",
            PropertyChange::FontFamily(_) => "font_family",
            PropertyChange::FontWeight(_) => "font_weight",
            PropertyChange::Opacity(_) => "opacity",
        }
    }
}

/// Mutation primitive. All values are absolute so that applying twice converges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixKind {
    Resize { scale_x: f64, scale_y: f64 },
    Reposition { left: f64, top: f64 },
    Recolor { property: ColorProperty, color: String },
    AdjustProperty { change: PropertyChange },
}

impl FixKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FixKind::Resize { .. } => "resize",
            FixKind::Reposition { .. } => "reposition",
            FixKind::Recolor { .. } => "recolor",
            FixKind::AdjustProperty { .. } => "adjust_property",
        }
    }
}

/// How the fix target was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum TargetResolution {
    /// The producing result named the element.
    Explicit,
    /// Picked by a documented heuristic.
    Heuristic { strategy: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixTarget {
    pub element_id: ElementId,
    pub resolution: TargetResolution,
}

/// A minimal corrective mutation proposed for one violation on one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixAction {
    /// Deterministic id derived from rule, target and mutation.
    pub id: String,
    pub rule_id: String,
    pub target: FixTarget,
    pub kind: FixKind,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    Applied,
    Skipped,
}

/// Result of handing one fix to the applier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixOutcome {
    pub fix_id: String,
    pub rule_id: String,
    pub element_id: ElementId,
    pub status: FixStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FixOutcome {
    pub fn applied(&self) -> bool {
        self.status == FixStatus::Applied
    }
}

/// A failed ValidationResult whose fix target could not be pinned to one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedFix {
    pub rule_id: String,
    pub reason: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemediationSummary {
    pub proposed: u64,
    pub applied: u64,
    pub skipped: u64,
    pub unresolved: u64,
}

impl RemediationSummary {
    pub fn headline(&self) -> String {
        format!("{} of {} fixes applied", self.applied, self.proposed)
    }
}

/// Everything one remediation pass did, for audit and certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub schema: String,
    pub document_id: String,

    #[serde(default)]
    pub fixes: Vec<FixAction>,

    #[serde(default)]
    pub outcomes: Vec<FixOutcome>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<UnresolvedFix>,

    pub before: ComplianceReport,
    pub after: ComplianceReport,
    pub summary: RemediationSummary,

    /// Unified diff of the document JSON before and after the pass.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub patch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_kind_serializes_with_type_tag() {
        let kind = FixKind::AdjustProperty {
            change: PropertyChange::FontSize(24.0),
        };
        let json = serde_json::to_value(&kind).expect("serialize");
        assert_eq!(json["type"], "adjust_property");
        assert_eq!(json["change"]["property"], "font_size");
        assert_eq!(json["change"]["value"], 24.0);
    }

    #[test]
    fn summary_headline_counts_applied_over_proposed() {
        let summary = RemediationSummary {
            proposed: 4,
            applied: 3,
            skipped: 1,
            unresolved: 0,
        };
        assert_eq!(summary.headline(), "3 of 4 fixes applied");
    }
}
