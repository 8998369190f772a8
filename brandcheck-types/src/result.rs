use crate::rule::{Category, Rule, Severity};
use crate::scene::{ElementId, Rect};
use crate::vision::VisionCheck;
use serde::{Deserialize, Serialize};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    #[default]
    Rule,
    Vision,
}

/// Outcome of evaluating one rule against one document.
///
/// Built once per validation pass and never mutated afterwards; the `with_*` helpers
/// consume the value while it is being assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_id: String,
    pub rule_name: String,
    pub passed: bool,
    pub severity: Severity,
    pub category: Category,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_elements: Vec<ElementId>,

    #[serde(default)]
    pub details: ResultDetails,

    #[serde(default)]
    pub source: ResultSource,
}

impl ValidationResult {
    pub fn for_rule(rule: &Rule, passed: bool, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            passed,
            severity: rule.severity,
            category: rule.category,
            message: message.into(),
            suggestion: None,
            affected_elements: vec![],
            details: ResultDetails::None,
            source: ResultSource::Rule,
        }
    }

    pub fn with_details(mut self, details: ResultDetails) -> Self {
        self.details = details;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_affected(mut self, affected: Vec<ElementId>) -> Self {
        self.affected_elements = affected;
        self
    }

    /// True for a rule-based result that only stands in for a vision check.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.details, ResultDetails::Deferred { .. }) && self.source == ResultSource::Rule
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    Millimetres,
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeViolation {
    pub element_id: ElementId,
    pub label: String,
    pub unit: SizeUnit,
    /// Current physical size.
    pub current: f64,
    /// Required physical size.
    pub required: f64,
    /// Current measure in document units (rendered width, or rendered font size).
    pub current_px: f64,
    /// The same measure at exactly the required physical size.
    pub required_px: f64,
}

/// How a validator picked the elements it checked when no explicit reference existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionNote {
    pub strategy: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ambiguous_candidates: Vec<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorProperty {
    Fill,
    Stroke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorViolation {
    pub element_id: ElementId,
    pub property: ColorProperty,
    pub color: String,
    pub nearest: String,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsViolation {
    pub element_id: ElementId,
    pub label: String,
    pub bounds: Rect,
    /// Area the element must fit inside.
    pub allowed: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearSpaceViolation {
    /// The logo whose clear space is crowded.
    pub logo_id: ElementId,
    pub element_id: ElementId,
    pub label: String,
    pub bounds: Rect,
    pub gap_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastViolation {
    pub element_id: ElementId,
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub required: f64,
}

/// One distinct value of an aggregated property and the elements using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub value: String,
    pub count: usize,
    pub elements: Vec<ElementId>,
}

/// Validator-specific diagnostic payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultDetails {
    #[default]
    None,
    Size {
        violations: Vec<SizeViolation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolution: Option<ResolutionNote>,
    },
    Missing {
        missing: Vec<String>,
        present: Vec<String>,
    },
    Palette {
        violations: Vec<ColorViolation>,
        palette: Vec<String>,
    },
    Bounds {
        violations: Vec<BoundsViolation>,
    },
    ClearSpace {
        logos: Vec<ElementId>,
        clearance_mm: f64,
        violations: Vec<ClearSpaceViolation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolution: Option<ResolutionNote>,
    },
    Contrast {
        violations: Vec<ContrastViolation>,
    },
    Fonts {
        fonts: Vec<String>,
        usage: Vec<Usage>,
        max: usize,
    },
    Colors {
        colors: Vec<String>,
        usage: Vec<Usage>,
        max: usize,
    },
    AspectRatio {
        actual: f64,
        allowed: Vec<String>,
        tolerance: f64,
    },
    Deferred {
        check: VisionCheck,
    },
    Vision {
        check: VisionCheck,
        observed: f64,
        threshold: f64,
    },
    Error {
        error: String,
    },
}
