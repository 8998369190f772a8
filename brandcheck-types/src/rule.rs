use crate::scene::{ElementKind, SceneElement};
use crate::vision::VisionCheck;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Logo,
    Text,
    Color,
    Layout,
    Disclaimer,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Logo => "logo",
            Category::Text => "text",
            Category::Color => "color",
            Category::Layout => "layout",
            Category::Disclaimer => "disclaimer",
            Category::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Selects elements by name/role keyword and element kind.
///
/// An empty `keywords` list matches any name; an empty `kinds` list matches any kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementMatcher {
    pub label: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub kinds: Vec<ElementKind>,
}

impl ElementMatcher {
    pub fn new(label: &str, keywords: &[&str], kinds: &[ElementKind]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            kinds: kinds.to_vec(),
        }
    }

    pub fn matches(&self, el: &SceneElement) -> bool {
        let kind_ok = self.kinds.is_empty() || self.kinds.contains(&el.kind);
        let keyword_ok =
            self.keywords.is_empty() || self.keywords.iter().any(|k| el.matches_keyword(k));
        kind_ok && keyword_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoSizeParams {
    pub min_width_mm: f64,
    pub logo: ElementMatcher,

    /// When no element matches `logo`, treat the smallest image as the logo.
    #[serde(default)]
    pub fallback_smallest_image: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSizeParams {
    pub min_font_size_pt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MandatoryParams {
    pub required: Vec<ElementMatcher>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteParams {
    /// Approved colours as `#rrggbb`.
    pub colors: Vec<String>,
    /// Maximum euclidean RGB distance to count as an approved colour.
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZoneParams {
    pub margin_mm: f64,

    /// Elements whose name/role contains one of these keywords are not checked.
    #[serde(default)]
    pub exempt_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclaimerParams {
    pub disclaimer: ElementMatcher,
    /// Height of the bottom band, as a fraction of the document height.
    pub bottom_band: f64,
    pub margin_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearSpaceParams {
    pub logo: ElementMatcher,
    pub clearance_mm: f64,

    /// When no element matches `logo`, treat the smallest image as the logo.
    #[serde(default)]
    pub fallback_smallest_image: bool,

    #[serde(default)]
    pub exempt_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalityParams {
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastParams {
    pub min_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn value(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn label(&self) -> String {
        format!("{}:{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectRatioParams {
    pub allowed: Vec<AspectRatio>,
    /// Relative tolerance, e.g. `0.01` for 1%.
    pub tolerance: f64,
}

/// A region expressed as fractions of the document size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositioningParams {
    pub target: ElementMatcher,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredParams {
    pub check: VisionCheck,
}

/// Evaluation algorithm plus its typed parameters.
///
/// This is a closed set: every variant has exactly one evaluator in the domain crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Validator {
    LogoMinSize(LogoSizeParams),
    TextMinSize(TextSizeParams),
    MandatoryElements(MandatoryParams),
    ApprovedPalette(PaletteParams),
    SafeZone(SafeZoneParams),
    DisclaimerPosition(DisclaimerParams),
    LogoClearSpace(ClearSpaceParams),
    MaxFontFamilies(CardinalityParams),
    MaxColors(CardinalityParams),
    ContrastRatio(ContrastParams),
    AspectRatio(AspectRatioParams),
    ElementPositioning(PositioningParams),
    VisionDeferred(DeferredParams),
}

/// Validator family, used for grouping and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorFamily {
    SizeThreshold,
    Membership,
    Spatial,
    Aggregate,
    Visual,
    Deferred,
}

impl Validator {
    pub fn type_name(&self) -> &'static str {
        match self {
            Validator::LogoMinSize(_) => "logo_min_size",
            Validator::TextMinSize(_) => "text_min_size",
            Validator::MandatoryElements(_) => "mandatory_elements",
            Validator::ApprovedPalette(_) => "approved_palette",
            Validator::SafeZone(_) => "safe_zone",
            Validator::DisclaimerPosition(_) => "disclaimer_position",
            Validator::LogoClearSpace(_) => "logo_clear_space",
            Validator::MaxFontFamilies(_) => "max_font_families",
            Validator::MaxColors(_) => "max_colors",
            Validator::ContrastRatio(_) => "contrast_ratio",
            Validator::AspectRatio(_) => "aspect_ratio",
            Validator::ElementPositioning(_) => "element_positioning",
            Validator::VisionDeferred(_) => "vision_deferred",
        }
    }

    pub fn family(&self) -> ValidatorFamily {
        match self {
            Validator::LogoMinSize(_) | Validator::TextMinSize(_) => ValidatorFamily::SizeThreshold,
            Validator::MandatoryElements(_) | Validator::ApprovedPalette(_) => {
                ValidatorFamily::Membership
            }
            Validator::SafeZone(_)
            | Validator::DisclaimerPosition(_)
            | Validator::LogoClearSpace(_)
            | Validator::ElementPositioning(_) => ValidatorFamily::Spatial,
            Validator::MaxFontFamilies(_) | Validator::MaxColors(_) => ValidatorFamily::Aggregate,
            Validator::ContrastRatio(_) | Validator::AspectRatio(_) => ValidatorFamily::Visual,
            Validator::VisionDeferred(_) => ValidatorFamily::Deferred,
        }
    }
}

/// Declarative policy check definition. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    pub validator: Validator,

    #[serde(default = "enabled_default")]
    pub enabled: bool,

    /// Policy sets this rule belongs to. Empty means every policy set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policy_sets: Vec<String>,
}

fn enabled_default() -> bool {
    true
}

impl Rule {
    pub fn in_policy_set(&self, policy_set: &str) -> bool {
        self.policy_sets.is_empty() || self.policy_sets.iter().any(|p| p == policy_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_serializes_as_tag_and_params() {
        let v = Validator::MaxFontFamilies(CardinalityParams { max: 2 });
        let json = serde_json::to_value(&v).expect("serialize");
        assert_eq!(json["type"], "max_font_families");
        assert_eq!(json["params"]["max"], 2);
    }

    #[test]
    fn empty_policy_sets_match_everything() {
        let rule = Rule {
            id: "r".to_string(),
            name: "r".to_string(),
            description: String::new(),
            category: Category::General,
            severity: Severity::Info,
            validator: Validator::MaxColors(CardinalityParams { max: 3 }),
            enabled: true,
            policy_sets: vec![],
        };
        assert!(rule.in_policy_set("anything"));

        let scoped = Rule {
            policy_sets: vec!["retail-uk".to_string()],
            ..rule
        };
        assert!(scoped.in_policy_set("retail-uk"));
        assert!(!scoped.in_policy_set("default"));
    }
}
