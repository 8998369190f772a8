//! Static, versioned rule catalog.

use brandcheck_types::rule::{
    AspectRatio, AspectRatioParams, CardinalityParams, Category, ClearSpaceParams, ContrastParams,
    DeferredParams, DisclaimerParams, ElementMatcher, LogoSizeParams, MandatoryParams,
    PaletteParams, PositioningParams, Region, Rule, SafeZoneParams, Severity, TextSizeParams,
    Validator,
};
use brandcheck_types::scene::ElementKind;
use brandcheck_types::vision::VisionCheck;
use std::collections::BTreeSet;

/// Version of the built-in catalog. Bump when any rule's parameters or severity change.
pub const RULESET_VERSION: &str = "2025.1";

pub const POLICY_DEFAULT: &str = "default";
pub const POLICY_RETAIL_UK: &str = "retail-uk";

/// Per-run enable/disable switches layered over each rule's own `enabled` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOverrides {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

impl RuleOverrides {
    fn is_enabled(&self, rule: &Rule) -> bool {
        if self.disable.iter().any(|id| id == &rule.id) {
            return false;
        }
        rule.enabled || self.enable.iter().any(|id| id == &rule.id)
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    version: String,
    rules: Vec<Rule>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            version: RULESET_VERSION.to_string(),
            rules: builtin_rules(),
        }
    }

    pub fn from_rules(version: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            version: version.into(),
            rules,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every rule, in catalog order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules carrying `id`; policy-set variants share an id.
    pub fn variants(&self, id: &str) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.id == id).collect()
    }

    /// Named policy sets, sorted. Rules scoped to every set don't contribute a name.
    pub fn policy_sets(&self) -> Vec<String> {
        let mut sets: BTreeSet<String> = self
            .rules
            .iter()
            .flat_map(|r| r.policy_sets.iter().cloned())
            .collect();
        sets.insert(POLICY_DEFAULT.to_string());
        sets.into_iter().collect()
    }

    pub fn knows_policy_set(&self, policy_set: &str) -> bool {
        self.policy_sets().iter().any(|p| p == policy_set)
    }

    /// Enabled rules for `policy_set`, in catalog order.
    pub fn list_enabled(&self, policy_set: &str) -> Vec<Rule> {
        self.list_enabled_with(policy_set, &RuleOverrides::default())
    }

    pub fn list_enabled_with(&self, policy_set: &str, overrides: &RuleOverrides) -> Vec<Rule> {
        self.rules
            .iter()
            .filter(|r| r.in_policy_set(policy_set) && overrides.is_enabled(r))
            .cloned()
            .collect()
    }
}

fn logo_matcher() -> ElementMatcher {
    ElementMatcher::new("logo", &["logo"], &[ElementKind::Image])
}

fn disclaimer_matcher() -> ElementMatcher {
    ElementMatcher::new(
        "disclaimer",
        &["disclaimer", "legal", "terms"],
        &[ElementKind::Text],
    )
}

fn rule(
    id: &str,
    name: &str,
    description: &str,
    category: Category,
    severity: Severity,
    validator: Validator,
) -> Rule {
    Rule {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        severity,
        validator,
        enabled: true,
        policy_sets: vec![],
    }
}

fn scoped(mut rule: Rule, policy_set: &str) -> Rule {
    rule.policy_sets = vec![policy_set.to_string()];
    rule
}

fn safe_zone(margin_mm: f64) -> Rule {
    rule(
        "safe-zone",
        "Safe zone",
        "Every element must sit inside the canvas inset by the safe-zone margin.",
        Category::Layout,
        Severity::Error,
        Validator::SafeZone(SafeZoneParams {
            margin_mm,
            exempt_keywords: vec!["background".to_string()],
        }),
    )
}

fn disclaimer_position(severity: Severity) -> Rule {
    rule(
        "disclaimer-position",
        "Disclaimer position",
        "Legal copy must sit in the bottom band of the creative, inside the margin.",
        Category::Disclaimer,
        severity,
        Validator::DisclaimerPosition(DisclaimerParams {
            disclaimer: disclaimer_matcher(),
            bottom_band: 0.2,
            margin_mm: 3.0,
        }),
    )
}

fn builtin_rules() -> Vec<Rule> {
    vec![
        rule(
            "logo-min-size",
            "Minimum logo size",
            "The brand logo must render at least 15 mm wide.",
            Category::Logo,
            Severity::Error,
            Validator::LogoMinSize(LogoSizeParams {
                min_width_mm: 15.0,
                logo: logo_matcher(),
                fallback_smallest_image: true,
            }),
        ),
        rule(
            "text-min-size",
            "Minimum text size",
            "All text must render at 8 pt or larger.",
            Category::Text,
            Severity::Error,
            Validator::TextMinSize(TextSizeParams {
                min_font_size_pt: 8.0,
            }),
        ),
        rule(
            "mandatory-elements",
            "Mandatory elements",
            "A creative must carry the brand logo and a headline.",
            Category::General,
            Severity::Error,
            Validator::MandatoryElements(MandatoryParams {
                required: vec![
                    logo_matcher(),
                    ElementMatcher::new("headline", &["headline", "title"], &[ElementKind::Text]),
                ],
            }),
        ),
        rule(
            "approved-palette",
            "Approved palette",
            "Fills and strokes must come from the brand palette.",
            Category::Color,
            Severity::Warning,
            Validator::ApprovedPalette(PaletteParams {
                colors: ["#000000", "#ffffff", "#e30613", "#1d1d1b", "#f5f5f5", "#ffd100"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                tolerance: 24.0,
            }),
        ),
        scoped(safe_zone(5.0), POLICY_DEFAULT),
        scoped(safe_zone(8.0), POLICY_RETAIL_UK),
        scoped(disclaimer_position(Severity::Warning), POLICY_DEFAULT),
        scoped(disclaimer_position(Severity::Error), POLICY_RETAIL_UK),
        rule(
            "logo-clear-space",
            "Logo clear space",
            "Nothing may intrude within 3 mm of the logo.",
            Category::Logo,
            Severity::Warning,
            Validator::LogoClearSpace(ClearSpaceParams {
                logo: logo_matcher(),
                clearance_mm: 3.0,
                fallback_smallest_image: true,
                exempt_keywords: vec!["background".to_string()],
            }),
        ),
        rule(
            "max-font-families",
            "Font family limit",
            "Use at most two font families.",
            Category::Text,
            Severity::Warning,
            Validator::MaxFontFamilies(CardinalityParams { max: 2 }),
        ),
        rule(
            "max-colors",
            "Colour limit",
            "Use at most six distinct fill colours.",
            Category::Color,
            Severity::Info,
            Validator::MaxColors(CardinalityParams { max: 6 }),
        ),
        rule(
            "text-contrast",
            "Text contrast",
            "Text must reach a WCAG contrast ratio of 4.5:1 against what lies beneath it.",
            Category::Text,
            Severity::Error,
            Validator::ContrastRatio(ContrastParams { min_ratio: 4.5 }),
        ),
        rule(
            "canvas-aspect-ratio",
            "Canvas aspect ratio",
            "The canvas must use one of the supported placement ratios.",
            Category::Layout,
            Severity::Warning,
            Validator::AspectRatio(AspectRatioParams {
                allowed: vec![
                    AspectRatio {
                        width: 1,
                        height: 1,
                    },
                    AspectRatio {
                        width: 4,
                        height: 5,
                    },
                    AspectRatio {
                        width: 9,
                        height: 16,
                    },
                    AspectRatio {
                        width: 16,
                        height: 9,
                    },
                    AspectRatio {
                        width: 191,
                        height: 100,
                    },
                ],
                tolerance: 0.01,
            }),
        ),
        rule(
            "logo-position",
            "Logo position",
            "The logo belongs in the top third of the creative.",
            Category::Logo,
            Severity::Info,
            Validator::ElementPositioning(PositioningParams {
                target: logo_matcher(),
                region: Region {
                    left: 0.0,
                    top: 0.0,
                    right: 1.0,
                    bottom: 1.0 / 3.0,
                },
            }),
        ),
        rule(
            "text-legibility",
            "Text legibility",
            "Rendered text must be machine-legible; confirmed by vision analysis.",
            Category::Text,
            Severity::Info,
            Validator::VisionDeferred(DeferredParams {
                check: VisionCheck::TextConfidence,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_policy_set_sees_one_variant_per_rule_id() {
        let registry = Registry::builtin();
        for set in registry.policy_sets() {
            let rules = registry.list_enabled(&set);
            let ids: BTreeSet<_> = rules.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids.len(), rules.len(), "duplicate rule id in {set}");
            assert_eq!(rules.len(), 13, "policy set {set}");
        }
    }

    #[test]
    fn retail_uk_escalates_disclaimer_and_widens_safe_zone() {
        let registry = Registry::builtin();
        let uk = registry.list_enabled(POLICY_RETAIL_UK);
        let disclaimer = uk
            .iter()
            .find(|r| r.id == "disclaimer-position")
            .expect("disclaimer rule");
        assert_eq!(disclaimer.severity, Severity::Error);

        let Some(Validator::SafeZone(p)) = uk
            .iter()
            .find(|r| r.id == "safe-zone")
            .map(|r| &r.validator)
        else {
            panic!("safe-zone rule missing");
        };
        assert_eq!(p.margin_mm, 8.0);
        assert_eq!(registry.variants("safe-zone").len(), 2);
    }

    #[test]
    fn overrides_disable_and_enable() {
        let mut rules = builtin_rules();
        rules[0].enabled = false;
        let registry = Registry::from_rules("test", rules);

        let plain = registry.list_enabled(POLICY_DEFAULT);
        assert!(plain.iter().all(|r| r.id != "logo-min-size"));

        let overrides = RuleOverrides {
            enable: vec!["logo-min-size".to_string()],
            disable: vec!["max-colors".to_string()],
        };
        let adjusted = registry.list_enabled_with(POLICY_DEFAULT, &overrides);
        assert_eq!(adjusted[0].id, "logo-min-size");
        assert!(adjusted.iter().all(|r| r.id != "max-colors"));
    }

    #[test]
    fn unknown_policy_set_is_reported() {
        let registry = Registry::builtin();
        assert!(registry.knows_policy_set("retail-uk"));
        assert!(!registry.knows_policy_set("retail-fr"));
    }
}
