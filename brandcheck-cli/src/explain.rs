//! Rule guidance for the `brandcheck explain` command.
//!
//! The catalog says what a rule checks. This table adds what the auto-fixer does about a
//! violation, and how to fix it by hand when it can't.

use brandcheck_types::audit::Advice;

#[derive(Debug, Clone)]
pub struct RuleGuidance {
    pub rule_id: &'static str,
    /// What `brandcheck fix` changes, if the rule has a fix generator.
    pub auto_fix: Option<&'static str>,
    pub remediation: &'static str,
}

impl RuleGuidance {
    pub fn to_advice(&self) -> Advice {
        Advice {
            rule_id: self.rule_id.to_string(),
            explanation: self.remediation.to_string(),
            suggested_fix: Some(
                self.auto_fix
                    .map(|f| format!("{f} (applied by `brandcheck fix`)"))
                    .unwrap_or_else(|| "none; fix by hand".to_string()),
            ),
        }
    }
}

pub static GUIDANCE: &[RuleGuidance] = &[
    RuleGuidance {
        rule_id: "logo-min-size",
        auto_fix: Some("scale the logo uniformly up to the minimum width"),
        remediation: r#"Name the logo layer so it contains "logo". Without one, the smallest image on
the canvas is treated as the logo. Scale it so its rendered width reaches the minimum; the
physical width is the pixel width times the reference width over the canvas width."#,
    },
    RuleGuidance {
        rule_id: "text-min-size",
        auto_fix: Some("raise the font size to the minimum"),
        remediation: r#"Increase the font size of each listed text element. Sizes are compared in
points after mapping the canvas onto the reference width, so a small canvas needs larger
pixel sizes."#,
    },
    RuleGuidance {
        rule_id: "mandatory-elements",
        auto_fix: None,
        remediation: r#"Add the missing element, or rename an existing layer so its name contains one
of the expected keywords (for example "logo" or "headline")."#,
    },
    RuleGuidance {
        rule_id: "approved-palette",
        auto_fix: Some("recolour to the nearest approved colour"),
        remediation: r#"Replace off-palette fills and strokes with brand colours. Colours within the
rule's RGB tolerance of an approved colour already count as approved."#,
    },
    RuleGuidance {
        rule_id: "safe-zone",
        auto_fix: Some("move the element back inside the safe zone"),
        remediation: r#"Keep every element inside the canvas inset by the safe-zone margin. Elements
larger than the safe zone can't be moved into it and must be resized by hand. Layers named
"background" are exempt."#,
    },
    RuleGuidance {
        rule_id: "disclaimer-position",
        auto_fix: Some("move the disclaimer into the bottom band"),
        remediation: r#"Place legal copy in the bottom band of the creative and keep it clear of the
margin."#,
    },
    RuleGuidance {
        rule_id: "logo-clear-space",
        auto_fix: None,
        remediation: r#"Move intruding elements out of the clear-space box around the logo, or shrink
them. Every layer named like a logo is checked; without one, the smallest image is. Backgrounds
are exempt."#,
    },
    RuleGuidance {
        rule_id: "max-font-families",
        auto_fix: Some("switch stray text to the most used font family"),
        remediation: r#"Limit the creative to the allowed number of font families. The fixer keeps
the most frequent family; ties go to the family that appears first."#,
    },
    RuleGuidance {
        rule_id: "max-colors",
        auto_fix: Some("recolour the least used fills to the nearest kept colour"),
        remediation: r#"Reduce the number of distinct fill colours."#,
    },
    RuleGuidance {
        rule_id: "text-contrast",
        auto_fix: Some("set the text fill to black or white, whichever contrasts more"),
        remediation: r#"Raise the contrast between text and what lies beneath it to at least the
required WCAG ratio, by changing either the text colour or the backdrop."#,
    },
    RuleGuidance {
        rule_id: "canvas-aspect-ratio",
        auto_fix: None,
        remediation: r#"Resize the canvas to one of the supported placement ratios."#,
    },
    RuleGuidance {
        rule_id: "logo-position",
        auto_fix: Some("move the logo into the allowed region"),
        remediation: r#"Place the logo inside the region the rule names (the top third by default)."#,
    },
    RuleGuidance {
        rule_id: "text-legibility",
        auto_fix: None,
        remediation: r#"Confirmed only by vision analysis. When OCR confidence is low, simplify the
backdrop behind text or increase weight and size."#,
    },
];

pub fn lookup_guidance(rule_id: &str) -> Option<&'static RuleGuidance> {
    GUIDANCE.iter().find(|g| g.rule_id == rule_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandcheck_core::Registry;

    #[test]
    fn every_catalog_rule_has_guidance() {
        for rule in Registry::builtin().rules() {
            assert!(
                lookup_guidance(&rule.id).is_some(),
                "missing guidance for {}",
                rule.id
            );
        }
    }

    #[test]
    fn guidance_ids_are_unique() {
        let mut ids: Vec<_> = GUIDANCE.iter().map(|g| g.rule_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), GUIDANCE.len());
    }

    #[test]
    fn unfixable_rules_say_so() {
        let advice = lookup_guidance("mandatory-elements")
            .expect("guidance")
            .to_advice();
        assert_eq!(advice.suggested_fix.as_deref(), Some("none; fix by hand"));
    }
}
