//! Vision fusion: merge an externally computed observation into a rule-based report.
//!
//! Every derived result is tagged `source = vision`. A result replaces the rule-based
//! placeholder deferred to the same check; otherwise it is appended. Rule-based results that
//! actually evaluated something are never removed or overridden.

use crate::scoring::rescore;
use crate::units::DEFAULT_REFERENCE_WIDTH_MM;
use brandcheck_types::report::{ComplianceReport, ReportEnhancements};
use brandcheck_types::result::{ResultDetails, ResultSource, ValidationResult};
use brandcheck_types::rule::Severity;
use brandcheck_types::scene::SceneDocument;
use brandcheck_types::vision::{VisionCheck, VisionObservation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Thresholds for deriving results from an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Physical width the rendered image stands for.
    pub reference_width_mm: f64,
    pub min_logo_confidence: f64,
    pub min_logo_width_mm: f64,
    pub min_ocr_confidence: f64,
    /// Fraction of document text nodes that OCR must recognise.
    pub min_text_coverage: f64,
    pub max_dominant_colors: usize,
    /// Colours covering less than this share of the image are ignored.
    pub dominant_color_min_share: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            reference_width_mm: DEFAULT_REFERENCE_WIDTH_MM,
            min_logo_confidence: 0.5,
            min_logo_width_mm: 15.0,
            min_ocr_confidence: 0.6,
            min_text_coverage: 0.8,
            max_dominant_colors: 5,
            dominant_color_min_share: 0.05,
        }
    }
}

/// Result id used for a vision check that has no placeholder to supersede.
pub fn vision_rule_id(check: VisionCheck) -> String {
    format!("vision-{}", check.as_str().replace('_', "-"))
}

/// Merge `observation` into `base`. Without an observation the report is returned unchanged.
pub fn enhance(
    base: ComplianceReport,
    observation: Option<&VisionObservation>,
    doc: &SceneDocument,
    config: &FusionConfig,
) -> ComplianceReport {
    let Some(obs) = observation else {
        debug!(document = %base.document_id, "no vision observation; report unchanged");
        return base;
    };

    let derived = derive(obs, doc, config);
    if derived.is_empty() {
        debug!(document = %base.document_id, "vision observation produced no results");
        return base;
    }

    let mut report = base;
    let mut checks = Vec::with_capacity(derived.len());
    for (check, result) in derived {
        merge(&mut report.results, check, result);
        checks.push(check);
    }
    rescore(&mut report);

    let enhancements = report.enhancements.get_or_insert_with(ReportEnhancements::default);
    enhancements.vision_applied = true;
    for check in checks {
        if !enhancements.vision_checks.contains(&check) {
            enhancements.vision_checks.push(check);
        }
    }

    info!(
        document = %report.document_id,
        score = report.score,
        status = report.overall_status.as_str(),
        "vision results merged"
    );
    report
}

fn merge(results: &mut Vec<ValidationResult>, check: VisionCheck, mut derived: ValidationResult) {
    match results.iter_mut().find(|r| supersedes(r, check)) {
        Some(slot) => {
            debug!(rule = %slot.rule_id, check = check.as_str(), "vision result replaces earlier result");
            derived.rule_id = slot.rule_id.clone();
            derived.rule_name = slot.rule_name.clone();
            derived.severity = slot.severity;
            *slot = derived;
        }
        None => results.push(derived),
    }
}

/// A placeholder deferred to `check`, or a vision result from an earlier merge of `check`.
fn supersedes(result: &ValidationResult, check: VisionCheck) -> bool {
    match result.details {
        ResultDetails::Deferred { check: c } => c == check && result.is_placeholder(),
        ResultDetails::Vision { check: c, .. } => c == check && result.source == ResultSource::Vision,
        _ => false,
    }
}

fn derive(
    obs: &VisionObservation,
    doc: &SceneDocument,
    config: &FusionConfig,
) -> Vec<(VisionCheck, ValidationResult)> {
    if !(obs.image_width > 0.0 && obs.image_height > 0.0) {
        warn!(
            width = obs.image_width,
            height = obs.image_height,
            "vision observation has no image size; ignored"
        );
        return vec![];
    }

    let mut out = Vec::new();
    let logos: Vec<_> = obs
        .logos
        .iter()
        .filter(|l| l.confidence >= config.min_logo_confidence)
        .collect();

    out.push(logo_presence(logos.len(), config));

    let mm_per_image_px = config.reference_width_mm / obs.image_width;
    if let Some(widest) = logos
        .iter()
        .map(|l| l.bbox.width * mm_per_image_px)
        .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
    {
        out.push(logo_size(widest, config));
    }

    if let Some(lowest) = obs
        .ocr_blocks
        .iter()
        .map(|b| b.confidence)
        .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.min(c))))
    {
        out.push(text_confidence(lowest, obs.ocr_blocks.len(), config));
    }

    if let Some(coverage) = text_coverage_ratio(obs, doc, config) {
        out.push(text_coverage(coverage, config));
    }

    if !obs.dominant_colors.is_empty() {
        let count = obs
            .dominant_colors
            .iter()
            .filter(|c| c.share >= config.dominant_color_min_share)
            .count();
        out.push(palette_simplicity(count, config));
    }
    out
}

fn vision_result(
    check: VisionCheck,
    name: &str,
    severity: Severity,
    passed: bool,
    message: String,
    observed: f64,
    threshold: f64,
) -> (VisionCheck, ValidationResult) {
    let result = ValidationResult {
        rule_id: vision_rule_id(check),
        rule_name: name.to_string(),
        passed,
        severity,
        category: check.category(),
        message,
        suggestion: None,
        affected_elements: vec![],
        details: ResultDetails::Vision {
            check,
            observed,
            threshold,
        },
        source: ResultSource::Vision,
    };
    (check, result)
}

fn logo_presence(found: usize, config: &FusionConfig) -> (VisionCheck, ValidationResult) {
    let passed = found > 0;
    let message = if passed {
        format!("Vision analysis detected {found} logo(s)")
    } else {
        format!(
            "Vision analysis detected no logo at confidence {} or above",
            config.min_logo_confidence
        )
    };
    let (check, mut result) = vision_result(
        VisionCheck::LogoPresence,
        "Logo visible in render",
        Severity::Warning,
        passed,
        message,
        found as f64,
        1.0,
    );
    if !passed {
        result.suggestion = Some("Make sure the logo is not hidden, cropped or too faint".to_string());
    }
    (check, result)
}

fn logo_size(width_mm: f64, config: &FusionConfig) -> (VisionCheck, ValidationResult) {
    let passed = width_mm >= config.min_logo_width_mm;
    vision_result(
        VisionCheck::LogoSize,
        "Logo size in render",
        Severity::Warning,
        passed,
        format!(
            "Largest detected logo renders {width_mm:.2} mm wide; minimum is {} mm",
            config.min_logo_width_mm
        ),
        width_mm,
        config.min_logo_width_mm,
    )
}

fn text_confidence(lowest: f64, blocks: usize, config: &FusionConfig) -> (VisionCheck, ValidationResult) {
    let passed = lowest >= config.min_ocr_confidence;
    vision_result(
        VisionCheck::TextConfidence,
        "Text legibility",
        Severity::Info,
        passed,
        format!(
            "Lowest OCR confidence across {blocks} text block(s) is {lowest:.2}; minimum is {}",
            config.min_ocr_confidence
        ),
        lowest,
        config.min_ocr_confidence,
    )
}

fn text_coverage(coverage: f64, config: &FusionConfig) -> (VisionCheck, ValidationResult) {
    let passed = coverage >= config.min_text_coverage;
    let (check, mut result) = vision_result(
        VisionCheck::TextCoverage,
        "Text recognised in render",
        Severity::Warning,
        passed,
        format!(
            "{:.0}% of text nodes were recognised in the render; minimum is {:.0}%",
            coverage * 100.0,
            config.min_text_coverage * 100.0
        ),
        coverage,
        config.min_text_coverage,
    );
    if !passed {
        result.suggestion =
            Some("Check for text that is covered, clipped or set on a busy background".to_string());
    }
    (check, result)
}

fn palette_simplicity(count: usize, config: &FusionConfig) -> (VisionCheck, ValidationResult) {
    let passed = count <= config.max_dominant_colors;
    vision_result(
        VisionCheck::PaletteSimplicity,
        "Palette simplicity",
        Severity::Info,
        passed,
        format!(
            "{count} dominant colour(s) cover at least {:.0}% of the render each; maximum is {}",
            config.dominant_color_min_share * 100.0,
            config.max_dominant_colors
        ),
        count as f64,
        config.max_dominant_colors as f64,
    )
}

fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Share of non-empty document text nodes whose content appears in confident OCR output.
///
/// `None` when there is no text to look for or OCR returned nothing at all.
fn text_coverage_ratio(
    obs: &VisionObservation,
    doc: &SceneDocument,
    config: &FusionConfig,
) -> Option<f64> {
    let expected: Vec<String> = doc
        .elements
        .iter()
        .filter_map(|el| el.text())
        .map(|t| normalize_text(&t.content))
        .filter(|t| !t.is_empty())
        .collect();
    if expected.is_empty() || obs.ocr_blocks.is_empty() {
        return None;
    }

    let recognised = normalize_text(
        &obs.ocr_blocks
            .iter()
            .filter(|b| b.confidence >= config.min_ocr_confidence)
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );
    let found = expected.iter().filter(|t| recognised.contains(t.as_str())).count();
    Some(found as f64 / expected.len() as f64)
}
