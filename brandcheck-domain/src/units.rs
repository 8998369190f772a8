//! Conversion between document units and physical units.
//!
//! A document is mapped onto a fixed physical reference width: `mm_per_px = reference_width_mm /
//! document.width`. Height uses the same factor.

use crate::error::RuleEvaluationError;
use brandcheck_types::scene::SceneDocument;

/// Physical reference width a document's width maps onto.
pub const DEFAULT_REFERENCE_WIDTH_MM: f64 = 285.0;

/// Millimetres per typographic point.
pub const MM_PER_PT: f64 = 0.3528;

/// Tolerance for physical-size comparisons, so that a value fixed to exactly the threshold passes.
pub const EPSILON: f64 = 1e-6;

/// Per-pass evaluation context. Validators read nothing else besides the rule and the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalContext {
    pub reference_width_mm: f64,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            reference_width_mm: DEFAULT_REFERENCE_WIDTH_MM,
        }
    }
}

impl EvalContext {
    pub fn units(&self, doc: &SceneDocument) -> Result<Units, RuleEvaluationError> {
        Units::for_document(doc, self.reference_width_mm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    mm_per_px: f64,
}

impl Units {
    pub fn for_document(
        doc: &SceneDocument,
        reference_width_mm: f64,
    ) -> Result<Self, RuleEvaluationError> {
        if !(doc.width.is_finite() && doc.width > 0.0) {
            return Err(RuleEvaluationError::InvalidDocument(format!(
                "document width must be positive, got {}",
                doc.width
            )));
        }
        if !(reference_width_mm.is_finite() && reference_width_mm > 0.0) {
            return Err(RuleEvaluationError::InvalidParams(format!(
                "reference width must be positive, got {reference_width_mm}"
            )));
        }
        Ok(Self {
            mm_per_px: reference_width_mm / doc.width,
        })
    }

    pub fn mm_per_px(&self) -> f64 {
        self.mm_per_px
    }

    pub fn px_to_mm(&self, px: f64) -> f64 {
        px * self.mm_per_px
    }

    pub fn mm_to_px(&self, mm: f64) -> f64 {
        mm / self.mm_per_px
    }

    pub fn px_to_pt(&self, px: f64) -> f64 {
        self.px_to_mm(px) / MM_PER_PT
    }

    pub fn pt_to_px(&self, pt: f64) -> f64 {
        self.mm_to_px(pt * MM_PER_PT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_pixels_on_a_1080_canvas_is_about_ten_and_a_half_mm() {
        let doc = SceneDocument::new("d", 1080.0, 1080.0);
        let units = Units::for_document(&doc, DEFAULT_REFERENCE_WIDTH_MM).expect("units");
        let mm = units.px_to_mm(40.0);
        assert!((mm - 10.5556).abs() < 1e-3, "got {mm}");
        assert!((units.mm_to_px(mm) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn points_convert_through_millimetres() {
        let doc = SceneDocument::new("d", 285.0, 100.0);
        let units = Units::for_document(&doc, 285.0).expect("units");
        assert!((units.pt_to_px(10.0) - 3.528).abs() < 1e-9);
        assert!((units.px_to_pt(3.528) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_width_document_is_rejected() {
        let doc = SceneDocument::new("d", 0.0, 100.0);
        assert!(Units::for_document(&doc, 285.0).is_err());
    }
}
