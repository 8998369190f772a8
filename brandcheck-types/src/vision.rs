//! Externally computed image-analysis data.
//!
//! Bounding boxes are in pixels of the rendered image (`image_width` x `image_height`),
//! which need not match the document's own size.

use crate::rule::Category;
use crate::scene::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrBlock {
    pub text: String,
    /// 0.0..=1.0
    pub confidence: f64,
    pub bbox: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoDetection {
    #[serde(default)]
    pub label: String,
    pub confidence: f64,
    pub bbox: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorShare {
    pub color: String,
    /// Fraction of the image covered, 0.0..=1.0
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionObservation {
    pub image_width: f64,
    pub image_height: f64,

    #[serde(default)]
    pub ocr_blocks: Vec<OcrBlock>,

    #[serde(default)]
    pub logos: Vec<LogoDetection>,

    #[serde(default)]
    pub dominant_colors: Vec<ColorShare>,
}

/// Checks the fusion layer can derive from an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionCheck {
    LogoPresence,
    LogoSize,
    TextConfidence,
    TextCoverage,
    PaletteSimplicity,
}

impl VisionCheck {
    pub fn category(self) -> Category {
        match self {
            VisionCheck::LogoPresence | VisionCheck::LogoSize => Category::Logo,
            VisionCheck::TextConfidence | VisionCheck::TextCoverage => Category::Text,
            VisionCheck::PaletteSimplicity => Category::Color,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VisionCheck::LogoPresence => "logo_presence",
            VisionCheck::LogoSize => "logo_size",
            VisionCheck::TextConfidence => "text_confidence",
            VisionCheck::TextCoverage => "text_coverage",
            VisionCheck::PaletteSimplicity => "palette_simplicity",
        }
    }
}
