//! Element resolution: explicit id first, then documented heuristics.
//!
//! Heuristic order is fixed and deterministic:
//! 1. keyword match on name/role (restricted by kind), candidates in z-order (back to front);
//! 2. type fallback: the image with the smallest rendered area.
//!
//! A tier that yields more than one candidate is reported as ambiguous instead of picking one.

use crate::units::EPSILON;
use brandcheck_types::rule::ElementMatcher;
use brandcheck_types::scene::{ElementId, ElementKind, SceneDocument, SceneElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Explicit,
    KeywordMatch,
    SmallestImage,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Explicit => "explicit",
            Strategy::KeywordMatch => "keyword_match",
            Strategy::SmallestImage => "smallest_image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    One {
        element: &'a SceneElement,
        strategy: Strategy,
    },
    Ambiguous {
        candidates: Vec<&'a SceneElement>,
        strategy: Strategy,
    },
    None,
}

impl<'a> Resolved<'a> {
    fn from_candidates(candidates: Vec<&'a SceneElement>, strategy: Strategy) -> Self {
        match candidates.len() {
            0 => Resolved::None,
            1 => Resolved::One {
                element: candidates[0],
                strategy,
            },
            _ => Resolved::Ambiguous {
                candidates,
                strategy,
            },
        }
    }

    pub fn candidate_ids(&self) -> Vec<ElementId> {
        match self {
            Resolved::One { element, .. } => vec![element.id.clone()],
            Resolved::Ambiguous { candidates, .. } => {
                candidates.iter().map(|e| e.id.clone()).collect()
            }
            Resolved::None => vec![],
        }
    }
}

/// Look an id up; duplicated ids are ambiguous.
pub fn explicit<'a>(doc: &'a SceneDocument, id: &ElementId) -> Resolved<'a> {
    let found = doc.find_all(id).into_iter().map(|(_, e)| e).collect();
    Resolved::from_candidates(found, Strategy::Explicit)
}

pub fn by_keyword<'a>(doc: &'a SceneDocument, matcher: &ElementMatcher) -> Resolved<'a> {
    let found = doc.elements.iter().filter(|e| matcher.matches(e)).collect();
    Resolved::from_candidates(found, Strategy::KeywordMatch)
}

/// The image with the smallest rendered area. Equal areas tie.
pub fn smallest_image(doc: &SceneDocument) -> Resolved<'_> {
    let images: Vec<&SceneElement> = doc.elements_of_kind(ElementKind::Image).collect();
    let Some(min_area) = images
        .iter()
        .map(|e| e.rendered_bounds().area())
        .min_by(f64::total_cmp)
    else {
        return Resolved::None;
    };
    let tied = images
        .into_iter()
        .filter(|e| (e.rendered_bounds().area() - min_area).abs() <= EPSILON)
        .collect();
    Resolved::from_candidates(tied, Strategy::SmallestImage)
}

/// Keyword tier, then (optionally) the smallest-image tier.
pub fn logo_target<'a>(
    doc: &'a SceneDocument,
    matcher: &ElementMatcher,
    fallback_smallest_image: bool,
) -> Resolved<'a> {
    match by_keyword(doc, matcher) {
        Resolved::None if fallback_smallest_image => smallest_image(doc),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandcheck_types::scene::{Geometry, Payload, Style};

    fn image(id: &str, name: &str, w: f64, h: f64) -> SceneElement {
        SceneElement {
            id: ElementId::new(id),
            name: Some(name.to_string()),
            role: None,
            kind: ElementKind::Image,
            geometry: Geometry::new(0.0, 0.0, w, h),
            style: Style::default(),
            payload: Payload::None,
            bounds: None,
        }
    }

    fn doc(elements: Vec<SceneElement>) -> SceneDocument {
        let mut d = SceneDocument::new("d", 1080.0, 1080.0);
        d.elements = elements;
        d
    }

    fn matcher() -> ElementMatcher {
        ElementMatcher::new("logo", &["logo"], &[ElementKind::Image])
    }

    #[test]
    fn keyword_tier_wins_over_type_fallback() {
        let d = doc(vec![
            image("tiny", "sticker", 5.0, 5.0),
            image("brand", "Brand Logo", 100.0, 50.0),
        ]);
        let Resolved::One { element, strategy } = logo_target(&d, &matcher(), true) else {
            panic!("expected one");
        };
        assert_eq!(element.id.as_str(), "brand");
        assert_eq!(strategy, Strategy::KeywordMatch);
    }

    #[test]
    fn two_keyword_matches_are_ambiguous_in_z_order() {
        let d = doc(vec![
            image("b", "logo-dark", 10.0, 10.0),
            image("a", "logo-light", 10.0, 10.0),
        ]);
        let resolved = by_keyword(&d, &matcher());
        assert!(matches!(resolved, Resolved::Ambiguous { .. }));
        assert_eq!(
            resolved.candidate_ids(),
            vec![ElementId::new("b"), ElementId::new("a")]
        );
    }

    #[test]
    fn smallest_image_fallback_and_tie() {
        let d = doc(vec![
            image("hero", "hero", 800.0, 600.0),
            image("mark", "mark", 40.0, 40.0),
        ]);
        let Resolved::One { element, strategy } = logo_target(&d, &matcher(), true) else {
            panic!("expected one");
        };
        assert_eq!(element.id.as_str(), "mark");
        assert_eq!(strategy, Strategy::SmallestImage);

        let tied = doc(vec![
            image("x", "x", 20.0, 40.0),
            image("y", "y", 40.0, 20.0),
        ]);
        assert!(matches!(
            smallest_image(&tied),
            Resolved::Ambiguous {
                strategy: Strategy::SmallestImage,
                ..
            }
        ));
        assert_eq!(logo_target(&tied, &matcher(), false), Resolved::None);
    }

    #[test]
    fn duplicated_explicit_id_is_ambiguous() {
        let d = doc(vec![image("x", "a", 1.0, 1.0), image("x", "b", 1.0, 1.0)]);
        assert!(matches!(
            explicit(&d, &ElementId::new("x")),
            Resolved::Ambiguous { .. }
        ));
        assert_eq!(explicit(&d, &ElementId::new("nope")), Resolved::None);
    }
}
