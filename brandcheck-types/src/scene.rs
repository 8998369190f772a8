//! The design document as handed over by the host editor.
//!
//! Coordinates are in document units (pixels of the design canvas). `left`/`top` are the
//! unscaled origin; rendered extents are `width * scale_x` by `height * scale_y`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Image,
    Shape,
    Group,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Shape => "shape",
            ElementKind::Group => "group",
        }
    }
}

/// Axis-aligned rectangle in document units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True if `other` lies fully inside `self`. Edges may touch.
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-9;
        other.left + EPS >= self.left
            && other.top + EPS >= self.top
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Strict overlap; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Rect {
        Rect {
            left: self.left - amount,
            top: self.top - amount,
            width: self.width + 2.0 * amount,
            height: self.height + 2.0 * amount,
        }
    }

    /// Shortest distance between two rectangles; zero when they touch or overlap.
    pub fn gap(&self, other: &Rect) -> f64 {
        let dx = (other.left - self.right()).max(self.left - other.right()).max(0.0);
        let dy = (other.top - self.bottom()).max(self.top - other.bottom()).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,

    #[serde(default = "one")]
    pub scale_x: f64,

    #[serde(default = "one")]
    pub scale_y: f64,
}

fn one() -> f64 {
    1.0
}

impl Geometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn rendered_width(&self) -> f64 {
        self.width * self.scale_x
    }

    pub fn rendered_height(&self) -> f64 {
        self.height * self.scale_y
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.rendered_width(),
            self.rendered_height(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,

    #[serde(default = "one")]
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    pub content: String,
    pub font_family: String,
    /// Unscaled font size in document units.
    pub font_size: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Text(TextPayload),
    Image(ImagePayload),
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: ElementId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    pub kind: ElementKind,
    pub geometry: Geometry,

    #[serde(default)]
    pub style: Style,

    #[serde(default)]
    pub payload: Payload,

    /// Cached rendered bounds, maintained by [`SceneDocument::recompute_geometry`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

impl SceneElement {
    /// Human-facing label: name, then role, then id.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.role.as_deref())
            .unwrap_or(self.id.as_str())
    }

    /// Case-insensitive substring match against name and role.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_ascii_lowercase();
        [self.name.as_deref(), self.role.as_deref()]
            .into_iter()
            .flatten()
            .any(|v| v.to_ascii_lowercase().contains(&needle))
    }

    pub fn text(&self) -> Option<&TextPayload> {
        match &self.payload {
            Payload::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextPayload> {
        match &mut self.payload {
            Payload::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Rendered bounds, from the cache when present.
    pub fn rendered_bounds(&self) -> Rect {
        self.bounds.unwrap_or_else(|| self.geometry.bounds())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub id: String,
    pub width: f64,
    pub height: f64,

    /// Canvas background colour; white when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Elements in z-order, back to front.
    #[serde(default)]
    pub elements: Vec<SceneElement>,
}

impl SceneDocument {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            background: None,
            elements: Vec::new(),
        }
    }

    pub fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Elements carrying `id`, with their z-index.
    pub fn find_all(&self, id: &ElementId) -> Vec<(usize, &SceneElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| &e.id == id)
            .collect()
    }

    pub fn element(&self, id: &ElementId) -> Option<&SceneElement> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut SceneElement> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    pub fn z_index(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    pub fn elements_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &SceneElement> {
        self.elements.iter().filter(move |e| e.kind == kind)
    }

    /// Refresh the cached bounds of one element after its geometry changed.
    pub fn recompute_geometry(&mut self, id: &ElementId) {
        if let Some(el) = self.element_mut(id) {
            el.bounds = Some(el.geometry.bounds());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, name: Option<&str>) -> SceneElement {
        SceneElement {
            id: ElementId::new(id),
            name: name.map(str::to_string),
            role: None,
            kind: ElementKind::Image,
            geometry: Geometry::new(10.0, 10.0, 40.0, 20.0),
            style: Style::default(),
            payload: Payload::Image(ImagePayload {
                src: "logo.png".to_string(),
            }),
            bounds: None,
        }
    }

    #[test]
    fn rect_contains_allows_touching_edges() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(!outer.contains(&Rect::new(-1.0, 0.0, 10.0, 10.0)));
        assert!(!outer.contains(&Rect::new(95.0, 95.0, 10.0, 10.0)));
    }

    #[test]
    fn rect_gap_is_zero_on_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.gap(&Rect::new(5.0, 5.0, 10.0, 10.0)), 0.0);
        assert_eq!(a.gap(&Rect::new(13.0, 0.0, 10.0, 10.0)), 3.0);
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn keyword_match_is_case_insensitive_over_name_and_role() {
        let mut el = image("a", Some("Brand LOGO"));
        assert!(el.matches_keyword("logo"));
        el.name = None;
        assert!(!el.matches_keyword("logo"));
        el.role = Some("logo".to_string());
        assert!(el.matches_keyword("Logo"));
    }

    #[test]
    fn recompute_geometry_updates_cached_bounds() {
        let mut doc = SceneDocument::new("doc", 1080.0, 1080.0);
        doc.elements.push(image("a", None));
        doc.elements[0].geometry.scale_x = 2.0;
        doc.recompute_geometry(&ElementId::new("a"));
        let bounds = doc.elements[0].bounds.expect("bounds cached");
        assert_eq!(bounds.width, 80.0);
        assert_eq!(bounds.height, 20.0);
    }

    #[test]
    fn geometry_scale_defaults_to_one_when_absent() {
        let g: Geometry =
            serde_json::from_str(r#"{"left":0,"top":0,"width":5,"height":5}"#).expect("parse");
        assert_eq!(g.scale_x, 1.0);
        assert_eq!(g.scale_y, 1.0);
    }
}
