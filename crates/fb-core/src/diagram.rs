//! The diagram aggregate: element sequence, title, canvas, zoom.
//!
//! Element order is z-order. Later elements paint on top and are picked
//! first.

use crate::geom::snap_point;
use crate::id::{ElementId, IdCounter};
use crate::model::*;
use crate::template::resolve_template;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;
pub const ZOOM_STEP: f64 = 1.2;
pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 3.0;

/// Pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl CanvasSize {
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}

/// Everything that is persisted and everything a history snapshot restores.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub elements: Vec<Element>,
    /// Reserved list carried through load/save untouched.
    pub connections: Vec<serde_json::Value>,
    pub id_counter: IdCounter,
    pub title: String,
    pub canvas: CanvasSize,
    pub zoom: f64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            connections: Vec::new(),
            id_counter: IdCounter::default(),
            title: String::new(),
            canvas: CanvasSize::default(),
            zoom: 1.0,
        }
    }

    pub fn with_canvas(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Z-index of an element (0 = bottom).
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Build a new element from the template catalog at `at` and assign it
    /// the next id. The element is not inserted.
    ///
    /// Arrows are anchored at `at` and point right by the template width;
    /// with `grid` set, the end point is snapped to the arrow half-cell.
    pub fn create_element(
        &mut self,
        kind: Option<ElementKind>,
        template: &str,
        at: Point,
        grid: Option<f64>,
    ) -> Element {
        let resolved = resolve_template(kind, template);
        let config = resolved.config;
        let mut element = Element {
            id: self.id_counter.next(),
            x: at.x,
            y: at.y,
            width: config.width,
            height: config.height,
            text: config.default_text.to_string(),
            color: config.color,
            selected: false,
            shape: resolved.shape(),
            style: None,
        };

        if let Some(arrow) = element.arrow_mut() {
            let raw_end = Point::new(at.x + config.width, at.y);
            let end = match grid {
                Some(g) => snap_point(raw_end, g, true),
                None => raw_end,
            };
            arrow.endpoints = Some(kurbo::Line::new(at, end));
            element.recompute_arrow_bounds();
        }

        log::debug!(
            "created {} {} at ({}, {}) as {}",
            resolved.kind.as_str(),
            resolved.template,
            at.x,
            at.y,
            element.id
        );
        element
    }

    /// Build an in-progress arrow whose start and end both sit at `at`.
    pub fn create_arrow_stub(&mut self, template: &str, at: Point) -> Element {
        let resolved = resolve_template(Some(ElementKind::Arrow), template);
        let thickness = resolved.config.thickness.unwrap_or(DEFAULT_ARROW_THICKNESS);
        let template = match resolved.shape() {
            Shape::Arrow(arrow) => arrow.template,
            _ => ArrowTemplate::Line,
        };
        let mut element = Element {
            id: self.id_counter.next(),
            x: at.x,
            y: at.y,
            width: resolved.config.width,
            height: resolved.config.height,
            text: String::new(),
            color: resolved.config.color,
            selected: false,
            shape: Shape::Arrow(Arrow::between(template, at, at, thickness)),
            style: None,
        };
        element.recompute_arrow_bounds();
        element
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
    }

    /// Grow the canvas by `step` in both dimensions.
    pub fn expand_canvas(&mut self, step: u32) {
        self.canvas.width = self.canvas.width.saturating_add(step);
        self.canvas.height = self.canvas.height.saturating_add(step);
    }

    /// Assign each element's transient `selected` flag.
    pub fn mark_selected(&mut self, primary: Option<ElementId>) {
        for element in &mut self.elements {
            element.selected = Some(element.id) == primary;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_defaults() {
        let mut d = Diagram::new();
        let card = d.create_element(Some(ElementKind::Card), "basic", Point::new(100.0, 100.0), None);
        assert_eq!(card.id, ElementId(1));
        assert_eq!((card.width, card.height), (140.0, 70.0));
        assert_eq!(card.text, "Card");
        assert_eq!(card.color, Color::rgb(0x00, 0x7b, 0xff));
    }

    #[test]
    fn created_arrow_points_right_and_snaps_end() {
        let mut d = Diagram::new();
        let arrow = d.create_element(Some(ElementKind::Arrow), "line", Point::new(45.0, 45.0), Some(20.0));
        let line = arrow.arrow_endpoints().unwrap();
        assert_eq!(line.p0, Point::new(45.0, 45.0));
        // Raw end (165, 45) lands in the middle of cell (160, 40).
        assert_eq!(line.p1, Point::new(170.0, 50.0));
        assert_eq!((arrow.x, arrow.y, arrow.width, arrow.height), (45.0, 45.0, 125.0, 5.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut d = Diagram::new();
        for _ in 0..20 {
            d.zoom_in();
        }
        assert_eq!(d.zoom, MAX_ZOOM);
        for _ in 0..40 {
            d.zoom_out();
        }
        assert_eq!(d.zoom, MIN_ZOOM);
        d.zoom_reset();
        assert_eq!(d.zoom, 1.0);
    }

    #[test]
    fn expand_grows_both_dimensions() {
        let mut d = Diagram::new();
        d.expand_canvas(200);
        assert_eq!(d.canvas, CanvasSize { width: 1000, height: 800 });
    }
}
