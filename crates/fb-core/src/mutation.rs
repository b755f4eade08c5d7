//! Diagram mutations.
//!
//! Every edit to the element sequence is expressed as a [`Mutation`] and
//! applied through [`Diagram::apply`]. Gestures and property commands only
//! decide *what* changes; this module is the one place that writes element
//! fields.

use crate::diagram::Diagram;
use crate::id::{ElementId, IdList};
use crate::model::*;
use kurbo::{Line, Point, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddElement(Box<Element>),
    RemoveElements {
        ids: IdList,
    },
    /// Translate elements by a delta. Box kinds are clamped so they stay
    /// inside the canvas; arrows move both endpoints unclamped.
    MoveElements {
        ids: IdList,
        delta: Vec2,
    },
    /// Set an absolute size on every listed non-arrow element.
    ResizeElements {
        ids: IdList,
        width: Option<f64>,
        height: Option<f64>,
    },
    SetArrowPoint {
        id: ElementId,
        end: ArrowEnd,
        point: Point,
    },
    SetText {
        ids: IdList,
        text: String,
    },
    SetColor {
        ids: IdList,
        color: Color,
    },
    SetThickness {
        ids: IdList,
        thickness: f64,
    },
    SetArrowHead {
        ids: IdList,
        end: ArrowEnd,
        head: ArrowHead,
    },
    /// Drop all elements and connections and reset the id counter and title.
    Clear,
}

impl Diagram {
    /// Apply a mutation. Ids that no longer exist are skipped.
    pub fn apply(&mut self, mutation: Mutation) {
        log::trace!("apply {mutation:?}");
        match mutation {
            Mutation::AddElement(element) => {
                self.id_counter.observe(element.id);
                self.elements.push(*element);
            }
            Mutation::RemoveElements { ids } => {
                self.elements.retain(|e| !ids.contains(&e.id));
            }
            Mutation::MoveElements { ids, delta } => {
                let canvas = self.canvas;
                for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
                    move_element(element, delta, canvas.width as f64, canvas.height as f64);
                }
            }
            Mutation::ResizeElements { ids, width, height } => {
                for element in self
                    .elements
                    .iter_mut()
                    .filter(|e| ids.contains(&e.id) && !e.is_arrow())
                {
                    if let Some(w) = width {
                        element.width = w.max(MIN_WIDTH);
                    }
                    if let Some(h) = height {
                        element.height = h.max(MIN_HEIGHT);
                    }
                }
            }
            Mutation::SetArrowPoint { id, end, point } => {
                if let Some(element) = self.get_mut(id) {
                    element.set_arrow_point(end, point);
                }
            }
            Mutation::SetText { ids, text } => {
                for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
                    element.text.clone_from(&text);
                }
            }
            Mutation::SetColor { ids, color } => {
                for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
                    element.color = color;
                }
            }
            Mutation::SetThickness { ids, thickness } => {
                let (lo, hi) = ARROW_THICKNESS_RANGE;
                for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
                    if let Some(arrow) = element.arrow_mut() {
                        arrow.thickness = thickness.clamp(lo, hi);
                    }
                }
            }
            Mutation::SetArrowHead { ids, end, head } => {
                for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
                    if let Some(arrow) = element.arrow_mut() {
                        match end {
                            ArrowEnd::Start => arrow.start_head = head,
                            ArrowEnd::End => arrow.end_head = head,
                        }
                    }
                }
            }
            Mutation::Clear => {
                self.elements.clear();
                self.connections.clear();
                self.id_counter = Default::default();
                self.title.clear();
            }
        }
    }
}

fn move_element(element: &mut Element, delta: Vec2, canvas_w: f64, canvas_h: f64) {
    let explicit = element.arrow().and_then(|a| a.endpoints);
    if let Some(line) = explicit {
        let moved = Line::new(line.p0 + delta, line.p1 + delta);
        if let Some(arrow) = element.arrow_mut() {
            arrow.endpoints = Some(moved);
        }
        element.recompute_arrow_bounds();
        return;
    }

    // Box kinds (and legacy arrows, whose geometry follows the box).
    element.x = (element.x + delta.x).min(canvas_w - element.width).max(0.0);
    element.y = (element.y + delta.y).min(canvas_h - element.height).max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn diagram_with_card_and_arrow() -> (Diagram, ElementId, ElementId) {
        let mut d = Diagram::new();
        let card = d.create_element(Some(ElementKind::Card), "basic", Point::new(100.0, 100.0), None);
        let arrow = d.create_arrow_stub("line", Point::new(10.0, 10.0));
        let (c, a) = (card.id, arrow.id);
        d.apply(Mutation::AddElement(Box::new(card)));
        d.apply(Mutation::AddElement(Box::new(arrow)));
        d.apply(Mutation::SetArrowPoint {
            id: a,
            end: ArrowEnd::End,
            point: Point::new(60.0, 10.0),
        });
        (d, c, a)
    }

    #[test]
    fn move_clamps_boxes_but_not_arrows() {
        let (mut d, card, arrow) = diagram_with_card_and_arrow();
        d.apply(Mutation::MoveElements {
            ids: smallvec![card, arrow],
            delta: Vec2::new(-500.0, 20.0),
        });
        let c = d.get(card).unwrap();
        assert_eq!((c.x, c.y), (0.0, 120.0));
        let line = d.get(arrow).unwrap().arrow_endpoints().unwrap();
        assert_eq!(line.p0, Point::new(-490.0, 30.0));
        assert_eq!(line.p1, Point::new(-440.0, 30.0));
    }

    #[test]
    fn move_clamps_to_far_canvas_edge() {
        let (mut d, card, _) = diagram_with_card_and_arrow();
        d.apply(Mutation::MoveElements {
            ids: smallvec![card],
            delta: Vec2::new(5000.0, 5000.0),
        });
        let c = d.get(card).unwrap();
        assert_eq!((c.x, c.y), (800.0 - 140.0, 600.0 - 70.0));
    }

    #[test]
    fn resize_skips_arrows_and_enforces_minimum() {
        let (mut d, card, arrow) = diagram_with_card_and_arrow();
        let arrow_before = d.get(arrow).unwrap().clone();
        d.apply(Mutation::ResizeElements {
            ids: smallvec![card, arrow],
            width: Some(10.0),
            height: Some(200.0),
        });
        let c = d.get(card).unwrap();
        assert_eq!((c.width, c.height), (MIN_WIDTH, 200.0));
        assert_eq!(d.get(arrow).unwrap(), &arrow_before);
    }

    #[test]
    fn thickness_is_clamped_and_ignores_boxes() {
        let (mut d, card, arrow) = diagram_with_card_and_arrow();
        d.apply(Mutation::SetThickness {
            ids: smallvec![card, arrow],
            thickness: 50.0,
        });
        assert_eq!(d.get(arrow).unwrap().arrow().unwrap().thickness, 20.0);
        assert!(d.get(card).unwrap().arrow().is_none());
    }

    #[test]
    fn clear_resets_counter_and_title() {
        let (mut d, _, _) = diagram_with_card_and_arrow();
        d.title = "Onboarding".into();
        d.apply(Mutation::Clear);
        assert!(d.is_empty());
        assert!(d.title.is_empty());
        assert_eq!(d.id_counter.last(), 0);
    }
}
