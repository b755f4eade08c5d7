//! Hit testing: point → element / selection handle lookup.
//!
//! Walks the element sequence back to front (last painted = topmost).
//! Boxes are matched by inclusive rectangle containment; arrows by distance
//! to their start–end segment.

use fb_core::geom::{distance_to_segment, point_in_circle};
use fb_core::{ArrowEnd, Element, ElementId};
use kurbo::{Point, Rect};
use smallvec::SmallVec;

/// Extra slop around an arrow's stroke, in pixels.
pub const ARROW_HIT_SLOP: f64 = 6.0;
/// Arrows are always clickable within this distance.
pub const MIN_ARROW_HIT_TOLERANCE: f64 = 10.0;
/// Side of the square corner handles on box kinds.
pub const HANDLE_SIZE: f64 = 8.0;
/// Radius of the circular endpoint handles on arrows.
pub const ARROW_HANDLE_RADIUS: f64 = 6.0;

/// A box corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    /// Probe order for overlapping handles.
    pub const PROBE_ORDER: [Corner; 4] = [
        Corner::SouthEast,
        Corner::SouthWest,
        Corner::NorthEast,
        Corner::NorthWest,
    ];

    pub fn of(self, r: Rect) -> Point {
        match self {
            Corner::NorthWest => Point::new(r.x0, r.y0),
            Corner::NorthEast => Point::new(r.x1, r.y0),
            Corner::SouthWest => Point::new(r.x0, r.y1),
            Corner::SouthEast => Point::new(r.x1, r.y1),
        }
    }

    /// How the size changes per unit of pointer movement while this corner
    /// is held: `+1` grows with the pointer, `-1` shrinks.
    pub fn grow_direction(self) -> (f64, f64) {
        match self {
            Corner::NorthWest => (-1.0, -1.0),
            Corner::NorthEast => (1.0, -1.0),
            Corner::SouthWest => (-1.0, 1.0),
            Corner::SouthEast => (1.0, 1.0),
        }
    }
}

/// A selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Corner(Corner),
    Endpoint(ArrowEnd),
}

/// Result of [`pick_resize_handle_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleHit {
    pub element: ElementId,
    pub handle: Handle,
}

/// Handle centers of an element, in probe order.
pub fn handles(element: &Element) -> SmallVec<[(Handle, Point); 4]> {
    if let Some(line) = element.arrow_endpoints() {
        return SmallVec::from_iter([
            (Handle::Endpoint(ArrowEnd::Start), line.p0),
            (Handle::Endpoint(ArrowEnd::End), line.p1),
        ]);
    }
    let bounds = element.bounds();
    Corner::PROBE_ORDER
        .into_iter()
        .map(|c| (Handle::Corner(c), c.of(bounds)))
        .collect()
}

/// Inclusive on all four edges, unlike `Rect::contains`.
fn rect_contains(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Whether `point` lies on `element`.
pub fn element_contains(element: &Element, point: Point) -> bool {
    match (element.arrow(), element.arrow_endpoints()) {
        (Some(arrow), Some(line)) => {
            let tolerance = (arrow.thickness / 2.0 + ARROW_HIT_SLOP).max(MIN_ARROW_HIT_TOLERANCE);
            distance_to_segment(point, line) <= tolerance
        }
        _ => rect_contains(element.bounds(), point),
    }
}

/// Find the topmost element at `point`.
/// Returns `None` if the point is over empty canvas.
pub fn pick_element_at(point: Point, elements: &[Element]) -> Option<&Element> {
    elements.iter().rev().find(|e| element_contains(e, point))
}

/// Find the first handle at `point` among `selected`, scanned in the given
/// order. The hit names the element that owns the handle.
pub fn pick_resize_handle_at<'a>(
    point: Point,
    selected: impl IntoIterator<Item = &'a Element>,
) -> Option<HandleHit> {
    for element in selected {
        for (handle, center) in handles(element) {
            let hit = match handle {
                Handle::Endpoint(_) => point_in_circle(point, center, ARROW_HANDLE_RADIUS),
                Handle::Corner(_) => {
                    rect_contains(Rect::from_center_size(center, (HANDLE_SIZE, HANDLE_SIZE)), point)
                }
            };
            if hit {
                log::trace!("handle {handle:?} of {} at ({}, {})", element.id, point.x, point.y);
                return Some(HandleHit {
                    element: element.id,
                    handle,
                });
            }
        }
    }
    None
}
