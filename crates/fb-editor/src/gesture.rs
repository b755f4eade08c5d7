//! Gesture state and the pure geometry behind each pointer gesture.

use fb_core::geom::{snap, snap_point};
use fb_core::{ElementId, MIN_HEIGHT, MIN_WIDTH};
use fb_render::{Corner, Handle};
use kurbo::{Point, Size, Vec2};

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Moving the selection. `grab` is the pointer's offset from the
    /// anchor element's origin at pointer-down. The anchor is the clicked
    /// element rather than the primary, so the grabbed element stays under
    /// the pointer when a co-selected member is clicked.
    Dragging { anchor: ElementId, grab: Vec2 },
    /// Holding a handle of `target`.
    Resizing {
        target: ElementId,
        handle: Handle,
        start_size: Size,
        origin: Point,
    },
    /// Stretching a freshly stamped arrow from `start`. Ends on a drag
    /// release away from `start` or on the next pointer-down.
    DraggingArrowEndpoint { arrow: ElementId, start: Point },
    /// The host shows an inline text field for `element`.
    EditingText { element: ElementId },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Dragging { .. } => "dragging",
            Gesture::Resizing { .. } => "resizing",
            Gesture::DraggingArrowEndpoint { .. } => "arrow",
            Gesture::EditingText { .. } => "editing-text",
        }
    }
}

/// Snap `p` when a grid is given. Arrow points take the half-cell offset.
pub fn snapped(p: Point, grid: Option<f64>, arrow: bool) -> Point {
    match grid {
        Some(g) => snap_point(p, g, arrow),
        None => p,
    }
}

/// New box size while `corner` is held.
///
/// The size follows the pointer delta since `origin`, is clamped to the
/// minimum box size and, with a grid, rounded to whole cells.
pub fn resized(corner: Corner, start: Size, origin: Point, pointer: Point, grid: Option<f64>) -> Size {
    let (gx, gy) = corner.grow_direction();
    let delta = pointer - origin;
    let mut width = (start.width + gx * delta.x).max(MIN_WIDTH);
    let mut height = (start.height + gy * delta.y).max(MIN_HEIGHT);
    if let Some(g) = grid {
        width = snap(width, g).max(MIN_WIDTH);
        height = snap(height, g).max(MIN_HEIGHT);
    }
    Size::new(width, height)
}

/// Where the anchor's origin should land for a drag to `pointer`.
pub fn drag_target(pointer: Point, grab: Vec2, grid: Option<f64>, anchor_is_arrow: bool) -> Point {
    snapped(pointer - grab, grid, anchor_is_arrow)
}
