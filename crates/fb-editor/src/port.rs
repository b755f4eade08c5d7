//! The host-facing UI port.
//!
//! The editor never touches a widget toolkit. It reports what changed
//! through [`UiPort`] and the host decides how to show it. Every method
//! has a no-op default so hosts implement only what they display.

use fb_core::{ArrowHead, Color, Element, ElementId, ElementKind};
use kurbo::Rect;

/// Minimum width of the inline text editor.
pub const TEXT_EDIT_MIN_WIDTH: f64 = 200.0;
/// Height of the inline text editor.
pub const TEXT_EDIT_HEIGHT: f64 = 30.0;

/// Pointer cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    /// Over empty canvas: a click stamps the current tool.
    Crosshair,
    /// Over an element: a drag moves it.
    Move,
    /// Over a handle of the selection.
    Resize,
    Grabbing,
}

/// Short user-facing messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Saved,
    /// A requested save could not be written.
    SaveFailed(String),
    /// The stored record was unreadable; an empty diagram was opened.
    LoadFailed(String),
    /// The stored record loaded with some fields or elements dropped.
    PartialLoad(Vec<String>),
    /// A command was refused because of invalid input.
    Validation(String),
    Exported(String),
    Cleared,
}

/// Properties of the primary selection, for a property panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub id: ElementId,
    pub kind: ElementKind,
    pub template: &'static str,
    pub text: String,
    pub color: Color,
    pub width: f64,
    pub height: f64,
    /// Arrow-only properties.
    pub thickness: Option<f64>,
    pub start_head: Option<ArrowHead>,
    pub end_head: Option<ArrowHead>,
    /// Number of selected elements, including the primary.
    pub selection_len: usize,
}

impl PanelState {
    pub fn of(element: &Element, selection_len: usize) -> Self {
        let arrow = element.arrow();
        Self {
            id: element.id,
            kind: element.kind(),
            template: element.shape.template_name(),
            text: element.text.clone(),
            color: element.color,
            width: element.width,
            height: element.height,
            thickness: arrow.map(|a| a.thickness),
            start_head: arrow.map(|a| a.start_head),
            end_head: arrow.map(|a| a.end_head),
            selection_len,
        }
    }
}

/// Ask the host to show an inline text field over an element.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditRequest {
    pub element: ElementId,
    /// Seed text.
    pub text: String,
    /// Where to place the field, in canvas coordinates.
    pub rect: Rect,
}

impl TextEditRequest {
    pub fn for_element(element: &Element) -> Self {
        let rect = match element.kind() {
            // The actor's label plate sits along its bottom edge.
            ElementKind::Actor => {
                let width = (element.width - 16.0).max(TEXT_EDIT_MIN_WIDTH);
                let y = element.y + element.height - 32.0;
                Rect::new(element.x + 8.0, y, element.x + 8.0 + width, y + TEXT_EDIT_HEIGHT)
            }
            _ => {
                let width = element.width.max(TEXT_EDIT_MIN_WIDTH);
                Rect::new(
                    element.x,
                    element.y,
                    element.x + width,
                    element.y + TEXT_EDIT_HEIGHT,
                )
            }
        };
        Self {
            element: element.id,
            text: element.text.clone(),
            rect,
        }
    }
}

/// Outbound notifications from the editor to its host.
pub trait UiPort {
    /// The canvas needs repainting.
    fn redraw(&mut self) {}

    /// The selection changed. `None` means nothing is selected.
    fn selection_changed(&mut self, _panel: Option<&PanelState>) {}

    fn notify(&mut self, _notice: Notice) {}

    fn begin_text_edit(&mut self, _request: &TextEditRequest) {}

    /// The inline text field should be hidden.
    fn end_text_edit(&mut self) {}

    fn set_cursor(&mut self, _cursor: CursorShape) {}

    /// Ask the user to confirm a destructive clear. Refuses by default.
    fn confirm_clear(&mut self) -> bool {
        false
    }
}

/// A port that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPort;

impl UiPort for NullPort {}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::Diagram;
    use kurbo::Point;

    #[test]
    fn actor_edit_sits_on_label_plate() {
        let mut d = Diagram::new();
        let actor = d.create_element(Some(ElementKind::Actor), "human", Point::new(100.0, 100.0), None);
        let req = TextEditRequest::for_element(&actor);
        assert_eq!(req.rect, Rect::new(108.0, 208.0, 308.0, 238.0));
        assert_eq!(req.text, "Actor");
    }

    #[test]
    fn wide_elements_widen_the_editor() {
        let mut d = Diagram::new();
        let mut card = d.create_element(Some(ElementKind::Card), "basic", Point::new(10.0, 20.0), None);
        card.width = 260.0;
        let req = TextEditRequest::for_element(&card);
        assert_eq!(req.rect, Rect::new(10.0, 20.0, 270.0, 50.0));
    }

    #[test]
    fn panel_reports_arrow_properties() {
        let mut d = Diagram::new();
        let arrow = d.create_arrow_stub("line", Point::new(0.0, 0.0));
        let panel = PanelState::of(&arrow, 1);
        assert_eq!(panel.thickness, Some(8.0));
        assert_eq!(panel.start_head, Some(ArrowHead::None));
        assert_eq!(panel.end_head, Some(ArrowHead::Arrow));
    }
}
