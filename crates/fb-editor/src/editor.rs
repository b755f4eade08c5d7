//! The editor aggregate.
//!
//! [`Editor`] owns the diagram, the selection, the gesture state, the undo
//! history and both host ports. Hosts feed it [`InputEvent`]s and property
//! commands from one event loop and call [`Editor::tick`] so that deferred
//! work (the post-stamp deselect and debounced saves) runs.
//!
//! Every mutation records a history snapshot first. A continuous drag or
//! resize records one snapshot when it starts.

use std::time::Instant;

use chrono::{DateTime, Utc};
use fb_core::{
    ArrowEnd, ArrowHead, Color, Diagram, Element, ElementId, ElementKind, FlowDocument, IdList,
    Mutation, export_file_name, export_json, load_document,
};
use fb_render::{ExportError, Handle, RenderOptions, pick_element_at, pick_resize_handle_at};
use kurbo::{Point, Size};
use smallvec::smallvec;
use tiny_skia::Pixmap;

use crate::config::EditorConfig;
use crate::gesture::{Gesture, drag_target, resized, snapped};
use crate::history::History;
use crate::input::{InputEvent, Modifiers};
use crate::port::{CursorShape, Notice, PanelState, TextEditRequest, UiPort};
use crate::saver::{SaveDebouncer, Storage, StorageError};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};

/// File name stem used when the diagram has no title.
const EXPORT_FALLBACK_STEM: &str = "flowboard";

/// The element kind and template stamped on empty canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub kind: ElementKind,
    pub template: String,
}

impl Default for Tool {
    fn default() -> Self {
        Self {
            kind: ElementKind::Card,
            template: "basic".into(),
        }
    }
}

impl Tool {
    pub fn new(kind: ElementKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            template: template.into(),
        }
    }
}

/// A file offered to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct Editor {
    config: EditorConfig,
    diagram: Diagram,
    /// When the stored record was first written; `None` until then.
    created_at: Option<DateTime<Utc>>,
    selection: Selection,
    /// Selection revision last reported to the port.
    seen_revision: u64,
    gesture: Gesture,
    history: History,
    tool: Tool,
    cursor: CursorShape,
    /// The last pointer-down stamped a box element.
    just_stamped: bool,
    deselect_at: Option<Instant>,
    /// Element whose inline edit a pointer-down closed. The host's blur
    /// commit for it arrives after that pointer-down.
    blurred_edit: Option<ElementId>,
    saver: SaveDebouncer,
    storage: Box<dyn Storage>,
    port: Box<dyn UiPort>,
}

impl Editor {
    /// Open the diagram held by `storage`, or a blank one.
    ///
    /// An unreadable record opens a blank 800×600 diagram and raises
    /// [`Notice::LoadFailed`]; a record with dropped fields raises
    /// [`Notice::PartialLoad`].
    pub fn open(config: EditorConfig, storage: Box<dyn Storage>, mut port: Box<dyn UiPort>) -> Self {
        let (diagram, created_at) = match storage.read() {
            Ok(Some(text)) => {
                let loaded = load_document(&text);
                if let Some(failure) = loaded.report.failure {
                    port.notify(Notice::LoadFailed(failure));
                } else if !loaded.report.issues.is_empty() {
                    port.notify(Notice::PartialLoad(loaded.report.issues));
                }
                (loaded.diagram, loaded.created_at)
            }
            Ok(None) => (Diagram::with_canvas(config.canvas), None),
            Err(e) => {
                log::warn!("cannot read stored diagram: {e}");
                port.notify(Notice::LoadFailed(e.to_string()));
                (Diagram::new(), None)
            }
        };
        log::debug!(
            "opened diagram `{}` with {} elements",
            diagram.title,
            diagram.len()
        );

        let history = History::new(config.history_depth);
        let saver = SaveDebouncer::new(config.save_debounce());
        let cursor = if config.edit_only {
            CursorShape::Default
        } else {
            CursorShape::Crosshair
        };
        Self {
            config,
            diagram,
            created_at,
            selection: Selection::new(),
            seen_revision: 0,
            gesture: Gesture::Idle,
            history,
            tool: Tool::default(),
            cursor,
            just_stamped: false,
            deselect_at: None,
            blurred_edit: None,
            saver,
            storage,
            port,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// A debounced save is waiting for its deadline.
    pub fn save_pending(&self) -> bool {
        self.saver.is_pending()
    }

    /// Properties of the primary selection.
    pub fn panel_state(&self) -> Option<PanelState> {
        let primary = self.selection.primary()?;
        let element = self.diagram.get(primary)?;
        Some(PanelState::of(element, self.selection.len()))
    }

    /// The cursor for a pointer resting at `p`.
    pub fn cursor_at(&self, p: Point) -> CursorShape {
        if self.config.edit_only {
            return CursorShape::Default;
        }
        if pick_resize_handle_at(p, self.selected_elements()).is_some() {
            CursorShape::Resize
        } else if pick_element_at(p, &self.diagram.elements).is_some() {
            CursorShape::Move
        } else {
            CursorShape::Crosshair
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent, now: Instant) {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers, now)
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y), now),
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y)),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers, now),
        }
        self.sync_selection();
    }

    /// Run deferred work that is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.deselect_at.is_some_and(|at| now >= at) {
            self.deselect_at = None;
            // Not while a gesture is holding the selection.
            if self.gesture.is_idle() {
                self.selection.clear();
            }
        }
        if self.saver.take_due(now)
            && let Err(e) = self.persist()
        {
            log::warn!("debounced save failed: {e}");
        }
        self.sync_selection();
    }

    fn pointer_down(&mut self, p: Point, modifiers: Modifiers, now: Instant) {
        self.deselect_at = None;
        self.just_stamped = false;
        if let Gesture::EditingText { element } = self.gesture {
            self.close_text_edit();
            self.blurred_edit = Some(element);
        }

        // A stretching arrow is placed by the next click.
        if let Gesture::DraggingArrowEndpoint { arrow, .. } = self.gesture {
            self.finish_arrow(arrow, p, now);
            return;
        }

        if let Some(hit) = pick_resize_handle_at(p, self.selected_elements())
            && let Some(target) = self.diagram.get(hit.element)
        {
            let start_size = Size::new(target.width, target.height);
            self.record();
            self.gesture = Gesture::Resizing {
                target: hit.element,
                handle: hit.handle,
                start_size,
                origin: p,
            };
            log::debug!("resize {} by {:?}", hit.element, hit.handle);
            self.show_cursor(CursorShape::Resize);
            return;
        }

        if let Some(element) = pick_element_at(p, &self.diagram.elements) {
            let (id, grab) = (element.id, p - element.origin());
            if modifiers.shift {
                self.selection.toggle(id);
                self.port.redraw();
                return;
            }
            if !(self.selection.len() > 1 && self.selection.contains(id)) {
                self.selection.select_exclusive(id);
            }
            self.record();
            self.gesture = Gesture::Dragging { anchor: id, grab };
            log::debug!("drag {} members anchored on {id}", self.selection.len());
            self.show_cursor(CursorShape::Grabbing);
            self.port.redraw();
            return;
        }

        if modifiers.shift {
            return;
        }
        self.selection.clear();
        if self.config.edit_only {
            return;
        }
        self.stamp(p, now);
    }

    /// Create an element of the current tool at `p`.
    fn stamp(&mut self, p: Point, now: Instant) {
        let grid = self.config.snap_grid();
        self.record();
        if self.tool.kind == ElementKind::Arrow {
            let start = snapped(p, grid, true);
            let arrow = self.diagram.create_arrow_stub(&self.tool.template, start);
            let id = arrow.id;
            self.diagram.apply(Mutation::AddElement(Box::new(arrow)));
            self.selection.select_exclusive(id);
            self.gesture = Gesture::DraggingArrowEndpoint { arrow: id, start };
            log::debug!("arrow {id} started at ({}, {})", start.x, start.y);
        } else {
            let at = snapped(p, grid, false);
            let element = self
                .diagram
                .create_element(Some(self.tool.kind), &self.tool.template, at, grid);
            let id = element.id;
            self.diagram.apply(Mutation::AddElement(Box::new(element)));
            self.selection.select_exclusive(id);
            self.just_stamped = true;
            self.saver.schedule(now);
        }
        self.port.redraw();
    }

    fn finish_arrow(&mut self, arrow: ElementId, p: Point, now: Instant) {
        let end = snapped(p, self.config.snap_grid(), true);
        self.diagram.apply(Mutation::SetArrowPoint {
            id: arrow,
            end: ArrowEnd::End,
            point: end,
        });
        self.gesture = Gesture::Idle;
        log::debug!("arrow {arrow} placed at ({}, {})", end.x, end.y);
        self.show_cursor(CursorShape::Crosshair);
        self.saver.schedule(now);
        self.refresh_panel();
        self.port.redraw();
    }

    fn pointer_move(&mut self, p: Point, modifiers: Modifiers) {
        let grid = self.config.snap_grid();
        match self.gesture {
            Gesture::DraggingArrowEndpoint { arrow, .. } => {
                self.diagram.apply(Mutation::SetArrowPoint {
                    id: arrow,
                    end: ArrowEnd::End,
                    point: snapped(p, grid, true),
                });
                self.port.redraw();
            }
            Gesture::Resizing {
                target,
                handle,
                start_size,
                origin,
            } => {
                match handle {
                    Handle::Endpoint(end) => self.diagram.apply(Mutation::SetArrowPoint {
                        id: target,
                        end,
                        point: snapped(p, grid, true),
                    }),
                    Handle::Corner(corner) => {
                        let size = resized(corner, start_size, origin, p, grid);
                        log::trace!("resize to {}x{}", size.width, size.height);
                        let ids = self.members();
                        self.diagram.apply(Mutation::ResizeElements {
                            ids,
                            width: Some(size.width),
                            height: Some(size.height),
                        });
                    }
                }
                self.refresh_panel();
                self.port.redraw();
            }
            Gesture::Dragging { anchor, grab } => {
                let Some(element) = self.diagram.get(anchor) else {
                    self.gesture = Gesture::Idle;
                    return;
                };
                let is_arrow = element.is_arrow();
                // Command-drag places arrows freely.
                let grid = if is_arrow && modifiers.command() { None } else { grid };
                let target = drag_target(p, grab, grid, is_arrow);
                let delta = target - element.origin();
                if delta.x == 0.0 && delta.y == 0.0 {
                    return;
                }
                log::trace!("drag by ({}, {})", delta.x, delta.y);
                let ids = self.members();
                self.diagram.apply(Mutation::MoveElements { ids, delta });
                self.port.redraw();
            }
            Gesture::Idle => {
                let cursor = self.cursor_at(p);
                self.show_cursor(cursor);
            }
            Gesture::EditingText { .. } => {}
        }
    }

    fn pointer_up(&mut self, p: Point, now: Instant) {
        match self.gesture {
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => {
                log::debug!("{} finished", self.gesture.name());
                self.gesture = Gesture::Idle;
                self.saver.schedule(now);
                self.refresh_panel();
            }
            Gesture::DraggingArrowEndpoint { arrow, start } => {
                // A plain click leaves the arrow waiting for a second click.
                if snapped(p, self.config.snap_grid(), true) != start {
                    self.finish_arrow(arrow, p, now);
                }
            }
            Gesture::Idle | Gesture::EditingText { .. } => {}
        }

        if self.just_stamped {
            self.just_stamped = false;
            self.deselect_at = Some(now + self.config.deselect_delay());
        }
        if self.gesture.is_idle() {
            let cursor = self.cursor_at(p);
            self.show_cursor(cursor);
        }
    }

    fn double_click(&mut self, p: Point) {
        let Some(element) = pick_element_at(p, &self.diagram.elements) else {
            return;
        };
        let request = TextEditRequest::for_element(element);
        if matches!(self.gesture, Gesture::EditingText { .. }) {
            self.cancel_text_edit();
        }
        self.blurred_edit = None;
        log::debug!("text edit on {}", request.element);
        self.gesture = Gesture::EditingText {
            element: request.element,
        };
        self.port.begin_text_edit(&request);
        self.port.redraw();
    }

    fn key(&mut self, key: &str, modifiers: Modifiers, now: Instant) {
        // The host's text field owns the keyboard while it is open.
        if matches!(self.gesture, Gesture::EditingText { .. }) {
            if key == "Escape" {
                self.cancel_text_edit();
            }
            return;
        }
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return;
        };
        log::debug!("shortcut {key} -> {action:?}");
        match action {
            ShortcutAction::Delete => self.delete_selection(now),
            ShortcutAction::Undo => self.undo(now),
            ShortcutAction::Save => self.save_now(),
            ShortcutAction::ZoomIn => self.zoom_in(now),
            ShortcutAction::ZoomOut => self.zoom_out(now),
            ShortcutAction::ZoomReset => self.zoom_reset(now),
            ShortcutAction::Cancel => self.cancel(),
        }
    }

    /// Abandon an in-progress arrow, or drop the selection.
    fn cancel(&mut self) {
        if let Gesture::DraggingArrowEndpoint { arrow, .. } = self.gesture {
            log::debug!("arrow {arrow} abandoned");
            self.diagram.apply(Mutation::RemoveElements { ids: smallvec![arrow] });
            self.gesture = Gesture::Idle;
            self.port.redraw();
        }
        self.selection.clear();
    }

    // ─── Text editing ────────────────────────────────────────────────────

    /// Write the inline editor's text to its element.
    ///
    /// Also accepts the commit of an edit that a pointer-down on the canvas
    /// already closed, since hosts report the field's blur after the click.
    pub fn commit_text_edit(&mut self, text: &str, now: Instant) {
        let element = match self.gesture {
            Gesture::EditingText { element } => {
                self.gesture = Gesture::Idle;
                self.port.end_text_edit();
                element
            }
            _ => match self.blurred_edit {
                Some(element) => element,
                None => return,
            },
        };
        self.blurred_edit = None;
        if !self.diagram.contains(element) {
            return;
        }
        self.record();
        self.diagram.apply(Mutation::SetText {
            ids: smallvec![element],
            text: text.to_string(),
        });
        self.changed(now);
    }

    /// Close the inline editor without touching the element.
    pub fn cancel_text_edit(&mut self) {
        self.blurred_edit = None;
        self.close_text_edit();
    }

    fn close_text_edit(&mut self) {
        if matches!(self.gesture, Gesture::EditingText { .. }) {
            self.gesture = Gesture::Idle;
            self.port.end_text_edit();
            self.port.redraw();
        }
    }

    // ─── Property commands ───────────────────────────────────────────────

    pub fn set_text(&mut self, text: &str, now: Instant) {
        if self.selection.is_empty() {
            return;
        }
        let ids = self.members();
        self.record();
        self.diagram.apply(Mutation::SetText {
            ids,
            text: text.to_string(),
        });
        self.changed(now);
    }

    pub fn set_color(&mut self, color: Color, now: Instant) {
        if self.selection.is_empty() {
            return;
        }
        let ids = self.members();
        self.record();
        self.diagram.apply(Mutation::SetColor { ids, color });
        self.changed(now);
    }

    /// Width of every selected box element. Non-positive values are ignored.
    pub fn set_width(&mut self, width: f64, now: Instant) {
        self.set_size(Some(width), None, now);
    }

    /// Height of every selected box element. Non-positive values are ignored.
    pub fn set_height(&mut self, height: f64, now: Instant) {
        self.set_size(None, Some(height), now);
    }

    fn set_size(&mut self, width: Option<f64>, height: Option<f64>, now: Instant) {
        let valid = |v: Option<f64>| v.is_none_or(|v| v.is_finite() && v > 0.0);
        if !valid(width) || !valid(height) {
            log::debug!("ignoring size {width:?}x{height:?}");
            return;
        }
        let ids: IdList = self
            .selected_elements()
            .filter(|e| !e.is_arrow())
            .map(|e| e.id)
            .collect();
        if ids.is_empty() {
            return;
        }
        self.record();
        self.diagram
            .apply(Mutation::ResizeElements { ids, width, height });
        self.changed(now);
    }

    pub fn set_arrow_thickness(&mut self, thickness: f64, now: Instant) {
        if !self.primary_is_arrow() || !thickness.is_finite() {
            return;
        }
        let ids = self.members();
        self.record();
        self.diagram.apply(Mutation::SetThickness { ids, thickness });
        self.changed(now);
    }

    pub fn set_arrow_head(&mut self, end: ArrowEnd, head: ArrowHead, now: Instant) {
        if !self.primary_is_arrow() {
            return;
        }
        let ids = self.members();
        self.record();
        self.diagram.apply(Mutation::SetArrowHead { ids, end, head });
        self.changed(now);
    }

    pub fn delete_selection(&mut self, now: Instant) {
        if self.selection.is_empty() {
            return;
        }
        let ids = self.members();
        log::debug!("delete {} elements", ids.len());
        self.record();
        self.diagram.apply(Mutation::RemoveElements { ids });
        self.selection.clear();
        self.gesture = Gesture::Idle;
        self.saver.schedule(now);
        self.port.redraw();
        self.sync_selection();
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Restore the state before the last recorded change.
    pub fn undo(&mut self, now: Instant) {
        let Some(snapshot) = self.history.begin_restore() else {
            return;
        };
        if matches!(self.gesture, Gesture::EditingText { .. }) {
            self.port.end_text_edit();
        }
        self.diagram = snapshot;
        self.diagram.mark_selected(None);
        self.gesture = Gesture::Idle;
        self.selection.clear();
        self.deselect_at = None;
        self.blurred_edit = None;
        log::debug!("undo, {} snapshots left", self.history.len());
        self.saver.schedule(now);
        self.port.redraw();
        self.sync_selection();
        self.history.end_restore();
    }

    /// Erase the whole diagram after the host confirms.
    ///
    /// Returns `false` when the host declined.
    pub fn clear_all(&mut self) -> bool {
        if !self.port.confirm_clear() {
            return false;
        }
        self.record();
        self.diagram.apply(Mutation::Clear);
        self.selection.clear();
        self.gesture = Gesture::Idle;
        self.saver.cancel();
        match self.persist() {
            Ok(()) => self.port.notify(Notice::Cleared),
            Err(e) => self.port.notify(Notice::SaveFailed(e.to_string())),
        }
        self.port.redraw();
        self.sync_selection();
        true
    }

    // ─── View & document ─────────────────────────────────────────────────

    pub fn zoom_in(&mut self, now: Instant) {
        self.diagram.zoom_in();
        self.view_changed(now);
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.diagram.zoom_out();
        self.view_changed(now);
    }

    pub fn zoom_reset(&mut self, now: Instant) {
        self.diagram.zoom_reset();
        self.view_changed(now);
    }

    /// Grow the canvas by the configured step in both dimensions.
    pub fn expand_canvas(&mut self, now: Instant) {
        self.diagram.expand_canvas(self.config.expand_step);
        self.view_changed(now);
    }

    pub fn set_title(&mut self, title: &str, now: Instant) {
        if self.diagram.title == title {
            return;
        }
        self.diagram.title = title.to_string();
        self.saver.schedule(now);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        log::debug!("tool {} {}", tool.kind.as_str(), tool.template);
        self.tool = tool;
    }

    pub fn set_edit_only(&mut self, edit_only: bool) {
        self.config.edit_only = edit_only;
        let cursor = if edit_only {
            CursorShape::Default
        } else {
            CursorShape::Crosshair
        };
        self.show_cursor(cursor);
    }

    pub fn set_snap(&mut self, snap: bool) {
        self.config.snap_to_grid = snap;
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.config.show_grid = show;
        self.port.redraw();
    }

    // ─── Persistence & export ────────────────────────────────────────────

    /// Write immediately and report the outcome.
    pub fn save_now(&mut self) {
        self.saver.cancel();
        match self.persist() {
            Ok(()) => self.port.notify(Notice::Saved),
            Err(e) => {
                log::warn!("save failed: {e}");
                self.port.notify(Notice::SaveFailed(e.to_string()));
            }
        }
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let now = Utc::now();
        let record = FlowDocument::from_diagram(&self.diagram, self.created_at, now).to_json()?;
        self.storage.write(&record)?;
        self.created_at.get_or_insert(now);
        log::debug!("saved {} elements", self.diagram.len());
        Ok(())
    }

    /// The diagram as a pretty-printed JSON export.
    pub fn export_json(&mut self) -> fb_core::Result<ExportFile> {
        let now = Utc::now();
        let text = export_json(&self.diagram, self.created_at, now)?;
        let name = export_file_name("", EXPORT_FALLBACK_STEM, now, "json");
        self.port.notify(Notice::Exported(name.clone()));
        Ok(ExportFile {
            name,
            bytes: text.into_bytes(),
        })
    }

    /// The canvas as shown, flattened onto white and encoded as PNG.
    ///
    /// A blank title is refused with a [`Notice::Validation`].
    pub fn export_png(&mut self) -> Result<ExportFile, ExportError> {
        self.diagram.mark_selected(self.selection.primary());
        let options = self.render_options();
        let bytes = match fb_render::export_png(&self.diagram, self.selection.members(), &options) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.port.notify(Notice::Validation(e.to_string()));
                return Err(e);
            }
        };
        let name = export_file_name(&self.diagram.title, EXPORT_FALLBACK_STEM, Utc::now(), "png");
        self.port.notify(Notice::Exported(name.clone()));
        Ok(ExportFile { name, bytes })
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render_options(&self) -> RenderOptions {
        let editing = match self.gesture {
            Gesture::EditingText { element } => Some(element),
            _ => None,
        };
        RenderOptions {
            show_grid: self.config.show_grid,
            grid_size: self.config.grid_size,
            editing,
            ..RenderOptions::default()
        }
    }

    /// Paint the current frame.
    pub fn render(&mut self) -> Result<Pixmap, ExportError> {
        self.diagram.mark_selected(self.selection.primary());
        fb_render::render_diagram(&self.diagram, self.selection.members(), &self.render_options())
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    /// Snapshot the diagram before a change.
    fn record(&mut self) {
        self.diagram.mark_selected(None);
        self.history.push(&self.diagram);
    }

    /// After a property command: persist later, refresh the panel, repaint.
    fn changed(&mut self, now: Instant) {
        self.saver.schedule(now);
        self.refresh_panel();
        self.port.redraw();
    }

    fn view_changed(&mut self, now: Instant) {
        self.saver.schedule(now);
        self.port.redraw();
    }

    fn members(&self) -> IdList {
        self.selection.members().iter().copied().collect()
    }

    /// Selected elements in selection order.
    fn selected_elements(&self) -> impl Iterator<Item = &Element> {
        self.selection
            .members()
            .iter()
            .filter_map(|id| self.diagram.get(*id))
    }

    fn primary_is_arrow(&self) -> bool {
        self.selection
            .primary()
            .and_then(|id| self.diagram.get(id))
            .is_some_and(Element::is_arrow)
    }

    fn show_cursor(&mut self, cursor: CursorShape) {
        let cursor = if self.config.edit_only {
            CursorShape::Default
        } else {
            cursor
        };
        if cursor != self.cursor {
            self.cursor = cursor;
            self.port.set_cursor(cursor);
        }
    }

    fn refresh_panel(&mut self) {
        let panel = self.panel_state();
        self.port.selection_changed(panel.as_ref());
    }

    /// Drop stale members and report selection changes to the port.
    fn sync_selection(&mut self) {
        let diagram = &self.diagram;
        self.selection.retain(|id| diagram.contains(id));
        if self.selection.revision() != self.seen_revision {
            self.seen_revision = self.selection.revision();
            self.refresh_panel();
            self.port.redraw();
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("diagram", &self.diagram)
            .field("selection", &self.selection)
            .field("gesture", &self.gesture)
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::NullPort;
    use crate::saver::MemoryStorage;

    fn editor() -> Editor {
        Editor::open(
            EditorConfig::default(),
            Box::new(MemoryStorage::new()),
            Box::new(NullPort),
        )
    }

    #[test]
    fn click_on_empty_canvas_stamps_the_tool() {
        let mut ed = editor();
        let t0 = Instant::now();
        ed.handle(&InputEvent::down(100.0, 100.0), t0);
        ed.handle(&InputEvent::up(100.0, 100.0), t0);
        assert_eq!(ed.diagram().len(), 1);
        assert_eq!(ed.selection().primary(), Some(ElementId(1)));
        assert!(ed.gesture().is_idle());
    }

    #[test]
    fn stamped_element_is_deselected_after_delay() {
        let mut ed = editor();
        let t0 = Instant::now();
        ed.handle(&InputEvent::down(100.0, 100.0), t0);
        ed.handle(&InputEvent::up(100.0, 100.0), t0);
        ed.tick(t0 + std::time::Duration::from_millis(50));
        assert!(!ed.selection().is_empty());
        ed.tick(t0 + std::time::Duration::from_millis(100));
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn edit_only_blocks_creation() {
        let mut ed = editor();
        ed.set_edit_only(true);
        let t0 = Instant::now();
        ed.handle(&InputEvent::down(100.0, 100.0), t0);
        assert!(ed.diagram().is_empty());
        assert!(ed.history().is_empty());
        assert_eq!(ed.cursor(), CursorShape::Default);
    }

    #[test]
    fn shift_click_on_empty_canvas_does_nothing() {
        let mut ed = editor();
        let t0 = Instant::now();
        ed.handle(
            &InputEvent::PointerDown {
                x: 10.0,
                y: 10.0,
                modifiers: Modifiers::SHIFT,
            },
            t0,
        );
        assert!(ed.diagram().is_empty());
    }
}
