//! Shared harness: an editor wired to in-memory storage and a port that
//! records everything it is told.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use fb_core::ElementKind;
use fb_editor::{
    CursorShape, Editor, EditorConfig, InputEvent, MemoryStorage, Modifiers, Notice, PanelState,
    TextEditRequest, Tool, UiPort,
};

#[derive(Debug, Default)]
pub struct PortLog {
    pub redraws: usize,
    pub panels: Vec<Option<PanelState>>,
    pub notices: Vec<Notice>,
    pub text_edits: Vec<TextEditRequest>,
    pub text_edits_ended: usize,
    pub cursors: Vec<CursorShape>,
    pub confirm_clear: bool,
}

#[derive(Clone, Default)]
pub struct RecordingPort(pub Rc<RefCell<PortLog>>);

impl UiPort for RecordingPort {
    fn redraw(&mut self) {
        self.0.borrow_mut().redraws += 1;
    }

    fn selection_changed(&mut self, panel: Option<&PanelState>) {
        self.0.borrow_mut().panels.push(panel.cloned());
    }

    fn notify(&mut self, notice: Notice) {
        self.0.borrow_mut().notices.push(notice);
    }

    fn begin_text_edit(&mut self, request: &TextEditRequest) {
        self.0.borrow_mut().text_edits.push(request.clone());
    }

    fn end_text_edit(&mut self) {
        self.0.borrow_mut().text_edits_ended += 1;
    }

    fn set_cursor(&mut self, cursor: CursorShape) {
        self.0.borrow_mut().cursors.push(cursor);
    }

    fn confirm_clear(&mut self) -> bool {
        self.0.borrow().confirm_clear
    }
}

pub struct Harness {
    pub editor: Editor,
    pub log: Rc<RefCell<PortLog>>,
    pub storage: MemoryStorage,
    pub t0: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(EditorConfig::default(), MemoryStorage::new())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_storage(config, MemoryStorage::new())
    }

    pub fn with_storage(config: EditorConfig, storage: MemoryStorage) -> Self {
        let port = RecordingPort::default();
        let log = port.0.clone();
        let editor = Editor::open(config, Box::new(storage.clone()), Box::new(port));
        Self {
            editor,
            log,
            storage,
            t0: Instant::now(),
        }
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    pub fn send(&mut self, event: InputEvent) {
        let now = self.t0;
        self.editor.handle(&event, now);
    }

    pub fn click(&mut self, x: f64, y: f64) {
        self.send(InputEvent::down(x, y));
        self.send(InputEvent::up(x, y));
    }

    pub fn shift_click(&mut self, x: f64, y: f64) {
        self.send(InputEvent::PointerDown {
            x,
            y,
            modifiers: Modifiers::SHIFT,
        });
        self.send(InputEvent::up(x, y));
    }

    pub fn drag(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.send(InputEvent::down(from.0, from.1));
        self.send(InputEvent::moved(to.0, to.1));
        self.send(InputEvent::up(to.0, to.1));
    }

    pub fn key(&mut self, key: &str, modifiers: Modifiers) {
        self.send(InputEvent::key(key, modifiers));
    }

    pub fn use_tool(&mut self, kind: ElementKind, template: &str) {
        self.editor.set_tool(Tool::new(kind, template));
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.log.borrow().notices.clone()
    }
}
