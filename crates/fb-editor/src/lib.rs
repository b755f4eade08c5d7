pub mod config;
pub mod editor;
pub mod gesture;
pub mod history;
pub mod input;
pub mod port;
pub mod saver;
pub mod selection;
pub mod shortcuts;

pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, ExportFile, Tool};
pub use gesture::Gesture;
pub use history::History;
pub use input::{InputEvent, Modifiers};
pub use port::{CursorShape, Notice, NullPort, PanelState, TextEditRequest, UiPort};
pub use saver::{FileStorage, MemoryStorage, SaveDebouncer, Storage, StorageError};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
