pub mod export;
pub mod hit;
pub mod label;
pub mod paint;

pub use export::{ExportError, export_png, flatten_onto_white, new_surface, render_diagram};
pub use hit::{Corner, Handle, HandleHit, pick_element_at, pick_resize_handle_at};
pub use label::fonts_available;
pub use paint::{CanvasTheme, RenderOptions, TextAlign, TextLayout, paint_scene, text_layout};
