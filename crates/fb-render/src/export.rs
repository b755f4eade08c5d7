//! Surface allocation and PNG export.

use fb_core::{CanvasSize, Diagram, ElementId};
use thiserror::Error;
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::paint::{RenderOptions, paint_scene};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("enter a diagram title before exporting an image")]
    MissingTitle,

    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// A transparent pixmap covering `canvas` at `scale`.
pub fn new_surface(canvas: CanvasSize, scale: f32) -> Result<Pixmap, ExportError> {
    let width = (canvas.width as f32 * scale).ceil() as u32;
    let height = (canvas.height as f32 * scale).ceil() as u32;
    Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })
}

/// Allocate a surface and paint the diagram onto it.
pub fn render_diagram(
    diagram: &Diagram,
    members: &[ElementId],
    options: &RenderOptions,
) -> Result<Pixmap, ExportError> {
    let mut pixmap = new_surface(diagram.canvas, options.scale)?;
    paint_scene(&mut pixmap, diagram, members, options);
    Ok(pixmap)
}

/// Composite `scene` onto an opaque white surface of the same size.
pub fn flatten_onto_white(scene: &Pixmap) -> Result<Pixmap, ExportError> {
    let mut out = Pixmap::new(scene.width(), scene.height()).ok_or(ExportError::Surface {
        width: scene.width(),
        height: scene.height(),
    })?;
    out.fill(tiny_skia::Color::WHITE);
    out.draw_pixmap(0, 0, scene.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    Ok(out)
}

/// Render the canvas as currently shown and encode it as PNG on white.
///
/// Refuses diagrams without a title.
pub fn export_png(
    diagram: &Diagram,
    members: &[ElementId],
    options: &RenderOptions,
) -> Result<Vec<u8>, ExportError> {
    if diagram.title.trim().is_empty() {
        return Err(ExportError::MissingTitle);
    }
    let scene = render_diagram(diagram, members, options)?;
    let flat = flatten_onto_white(&scene)?;
    log::debug!("exporting `{}` as {}x{} PNG", diagram.title, flat.width(), flat.height());
    flat.encode_png().map_err(|e| ExportError::Encode(e.to_string()))
}
