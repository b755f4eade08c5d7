//! Label glyphs through resvg.
//!
//! Each label becomes a one-text SVG document in canvas units and is
//! rendered onto the scene with the frame transform, right after its
//! element so later elements still cover it. Faces come from the system
//! font database, loaded once per process.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use fb_core::{CanvasSize, Element};
use resvg::usvg::{self, fontdb};
use tiny_skia::{Pixmap, Transform};

use crate::paint::{TextAlign, TextLayout};

/// Families tried in order before falling back to any installed face.
const PREFERRED_FAMILIES: [&str; 5] = ["Arial", "Helvetica", "Liberation Sans", "DejaVu Sans", "Noto Sans"];

struct FontStack {
    db: Arc<fontdb::Database>,
    family: Option<String>,
}

fn font_stack() -> &'static FontStack {
    static FONTS: OnceLock<FontStack> = OnceLock::new();
    FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let family = pick_family(&db);
        match &family {
            Some(name) => log::debug!("labels use `{name}` ({} faces loaded)", db.len()),
            None => log::warn!("no system fonts found, labels are not drawn"),
        }
        FontStack {
            db: Arc::new(db),
            family,
        }
    })
}

fn pick_family(db: &fontdb::Database) -> Option<String> {
    let installed: Vec<&str> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str()))
        .collect();
    PREFERRED_FAMILIES
        .iter()
        .copied()
        .find(|name| installed.contains(name))
        .or_else(|| installed.first().copied())
        .map(str::to_string)
}

/// Whether any face is installed for drawing labels.
pub fn fonts_available() -> bool {
    font_stack().family.is_some()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// The SVG document drawing `text` at `layout`, sized to `canvas`.
pub fn label_svg(text: &str, layout: &TextLayout, canvas: CanvasSize, family: &str) -> String {
    let anchor = match layout.align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
    };
    let weight = if layout.bold { "bold" } else { "normal" };
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width,
        h = canvas.height,
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{weight}" fill="{}" text-anchor="{anchor}" dominant-baseline="central" xml:space="preserve">{}</text></svg>"#,
        layout.anchor.x,
        layout.anchor.y,
        escape(family),
        layout.font_size,
        layout.color.to_hex(),
        escape(text),
    );
    svg
}

/// Draw `element`'s label onto `pixmap`.
pub(crate) fn paint_label(
    pixmap: &mut Pixmap,
    transform: Transform,
    canvas: CanvasSize,
    element: &Element,
    layout: &TextLayout,
) {
    let stack = font_stack();
    let Some(family) = &stack.family else {
        return;
    };
    let svg = label_svg(&element.text, layout, canvas, family);
    let mut options = usvg::Options::default();
    options.fontdb = stack.db.clone();
    options.font_family = family.clone();
    match usvg::Tree::from_str(&svg, &options) {
        Ok(tree) => resvg::render(&tree, transform, &mut pixmap.as_mut()),
        Err(e) => log::warn!("label of {} not drawn: {e}", element.id),
    }
}
