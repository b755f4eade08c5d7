//! Diagram → tiny-skia drawing commands.
//!
//! Paints the grid, every element in sequence order with its label, then
//! selection handles. The pass reads the element's transient `selected` flag for the
//! primary and the member list for co-selected elements; it never writes
//! model state.

use fb_core::{
    ArrowHead, BranchOutline, Color, Diagram, Element, ElementId, ElementKind, FunctionIcon, Shape,
    resolve_template,
};
use kurbo::{BezPath, Circle, PathEl, Point, Rect, RoundedRect, RoundedRectRadii, Vec2};
use tiny_skia::{
    FillRule, GradientStop, LineCap, LineJoin, LinearGradient, Paint, Path, PathBuilder, Pixmap,
    SpreadMode, Stroke, Transform,
};

use crate::hit::{self, ARROW_HANDLE_RADIUS, HANDLE_SIZE, Handle};
use crate::label;

/// Colors used by the raster pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTheme {
    pub background: tiny_skia::Color,
    pub grid: Color,
    /// Stroke of the primary selection.
    pub selection: Color,
    /// Stroke of co-selected, non-primary members.
    pub co_selection: Color,
    pub handle_fill: Color,
    pub handle_stroke: Color,
    pub label_fill: Color,
    pub label_text: Color,
    /// Glow around the element whose text is being edited.
    pub highlight: Color,
}

impl CanvasTheme {
    /// Transparent surface with light grid lines; hosts show it over white.
    pub fn light() -> Self {
        Self {
            background: tiny_skia::Color::TRANSPARENT,
            grid: Color::rgb(0xe9, 0xec, 0xef),
            selection: Color::rgb(0x0d, 0x6e, 0xfd),
            co_selection: Color::rgb(0x6c, 0x75, 0x7d),
            handle_fill: Color::rgb(0x0d, 0x6e, 0xfd),
            handle_stroke: Color::WHITE,
            label_fill: Color::WHITE,
            label_text: Color::rgb(0x21, 0x25, 0x29),
            highlight: Color::rgb(0x00, 0x7b, 0xff),
        }
    }
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Per-frame render settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub show_grid: bool,
    pub grid_size: f64,
    /// Surface pixels per canvas unit (the zoom level).
    pub scale: f32,
    pub theme: CanvasTheme,
    /// Element with an open inline text field.
    pub editing: Option<ElementId>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            grid_size: 20.0,
            scale: 1.0,
            theme: CanvasTheme::light(),
            editing: None,
        }
    }
}

const CARD_RADIUS: f64 = 8.0;
const TEXTBOX_RADIUS: f64 = 4.0;
const FUNCTION_RADIUS: f64 = 8.0;
const FUNCTION_ICON_SIZE: f64 = 24.0;
const FUNCTION_ICON_INSET: f64 = 10.0;
const FUNCTION_TEXT_GAP: f64 = 15.0;
const ACTOR_HEAD_RADIUS: f64 = 12.0;
const ACTOR_LABEL_HEIGHT: f64 = 32.0;
const ACTOR_LABEL_INSET: f64 = 8.0;
const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;
const FONT_SIZE: f64 = 14.0;
/// Stroke widths of the edit glow, outermost first.
const HIGHLIGHT_RINGS: [(f64, u8); 3] = [(20.0, 24), (13.0, 40), (6.0, 64)];

/// Paint the whole diagram.
///
/// Call once per frame with a fresh pixmap sized to the canvas times
/// `options.scale`. `members` is the full selection; the primary is read
/// from each element's `selected` flag.
pub fn paint_scene(pixmap: &mut Pixmap, diagram: &Diagram, members: &[ElementId], options: &RenderOptions) {
    pixmap.fill(options.theme.background);
    let mut painter = Painter {
        pixmap,
        transform: Transform::from_scale(options.scale, options.scale),
    };

    if options.show_grid {
        paint_grid(&mut painter, diagram, options);
    }

    let multi = members.len() > 1;
    for element in &diagram.elements {
        if options.editing == Some(element.id) {
            paint_highlight(&mut painter, element, &options.theme);
        }
        let co_selected = !element.selected && members.contains(&element.id);
        paint_element(&mut painter, element, co_selected, &options.theme);
        if let Some(layout) = text_layout(element) {
            label::paint_label(painter.pixmap, painter.transform, diagram.canvas, element, &layout);
        }
    }

    // Handles go on top of every element.
    for element in &diagram.elements {
        if element.selected || (multi && members.contains(&element.id)) {
            paint_handles(&mut painter, element, &options.theme);
        }
    }
}

fn stroke_color(element: &Element, co_selected: bool, theme: &CanvasTheme) -> Color {
    if element.selected {
        theme.selection
    } else if co_selected {
        theme.co_selection
    } else {
        element.color.darken(0.2)
    }
}

/// Soft glow under the element being text-edited.
fn paint_highlight(painter: &mut Painter<'_>, element: &Element, theme: &CanvasTheme) {
    for (width, alpha) in HIGHLIGHT_RINGS {
        let paint = solid(theme.highlight, alpha);
        match (element.arrow(), element.arrow_endpoints()) {
            (Some(arrow), Some(line)) => painter.stroke(&line, &paint, arrow.thickness + width, true),
            _ => {
                let outline = element.bounds().to_rounded_rect(CARD_RADIUS);
                painter.stroke(&outline, &paint, width, true);
            }
        }
    }
}

fn paint_grid(painter: &mut Painter<'_>, diagram: &Diagram, options: &RenderOptions) {
    if options.grid_size <= 0.0 {
        return;
    }
    let (w, h) = (diagram.canvas.width as f64, diagram.canvas.height as f64);
    let paint = solid(options.theme.grid, 255);
    let mut x = 0.0;
    while x <= w {
        painter.fill_rect(Rect::new(x, 0.0, x + 1.0, h), &paint);
        x += options.grid_size;
    }
    let mut y = 0.0;
    while y <= h {
        painter.fill_rect(Rect::new(0.0, y, w, y + 1.0), &paint);
        y += options.grid_size;
    }
}

// ─── Element painters ────────────────────────────────────────────────────

fn paint_element(painter: &mut Painter<'_>, element: &Element, co_selected: bool, theme: &CanvasTheme) {
    let stroke = stroke_color(element, co_selected, theme);
    let line_width = if element.selected { 3.0 } else { 2.0 };
    match &element.shape {
        Shape::Card => {
            let shape = element.bounds().to_rounded_rect(CARD_RADIUS);
            painter.fill(&shape, &solid(element.color, 255));
            painter.stroke(&shape, &solid(stroke, 255), line_width, false);
        }
        Shape::TextBox => {
            let shape = element.bounds().to_rounded_rect(TEXTBOX_RADIUS);
            painter.stroke(&shape, &solid(element.color, 255), 1.5, false);
        }
        Shape::Branch(outline) => {
            let shape = branch_outline(element, *outline);
            painter.fill(&shape, &solid(element.color, 255));
            painter.stroke(&shape, &solid(stroke, 255), line_width, false);
        }
        Shape::Actor => paint_actor(painter, element, theme),
        Shape::Function(icon) => {
            let border = if element.selected || co_selected {
                solid(stroke, 255)
            } else {
                solid(Color::WHITE, 128)
            };
            paint_function(painter, element, *icon, &border, line_width);
        }
        Shape::Arrow(arrow) => {
            let Some(line) = element.arrow_endpoints() else {
                return;
            };
            let paint = solid(stroke, 255);
            painter.stroke(&line, &paint, arrow.thickness, true);

            let head_len = (3.0 * arrow.thickness).max(20.0);
            let mut heads = BezPath::new();
            if arrow.end_head == ArrowHead::Arrow {
                push_head(&mut heads, line.p1, line.p1 - line.p0, head_len);
            }
            if arrow.start_head == ArrowHead::Arrow {
                push_head(&mut heads, line.p0, line.p0 - line.p1, head_len);
            }
            if !heads.elements().is_empty() {
                painter.stroke(&heads, &paint, arrow.thickness, true);
            }
        }
    }
}

/// Two barbs at `tip`, opening back against `direction`.
fn push_head(path: &mut BezPath, tip: Point, direction: Vec2, len: f64) {
    let angle = direction.atan2();
    for barb in [angle - ARROW_HEAD_ANGLE, angle + ARROW_HEAD_ANGLE] {
        path.move_to(tip);
        path.line_to(tip - Vec2::from_angle(barb) * len);
    }
}

fn branch_outline(element: &Element, outline: BranchOutline) -> BezPath {
    let c = element.center();
    let r = element.width.min(element.height) / 2.0 - 5.0;
    let mut path = BezPath::new();
    match outline {
        BranchOutline::Triangle => {
            path.move_to((c.x, element.y));
            path.line_to((element.x + element.width, element.y + element.height));
            path.line_to((element.x, element.y + element.height));
            path.close_path();
        }
        BranchOutline::Diamond => {
            path.move_to((c.x, c.y - r));
            path.line_to((c.x + r, c.y));
            path.line_to((c.x, c.y + r));
            path.line_to((c.x - r, c.y));
            path.close_path();
        }
        BranchOutline::Circle => {
            path.extend(kurbo::Shape::path_elements(&Circle::new(c, r.max(0.0)), 0.1));
        }
        BranchOutline::Hexagon => {
            path.move_to((c.x + r, c.y));
            for i in 1..=6 {
                path.line_to(c + Vec2::from_angle(i as f64 * std::f64::consts::FRAC_PI_3) * r);
            }
            path.close_path();
        }
    }
    path
}

fn actor_label_box(element: &Element) -> Rect {
    let top = element.y + element.height - ACTOR_LABEL_HEIGHT;
    Rect::new(
        element.x + ACTOR_LABEL_INSET,
        top,
        element.x + element.width - ACTOR_LABEL_INSET,
        top + ACTOR_LABEL_HEIGHT,
    )
}

fn paint_actor(painter: &mut Painter<'_>, element: &Element, theme: &CanvasTheme) {
    let cx = element.center().x;
    let label = actor_label_box(element);
    let head_top = element.y + 8.0;
    let body_top = head_top + ACTOR_HEAD_RADIUS * 2.0 + 4.0;
    let body_bottom = label.y0 - 6.0;
    let ink = solid(element.color, 255);

    painter.fill(&Circle::new((cx, head_top + ACTOR_HEAD_RADIUS), ACTOR_HEAD_RADIUS), &ink);

    let mut figure = BezPath::new();
    figure.move_to((cx, body_top));
    figure.line_to((cx, body_bottom));
    figure.move_to((cx - 24.0, body_top + 10.0));
    figure.line_to((cx + 24.0, body_top + 10.0));
    figure.move_to((cx, body_bottom));
    figure.line_to((cx - 18.0, body_bottom + 18.0));
    figure.move_to((cx, body_bottom));
    figure.line_to((cx + 18.0, body_bottom + 18.0));
    painter.stroke(&figure, &ink, 2.0, false);

    let plate = label.to_rounded_rect(4.0);
    painter.fill(&plate, &solid(theme.label_fill, 255));
    painter.stroke(&plate, &ink, 1.5, false);
}

/// Top/bottom gradient colors of a function block.
///
/// Blocks still wearing their template color get the designed pair;
/// recolored blocks shade from their own color.
pub fn function_gradient(element: &Element, icon: FunctionIcon) -> (Color, Color) {
    let template = resolve_template(Some(ElementKind::FunctionBlock), element.shape.template_name());
    if element.color != template.config.color {
        return (element.color, element.color.darken(0.25));
    }
    let (top, bottom) = match icon {
        FunctionIcon::Database => (0x00d4ff, 0x0096c7),
        FunctionIcon::Api => (0x4cc9f0, 0x3a86ff),
        FunctionIcon::Email => (0x7209b7, 0x560bad),
        FunctionIcon::Notification => (0xf72585, 0xb5179e),
        FunctionIcon::Calculation => (0xff9500, 0xff6d00),
        FunctionIcon::Validation => (0x06d6a0, 0x118ab2),
    };
    (hex(top), hex(bottom))
}

fn hex(v: u32) -> Color {
    Color::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn paint_function(painter: &mut Painter<'_>, element: &Element, icon: FunctionIcon, border: &Paint<'_>, line_width: f64) {
    let bounds = element.bounds();
    let body = bounds.to_rounded_rect(FUNCTION_RADIUS);

    // Drop shadow, unblurred.
    painter.fill(&(body + Vec2::new(4.0, 4.0)), &solid(Color::BLACK, 46));

    let (top, bottom) = function_gradient(element, icon);
    let fill = vertical_gradient(bounds, [(top, 255), (bottom, 255)]);
    painter.fill(&body, &fill);

    painter.stroke(&body, border, line_width, false);

    let icon_center = Point::new(
        element.x + FUNCTION_ICON_INSET + FUNCTION_ICON_SIZE / 2.0,
        element.y + FUNCTION_ICON_INSET + FUNCTION_ICON_SIZE / 2.0,
    );
    painter.fill(
        &Circle::new(icon_center, FUNCTION_ICON_SIZE / 2.0 + 4.0),
        &solid(Color::WHITE, 77),
    );

    let gloss_rect = Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y0 + bounds.height() / 2.0);
    let gloss = RoundedRect::from_rect(
        gloss_rect,
        RoundedRectRadii::new(FUNCTION_RADIUS, FUNCTION_RADIUS, 0.0, 0.0),
    );
    painter.fill(&gloss, &vertical_gradient(gloss_rect, [(Color::WHITE, 102), (Color::WHITE, 0)]));
}

fn paint_handles(painter: &mut Painter<'_>, element: &Element, theme: &CanvasTheme) {
    let fill = solid(theme.handle_fill, 255);
    let ring = solid(theme.handle_stroke, 255);
    for (handle, center) in hit::handles(element) {
        match handle {
            Handle::Endpoint(_) => {
                let dot = Circle::new(center, ARROW_HANDLE_RADIUS);
                painter.fill(&dot, &fill);
                painter.stroke(&dot, &ring, 2.0, false);
            }
            Handle::Corner(_) => {
                let square = Rect::from_center_size(center, (HANDLE_SIZE, HANDLE_SIZE));
                painter.fill(&square, &fill);
                painter.stroke(&square, &ring, 2.0, false);
            }
        }
    }
}

// ─── Text layout ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Where and how an element's label is drawn. The anchor is the left or
/// center point of the text's middle line, per `align`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub anchor: Point,
    pub align: TextAlign,
    pub color: Color,
    pub bold: bool,
    pub font_size: f64,
}

/// Label layout for `element`, or `None` when it has no text.
pub fn text_layout(element: &Element) -> Option<TextLayout> {
    if element.text.is_empty() {
        return None;
    }
    let center = element.center();
    let layout = match element.shape {
        Shape::Function(_) => TextLayout {
            anchor: Point::new(
                element.x + FUNCTION_ICON_INSET + FUNCTION_ICON_SIZE + FUNCTION_TEXT_GAP,
                center.y,
            ),
            align: TextAlign::Left,
            color: Color::WHITE,
            bold: true,
            font_size: FONT_SIZE,
        },
        Shape::Actor => TextLayout {
            anchor: actor_label_box(element).center(),
            align: TextAlign::Center,
            color: CanvasTheme::light().label_text,
            bold: false,
            font_size: FONT_SIZE,
        },
        Shape::TextBox => TextLayout {
            anchor: center,
            align: TextAlign::Center,
            color: element.color,
            bold: false,
            font_size: FONT_SIZE,
        },
        _ => TextLayout {
            anchor: center,
            align: TextAlign::Center,
            color: Color::BLACK,
            bold: false,
            font_size: FONT_SIZE,
        },
    };
    Some(layout)
}

// ─── tiny-skia glue ──────────────────────────────────────────────────────

struct Painter<'p> {
    pixmap: &'p mut Pixmap,
    transform: Transform,
}

impl Painter<'_> {
    fn fill(&mut self, shape: &impl kurbo::Shape, paint: &Paint<'_>) {
        if let Some(path) = to_skia_path(shape) {
            self.pixmap.fill_path(&path, paint, FillRule::Winding, self.transform, None);
        }
    }

    fn stroke(&mut self, shape: &impl kurbo::Shape, paint: &Paint<'_>, width: f64, round: bool) {
        let Some(path) = to_skia_path(shape) else {
            return;
        };
        let mut stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        if round {
            stroke.line_cap = LineCap::Round;
            stroke.line_join = LineJoin::Round;
        }
        self.pixmap.stroke_path(&path, paint, &stroke, self.transform, None);
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint<'_>) {
        if let Some(r) = tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32) {
            self.pixmap.fill_rect(r, paint, self.transform, None);
        }
    }
}

/// Convert a kurbo shape into a tiny-skia path. Degenerate shapes yield
/// `None`.
fn to_skia_path(shape: &impl kurbo::Shape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in shape.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(a, p) => pb.quad_to(a.x as f32, a.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(a, b, p) => {
                pb.cubic_to(a.x as f32, a.y as f32, b.x as f32, b.y as f32, p.x as f32, p.y as f32)
            }
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn sk_color(color: Color, alpha: u8) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, alpha)
}

fn solid(color: Color, alpha: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(sk_color(color, alpha));
    paint.anti_alias = true;
    paint
}

/// Top-to-bottom two-stop gradient over `rect`. Falls back to the last stop
/// if the shader cannot be built.
fn vertical_gradient(rect: Rect, stops: [(Color, u8); 2]) -> Paint<'static> {
    let shader = LinearGradient::new(
        tiny_skia::Point::from_xy(rect.x0 as f32, rect.y0 as f32),
        tiny_skia::Point::from_xy(rect.x0 as f32, rect.y1 as f32),
        vec![
            GradientStop::new(0.0, sk_color(stops[0].0, stops[0].1)),
            GradientStop::new(1.0, sk_color(stops[1].0, stops[1].1)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );
    match shader {
        Some(shader) => Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        },
        None => solid(stops[1].0, stops[1].1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::{ElementKind, Mutation};

    fn stamp(d: &mut Diagram, kind: ElementKind, template: &str, at: (f64, f64)) -> ElementId {
        let el = d.create_element(Some(kind), template, Point::new(at.0, at.1), None);
        let id = el.id;
        d.apply(Mutation::AddElement(Box::new(el)));
        id
    }

    #[test]
    fn function_label_sits_after_icon() {
        let mut d = Diagram::new();
        let id = stamp(&mut d, ElementKind::FunctionBlock, "api", (100.0, 100.0));
        let layout = text_layout(d.get(id).unwrap()).unwrap();
        assert_eq!(layout.anchor, Point::new(149.0, 130.0));
        assert_eq!(layout.align, TextAlign::Left);
        assert_eq!(layout.color, Color::WHITE);
        assert!(layout.bold);
    }

    #[test]
    fn actor_label_sits_in_name_plate() {
        let mut d = Diagram::new();
        let id = stamp(&mut d, ElementKind::Actor, "human", (0.0, 0.0));
        let layout = text_layout(d.get(id).unwrap()).unwrap();
        // 120x140 actor: plate spans y 108..140.
        assert_eq!(layout.anchor, Point::new(60.0, 124.0));
        assert_eq!(layout.color, Color::rgb(0x21, 0x25, 0x29));
    }

    #[test]
    fn textbox_label_uses_own_color_and_blank_text_has_no_layout() {
        let mut d = Diagram::new();
        let id = stamp(&mut d, ElementKind::TextBox, "plain", (0.0, 0.0));
        let el = d.get(id).unwrap();
        assert_eq!(text_layout(el).unwrap().color, el.color);

        d.apply(Mutation::SetText {
            ids: smallvec::smallvec![id],
            text: String::new(),
        });
        assert!(text_layout(d.get(id).unwrap()).is_none());
    }

    #[test]
    fn recolored_function_shades_its_own_color() {
        let mut d = Diagram::new();
        let id = stamp(&mut d, ElementKind::FunctionBlock, "email", (0.0, 0.0));
        let el = d.get(id).unwrap();
        assert_eq!(function_gradient(el, FunctionIcon::Email), (hex(0x7209b7), hex(0x560bad)));

        let red = Color::rgb(200, 0, 0);
        d.apply(Mutation::SetColor {
            ids: smallvec::smallvec![id],
            color: red,
        });
        let el = d.get(id).unwrap();
        assert_eq!(function_gradient(el, FunctionIcon::Email), (red, Color::rgb(150, 0, 0)));
    }

    #[test]
    fn hexagon_outline_has_six_sides() {
        let mut d = Diagram::new();
        let id = stamp(&mut d, ElementKind::Branch, "hexagon", (0.0, 0.0));
        let path = branch_outline(d.get(id).unwrap(), BranchOutline::Hexagon);
        let line_tos = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::LineTo(_)))
            .count();
        assert_eq!(line_tos, 6);
    }
}
