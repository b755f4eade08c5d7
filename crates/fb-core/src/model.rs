//! Diagram element model.
//!
//! An [`Element`] carries the fields every kind shares (id, box, text, color)
//! plus a [`Shape`] sum type holding only what its kind needs. Arrows own an
//! explicit start/end [`Line`]; their box is derived from it and must be
//! refreshed with [`Element::recompute_arrow_bounds`] after every endpoint
//! change.

use crate::id::ElementId;
use kurbo::{Line, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum width of any non-arrow element.
pub const MIN_WIDTH: f64 = 50.0;
/// Minimum height of any non-arrow element.
pub const MIN_HEIGHT: f64 = 30.0;
/// Default arrow stroke width.
pub const DEFAULT_ARROW_THICKNESS: f64 = 8.0;
/// Stroke width recorded for box kinds in persisted records.
pub const BOX_STROKE_WIDTH: f64 = 2.0;
/// Allowed arrow thickness range for user edits.
pub const ARROW_THICKNESS_RANGE: (f64, f64) = (1.0, 20.0);

// ─── Colors ──────────────────────────────────────────────────────────────

/// Opaque RGB color, serialized as `#rrggbb`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`, the form color pickers report.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scale each channel towards black by `factor` (0.0 = unchanged).
    pub fn darken(&self, factor: f64) -> Self {
        let keep = (1.0 - factor).clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * keep).floor() as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Kinds & templates ───────────────────────────────────────────────────

/// The kind tag of an element, as stored in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Card,
    #[serde(rename = "textbox")]
    TextBox,
    Branch,
    Actor,
    #[serde(rename = "function")]
    FunctionBlock,
    Arrow,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Card,
        ElementKind::TextBox,
        ElementKind::Branch,
        ElementKind::Actor,
        ElementKind::FunctionBlock,
        ElementKind::Arrow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Card => "card",
            ElementKind::TextBox => "textbox",
            ElementKind::Branch => "branch",
            ElementKind::Actor => "actor",
            ElementKind::FunctionBlock => "function",
            ElementKind::Arrow => "arrow",
        }
    }
}

impl FromStr for ElementKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| crate::Error::UnknownKind(s.to_string()))
    }
}

/// Outline drawn for a `Branch` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchOutline {
    Diamond,
    Triangle,
    Circle,
    Hexagon,
}

/// Icon/gradient pair of a `FunctionBlock` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionIcon {
    Database,
    Api,
    Email,
    Notification,
    Calculation,
    Validation,
}

/// Arrow template. `Line` arrows always carry explicit endpoints; the
/// directional templates only matter for legacy records without them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowTemplate {
    Line,
    Right,
    Down,
    Left,
    Up,
}

/// Decoration at one end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowHead {
    None,
    #[default]
    Arrow,
}

/// Which end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowEnd {
    Start,
    End,
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Arrow-specific state.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub template: ArrowTemplate,
    /// Explicit start (`p0`) and end (`p1`). `None` for legacy arrows whose
    /// geometry derives from the template direction and the element box.
    pub endpoints: Option<Line>,
    pub thickness: f64,
    pub start_head: ArrowHead,
    pub end_head: ArrowHead,
}

impl Arrow {
    /// A fresh arrow anchored at `start` and `end` with the default heads.
    pub fn between(template: ArrowTemplate, start: Point, end: Point, thickness: f64) -> Self {
        Self {
            template,
            endpoints: Some(Line::new(start, end)),
            thickness,
            start_head: ArrowHead::None,
            end_head: ArrowHead::Arrow,
        }
    }

    pub fn head(&self, end: ArrowEnd) -> ArrowHead {
        match end {
            ArrowEnd::Start => self.start_head,
            ArrowEnd::End => self.end_head,
        }
    }
}

/// Kind-specific part of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Card,
    TextBox,
    Branch(BranchOutline),
    Actor,
    Function(FunctionIcon),
    Arrow(Arrow),
}

impl Shape {
    pub fn kind(&self) -> ElementKind {
        match self {
            Shape::Card => ElementKind::Card,
            Shape::TextBox => ElementKind::TextBox,
            Shape::Branch(_) => ElementKind::Branch,
            Shape::Actor => ElementKind::Actor,
            Shape::Function(_) => ElementKind::FunctionBlock,
            Shape::Arrow(_) => ElementKind::Arrow,
        }
    }

    /// Template name as stored in the `template` field.
    pub fn template_name(&self) -> &'static str {
        match self {
            Shape::Card => "basic",
            Shape::TextBox => "plain",
            Shape::Actor => "human",
            Shape::Branch(outline) => match outline {
                BranchOutline::Diamond => "diamond",
                BranchOutline::Triangle => "triangle",
                BranchOutline::Circle => "circle",
                BranchOutline::Hexagon => "hexagon",
            },
            Shape::Function(icon) => match icon {
                FunctionIcon::Database => "database",
                FunctionIcon::Api => "api",
                FunctionIcon::Email => "email",
                FunctionIcon::Notification => "notification",
                FunctionIcon::Calculation => "calculation",
                FunctionIcon::Validation => "validation",
            },
            Shape::Arrow(arrow) => match arrow.template {
                ArrowTemplate::Line => "line",
                ArrowTemplate::Right => "right",
                ArrowTemplate::Down => "down",
                ArrowTemplate::Left => "left",
                ArrowTemplate::Up => "up",
            },
        }
    }
}

// ─── Element ─────────────────────────────────────────────────────────────

/// One placed shape or arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    /// Top-left corner. Derived from the endpoints for arrows.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub color: Color,
    /// Render-pass styling flag. Reassigned on every paint from the
    /// selection; never read as authoritative state.
    pub selected: bool,
    pub shape: Shape,
    /// Host style overrides from the stored record, kept verbatim.
    pub style: Option<serde_json::Value>,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self.shape, Shape::Arrow(_))
    }

    pub fn arrow(&self) -> Option<&Arrow> {
        match &self.shape {
            Shape::Arrow(arrow) => Some(arrow),
            _ => None,
        }
    }

    pub fn arrow_mut(&mut self) -> Option<&mut Arrow> {
        match &mut self.shape {
            Shape::Arrow(arrow) => Some(arrow),
            _ => None,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Start/end of an arrow: the explicit endpoints if present, otherwise
    /// derived from the box and the template direction. `None` for
    /// non-arrow kinds.
    pub fn arrow_endpoints(&self) -> Option<Line> {
        let arrow = self.arrow()?;
        if let Some(line) = arrow.endpoints {
            return Some(line);
        }

        let c = self.center();
        let half = self.width.min(self.height) * 0.8 / 2.0;
        let line = match arrow.template {
            ArrowTemplate::Right => Line::new(c - Vec2::new(half, 0.0), c + Vec2::new(half, 0.0)),
            ArrowTemplate::Left => Line::new(c + Vec2::new(half, 0.0), c - Vec2::new(half, 0.0)),
            ArrowTemplate::Down => Line::new(c - Vec2::new(0.0, half), c + Vec2::new(0.0, half)),
            ArrowTemplate::Up => Line::new(c + Vec2::new(0.0, half), c - Vec2::new(0.0, half)),
            ArrowTemplate::Line => Line::new(
                (self.x, self.y),
                (self.x + self.width, self.y),
            ),
        };
        Some(line)
    }

    /// Refresh an arrow's box from its endpoints:
    /// `x = min(x0, x1)`, `y = min(y0, y1)`, `w = max(1, |dx|)`, `h = max(1, |dy|)`.
    /// No-op for other kinds.
    pub fn recompute_arrow_bounds(&mut self) {
        let Some(line) = self.arrow_endpoints() else {
            return;
        };
        let (a, b) = (line.p0, line.p1);
        self.x = a.x.min(b.x);
        self.y = a.y.min(b.y);
        self.width = (b.x - a.x).abs().max(1.0);
        self.height = (b.y - a.y).abs().max(1.0);
    }

    /// Move one endpoint of an arrow and refresh its box. Legacy arrows are
    /// materialized into explicit endpoints first.
    pub fn set_arrow_point(&mut self, end: ArrowEnd, point: Point) {
        let Some(mut line) = self.arrow_endpoints() else {
            return;
        };
        match end {
            ArrowEnd::Start => line.p0 = point,
            ArrowEnd::End => line.p1 = point,
        }
        if let Some(arrow) = self.arrow_mut() {
            arrow.endpoints = Some(line);
        }
        self.recompute_arrow_bounds();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow_element(line: Option<Line>, template: ArrowTemplate) -> Element {
        Element {
            id: ElementId(1),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
            text: String::new(),
            color: Color::rgb(0x6c, 0x75, 0x7d),
            selected: false,
            style: None,
            shape: Shape::Arrow(Arrow {
                template,
                endpoints: line,
                thickness: DEFAULT_ARROW_THICKNESS,
                start_head: ArrowHead::None,
                end_head: ArrowHead::Arrow,
            }),
        }
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#007BFF").unwrap();
        assert_eq!(c, Color::rgb(0x00, 0x7b, 0xff));
        assert_eq!(c.to_hex(), "#007bff");
        assert_eq!(Color::from_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn darken_scales_channels_down() {
        let c = Color::rgb(100, 200, 50).darken(0.2);
        assert_eq!(c, Color::rgb(80, 160, 40));
    }

    #[test]
    fn kind_parses_wire_names() {
        assert_eq!("function".parse::<ElementKind>().unwrap(), ElementKind::FunctionBlock);
        assert_eq!("textbox".parse::<ElementKind>().unwrap(), ElementKind::TextBox);
        assert!("ellipse".parse::<ElementKind>().is_err());
    }

    #[test]
    fn recompute_bounds_normalizes_reversed_arrow() {
        let line = Line::new((200.0, 90.0), (40.0, 10.0));
        let mut el = arrow_element(Some(line), ArrowTemplate::Line);
        el.recompute_arrow_bounds();
        assert_eq!((el.x, el.y, el.width, el.height), (40.0, 10.0, 160.0, 80.0));
    }

    #[test]
    fn recompute_bounds_keeps_minimum_extent() {
        let line = Line::new((30.0, 30.0), (30.0, 30.0));
        let mut el = arrow_element(Some(line), ArrowTemplate::Line);
        el.recompute_arrow_bounds();
        assert_eq!((el.width, el.height), (1.0, 1.0));
    }

    #[test]
    fn legacy_arrow_derives_from_template() {
        // 100x50 box centered at (50, 25): length = 0.8 * 50 = 40.
        let el = arrow_element(None, ArrowTemplate::Left);
        let line = el.arrow_endpoints().unwrap();
        assert_eq!(line.p0, Point::new(70.0, 25.0));
        assert_eq!(line.p1, Point::new(30.0, 25.0));

        let el = arrow_element(None, ArrowTemplate::Line);
        let line = el.arrow_endpoints().unwrap();
        assert_eq!(line.p0, Point::new(0.0, 0.0));
        assert_eq!(line.p1, Point::new(100.0, 0.0));
    }

    #[test]
    fn set_arrow_point_materializes_legacy_endpoints() {
        let mut el = arrow_element(None, ArrowTemplate::Down);
        el.set_arrow_point(ArrowEnd::End, Point::new(50.0, 200.0));
        let arrow = el.arrow().unwrap();
        let line = arrow.endpoints.unwrap();
        assert_eq!(line.p0, Point::new(50.0, 5.0));
        assert_eq!(line.p1, Point::new(50.0, 200.0));
        assert_eq!(el.height, 195.0);
    }
}
