//! Per-(kind, template) defaults used when stamping new elements.
//!
//! Lookup falls back in three steps: unknown template → the kind's first
//! template; unknown kind → `card/basic`.

use crate::model::*;

/// Defaults for one template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateConfig {
    pub width: f64,
    pub height: f64,
    pub default_text: &'static str,
    pub color: Color,
    /// Stroke width, arrows only.
    pub thickness: Option<f64>,
}

const fn boxed(width: f64, height: f64, default_text: &'static str, color: Color) -> TemplateConfig {
    TemplateConfig {
        width,
        height,
        default_text,
        color,
        thickness: None,
    }
}

const BRANCH: TemplateConfig = boxed(100.0, 80.0, "Branch", Color::rgb(0xff, 0xc1, 0x07));
const ARROW: TemplateConfig = TemplateConfig {
    width: 120.0,
    height: 60.0,
    default_text: "",
    color: Color::rgb(0x6c, 0x75, 0x7d),
    thickness: Some(DEFAULT_ARROW_THICKNESS),
};

/// The catalog, grouped by kind. The first entry of each kind is its basic
/// template.
const CATALOG: &[(ElementKind, &str, TemplateConfig)] = &[
    (ElementKind::Card, "basic", boxed(140.0, 70.0, "Card", Color::rgb(0x00, 0x7b, 0xff))),
    (ElementKind::TextBox, "plain", boxed(160.0, 50.0, "Text", Color::rgb(0x21, 0x25, 0x29))),
    (ElementKind::Branch, "diamond", BRANCH),
    (ElementKind::Branch, "triangle", BRANCH),
    (ElementKind::Branch, "circle", BRANCH),
    (ElementKind::Branch, "hexagon", BRANCH),
    (ElementKind::Actor, "human", boxed(120.0, 140.0, "Actor", Color::rgb(0x0d, 0x6e, 0xfd))),
    (ElementKind::FunctionBlock, "database", boxed(160.0, 60.0, "Database", Color::rgb(0x00, 0xd4, 0xff))),
    (ElementKind::FunctionBlock, "api", boxed(160.0, 60.0, "API", Color::rgb(0x4c, 0xc9, 0xf0))),
    (ElementKind::FunctionBlock, "email", boxed(160.0, 60.0, "Email", Color::rgb(0x72, 0x09, 0xb7))),
    (ElementKind::FunctionBlock, "notification", boxed(160.0, 60.0, "Notification", Color::rgb(0xf7, 0x25, 0x85))),
    (ElementKind::FunctionBlock, "calculation", boxed(160.0, 60.0, "Calculation", Color::rgb(0xff, 0x95, 0x00))),
    (ElementKind::FunctionBlock, "validation", boxed(160.0, 60.0, "Validation", Color::rgb(0x06, 0xd6, 0xa0))),
    (ElementKind::Arrow, "line", ARROW),
    (ElementKind::Arrow, "right", ARROW),
    (ElementKind::Arrow, "down", ARROW),
    (ElementKind::Arrow, "left", ARROW),
    (ElementKind::Arrow, "up", ARROW),
];

/// A catalog entry after fallback resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTemplate {
    pub kind: ElementKind,
    pub template: &'static str,
    pub config: TemplateConfig,
}

/// Resolve a (kind, template) pair against the catalog.
///
/// `kind == None` stands for a kind name that did not parse.
pub fn resolve_template(kind: Option<ElementKind>, template: &str) -> ResolvedTemplate {
    let entry = kind.and_then(|kind| {
        CATALOG
            .iter()
            .find(|(k, t, _)| *k == kind && *t == template)
            .or_else(|| CATALOG.iter().find(|(k, _, _)| *k == kind))
    });
    let (kind, template, config) = match entry {
        Some(e) => *e,
        None => CATALOG[0],
    };
    ResolvedTemplate {
        kind,
        template,
        config,
    }
}

/// Templates available for `kind`, in catalog order.
pub fn templates_for(kind: ElementKind) -> impl Iterator<Item = &'static str> {
    CATALOG
        .iter()
        .filter(move |(k, _, _)| *k == kind)
        .map(|(_, t, _)| *t)
}

impl ResolvedTemplate {
    /// Build the kind-specific [`Shape`] for this template. Arrow shapes are
    /// created without endpoints; the caller anchors them.
    pub fn shape(&self) -> Shape {
        match self.kind {
            ElementKind::Card => Shape::Card,
            ElementKind::TextBox => Shape::TextBox,
            ElementKind::Actor => Shape::Actor,
            ElementKind::Branch => Shape::Branch(match self.template {
                "triangle" => BranchOutline::Triangle,
                "circle" => BranchOutline::Circle,
                "hexagon" => BranchOutline::Hexagon,
                _ => BranchOutline::Diamond,
            }),
            ElementKind::FunctionBlock => Shape::Function(match self.template {
                "api" => FunctionIcon::Api,
                "email" => FunctionIcon::Email,
                "notification" => FunctionIcon::Notification,
                "calculation" => FunctionIcon::Calculation,
                "validation" => FunctionIcon::Validation,
                _ => FunctionIcon::Database,
            }),
            ElementKind::Arrow => Shape::Arrow(Arrow {
                template: match self.template {
                    "right" => ArrowTemplate::Right,
                    "down" => ArrowTemplate::Down,
                    "left" => ArrowTemplate::Left,
                    "up" => ArrowTemplate::Up,
                    _ => ArrowTemplate::Line,
                },
                endpoints: None,
                thickness: self.config.thickness.unwrap_or(DEFAULT_ARROW_THICKNESS),
                start_head: ArrowHead::None,
                end_head: ArrowHead::Arrow,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let t = resolve_template(Some(ElementKind::Branch), "hexagon");
        assert_eq!(t.kind, ElementKind::Branch);
        assert_eq!(t.template, "hexagon");
        assert_eq!(t.shape(), Shape::Branch(BranchOutline::Hexagon));
    }

    #[test]
    fn unknown_template_falls_back_to_first_of_kind() {
        let t = resolve_template(Some(ElementKind::FunctionBlock), "teleport");
        assert_eq!(t.template, "database");
        assert_eq!(t.config.default_text, "Database");
    }

    #[test]
    fn unknown_kind_falls_back_to_basic_card() {
        let t = resolve_template(None, "whatever");
        assert_eq!(t.kind, ElementKind::Card);
        assert_eq!(t.template, "basic");
        assert_eq!((t.config.width, t.config.height), (140.0, 70.0));
    }

    #[test]
    fn every_kind_has_a_template() {
        for kind in ElementKind::ALL {
            assert!(templates_for(kind).next().is_some(), "{kind:?} has no template");
        }
    }

    #[test]
    fn arrow_defaults_to_thickness_eight() {
        let t = resolve_template(Some(ElementKind::Arrow), "line");
        match t.shape() {
            Shape::Arrow(arrow) => {
                assert_eq!(arrow.thickness, 8.0);
                assert_eq!(arrow.start_head, ArrowHead::None);
                assert_eq!(arrow.end_head, ArrowHead::Arrow);
            }
            other => panic!("expected arrow, got {other:?}"),
        }
    }
}
