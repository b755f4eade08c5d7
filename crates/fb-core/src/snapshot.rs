//! Persisted snapshot and JSON export formats.
//!
//! The stored record is a flat JSON object (`elements`, `connections`,
//! `elementIdCounter`, `flowTitle`, `canvasWidth`, `canvasHeight`,
//! `zoomLevel`, `createdAt`, `updatedAt`). Elements are written as flat
//! [`ElementRecord`]s and converted to the sum-typed [`Element`] on load.
//!
//! Loading never fails: each field that is missing or malformed takes its
//! default, malformed elements are skipped, and every recovery is reported
//! in the [`LoadReport`].

use crate::diagram::{CanvasSize, Diagram, MAX_ZOOM, MIN_ZOOM};
use crate::error::{Error, Result};
use crate::id::{ElementId, IdCounter};
use crate::model::*;
use crate::template::resolve_template;
use chrono::{DateTime, Utc};
use kurbo::Line;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version tag written into JSON exports.
pub const EXPORT_VERSION: &str = "1.0";

// ─── Element records ─────────────────────────────────────────────────────

/// Wire form of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_head: Option<ArrowHead>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_head: Option<ArrowHead>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
}

impl From<&Element> for ElementRecord {
    fn from(e: &Element) -> Self {
        let mut record = ElementRecord {
            id: e.id.get(),
            kind: e.kind().as_str().to_string(),
            template: e.shape.template_name().to_string(),
            x: e.x,
            y: e.y,
            width: e.width,
            height: e.height,
            text: e.text.clone(),
            color: e.color.to_hex(),
            thickness: Some(BOX_STROKE_WIDTH),
            start_x: None,
            start_y: None,
            end_x: None,
            end_y: None,
            start_head: None,
            end_head: None,
            style: e.style.clone(),
        };
        if let Some(arrow) = e.arrow() {
            record.thickness = Some(arrow.thickness);
            record.start_head = Some(arrow.start_head);
            record.end_head = Some(arrow.end_head);
            if let Some(line) = arrow.endpoints {
                record.start_x = Some(line.p0.x);
                record.start_y = Some(line.p0.y);
                record.end_x = Some(line.p1.x);
                record.end_y = Some(line.p1.y);
            }
        }
        record
    }
}

impl ElementRecord {
    /// Convert to a model element.
    ///
    /// The kind must be known. An unknown template falls back to the kind's
    /// basic template and an unparseable color to the template color.
    pub fn into_element(self) -> Result<Element> {
        let kind: ElementKind = self.kind.parse()?;
        let resolved = resolve_template(Some(kind), &self.template);
        if resolved.template != self.template {
            log::warn!(
                "element {}: unknown {} template `{}`, using `{}`",
                self.id,
                kind.as_str(),
                self.template,
                resolved.template
            );
        }
        let color = Color::from_hex(&self.color).unwrap_or_else(|| {
            log::warn!("element {}: invalid color `{}`", self.id, self.color);
            resolved.config.color
        });

        let mut shape = resolved.shape();
        if let Shape::Arrow(arrow) = &mut shape {
            arrow.thickness = self.thickness.unwrap_or(DEFAULT_ARROW_THICKNESS);
            arrow.start_head = self.start_head.unwrap_or(ArrowHead::None);
            arrow.end_head = self.end_head.unwrap_or(ArrowHead::Arrow);
            if let (Some(sx), Some(sy), Some(ex), Some(ey)) =
                (self.start_x, self.start_y, self.end_x, self.end_y)
            {
                arrow.endpoints = Some(Line::new((sx, sy), (ex, ey)));
            }
        }

        let mut element = Element {
            id: ElementId(self.id),
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            text: self.text,
            color,
            selected: false,
            shape,
            style: self.style,
        };
        if element.is_arrow() {
            if element.arrow().is_some_and(|a| a.endpoints.is_some()) {
                element.recompute_arrow_bounds();
            }
        } else {
            element.width = element.width.max(MIN_WIDTH);
            element.height = element.height.max(MIN_HEIGHT);
        }
        Ok(element)
    }
}

// ─── Flow document ───────────────────────────────────────────────────────

/// The persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    pub elements: Vec<ElementRecord>,
    pub connections: Vec<Value>,
    pub element_id_counter: u64,
    pub flow_title: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub zoom_level: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlowDocument {
    /// Capture `diagram`. `created_at` defaults to `now` for a diagram that
    /// has never been stored.
    pub fn from_diagram(diagram: &Diagram, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            elements: diagram.elements.iter().map(ElementRecord::from).collect(),
            connections: diagram.connections.clone(),
            element_id_counter: diagram.id_counter.last(),
            flow_title: diagram.title.clone(),
            canvas_width: diagram.canvas.width,
            canvas_height: diagram.canvas.height,
            zoom_level: diagram.zoom,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Metadata block appended to JSON exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// A persisted record plus export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(flatten)]
    pub document: FlowDocument,
    pub metadata: ExportMetadata,
}

/// Pretty-printed JSON export of `diagram`.
pub fn export_json(diagram: &Diagram, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<String> {
    let export = ExportDocument {
        document: FlowDocument::from_diagram(diagram, created_at, now),
        metadata: ExportMetadata {
            exported_at: now,
            version: EXPORT_VERSION.to_string(),
        },
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// `<stem>-YYYY-MM-DD.<ext>` where the stem is the title with characters
/// that are invalid in file names removed and whitespace runs turned into
/// `-`. A blank title uses `fallback`.
pub fn export_file_name(title: &str, fallback: &str, date: DateTime<Utc>, ext: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let stem = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    let stem = if stem.is_empty() { fallback } else { &stem };
    format!("{stem}-{}.{ext}", date.format("%Y-%m-%d"))
}

// ─── Loading ─────────────────────────────────────────────────────────────

/// What happened while loading a stored record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Set when the record could not be used at all.
    pub failure: Option<String>,
    /// Recovered field-level problems.
    pub issues: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failure.is_none() && self.issues.is_empty()
    }
}

/// Result of [`load_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub diagram: Diagram,
    pub created_at: Option<DateTime<Utc>>,
    pub report: LoadReport,
}

/// Decode a stored record, recovering from anything malformed.
pub fn load_document(text: &str) -> Loaded {
    match decode_object(text) {
        Ok(obj) => decode_fields(&obj),
        Err(err) => {
            log::warn!("stored diagram unreadable: {err}");
            Loaded {
                diagram: Diagram::new(),
                created_at: None,
                report: LoadReport {
                    failure: Some(err.to_string()),
                    issues: Vec::new(),
                },
            }
        }
    }
}

fn decode_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(obj) => Ok(obj),
        _ => Err(Error::NotAnObject),
    }
}

/// Read `key` as `T`, or `None` if it is absent, null, or the wrong shape.
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, issues: &mut Vec<String>) -> Option<T> {
    let value = obj.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(err) => {
            log::warn!("stored field `{key}` ignored: {err}");
            issues.push(format!("`{key}`: {err}"));
            None
        }
    }
}

fn decode_fields(obj: &Map<String, Value>) -> Loaded {
    let mut issues = Vec::new();
    let mut diagram = Diagram::new();

    let raw_elements: Vec<Value> = field(obj, "elements", &mut issues).unwrap_or_default();
    for raw in raw_elements {
        let decoded = serde_json::from_value::<ElementRecord>(raw)
            .map_err(|e| Error::MalformedElement(e.to_string()))
            .and_then(ElementRecord::into_element);
        match decoded {
            Ok(element) if diagram.contains(element.id) => {
                issues.push(format!("duplicate element id {}", element.id));
            }
            Ok(element) => {
                diagram.id_counter.observe(element.id);
                diagram.elements.push(element);
            }
            Err(err) => {
                log::warn!("stored element skipped: {err}");
                issues.push(err.to_string());
            }
        }
    }

    diagram.connections = field(obj, "connections", &mut issues).unwrap_or_default();

    let stored_counter: u64 = field(obj, "elementIdCounter", &mut issues).unwrap_or(0);
    let observed = diagram.id_counter.last();
    diagram.id_counter = IdCounter::starting_at(stored_counter.max(observed));

    diagram.title = field(obj, "flowTitle", &mut issues).unwrap_or_default();

    let defaults = CanvasSize::default();
    diagram.canvas = CanvasSize {
        width: field::<u32>(obj, "canvasWidth", &mut issues)
            .filter(|w| *w > 0)
            .unwrap_or(defaults.width),
        height: field::<u32>(obj, "canvasHeight", &mut issues)
            .filter(|h| *h > 0)
            .unwrap_or(defaults.height),
    };

    diagram.zoom = field::<f64>(obj, "zoomLevel", &mut issues)
        .filter(|z| z.is_finite() && *z > 0.0)
        .map(|z| z.clamp(MIN_ZOOM, MAX_ZOOM))
        .unwrap_or(1.0);

    let created_at = field(obj, "createdAt", &mut issues);

    log::debug!(
        "loaded diagram `{}`: {} elements, {} issues",
        diagram.title,
        diagram.len(),
        issues.len()
    );

    Loaded {
        diagram,
        created_at,
        report: LoadReport {
            failure: None,
            issues,
        },
    }
}
