pub mod diagram;
pub mod error;
pub mod geom;
pub mod id;
pub mod model;
pub mod mutation;
pub mod snapshot;
pub mod template;

pub use diagram::{CanvasSize, Diagram};
pub use error::{Error, Result};
pub use id::{ElementId, IdCounter, IdList};
pub use model::*;
pub use mutation::Mutation;
pub use snapshot::{FlowDocument, LoadReport, Loaded, export_file_name, export_json, load_document};
pub use template::{ResolvedTemplate, TemplateConfig, resolve_template, templates_for};

// Re-export kurbo so downstream crates share one geometry vocabulary
pub use kurbo;
