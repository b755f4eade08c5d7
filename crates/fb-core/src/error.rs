use thiserror::Error;

/// Errors raised by the core model and snapshot codecs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown element kind `{0}`")]
    UnknownKind(String),

    #[error("malformed element record: {0}")]
    MalformedElement(String),

    #[error("snapshot is not a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
