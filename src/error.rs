use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabkitError {
    /// The payload is neither an array nor an object holding a recognizable array.
    #[error("Unrecognized payload shape: {0}")]
    Shape(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid sort key: {0}")]
    InvalidSort(String),
}

pub type Result<T> = std::result::Result<T, TabkitError>;
