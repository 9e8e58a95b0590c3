use thiserror::Error;

/// Reasons a share link or foreign document could not be turned into records.
///
/// These never cross the public parsing façade: `parse_share_link` maps them
/// to an empty record, and the importers skip the offending entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed base64 payload")]
    MalformedBase64,

    #[error("Invalid JSON document: {0}")]
    InvalidJson(String),

    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Unsupported link scheme: {0}")]
    UnsupportedScheme(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(error: serde_json::Error) -> Self {
        ParseError::InvalidJson(error.to_string())
    }
}

/// Errors raised while loading settings or translation catalogs.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while serializing rendered documents.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
