pub mod error;
pub mod generator;
pub mod helper;
pub mod i18n;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;
pub mod validators;

// Re-export the record types for easier access
pub use models::{Protocol, ServerRecord};

// Re-export the dispatcher
pub use helper::{parse_share_link, render, validate, ServerConfigHelper};

pub use error::{ParseError, RenderError, SettingsError};
pub use settings::Settings;
