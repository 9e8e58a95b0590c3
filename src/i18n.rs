//! Translation of diagnostic messages
//!
//! Diagnostics are written as English source strings with positional `%1`,
//! `%2`, ... placeholders. The source string is translated first and the
//! arguments are interpolated afterwards, so catalogs key on stable text.

use std::collections::HashMap;
use std::path::Path;

use crate::error::SettingsError;

/// Maps English source strings to the active locale.
pub trait Translator {
    fn translate(&self, source: &str) -> String;
}

/// Passes source strings through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Translator for Identity {
    fn translate(&self, source: &str) -> String {
        source.to_string()
    }
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, source: &str) -> String {
        self(source)
    }
}

/// A translation table loaded from a flat JSON object of `source: translation` pairs.
///
/// Missing entries fall back to the source string.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Catalog { entries }
    }

    pub fn from_json_str(content: &str) -> Result<Self, SettingsError> {
        Ok(Catalog {
            entries: serde_json::from_str(content)?,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Catalog::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for Catalog {
    fn translate(&self, source: &str) -> String {
        self.entries
            .get(source)
            .cloned()
            .unwrap_or_else(|| source.to_string())
    }
}

/// Replaces `%1`, `%2`, ... in `template` with `args` in order.
///
/// Placeholders are substituted from the highest index down so `%1` never
/// clobbers the prefix of `%10`.
pub fn interpolate(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (index, arg) in args.iter().enumerate().rev() {
        result = result.replace(&format!("%{}", index + 1), arg);
    }
    result
}

/// Translates `source` and interpolates `args` into the result.
pub fn tr(translator: &dyn Translator, source: &str, args: &[&str]) -> String {
    interpolate(&translator.translate(source), args)
}
