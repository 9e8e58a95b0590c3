//! Single-field validation building blocks.
//!
//! Each function returns `None` when the field is valid and a translated
//! diagnostic otherwise.

use serde_json::{Map, Value};

use crate::i18n::{tr, Translator};
use crate::models::as_integer;

/// A predicate over a field value; a field passes when any predicate holds.
pub type Predicate<'a> = &'a dyn Fn(&str) -> bool;

pub const MSG_MISSING: &str = "Missing the value of '%1'.";
pub const MSG_EMPTY: &str = "The value of '%1' cannot be empty.";
pub const MSG_INVALID: &str = "The value of '%1' seems invalid.";
pub const MSG_NOT_NUMBER: &str = "The value of '%1' should be a number.";
pub const MSG_OUT_OF_RANGE: &str = "The value of '%1' should be between %2 and %3.";

/// Validates the string field `key` of `doc`.
///
/// Checks, in priority order: the field is present and a string; it is not
/// empty unless `optional`; at least one of `predicates` accepts it. An empty
/// optional value skips the predicates, and an empty predicate list accepts
/// any value.
///
/// When the predicates reject the value and `custom_template` is given, the
/// template is translated and interpolated with the value as `%1` and the
/// label as `%2`; otherwise a generic "seems invalid" message is produced.
pub fn string_field_error(
    doc: &Map<String, Value>,
    key: &str,
    label: &str,
    predicates: &[Predicate<'_>],
    optional: bool,
    custom_template: Option<&str>,
    translator: &dyn Translator,
) -> Option<String> {
    let label = translator.translate(label);

    let value = match doc.get(key).and_then(Value::as_str) {
        Some(value) => value,
        None => return Some(tr(translator, MSG_MISSING, &[label.as_str()])),
    };

    if value.is_empty() {
        if optional {
            return None;
        }
        return Some(tr(translator, MSG_EMPTY, &[label.as_str()]));
    }

    if predicates.is_empty() || predicates.iter().any(|predicate| predicate(value)) {
        return None;
    }

    Some(match custom_template {
        Some(template) => tr(translator, template, &[value, label.as_str()]),
        None => tr(translator, MSG_INVALID, &[label.as_str()]),
    })
}

/// Validates that `key` of `doc` is an integer (or numeric string) in `min..=max`.
pub fn numeric_field_error(
    doc: &Map<String, Value>,
    key: &str,
    label: &str,
    min: i64,
    max: i64,
    translator: &dyn Translator,
) -> Option<String> {
    let label = translator.translate(label);

    let value = match doc.get(key) {
        Some(value) => value,
        None => return Some(tr(translator, MSG_MISSING, &[label.as_str()])),
    };

    match as_integer(value) {
        Some(n) if (min..=max).contains(&n) => None,
        Some(_) => Some(tr(
            translator,
            MSG_OUT_OF_RANGE,
            &[label.as_str(), min.to_string().as_str(), max.to_string().as_str()],
        )),
        None => Some(tr(translator, MSG_NOT_NUMBER, &[label.as_str()])),
    }
}
