//! Normalized server record
//!
//! Every protocol and direction shares one string-keyed shape. Records are
//! stored opaquely by the collaborator that owns the server list, so the map
//! keeps whatever keys a parser or a form produced; typed accessors below give
//! tolerant reads over it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Protocol;

/// A normalized server entry, shared by all protocols.
///
/// Shared keys: `serverName`, `serverAddr`, `serverPort`, `subscription`,
/// `autoConnect`, `udp`. Shadowsocks-family records additionally carry a nested
/// `plugins` mapping; the presence of `plugins.protocol` marks ShadowsocksR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerRecord(Map<String, Value>);

impl ServerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from any JSON value; non-objects yield an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => ServerRecord(map),
            _ => ServerRecord::default(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns the string stored under `key`, or `""` when missing or not a string.
    pub fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// Reads `key` as a boolean, accepting `true`/`1` strings and non-zero numbers.
    pub fn bool_field(&self, key: &str) -> bool {
        self.0.get(key).map(as_bool).unwrap_or(false)
    }

    /// Reads `key` as an integer, accepting numbers and numeric strings.
    pub fn int_field(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(as_integer)
    }

    /// Nested plugin options of a Shadowsocks-family record.
    pub fn plugins(&self) -> Option<&Map<String, Value>> {
        self.0.get("plugins").and_then(Value::as_object)
    }

    /// Returns the plugin option `key` as a string, or `""`.
    pub fn plugin(&self, key: &str) -> &str {
        self.plugins()
            .and_then(|plugins| plugins.get(key))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn set_plugin(&mut self, key: &str, value: &str) {
        let plugins = self
            .0
            .entry("plugins")
            .or_insert_with(|| Value::Object(Map::new()));
        if !plugins.is_object() {
            *plugins = Value::Object(Map::new());
        }
        if let Value::Object(map) = plugins {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    pub fn server_name(&self) -> &str {
        self.str_field("serverName")
    }

    pub fn server_addr(&self) -> &str {
        self.str_field("serverAddr")
    }

    pub fn server_port(&self) -> Option<i64> {
        self.int_field("serverPort")
    }

    pub fn subscription(&self) -> &str {
        self.str_field("subscription")
    }

    pub fn set_subscription(&mut self, url: &str) {
        self.insert("subscription", url);
    }

    pub fn with_subscription(mut self, url: &str) -> Self {
        self.set_subscription(url);
        self
    }

    /// ShadowsocksR records are Shadowsocks records whose plugins carry `protocol`.
    pub fn is_shadowsocks_r(&self) -> bool {
        self.plugins()
            .map(|plugins| plugins.contains_key("protocol"))
            .unwrap_or(false)
    }

    /// Whether the record carries a usable address and port.
    ///
    /// Callers use this to recognise records produced from malformed input.
    pub fn has_endpoint(&self) -> bool {
        !self.server_addr().is_empty() && self.server_port().is_some()
    }

    /// Protocol named by an explicit `protocol` key, if the record carries one.
    pub fn protocol_hint(&self) -> Option<Protocol> {
        match Protocol::from_name(self.str_field("protocol")) {
            Protocol::Unknown => None,
            protocol => Some(protocol),
        }
    }
}

impl From<Map<String, Value>> for ServerRecord {
    fn from(map: Map<String, Value>) -> Self {
        ServerRecord(map)
    }
}

impl From<ServerRecord> for Value {
    fn from(record: ServerRecord) -> Self {
        Value::Object(record.0)
    }
}

/// Reads a JSON value as an integer.
///
/// Integral floats and trimmed numeric strings are accepted; anything else is `None`.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a JSON value as a boolean the way share-link options spell them.
pub fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => parse_bool(s),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

/// Parses `true`/`1` (case-insensitive) as true, anything else as false.
pub fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    text == "1" || text.eq_ignore_ascii_case("true")
}

/// Stores numeric text as a JSON number and keeps anything else as a string.
///
/// Out-of-range ports stay numbers so validation can report them instead of
/// the value being clamped.
pub(crate) fn numeric_or_string(text: &str) -> Value {
    match text.trim().parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(text.to_string()),
    }
}
