use serde_json::{Map, Value};

use super::strip_scheme;
use crate::error::ParseError;
use crate::models::{as_integer, numeric_or_string, ServerRecord, DEFAULT_MUX, DEFAULT_SECURITY};
use crate::utils::base64::decode_base64_string;

/// Maps the share-link `net` field onto the record's `network` values.
fn map_network(net: &str) -> &'static str {
    match net {
        "kcp" => "kcp",
        "ws" => "ws",
        "h2" => "http",
        "quic" => "quic",
        _ => "tcp",
    }
}

/// Reads a JSON field as text, rendering numbers in decimal.
pub(crate) fn text_field(json: &Map<String, Value>, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a VMess link (`vmess://BASE64(JSON)`) into a server record
///
/// Follows the v2rayN v2 share format: `ps`, `add`, `port`, `id`, `aid`,
/// `net`, `type`, `host`, `path`, `tls`, and optionally `scy`. Missing fields
/// fall back to empty strings or protocol defaults.
pub fn explode_vmess(vmess: &str, subscription: &str) -> Result<ServerRecord, ParseError> {
    // Extract the base64 part
    let encoded = strip_scheme(vmess, "vmess")
        .ok_or_else(|| ParseError::UnsupportedScheme(vmess.to_string()))?;

    let decoded = decode_base64_string(encoded)?;
    let json: Value = serde_json::from_str(&decoded)?;
    let json = json
        .as_object()
        .ok_or_else(|| ParseError::InvalidJson("VMess payload is not an object".to_string()))?;

    let add = text_field(json, "add").unwrap_or_default();
    let port = json
        .get("port")
        .and_then(as_integer)
        .map(Value::from)
        .or_else(|| text_field(json, "port").map(|port| numeric_or_string(&port)))
        .unwrap_or_else(|| Value::String(String::new()));
    let alter_id = json.get("aid").and_then(as_integer).unwrap_or(0);
    let net = text_field(json, "net").unwrap_or_else(|| "tcp".to_string());
    let tls = text_field(json, "tls").unwrap_or_default();

    // Use the address as the name when the remark is absent
    let name = text_field(json, "ps")
        .map(|ps| ps.trim().to_string())
        .filter(|ps| !ps.is_empty())
        .unwrap_or_else(|| add.clone());

    let header_type = text_field(json, "type")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "none".to_string());
    let security = text_field(json, "scy")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SECURITY.to_string());

    let mut record = ServerRecord::new();
    record.insert("autoConnect", false);
    record.insert("serverName", name);
    record.insert("serverAddr", add);
    record.insert("serverPort", port);
    record.insert("subscription", subscription);
    record.insert("id", text_field(json, "id").unwrap_or_default());
    record.insert("alterId", alter_id);
    record.insert("udp", false);
    record.insert("security", security);
    record.insert("network", map_network(&net));
    record.insert("networkHost", text_field(json, "host").unwrap_or_default());
    record.insert("networkPath", text_field(json, "path").unwrap_or_default());
    record.insert("tcpHeaderType", header_type);
    record.insert("networkSecurity", if tls.is_empty() { "none" } else { "tls" });
    record.insert("allowInsecure", false);
    record.insert("mux", DEFAULT_MUX);

    Ok(record)
}
