use super::strip_scheme;
use crate::error::ParseError;
use crate::models::{numeric_or_string, ServerRecord};
use crate::utils::base64::decode_base64_string;
use crate::utils::url::parse_query;

/// Optional SSR parameters whose values are themselves base64 encoded.
const ENCODED_PARAMS: [&str; 4] = ["obfsparam", "protoparam", "remarks", "group"];

/// Parameters that also belong in the record's plugin options.
const PLUGIN_PARAMS: [&str; 2] = ["obfsparam", "protoparam"];

/// Decodes an SSR payload.
///
/// Some producers leave the `/?` query outside the base64 body, so when the
/// whole payload does not decode, the part before `/?` is decoded on its own
/// and the query is kept verbatim.
fn decode_payload(encoded: &str) -> Result<String, ParseError> {
    if let Ok(decoded) = decode_base64_string(encoded) {
        return Ok(decoded);
    }
    match encoded.split_once("/?") {
        Some((head, tail)) => Ok(format!("{}/?{}", decode_base64_string(head)?, tail)),
        None => Err(ParseError::MalformedBase64),
    }
}

/// Parse a ShadowsocksR link into a server record
///
/// The decoded payload is `host:port:protocol:method:obfs:BASE64(password)`
/// optionally followed by `/?` and a query. The server name is synthesized as
/// `host:port`. Query pairs are written directly into the record, so a pair
/// named like a record key (e.g. `serverAddr`) overrides it; `obfsparam` and
/// `protoparam` are mirrored into the plugin options.
pub fn explode_ssr(ssr: &str, subscription: &str) -> Result<ServerRecord, ParseError> {
    // Extract the base64 part
    let encoded = strip_scheme(ssr, "ssr")
        .ok_or_else(|| ParseError::UnsupportedScheme(ssr.to_string()))?;

    let decoded = decode_payload(encoded)?;
    let (head, query) = match decoded.split_once("/?") {
        Some((head, query)) => (head, query),
        None => (decoded.trim_end_matches('/'), ""),
    };

    // Split the essential part by ":"
    let parts: Vec<&str> = head.split(':').collect();
    if parts.len() != 6 {
        return Err(ParseError::FieldCount {
            expected: 6,
            found: parts.len(),
        });
    }

    let server = parts[0];
    let port = parts[1];
    let protocol = parts[2];
    let method = parts[3];
    let obfs = parts[4];
    let password = decode_base64_string(parts[5]).unwrap_or_else(|_| parts[5].to_string());

    let mut record = ServerRecord::new();
    record.insert("serverName", format!("{}:{}", server, port));
    record.insert("autoConnect", false);
    record.insert("subscription", subscription);
    record.insert("serverAddr", server);
    record.insert("serverPort", numeric_or_string(port));
    record.insert("encryption", method);
    record.insert("password", password);
    record.set_plugin("obfs", obfs);
    record.set_plugin("protocol", protocol);

    for (key, value) in parse_query(query) {
        let value = if ENCODED_PARAMS.contains(&key.as_str()) {
            decode_base64_string(&value).unwrap_or(value)
        } else {
            value
        };
        if PLUGIN_PARAMS.contains(&key.as_str()) {
            record.set_plugin(&key, &value);
        }
        record.insert(&key, value);
    }

    Ok(record)
}
