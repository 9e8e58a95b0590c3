use serde_json::{Map, Value};

use super::{split_host_port, strip_scheme};
use crate::error::ParseError;
use crate::models::{numeric_or_string, ServerRecord};
use crate::utils::base64::decode_base64_string;
use crate::utils::url::{parse_query, percent_decode};

/// Parse the plugin part of a Shadowsocks link into plugin options
///
/// The first `plugin` entry of the query is split on `;`, and every
/// `key=value` element becomes an option. The plugin name itself (the element
/// without `=`) is dropped.
pub fn shadowsocks_plugins(plugin_query: &str) -> Map<String, Value> {
    let mut plugins = Map::new();
    let pairs = parse_query(plugin_query);
    let Some((_, value)) = pairs.iter().find(|(key, _)| key == "plugin") else {
        return plugins;
    };

    for option in value.split(';') {
        if let Some((key, value)) = option.split_once('=') {
            plugins.insert(key.trim().to_string(), Value::String(value.to_string()));
        }
    }
    plugins
}

/// Decodes the `method:password` userinfo of a SIP002 link.
///
/// The userinfo is normally base64; AEAD-2022 style links carry it
/// percent-encoded instead, which is accepted when decoding fails.
fn decode_userinfo(userinfo: &str) -> Result<String, ParseError> {
    match decode_base64_string(userinfo) {
        Ok(decoded) if decoded.contains(':') => Ok(decoded),
        Ok(_) | Err(_) => {
            let plain = percent_decode(userinfo);
            if plain.contains(':') {
                Ok(plain)
            } else {
                Err(ParseError::MalformedBase64)
            }
        }
    }
}

/// Parse a Shadowsocks link into a server record
///
/// Accepts SIP002 (`ss://BASE64(method:password)@host:port[/?plugin=...][#name]`)
/// and the legacy fully-encoded form (`ss://BASE64(method:password@host:port)#name`).
pub fn explode_ss(ss: &str, subscription: &str) -> Result<ServerRecord, ParseError> {
    // Extract the content part after ss://
    let content = strip_scheme(ss, "ss")
        .ok_or_else(|| ParseError::UnsupportedScheme(ss.to_string()))?;

    // Extract fragment (remark) if present
    let (content, remark) = match content.split_once('#') {
        Some((content, fragment)) => (content, percent_decode(fragment).trim().to_string()),
        None => (content, String::new()),
    };

    // Extract the plugin query if present
    let (content, plugin_query) = match content.split_once('?') {
        Some((content, query)) => (content, query),
        None => (content, ""),
    };
    let content = content.trim_end_matches('/');

    let (secret, host_port) = match content.rsplit_once('@') {
        Some((userinfo, host_port)) => (decode_userinfo(userinfo)?, host_port.to_string()),
        None => {
            // Legacy format
            let decoded = decode_base64_string(content)?;
            match decoded.rsplit_once('@') {
                Some((secret, host_port)) => (secret.to_string(), host_port.to_string()),
                None => (decoded, String::new()),
            }
        }
    };

    let (encryption, password) = match secret.split_once(':') {
        Some((method, password)) => (method.to_string(), password.to_string()),
        None => (secret, String::new()),
    };
    let (server, port) = split_host_port(&host_port);

    // Use server:port as the name if none provided
    let name = if remark.is_empty() {
        format!("{}:{}", server, port)
    } else {
        remark
    };

    let mut record = ServerRecord::new();
    record.insert("serverName", name);
    record.insert("autoConnect", false);
    record.insert("subscription", subscription);
    record.insert("serverAddr", server);
    record.insert("serverPort", numeric_or_string(&port));
    record.insert("encryption", encryption);
    record.insert("password", password);

    let plugins = shadowsocks_plugins(plugin_query);
    if !plugins.is_empty() {
        record.insert("plugins", Value::Object(plugins));
    }
    Ok(record)
}
