use super::{split_host_port, strip_scheme};
use crate::error::ParseError;
use crate::models::{numeric_or_string, parse_bool, ServerRecord};
use crate::settings::TrojanDefaults;
use crate::utils::url::{parse_query, percent_decode};

/// Parse a Trojan link into a server record
///
/// Format: `trojan://password@host:port[?sni=...&udp=...&alpn=...&allowInsecure=...][#name]`.
/// Only the four listed options are recognised; anything else in the query is
/// ignored, and absent options take the values from `defaults`.
pub fn explode_trojan(
    trojan: &str,
    subscription: &str,
    defaults: &TrojanDefaults,
) -> Result<ServerRecord, ParseError> {
    let content = strip_scheme(trojan, "trojan")
        .ok_or_else(|| ParseError::UnsupportedScheme(trojan.to_string()))?;

    // Extract remark from the fragment
    let (content, remark) = match content.split_once('#') {
        Some((content, fragment)) => (content, percent_decode(fragment).trim().to_string()),
        None => (content, String::new()),
    };

    let (content, options) = match content.split_once('?') {
        Some((content, options)) => (content, options),
        None => (content, ""),
    };
    let content = content.trim_end_matches('/');

    let (password, host_port) = match content.rsplit_once('@') {
        Some((password, host_port)) => (percent_decode(password), host_port),
        None => (String::new(), content),
    };
    let (server, port) = split_host_port(host_port);

    let name = if remark.is_empty() {
        format!("{}:{}", server, port)
    } else {
        remark
    };

    let mut sni = defaults.sni.clone();
    let mut udp = defaults.udp;
    let mut alpn = defaults.alpn.clone();
    let mut allow_insecure = defaults.allow_insecure;

    // Extract parameters from the query string
    for (key, value) in parse_query(options) {
        match key.as_str() {
            "sni" => sni = value,
            "udp" => udp = parse_bool(&value),
            "alpn" => alpn = value,
            "allowInsecure" => allow_insecure = parse_bool(&value),
            _ => {}
        }
    }

    let mut record = ServerRecord::new();
    record.insert("serverName", name);
    record.insert("autoConnect", false);
    record.insert("subscription", subscription);
    record.insert("serverAddr", server);
    record.insert("serverPort", numeric_or_string(&port));
    record.insert("password", password);
    record.insert("sni", sni);
    record.insert("udp", udp);
    record.insert("alpn", alpn);
    record.insert("allowInsecure", allow_insecure);

    Ok(record)
}
