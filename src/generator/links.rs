//! Export of server records back into share links.

use serde_json::{json, Value};

use crate::models::{Protocol, ServerRecord};
use crate::utils::base64::base64_encode;
use crate::utils::url::percent_encode;

/// Renders the port as stored, so non-numeric input survives a round trip.
fn port_text(record: &ServerRecord) -> String {
    match record.get("serverPort") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Brackets IPv6 literals for use in a `host:port` authority.
fn authority(record: &ServerRecord) -> String {
    let host = record.server_addr();
    if host.contains(':') {
        format!("[{}]:{}", host, port_text(record))
    } else {
        format!("{}:{}", host, port_text(record))
    }
}

/// Serialize a VMess record into a v2rayN (v2) share link
pub fn to_vmess_link(record: &ServerRecord) -> String {
    let net = match record.str_field("network") {
        "http" => "h2",
        "" => "tcp",
        network => network,
    };
    let tls = if record.str_field("networkSecurity") == "tls" {
        "tls"
    } else {
        ""
    };

    let payload = json!({
        "v": "2",
        "ps": record.server_name(),
        "add": record.server_addr(),
        "port": port_text(record),
        "id": record.str_field("id"),
        "aid": record.int_field("alterId").unwrap_or(0).to_string(),
        "scy": record.str_field("security"),
        "net": net,
        "type": record.str_field("tcpHeaderType"),
        "host": record.str_field("networkHost"),
        "path": record.str_field("networkPath"),
        "tls": tls,
    });
    format!("vmess://{}", base64_encode(&payload.to_string()))
}

/// Serialize a plain Shadowsocks record into a SIP002 share link
///
/// An `obfs` plugin is exported as `obfs-local` with its options.
pub fn to_shadowsocks_link(record: &ServerRecord) -> String {
    let userinfo = base64_encode(&format!(
        "{}:{}",
        record.str_field("encryption"),
        record.str_field("password")
    ));

    let mut link = format!("ss://{}@{}", userinfo, authority(record));

    let obfs = record.plugin("obfs");
    if !obfs.is_empty() {
        let mut plugin = format!("obfs-local;obfs={}", obfs);
        let host = record.plugin("obfs-host");
        if !host.is_empty() {
            plugin.push_str(&format!(";obfs-host={}", host));
        }
        link.push_str(&format!("/?plugin={}", percent_encode(&plugin)));
    }

    link.push('#');
    link.push_str(&percent_encode(record.server_name()));
    link
}

/// Serialize a Trojan record into a share link carrying all four options
pub fn to_trojan_link(record: &ServerRecord) -> String {
    format!(
        "trojan://{}@{}?sni={}&udp={}&alpn={}&allowInsecure={}#{}",
        percent_encode(record.str_field("password")),
        authority(record),
        percent_encode(record.str_field("sni")),
        record.bool_field("udp"),
        percent_encode(record.str_field("alpn")),
        record.bool_field("allowInsecure"),
        percent_encode(record.server_name())
    )
}

/// Serialize a record into the share link of its protocol
///
/// ShadowsocksR records and unknown protocols have no export form.
pub fn to_share_link(protocol: Protocol, record: &ServerRecord) -> Option<String> {
    match protocol {
        Protocol::VMess => Some(to_vmess_link(record)),
        Protocol::Shadowsocks if record.is_shadowsocks_r() => None,
        Protocol::Shadowsocks => Some(to_shadowsocks_link(record)),
        Protocol::Trojan => Some(to_trojan_link(record)),
        Protocol::Unknown => None,
    }
}
