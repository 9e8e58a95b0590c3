use serde_json::Value;

use super::ss_conf::explode_ss_conf;
use super::v2ray_conf::explode_v2ray_conf;
use crate::error::ParseError;
use crate::models::{Protocol, ServerRecord};
use crate::settings::Settings;

/// Explode a share link of the given protocol into a server record
///
/// The Shadowsocks tag covers both `ss://` and `ssr://` links. A link whose
/// scheme does not belong to `protocol` is rejected.
pub fn explode(
    protocol: Protocol,
    link: &str,
    subscription: &str,
    settings: &Settings,
) -> Result<ServerRecord, ParseError> {
    // Trim the link
    let link = link.trim();

    match protocol {
        Protocol::VMess => super::vmess::explode_vmess(link, subscription),
        Protocol::Shadowsocks if super::strip_scheme(link, "ssr").is_some() => {
            super::ssr::explode_ssr(link, subscription)
        }
        Protocol::Shadowsocks => super::ss::explode_ss(link, subscription),
        Protocol::Trojan => super::trojan::explode_trojan(link, subscription, &settings.trojan),
        Protocol::Unknown => Err(ParseError::UnsupportedScheme(link.to_string())),
    }
}

/// Explode a share link, detecting the protocol from its scheme
pub fn explode_link(
    link: &str,
    subscription: &str,
    settings: &Settings,
) -> Result<(Protocol, ServerRecord), ParseError> {
    let protocol = Protocol::from_link(link);
    let record = explode(protocol, link, subscription, settings)?;
    Ok((protocol, record))
}

/// Explode a foreign configuration document into server records
///
/// Documents with an `outbounds` array are engine configurations and yield
/// VMess records; documents with a `configs` array come from a Shadowsocks GUI
/// and yield Shadowsocks records. Anything else is an error.
pub fn explode_conf_content(content: &str) -> Result<(Protocol, Vec<ServerRecord>), ParseError> {
    let document: Value = serde_json::from_str(content.trim())?;

    if document.get("outbounds").is_some_and(Value::is_array) {
        return Ok((Protocol::VMess, explode_v2ray_conf(&document)));
    }
    if document.get("configs").is_some_and(Value::is_array) {
        return Ok((Protocol::Shadowsocks, explode_ss_conf(&document)));
    }
    Err(ParseError::InvalidJson(
        "expected an `outbounds` or `configs` array".to_string(),
    ))
}
