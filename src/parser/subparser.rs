use log::{debug, warn};

use crate::models::{Protocol, ServerRecord};
use crate::parser::explodes::explode;
use crate::settings::Settings;
use crate::utils::base64::decode_base64_string;

/// Detects the protocol tag of a share link from its scheme prefix.
///
/// `ss://` and `ssr://` both map to [`Protocol::Shadowsocks`].
pub fn detect_protocol(link: &str) -> Protocol {
    Protocol::from_link(link)
}

/// Decodes a subscription body.
///
/// Feeds are usually a base64 encoded list of links; a body that does not
/// decode to text is used as is.
fn decode_body(body: &str) -> String {
    let body = body.trim();
    match decode_base64_string(body) {
        Ok(decoded) if decoded.contains("://") => decoded,
        _ => body.to_string(),
    }
}

/// Parse a subscription body into protocol-tagged server records
///
/// Every record is tagged with `subscription_url`. Lines with unknown
/// schemes, lines that fail to parse and records without an address and port
/// are skipped with a warning.
pub fn parse_subscription(
    body: &str,
    subscription_url: &str,
    settings: &Settings,
) -> Vec<(Protocol, ServerRecord)> {
    let content = decode_body(body);

    let mut servers = Vec::new();
    let mut skipped = 0usize;
    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let protocol = detect_protocol(line);
        if protocol == Protocol::Unknown {
            warn!("Skipping link with unsupported scheme: {}", line);
            skipped += 1;
            continue;
        }

        match explode(protocol, line, subscription_url, settings) {
            Ok(record) if record.has_endpoint() => servers.push((protocol, record)),
            Ok(_) => {
                warn!("Skipping {} link without server address or port", protocol);
                skipped += 1;
            }
            Err(e) => {
                warn!("Failed to parse {} link: {}", protocol, e);
                skipped += 1;
            }
        }
    }

    debug!(
        "Parsed {} servers from subscription {} ({} skipped)",
        servers.len(),
        subscription_url,
        skipped
    );
    servers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;

    const SS_LINK: &str = "ss://YWVzLTI1Ni1nY206cGFzczEyMw==@1.2.3.4:8388#My%20Node";
    const TROJAN_LINK: &str = "trojan://secret@host.example:443#node";

    #[test]
    fn test_parse_subscription_plain_body() {
        let body = format!("{}\n\n  {}  \nhttp://ignored\nss://***\n", SS_LINK, TROJAN_LINK);
        let servers = parse_subscription(&body, "https://sub.example", &Settings::default());
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].0, Protocol::Shadowsocks);
        assert_eq!(servers[1].0, Protocol::Trojan);
        assert!(servers
            .iter()
            .all(|(_, record)| record.subscription() == "https://sub.example"));
    }

    #[test]
    fn test_parse_subscription_base64_body() {
        let body = base64_encode(&format!("{}\r\n{}", SS_LINK, TROJAN_LINK));
        let servers = parse_subscription(&body, "https://sub.example", &Settings::default());
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].1.server_name(), "My Node");
    }

    #[test]
    fn test_parse_subscription_skips_records_without_endpoint() {
        let vmess = format!("vmess://{}", base64_encode(r#"{"ps":"x","add":"h"}"#));
        let servers = parse_subscription(&vmess, "", &Settings::default());
        assert!(servers.is_empty());
    }

    #[test]
    fn test_detect_protocol() {
        assert_eq!(detect_protocol("vmess://abc"), Protocol::VMess);
        assert_eq!(detect_protocol("ssr://abc"), Protocol::Shadowsocks);
        assert_eq!(detect_protocol("trojan://abc"), Protocol::Trojan);
        assert_eq!(detect_protocol("socks://abc"), Protocol::Unknown);
        assert_eq!(detect_protocol("no scheme"), Protocol::Unknown);
    }
}
