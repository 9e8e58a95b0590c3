pub mod common;
pub mod ss;
pub mod ss_conf;
pub mod ssr;
pub mod trojan;
pub mod v2ray_conf;
pub mod vmess;

pub use common::{explode, explode_conf_content, explode_link};
pub use ss::{explode_ss, shadowsocks_plugins};
pub use ss_conf::{explode_ss_conf, explode_ss_conf_content};
pub use ssr::explode_ssr;
pub use trojan::explode_trojan;
pub use v2ray_conf::{explode_v2ray_conf, explode_v2ray_conf_content};
pub use vmess::explode_vmess;

/// Returns the part after `<scheme>://`, matching the scheme case-insensitively.
pub(crate) fn strip_scheme<'a>(link: &'a str, scheme: &str) -> Option<&'a str> {
    let (prefix, rest) = link.split_once("://")?;
    prefix.eq_ignore_ascii_case(scheme).then_some(rest)
}

/// Splits `host:port`, accepting bracketed IPv6 hosts.
///
/// A missing port yields an empty port string.
pub(crate) fn split_host_port(input: &str) -> (String, String) {
    let (host, port) = match input.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') || host.ends_with(']') => (host, port),
        _ => (input, ""),
    };
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    (host.to_string(), port.to_string())
}
