use std::fmt;
use std::str::FromStr;

/// Protocol tag used to route a server record to its parser, validator and renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    VMess,
    /// Shadowsocks and ShadowsocksR share a tag; `plugins.protocol` tells them apart.
    Shadowsocks,
    Trojan,
    #[default]
    Unknown,
}

impl Protocol {
    /// Resolves a protocol name through the case-insensitive alias table.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "vmess" | "v2ray" => Protocol::VMess,
            "shadowsocks" | "ss" | "shadowsocksr" | "ssr" => Protocol::Shadowsocks,
            "trojan" => Protocol::Trojan,
            _ => Protocol::Unknown,
        }
    }

    /// Detects the protocol of a share link from its scheme prefix.
    pub fn from_link(link: &str) -> Self {
        match link.trim_start().split_once("://") {
            Some((scheme, _)) => Protocol::from_name(scheme),
            None => Protocol::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::VMess => "vmess",
            Protocol::Shadowsocks => "shadowsocks",
            Protocol::Trojan => "trojan",
            Protocol::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Protocol::from_name(s))
    }
}
