//! Rendering of server records into the Clash proxy dialect
//!
//! Each protocol has a typed output struct; the emitted keys are exactly the
//! serialized fields, so the rendered form never carries record keys the
//! engine does not understand.

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};

use super::useragent::random_user_agents;
use crate::error::RenderError;
use crate::models::{as_bool, Protocol, ServerRecord};
use crate::settings::Settings;
use crate::validators::get_alpn;

/// Hosts advertised by HTTP-obfuscated VMess over TCP.
pub const HTTP_OBFS_HOSTS: [&str; 12] = [
    "www.baidu.com",
    "www.bing.com",
    "www.163.com",
    "www.netease.com",
    "www.qq.com",
    "www.tencent.com",
    "www.taobao.com",
    "www.tmall.com",
    "www.alibaba-inc.com",
    "www.aliyun.com",
    "www.sensetime.com",
    "www.megvii.com",
];

/// Keys shared by every rendered proxy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonProxyOptions {
    #[serde(rename = "autoConnect")]
    pub auto_connect: bool,
    pub subscription: String,
    pub name: String,
    pub server: String,
    pub port: i64,
}

impl CommonProxyOptions {
    pub fn from_record(record: &ServerRecord) -> Self {
        CommonProxyOptions {
            auto_connect: record.bool_field("autoConnect"),
            subscription: record.subscription().to_string(),
            name: record.server_name().to_string(),
            server: record.server_addr().to_string(),
            port: record.server_port().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpHeaders {
    pub host: Vec<String>,
    #[serde(rename = "User-Agent")]
    pub user_agent: Vec<String>,
    #[serde(rename = "Accept-Encoding")]
    pub accept_encoding: Vec<String>,
    #[serde(rename = "Connection")]
    pub connection: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpOptions {
    pub method: String,
    pub headers: HttpHeaders,
}

/// VMess proxy configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VMessProxy {
    #[serde(flatten)]
    pub common: CommonProxyOptions,
    pub udp: bool,
    pub uuid: String,
    #[serde(rename = "alterId")]
    pub alter_id: i64,
    pub cipher: String,
    pub tls: bool,
    pub skip_cert_verify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_opts: Option<HttpOptions>,
}

impl VMessProxy {
    pub fn from_record<R: Rng + ?Sized>(
        record: &ServerRecord,
        user_agent_count: usize,
        rng: &mut R,
    ) -> Self {
        let mut vmess = VMessProxy {
            common: CommonProxyOptions::from_record(record),
            udp: record.bool_field("udp"),
            uuid: record.str_field("id").to_string(),
            alter_id: record.int_field("alterId").unwrap_or(0),
            cipher: record.str_field("security").to_lowercase(),
            tls: record.str_field("networkSecurity").eq_ignore_ascii_case("tls"),
            skip_cert_verify: record.bool_field("allowInsecure"),
            network: None,
            ws_path: None,
            ws_headers: None,
            http_opts: None,
        };

        match (record.str_field("network"), record.str_field("tcpHeaderType")) {
            ("ws", _) => {
                vmess.network = Some("ws".to_string());
                vmess.ws_path = Some(record.str_field("networkPath").to_string());
                let mut headers = BTreeMap::new();
                headers.insert(
                    "Host".to_string(),
                    record.str_field("networkHost").to_string(),
                );
                vmess.ws_headers = Some(headers);
            }
            ("tcp", "none") => vmess.network = Some("tcp".to_string()),
            ("tcp", "http") => {
                vmess.network = Some("http".to_string());
                vmess.http_opts = Some(HttpOptions {
                    method: "GET".to_string(),
                    headers: HttpHeaders {
                        host: HTTP_OBFS_HOSTS.iter().map(|h| h.to_string()).collect(),
                        user_agent: random_user_agents(user_agent_count, rng),
                        accept_encoding: vec!["gzip, deflate".to_string()],
                        connection: vec!["keep-alive".to_string()],
                    },
                });
            }
            _ => {}
        }
        vmess
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObfsPluginOptions {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Shadowsocks proxy configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksProxy {
    #[serde(flatten)]
    pub common: CommonProxyOptions,
    pub cipher: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<ObfsPluginOptions>,
}

impl From<&ServerRecord> for ShadowsocksProxy {
    fn from(record: &ServerRecord) -> Self {
        let mut ss = ShadowsocksProxy {
            common: CommonProxyOptions::from_record(record),
            cipher: record.str_field("encryption").to_lowercase(),
            password: record.str_field("password").to_string(),
            plugin: None,
            plugin_opts: None,
        };

        let obfs = record.plugin("obfs");
        if !obfs.is_empty() {
            let host = record.plugin("obfs-host");
            ss.plugin = Some("obfs".to_string());
            ss.plugin_opts = Some(ObfsPluginOptions {
                mode: obfs.to_string(),
                host: (!host.is_empty()).then(|| host.to_string()),
            });
        }
        ss
    }
}

/// ShadowsocksR proxy configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksRProxy {
    #[serde(flatten)]
    pub common: CommonProxyOptions,
    pub cipher: String,
    pub password: String,
    pub obfs: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfs_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
}

impl From<&ServerRecord> for ShadowsocksRProxy {
    fn from(record: &ServerRecord) -> Self {
        let non_empty = |key: &str| {
            let value = record.plugin(key);
            (!value.is_empty()).then(|| value.to_string())
        };

        ShadowsocksRProxy {
            common: CommonProxyOptions::from_record(record),
            cipher: record.str_field("encryption").to_lowercase(),
            password: record.str_field("password").to_string(),
            obfs: record.plugin("obfs").to_lowercase(),
            protocol: record.plugin("protocol").to_lowercase(),
            obfs_param: non_empty("obfsparam"),
            protocol_param: non_empty("protoparam").map(|param| param.to_lowercase()),
            udp: record
                .plugins()
                .and_then(|plugins| plugins.get("udp"))
                .map(as_bool),
        }
    }
}

/// Trojan proxy configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrojanProxy {
    #[serde(flatten)]
    pub common: CommonProxyOptions,
    pub password: String,
    pub sni: String,
    pub udp: bool,
    pub alpn: Vec<String>,
    pub skip_cert_verify: bool,
}

impl From<&ServerRecord> for TrojanProxy {
    fn from(record: &ServerRecord) -> Self {
        TrojanProxy {
            common: CommonProxyOptions::from_record(record),
            password: record.str_field("password").to_string(),
            sni: record.str_field("sni").to_string(),
            udp: record.bool_field("udp"),
            alpn: get_alpn(record.str_field("alpn")),
            skip_cert_verify: record.bool_field("allowInsecure"),
        }
    }
}

/// A rendered proxy, tagged by its Clash `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClashProxy {
    #[serde(rename = "vmess")]
    VMess(VMessProxy),
    #[serde(rename = "ss")]
    Shadowsocks(ShadowsocksProxy),
    #[serde(rename = "ssr")]
    ShadowsocksR(ShadowsocksRProxy),
    #[serde(rename = "trojan")]
    Trojan(TrojanProxy),
}

impl ClashProxy {
    /// Builds the Clash form of `record`; `None` for [`Protocol::Unknown`].
    pub fn from_record<R: Rng + ?Sized>(
        protocol: Protocol,
        record: &ServerRecord,
        settings: &Settings,
        rng: &mut R,
    ) -> Option<Self> {
        match protocol {
            Protocol::VMess => Some(ClashProxy::VMess(VMessProxy::from_record(
                record,
                settings.user_agent_count,
                rng,
            ))),
            Protocol::Shadowsocks if record.is_shadowsocks_r() => {
                Some(ClashProxy::ShadowsocksR(record.into()))
            }
            Protocol::Shadowsocks => Some(ClashProxy::Shadowsocks(record.into())),
            Protocol::Trojan => Some(ClashProxy::Trojan(record.into())),
            Protocol::Unknown => None,
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Render a record into the Clash dialect
///
/// Unknown protocols render to an empty mapping.
pub fn render<R: Rng + ?Sized>(
    protocol: Protocol,
    record: &ServerRecord,
    settings: &Settings,
    rng: &mut R,
) -> Map<String, Value> {
    ClashProxy::from_record(protocol, record, settings, rng)
        .map(|proxy| proxy.to_map())
        .unwrap_or_default()
}

#[derive(Serialize)]
struct ProxiesDocument {
    proxies: Vec<ClashProxy>,
}

/// Render a batch of records into a Clash `proxies:` YAML document
///
/// Records tagged [`Protocol::Unknown`] are skipped.
pub fn render_proxies<R: Rng + ?Sized>(
    servers: &[(Protocol, ServerRecord)],
    settings: &Settings,
    rng: &mut R,
) -> Result<String, RenderError> {
    let proxies: Vec<ClashProxy> = servers
        .iter()
        .filter_map(|(protocol, record)| {
            let proxy = ClashProxy::from_record(*protocol, record, settings, rng);
            if proxy.is_none() {
                debug!("Skipping server '{}' with unknown protocol", record.server_name());
            }
            proxy
        })
        .collect();
    Ok(serde_yaml::to_string(&ProxiesDocument { proxies })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn record(value: Value) -> ServerRecord {
        ServerRecord::from_value(value)
    }

    fn vmess_record(network: &str, header: &str) -> ServerRecord {
        record(json!({
            "serverName": "HK-01",
            "serverAddr": "example.com",
            "serverPort": "443",
            "subscription": "https://sub",
            "id": "uuid",
            "alterId": 0,
            "security": "AUTO",
            "network": network,
            "networkHost": "cdn.example.com",
            "networkPath": "/ws",
            "networkSecurity": "TLS",
            "tcpHeaderType": header,
            "allowInsecure": true
        }))
    }

    #[test]
    fn test_render_vmess_ws() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = render(Protocol::VMess, &vmess_record("ws", "none"), &Settings::default(), &mut rng);
        assert_eq!(map["type"], "vmess");
        assert_eq!(map["name"], "HK-01");
        assert_eq!(map["port"], 443);
        assert_eq!(map["cipher"], "auto");
        assert_eq!(map["tls"], true);
        assert_eq!(map["skip-cert-verify"], true);
        assert_eq!(map["udp"], false);
        assert_eq!(map["autoConnect"], false);
        assert_eq!(map["subscription"], "https://sub");
        assert_eq!(map["network"], "ws");
        assert_eq!(map["ws-path"], "/ws");
        assert_eq!(map["ws-headers"], json!({"Host": "cdn.example.com"}));
        assert!(!map.contains_key("http-opts"));
    }

    #[test]
    fn test_render_vmess_tcp_variants() {
        let mut rng = StdRng::seed_from_u64(1);
        let settings = Settings::default();

        let plain = render(Protocol::VMess, &vmess_record("tcp", "none"), &settings, &mut rng);
        assert_eq!(plain["network"], "tcp");
        assert!(!plain.contains_key("ws-path"));

        let http = render(Protocol::VMess, &vmess_record("tcp", "http"), &settings, &mut rng);
        assert_eq!(http["network"], "http");
        let opts = &http["http-opts"];
        assert_eq!(opts["method"], "GET");
        assert_eq!(opts["headers"]["host"].as_array().unwrap().len(), 12);
        assert_eq!(opts["headers"]["host"][0], "www.baidu.com");
        assert_eq!(opts["headers"]["User-Agent"].as_array().unwrap().len(), 24);
        assert_eq!(opts["headers"]["Accept-Encoding"], json!(["gzip, deflate"]));
        assert_eq!(opts["headers"]["Connection"], json!(["keep-alive"]));

        let kcp = render(Protocol::VMess, &vmess_record("kcp", "none"), &settings, &mut rng);
        assert!(!kcp.contains_key("network"));
    }

    #[test]
    fn test_render_is_deterministic_for_seeded_rng() {
        let settings = Settings::default();
        let server = vmess_record("tcp", "http");
        let first = render(Protocol::VMess, &server, &settings, &mut StdRng::seed_from_u64(9));
        let second = render(Protocol::VMess, &server, &settings, &mut StdRng::seed_from_u64(9));
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_shadowsocks() {
        let mut rng = StdRng::seed_from_u64(1);
        let server = record(json!({
            "serverName": "ss",
            "serverAddr": "1.2.3.4",
            "serverPort": 8388,
            "encryption": "AES-256-GCM",
            "password": "pw",
            "plugins": {"obfs": "http", "obfs-host": "cdn.example.com"}
        }));
        let map = render(Protocol::Shadowsocks, &server, &Settings::default(), &mut rng);
        assert_eq!(map["type"], "ss");
        assert_eq!(map["cipher"], "aes-256-gcm");
        assert_eq!(map["plugin"], "obfs");
        assert_eq!(map["plugin-opts"], json!({"mode": "http", "host": "cdn.example.com"}));
        assert_eq!(map["subscription"], "");

        let bare = record(json!({"serverName": "ss", "serverAddr": "h", "serverPort": 1, "plugins": {"obfs": "tls"}}));
        let map = render(Protocol::Shadowsocks, &bare, &Settings::default(), &mut rng);
        assert_eq!(map["plugin-opts"], json!({"mode": "tls"}));
    }

    #[test]
    fn test_render_shadowsocks_r() {
        let mut rng = StdRng::seed_from_u64(1);
        let server = record(json!({
            "serverName": "ssr",
            "serverAddr": "1.2.3.4",
            "serverPort": 8388,
            "encryption": "aes-256-cfb",
            "password": "pw",
            "plugins": {
                "obfs": "TLS1.2_ticket_auth",
                "protocol": "auth_aes128_md5",
                "obfsparam": "cdn.example.com",
                "protoparam": "",
                "udp": "true"
            }
        }));
        let map = render(Protocol::Shadowsocks, &server, &Settings::default(), &mut rng);
        assert_eq!(map["type"], "ssr");
        assert_eq!(map["obfs"], "tls1.2_ticket_auth");
        assert_eq!(map["protocol"], "auth_aes128_md5");
        assert_eq!(map["obfs-param"], "cdn.example.com");
        assert!(!map.contains_key("protocol-param"));
        assert_eq!(map["udp"], true);
        assert!(!map.contains_key("plugin"));
    }

    #[test]
    fn test_render_shadowsocks_r_protocol_param_lowercased() {
        let mut rng = StdRng::seed_from_u64(1);
        let server = record(json!({
            "serverName": "ssr",
            "serverAddr": "1.2.3.4",
            "serverPort": 8388,
            "encryption": "aes-256-cfb",
            "password": "pw",
            "plugins": {
                "obfs": "http_simple",
                "protocol": "auth_aes128_md5",
                "obfsparam": "CDN.Example.com",
                "protoparam": "32:ABC"
            }
        }));
        let map = render(Protocol::Shadowsocks, &server, &Settings::default(), &mut rng);
        assert_eq!(map["protocol-param"], "32:abc");
        assert_eq!(map["obfs-param"], "CDN.Example.com");
    }

    #[test]
    fn test_render_trojan_and_unknown() {
        let mut rng = StdRng::seed_from_u64(1);
        let server = record(json!({
            "serverName": "t",
            "serverAddr": "t.example",
            "serverPort": 443,
            "password": "secret",
            "sni": "sni.example",
            "udp": true,
            "alpn": "h2, http/1.1",
            "allowInsecure": false
        }));
        let map = render(Protocol::Trojan, &server, &Settings::default(), &mut rng);
        assert_eq!(map["type"], "trojan");
        assert_eq!(map["alpn"], json!(["h2", "http/1.1"]));
        assert_eq!(map["sni"], "sni.example");
        assert_eq!(map["udp"], true);
        assert_eq!(map["skip-cert-verify"], false);

        assert!(render(Protocol::Unknown, &server, &Settings::default(), &mut rng).is_empty());
    }

    #[test]
    fn test_render_proxies_yaml() {
        let mut rng = StdRng::seed_from_u64(3);
        let trojan = record(json!({"serverName": "t", "serverAddr": "t.example", "serverPort": 443, "password": "p", "alpn": "h2"}));
        let servers = vec![
            (Protocol::Trojan, trojan.clone()),
            (Protocol::Unknown, trojan),
        ];
        let yaml = render_proxies(&servers, &Settings::default(), &mut rng).unwrap();
        let document: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let proxies = document["proxies"].as_sequence().unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0]["type"].as_str(), Some("trojan"));
        assert_eq!(proxies[0]["port"].as_i64(), Some(443));
    }
}
