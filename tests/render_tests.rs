use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use serverconfig::generator::render_proxies;
use serverconfig::{Protocol, ServerConfigHelper, ServerRecord, Settings};

fn http_vmess_record() -> ServerRecord {
    ServerRecord::from_value(json!({
        "serverName": "HTTP-01",
        "serverAddr": "v.example",
        "serverPort": 80,
        "id": "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee",
        "alterId": 0,
        "security": "auto",
        "network": "tcp",
        "networkSecurity": "none",
        "tcpHeaderType": "http",
        "allowInsecure": false
    }))
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[test]
    fn test_render_deterministic_modulo_user_agents() {
        let helper = ServerConfigHelper::new(Arc::new(Settings::default()));
        let record = http_vmess_record();
        assert!(helper.validate(Protocol::VMess, &record, None).is_empty());

        let mut first = helper.render(Protocol::VMess, &record);
        let mut second = helper.render(Protocol::VMess, &record);
        for rendered in [&mut first, &mut second] {
            let headers = rendered
                .get_mut("http-opts")
                .and_then(|opts| opts.get_mut("headers"))
                .and_then(|headers| headers.as_object_mut())
                .unwrap();
            assert_eq!(headers["User-Agent"].as_array().unwrap().len(), 24);
            headers.remove("User-Agent");
        }
        assert_eq!(first, second);

        let seeded = |seed| helper.render_with_rng(Protocol::VMess, &record, &mut StdRng::seed_from_u64(seed));
        assert_eq!(seeded(5), seeded(5));
    }

    #[test]
    fn test_user_agent_count_follows_settings() {
        let settings = Settings {
            user_agent_count: 3,
            ..Settings::default()
        };
        let helper = ServerConfigHelper::new(Arc::new(settings));
        let rendered = helper.render(Protocol::VMess, &http_vmess_record());
        assert_eq!(
            rendered["http-opts"]["headers"]["User-Agent"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_rendered_keys_are_exactly_the_dialect() {
        let helper = ServerConfigHelper::new(Arc::new(Settings::default()));
        let record = helper.parse_share_link(Protocol::Trojan, "trojan://secret@host.example:443#node", "");
        let rendered = helper.render(Protocol::Trojan, &record);

        let mut keys: Vec<&str> = rendered.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "alpn",
                "autoConnect",
                "name",
                "password",
                "port",
                "server",
                "skip-cert-verify",
                "sni",
                "subscription",
                "type",
                "udp",
            ]
        );
        assert_eq!(rendered["alpn"], json!(["h2", "http/1.1"]));
    }

    #[test]
    fn test_render_proxies_document() {
        let helper = ServerConfigHelper::new(Arc::new(Settings::default()));
        let servers = vec![
            (
                Protocol::Shadowsocks,
                helper.parse_share_link(
                    Protocol::Shadowsocks,
                    "ss://YWVzLTI1Ni1nY206cGFzczEyMw==@1.2.3.4:8388#My%20Node",
                    "",
                ),
            ),
            (Protocol::VMess, http_vmess_record()),
        ];

        let yaml = render_proxies(&servers, helper.settings(), &mut StdRng::seed_from_u64(1)).unwrap();
        let document: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let proxies = document["proxies"].as_sequence().unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0]["name"].as_str(), Some("My Node"));
        assert_eq!(proxies[0]["type"].as_str(), Some("ss"));
        assert_eq!(proxies[1]["network"].as_str(), Some("http"));
        assert_eq!(
            proxies[1]["http-opts"]["headers"]["host"]
                .as_sequence()
                .map(Vec::len),
            Some(12)
        );
    }
}
