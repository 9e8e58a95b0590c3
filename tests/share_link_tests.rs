use std::sync::Arc;

use serverconfig::generator::to_vmess_link;
use serverconfig::utils::base64::{base64_encode, url_safe_base64_encode};
use serverconfig::{Protocol, ServerConfigHelper, Settings};

fn helper() -> ServerConfigHelper<'static> {
    ServerConfigHelper::new(Arc::new(Settings::default()))
}

#[cfg(test)]
mod share_link_tests {
    use super::*;

    #[test]
    fn test_vmess_share_link() {
        let link = "vmess://eyJwcyI6IkhLLTAxIiwiYWRkIjoiZXhhbXBsZS5jb20iLCJwb3J0IjoiNDQzIiwiaWQiOiJhYWFhYWFhYS1iYmJiLWNjY2MtZGRkZC1lZWVlZWVlZWVlZWUiLCJhaWQiOiIwIiwibmV0Ijoid3MiLCJob3N0IjoiZXhhbXBsZS5jb20iLCJwYXRoIjoiL3dzIiwidGxzIjoidGxzIn0=";
        let record = helper().parse_share_link(Protocol::VMess, link, "");

        assert_eq!(record.server_name(), "HK-01");
        assert_eq!(record.server_addr(), "example.com");
        assert_eq!(record.server_port(), Some(443));
        assert_eq!(record.str_field("id"), "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
        assert_eq!(record.int_field("alterId"), Some(0));
        assert_eq!(record.str_field("network"), "ws");
        assert_eq!(record.str_field("networkHost"), "example.com");
        assert_eq!(record.str_field("networkPath"), "/ws");
        assert_eq!(record.str_field("networkSecurity"), "tls");
    }

    #[test]
    fn test_shadowsocks_sip002_link() {
        let record = helper().parse_share_link(
            Protocol::Shadowsocks,
            "ss://YWVzLTI1Ni1nY206cGFzczEyMw==@1.2.3.4:8388#My%20Node",
            "",
        );

        assert_eq!(record.str_field("encryption"), "aes-256-gcm");
        assert_eq!(record.str_field("password"), "pass123");
        assert_eq!(record.server_addr(), "1.2.3.4");
        assert_eq!(record.server_port(), Some(8388));
        assert_eq!(record.server_name(), "My Node");
    }

    #[test]
    fn test_shadowsocks_r_link() {
        let record = helper().parse_share_link(
            Protocol::Shadowsocks,
            "ssr://MS4yLjMuNDo4Mzg4OmF1dGhfYWVzMTI4X21kNTphZXMtMjU2LWNmYjp0bHMxLjJfdGlja2V0X2F1dGg6Y0dGemMzZHZjbVE9/?remarks=U1NSLU5vZGU=",
            "",
        );

        assert_eq!(record.server_addr(), "1.2.3.4");
        assert_eq!(record.server_port(), Some(8388));
        assert_eq!(record.plugin("protocol"), "auth_aes128_md5");
        assert_eq!(record.str_field("encryption"), "aes-256-cfb");
        assert_eq!(record.plugin("obfs"), "tls1.2_ticket_auth");
        assert_eq!(record.str_field("password"), "password");
        assert_eq!(record.str_field("remarks"), "SSR-Node");
    }

    #[test]
    fn test_trojan_link_with_defaults() {
        let record =
            helper().parse_share_link(Protocol::Trojan, "trojan://secret@host.example:443#node", "");

        assert_eq!(record.str_field("password"), "secret");
        assert_eq!(record.str_field("sni"), "");
        assert!(!record.bool_field("udp"));
        assert_eq!(record.str_field("alpn"), "h2,http/1.1");
        assert!(!record.bool_field("allowInsecure"));
        assert_eq!(record.server_name(), "node");
    }

    #[test]
    fn test_vmess_round_trip_ignores_subscription() {
        let links = [
            r#"{"ps":"A","add":"a.example","port":"443","id":"id-a","aid":"0","net":"ws","type":"none","host":"a.example","path":"/a","tls":"tls"}"#,
            r#"{"add":"1.2.3.4","port":10086,"id":"id-b","aid":4,"net":"kcp","type":"wechat-video","tls":""}"#,
            r#"{"ps":"C","add":"c.example","port":"80","id":"id-c","net":"h2","host":"c.example","path":"/c","scy":"chacha20-poly1305"}"#,
        ];

        for payload in links {
            let link = format!("vmess://{}", base64_encode(payload));
            let parsed = helper().parse_share_link(Protocol::VMess, &link, "https://sub.example");
            assert!(!parsed.is_empty());

            let exported = to_vmess_link(&parsed);
            let mut reparsed = helper().parse_share_link(Protocol::VMess, &exported, "https://other.example");
            reparsed.set_subscription("https://sub.example");
            assert_eq!(reparsed, parsed, "round trip of {}", payload);
        }
    }

    #[test]
    fn test_base64_alphabets_parse_identically() {
        // The `?` characters produce `/` in the standard alphabet and `_` in the URL-safe one
        let payload = r#"{"ps":"??>","add":"h.example","port":"1","id":"u"}"#;
        let standard = format!("vmess://{}", base64_encode(payload));
        let url_safe = format!("vmess://{}", url_safe_base64_encode(payload));
        assert_ne!(standard, url_safe);

        let from_standard = helper().parse_share_link(Protocol::VMess, &standard, "");
        let from_url_safe = helper().parse_share_link(Protocol::VMess, &url_safe, "");
        assert!(!from_standard.is_empty());
        assert_eq!(from_standard, from_url_safe);
    }

    #[test]
    fn test_upper_case_schemes_parse_like_lower_case() {
        let helper = helper();
        let vmess = format!(
            "vmess://{}",
            base64_encode(r#"{"ps":"v","add":"v.example","port":"443","id":"u","net":"tcp"}"#)
        );
        let ss = "ss://YWVzLTI1Ni1nY206cGFzczEyMw==@1.2.3.4:8388#My%20Node";

        let upper_vmess = helper.parse_share_link(
            Protocol::VMess,
            &vmess.replacen("vmess://", "VMESS://", 1),
            "",
        );
        assert!(!upper_vmess.is_empty());
        assert_eq!(upper_vmess, helper.parse_share_link(Protocol::VMess, &vmess, ""));

        let upper_ss =
            helper.parse_share_link(Protocol::Shadowsocks, &ss.replacen("ss://", "SS://", 1), "");
        assert!(!upper_ss.is_empty());
        assert_eq!(upper_ss, helper.parse_share_link(Protocol::Shadowsocks, ss, ""));

        let body = format!(
            "{}\n{}\n",
            vmess.replacen("vmess://", "VMess://", 1),
            ss.replacen("ss://", "SS://", 1)
        );
        let servers = helper.parse_subscription(&body, "");
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].0, Protocol::VMess);
        assert_eq!(servers[1].0, Protocol::Shadowsocks);
    }

    #[test]
    fn test_malformed_links_yield_empty_records() {
        let helper = helper();
        assert!(helper.parse_share_link(Protocol::VMess, "vmess://@@@", "").is_empty());
        assert!(helper.parse_share_link(Protocol::Shadowsocks, "ss://@@@", "").is_empty());
        assert!(helper.parse_share_link(Protocol::Shadowsocks, "ssr://@@@", "").is_empty());
        assert!(helper.parse_share_link(Protocol::Unknown, "trojan://pw@h:1", "").is_empty());
    }
}
