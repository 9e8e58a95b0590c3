use log::info;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::models::{
    as_bool, as_integer, ServerRecord, DEFAULT_KCP_DOWN_CAPACITY, DEFAULT_KCP_MTU,
    DEFAULT_KCP_READ_BUF_SIZE, DEFAULT_KCP_TTI, DEFAULT_KCP_UP_CAPACITY,
    DEFAULT_KCP_WRITE_BUF_SIZE, DEFAULT_MUX, DEFAULT_SECURITY,
};

fn object<'a>(json: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    json.get(key).and_then(Value::as_object)
}

fn string_or(json: &Map<String, Value>, key: &str, default: &str) -> String {
    json.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn integer_or(json: &Map<String, Value>, key: &str, default: i64) -> i64 {
    json.get(key).and_then(as_integer).unwrap_or(default)
}

/// Header `type` of a stream sub-section, `none` when absent.
fn header_type(section: Option<&Map<String, Value>>) -> String {
    section
        .and_then(|section| object(section, "header"))
        .map(|header| string_or(header, "type", "none"))
        .unwrap_or_else(|| "none".to_string())
}

/// Server, port and first user of an outbound's `settings.vnext`.
///
/// Returns `None` when the outbound has no `vnext` entry.
fn vnext_settings(settings: &Map<String, Value>) -> Option<ServerRecord> {
    let server = settings
        .get("vnext")
        .and_then(Value::as_array)
        .and_then(|vnext| vnext.first())
        .and_then(Value::as_object)?;

    let address = string_or(server, "address", "");
    let port = integer_or(server, "port", 0);

    let mut record = ServerRecord::new();
    record.insert("serverName", format!("{}:{}", address, port));
    record.insert("serverAddr", address);
    record.insert("serverPort", port);

    let user = server
        .get("users")
        .and_then(Value::as_array)
        .and_then(|users| users.first())
        .and_then(Value::as_object);
    if let Some(user) = user {
        record.insert("id", string_or(user, "id", ""));
        record.insert("alterId", integer_or(user, "alterId", 0));
        record.insert("security", string_or(user, "security", DEFAULT_SECURITY));
    }
    Some(record)
}

/// Copies the transport fields of `stream` into `record`.
fn stream_settings(record: &mut ServerRecord, stream: &Map<String, Value>) {
    let network = string_or(stream, "network", "tcp");
    record.insert("network", network.as_str());
    record.insert("networkSecurity", string_or(stream, "security", "none"));
    record.insert("tcpHeaderType", "none");

    let allow_insecure = object(stream, "tlsSettings")
        .and_then(|tls| tls.get("allowInsecure"))
        .map(as_bool)
        .unwrap_or(true);
    record.insert("allowInsecure", allow_insecure);

    match network.as_str() {
        "tcp" => {
            record.insert("tcpHeaderType", header_type(object(stream, "tcpSettings")));
        }
        "kcp" => {
            let empty = Map::new();
            let kcp = object(stream, "kcpSettings").unwrap_or(&empty);
            record.insert("kcpMtu", integer_or(kcp, "mtu", DEFAULT_KCP_MTU));
            record.insert("kcpTti", integer_or(kcp, "tti", DEFAULT_KCP_TTI));
            record.insert(
                "kcpUpLink",
                integer_or(kcp, "uplinkCapacity", DEFAULT_KCP_UP_CAPACITY),
            );
            record.insert(
                "kcpDownLink",
                integer_or(kcp, "downlinkCapacity", DEFAULT_KCP_DOWN_CAPACITY),
            );
            record.insert(
                "kcpReadBuffer",
                integer_or(kcp, "readBufferSize", DEFAULT_KCP_READ_BUF_SIZE),
            );
            record.insert(
                "kcpWriteBuffer",
                integer_or(kcp, "writeBufferSize", DEFAULT_KCP_WRITE_BUF_SIZE),
            );
            record.insert(
                "kcpCongestion",
                kcp.get("congestion").map(as_bool).unwrap_or(false),
            );
            record.insert("packetHeader", header_type(Some(kcp)));
        }
        "ws" => {
            let ws = object(stream, "wsSettings");
            let host = ws
                .and_then(|ws| object(ws, "headers"))
                .and_then(|headers| headers.get("host").or_else(|| headers.get("Host")))
                .and_then(Value::as_str)
                .unwrap_or("");
            let path = ws.map(|ws| string_or(ws, "path", "")).unwrap_or_default();
            record.insert("networkHost", host);
            record.insert("networkPath", path);
        }
        "http" => {
            let http = object(stream, "httpSettings");
            let host = http
                .and_then(|http| http.get("host"))
                .and_then(Value::as_array)
                .and_then(|hosts| hosts.first())
                .and_then(Value::as_str)
                .unwrap_or("");
            let path = http.map(|http| string_or(http, "path", "")).unwrap_or_default();
            record.insert("networkHost", host);
            record.insert("networkPath", path);
        }
        "domainsocket" => {
            let path = object(stream, "dsSettings")
                .map(|ds| string_or(ds, "path", ""))
                .unwrap_or_default();
            record.insert("domainSocketFilePath", path);
        }
        "quic" => {
            let quic = object(stream, "quicSettings");
            record.insert(
                "quicSecurity",
                quic.map(|q| string_or(q, "security", "none"))
                    .unwrap_or_else(|| "none".to_string()),
            );
            record.insert(
                "quicKey",
                quic.map(|q| string_or(q, "key", "")).unwrap_or_default(),
            );
            record.insert("packetHeader", header_type(quic));
        }
        _ => {}
    }
}

/// Import the VMess outbounds of an engine configuration document
///
/// Each `vmess` outbound yields one record built from `settings.vnext[0]` and
/// its `streamSettings`, falling back to the document's top-level `transport`
/// when the outbound carries none. Other outbounds are skipped.
pub fn explode_v2ray_conf(config: &Value) -> Vec<ServerRecord> {
    let empty = Map::new();
    let transport = config
        .get("transport")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let outbounds = match config.get("outbounds").and_then(Value::as_array) {
        Some(outbounds) => outbounds,
        None => return Vec::new(),
    };

    let mut servers = Vec::new();
    for outbound in outbounds.iter().filter_map(Value::as_object) {
        let protocol = string_or(outbound, "protocol", "");
        if protocol != "vmess" {
            info!("Ignore the server protocol: {}", protocol);
            continue;
        }

        let Some(mut record) = object(outbound, "settings").and_then(vnext_settings) else {
            continue;
        };

        let stream = object(outbound, "streamSettings")
            .filter(|stream| !stream.is_empty())
            .unwrap_or(transport);
        stream_settings(&mut record, stream);

        let mux = object(outbound, "mux")
            .and_then(|mux| mux.get("concurrency"))
            .and_then(as_integer)
            .filter(|concurrency| *concurrency > 0)
            .unwrap_or(DEFAULT_MUX);
        record.insert("mux", mux);
        record.insert("autoConnect", false);
        record.insert("subscription", "");
        record.insert("udp", false);

        servers.push(record);
    }
    servers
}

/// Parses `content` as an engine configuration document and imports it.
pub fn explode_v2ray_conf_content(content: &str) -> Result<Vec<ServerRecord>, ParseError> {
    let config: Value = serde_json::from_str(content)?;
    Ok(explode_v2ray_conf(&config))
}
