use serde_json::Value;

use super::ss::shadowsocks_plugins;
use crate::error::ParseError;
use crate::models::{as_integer, ServerRecord};
use crate::utils::url::percent_encode;

/// Import the `configs` list of a Shadowsocks GUI configuration document
///
/// Each entry carries `remarks`, `server`, `server_port`, `method`,
/// `password` and optionally `plugin` with `plugin_opts`. Plugin options are
/// run through the same parser as share-link plugin strings.
pub fn explode_ss_conf(config: &Value) -> Vec<ServerRecord> {
    let configs = match config.get("configs").and_then(Value::as_array) {
        Some(configs) => configs,
        None => return Vec::new(),
    };

    let text = |entry: &Value, key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };

    let mut servers = Vec::with_capacity(configs.len());
    for entry in configs.iter().filter(|entry| entry.is_object()) {
        let port = entry.get("server_port").and_then(as_integer).unwrap_or(0);

        let mut record = ServerRecord::new();
        record.insert("serverName", text(entry, "remarks").trim());
        record.insert("autoConnect", false);
        record.insert("subscription", "");
        record.insert("serverAddr", text(entry, "server"));
        record.insert("serverPort", port);
        record.insert("encryption", text(entry, "method"));
        record.insert("password", text(entry, "password"));

        let plugin_opts = text(entry, "plugin_opts");
        if !plugin_opts.is_empty() {
            let plugin_query = format!(
                "plugin={}%3B{}",
                percent_encode(&text(entry, "plugin")),
                percent_encode(&plugin_opts)
            );
            record.insert("plugins", Value::Object(shadowsocks_plugins(&plugin_query)));
        }
        servers.push(record);
    }
    servers
}

/// Parses `content` as a Shadowsocks GUI document and imports it.
pub fn explode_ss_conf_content(content: &str) -> Result<Vec<ServerRecord>, ParseError> {
    let config: Value = serde_json::from_str(content)?;
    Ok(explode_ss_conf(&config))
}
