//! Per-protocol validation of normalized server records.

use crate::i18n::{tr, Identity, Translator};
use crate::models::{Protocol, ServerRecord};
use crate::settings::Settings;

use super::fields::{numeric_field_error, string_field_error, Predicate};
use super::predicates::{is_alpn, is_domain_name, is_ip_addr, NameRegistry};

pub const MSG_NAME_USED: &str = "The %2 '%1' has been used by another server.";
pub const MSG_UNKNOWN_PROTOCOL: &str = "Unknown Server protocol";
pub const MSG_UNSUPPORTED_NETWORK: &str = "Unsupported Network: %1";

/// Networks the downstream engine can carry VMess over.
const SUPPORTED_NETWORKS: [&str; 2] = ["tcp", "ws"];

/// Validates server records against the per-protocol schemas.
///
/// Every check runs; the result lists all diagnostics in schema order and is
/// empty exactly when the record is valid.
pub struct ServerValidator<'a> {
    names: &'a dyn NameRegistry,
    translator: &'a dyn Translator,
    allow_single_label_hosts: bool,
}

impl<'a> ServerValidator<'a> {
    pub fn new(names: &'a dyn NameRegistry) -> Self {
        ServerValidator {
            names,
            translator: &Identity,
            allow_single_label_hosts: Settings::default().allow_single_label_hosts,
        }
    }

    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.allow_single_label_hosts = settings.allow_single_label_hosts;
        self
    }

    /// Returns every diagnostic for `record` under `protocol`.
    ///
    /// `old_name` is the stored name of the record being edited; when it equals
    /// the record's `serverName` the uniqueness check is skipped.
    pub fn validate(
        &self,
        protocol: Protocol,
        record: &ServerRecord,
        old_name: Option<&str>,
    ) -> Vec<String> {
        let errors = match protocol {
            Protocol::VMess => self.vmess_errors(record, old_name),
            Protocol::Shadowsocks => self.shadowsocks_errors(record, old_name),
            Protocol::Trojan => self.trojan_errors(record, old_name),
            Protocol::Unknown => {
                return vec![self.translator.translate(MSG_UNKNOWN_PROTOCOL)];
            }
        };
        errors.into_iter().flatten().collect()
    }

    fn server_name_error(&self, record: &ServerRecord, old_name: Option<&str>) -> Option<String> {
        let doc = record.as_map();
        if old_name.is_some_and(|old| old == record.server_name()) {
            return string_field_error(doc, "serverName", "Server Name", &[], false, None, self.translator);
        }

        let not_used: Predicate = &|name| !self.names.is_name_used(name);
        string_field_error(
            doc,
            "serverName",
            "Server Name",
            &[not_used],
            false,
            Some(MSG_NAME_USED),
            self.translator,
        )
    }

    fn host_error(&self, record: &ServerRecord, key: &str, label: &str, optional: bool) -> Option<String> {
        let allow_single_label = self.allow_single_label_hosts;
        let ip: Predicate = &is_ip_addr;
        let domain: Predicate = &|value| is_domain_name(value, allow_single_label);
        string_field_error(record.as_map(), key, label, &[ip, domain], optional, None, self.translator)
    }

    fn required(&self, record: &ServerRecord, key: &str, label: &str) -> Option<String> {
        string_field_error(record.as_map(), key, label, &[], false, None, self.translator)
    }

    fn one_of(&self, record: &ServerRecord, key: &str, label: &str, allowed: &[&str]) -> Option<String> {
        let member: Predicate = &|value| allowed.iter().any(|a| *a == value);
        string_field_error(record.as_map(), key, label, &[member], false, None, self.translator)
    }

    fn port_error(&self, record: &ServerRecord) -> Option<String> {
        numeric_field_error(record.as_map(), "serverPort", "Server Port", 0, 65535, self.translator)
    }

    fn vmess_errors(&self, record: &ServerRecord, old_name: Option<&str>) -> Vec<Option<String>> {
        let mut errors = vec![
            self.server_name_error(record, old_name),
            self.host_error(record, "serverAddr", "Server Address", false),
            self.port_error(record),
            self.required(record, "id", "ID"),
            numeric_field_error(record.as_map(), "alterId", "Alter ID", 0, 65535, self.translator),
            self.required(record, "security", "Security"),
            self.required(record, "network", "Network"),
            self.one_of(record, "networkSecurity", "Network Security", &["none", "tls"]),
            self.one_of(record, "tcpHeaderType", "TCP Header", &["none", "http"]),
        ];
        errors.extend(self.vmess_stream_errors(record));
        errors
    }

    fn vmess_stream_errors(&self, record: &ServerRecord) -> Vec<Option<String>> {
        let network = record.str_field("network");
        let mut errors = Vec::new();
        // An empty network was already reported as a missing field
        if !network.is_empty() && !SUPPORTED_NETWORKS.iter().any(|n| *n == network) {
            errors.push(Some(tr(self.translator, MSG_UNSUPPORTED_NETWORK, &[network])));
        }
        if network == "ws" {
            let allow_single_label = self.allow_single_label_hosts;
            let domain: Predicate = &|value| is_domain_name(value, allow_single_label);
            errors.push(string_field_error(
                record.as_map(),
                "networkHost",
                "Host",
                &[domain],
                false,
                None,
                self.translator,
            ));
            errors.push(self.required(record, "networkPath", "Path"));
        }
        errors
    }

    fn shadowsocks_errors(&self, record: &ServerRecord, old_name: Option<&str>) -> Vec<Option<String>> {
        vec![
            self.server_name_error(record, old_name),
            self.host_error(record, "serverAddr", "Server Address", false),
            self.port_error(record),
            self.required(record, "encryption", "Security"),
            self.required(record, "password", "Password"),
        ]
    }

    fn trojan_errors(&self, record: &ServerRecord, old_name: Option<&str>) -> Vec<Option<String>> {
        let alpn: Predicate = &is_alpn;
        vec![
            self.server_name_error(record, old_name),
            self.host_error(record, "serverAddr", "Server Address", false),
            self.port_error(record),
            self.required(record, "password", "Password"),
            self.host_error(record, "sni", "SNI", true),
            string_field_error(record.as_map(), "alpn", "ALPN", &[alpn], false, None, self.translator),
        ]
    }
}
