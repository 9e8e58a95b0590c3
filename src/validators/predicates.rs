//! String predicates used by field validation.

use std::collections::HashSet;
use std::net::IpAddr;

use regex::Regex;

lazy_static::lazy_static! {
    static ref DOMAIN_LABEL: Regex =
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap();
}

/// ALPN tokens the downstream engine understands.
pub const ALPN_TOKENS: [&str; 2] = ["h2", "http/1.1"];

/// Whether `value` is an IPv4 or IPv6 literal; IPv6 may be bracketed.
pub fn is_ip_addr(value: &str) -> bool {
    let value = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    value.parse::<IpAddr>().is_ok()
}

/// Whether `value` is a DNS name under RFC 1035 label rules.
///
/// The name is at most 253 characters, each label at most 63, made of
/// letters, digits and inner hyphens. A single trailing dot is allowed.
/// Names without a dot are accepted only when `allow_single_label` is set.
pub fn is_domain_name(value: &str, allow_single_label: bool) -> bool {
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    if !allow_single_label && !name.contains('.') {
        return false;
    }
    // An all-numeric dotted name is a malformed IPv4 address, not a host name
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() > 1 && labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit())) {
        return false;
    }
    labels.iter().all(|label| DOMAIN_LABEL.is_match(label))
}

/// Whether every comma-separated token of `value` is a supported ALPN protocol.
pub fn is_alpn(value: &str) -> bool {
    get_alpn(value)
        .iter()
        .all(|token| ALPN_TOKENS.contains(&token.as_str()))
        && !value.trim().is_empty()
}

/// Splits a stored ALPN list into its tokens, dropping empty entries.
pub fn get_alpn(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Answers whether a server name is already taken in the owning collection.
///
/// The server list lives with the persistence collaborator, so uniqueness is
/// delegated to it through this trait.
pub trait NameRegistry {
    fn is_name_used(&self, name: &str) -> bool;
}

impl NameRegistry for HashSet<String> {
    fn is_name_used(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl NameRegistry for Vec<String> {
    fn is_name_used(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }
}

impl<F> NameRegistry for F
where
    F: Fn(&str) -> bool,
{
    fn is_name_used(&self, name: &str) -> bool {
        self(name)
    }
}

/// A registry with no names; every name is free.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNames;

impl NameRegistry for NoNames {
    fn is_name_used(&self, _name: &str) -> bool {
        false
    }
}
