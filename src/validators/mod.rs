//! Validation of server records
//!
//! [`fields`] holds the single-field building blocks, [`predicates`] the
//! string predicates they combine, and [`server`] the per-protocol schemas.

pub mod fields;
pub mod predicates;
pub mod server;

pub use fields::{numeric_field_error, string_field_error, Predicate};
pub use predicates::{get_alpn, is_alpn, is_domain_name, is_ip_addr, NameRegistry, NoNames};
pub use server::ServerValidator;
