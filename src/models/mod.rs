//! Core data models
//!
//! The protocol tag and the normalized server record shared by the parsers,
//! validators and renderers.
//!
//! ```rust
//! use serverconfig::models::{Protocol, ServerRecord};
//!
//! let mut record = ServerRecord::new();
//! record.insert("serverName", "HK-01");
//! record.insert("serverAddr", "example.com");
//! record.insert("serverPort", 443);
//!
//! assert_eq!(Protocol::from_name("v2ray"), Protocol::VMess);
//! assert!(record.has_endpoint());
//! ```

mod protocol;
mod record;

pub use protocol::Protocol;
pub use record::{as_bool, as_integer, parse_bool, ServerRecord};
pub(crate) use record::numeric_or_string;

/// Default values applied when a foreign document omits them.
pub const DEFAULT_SECURITY: &str = "auto";
pub const DEFAULT_KCP_MTU: i64 = 1350;
pub const DEFAULT_KCP_TTI: i64 = 50;
pub const DEFAULT_KCP_UP_CAPACITY: i64 = 5;
pub const DEFAULT_KCP_DOWN_CAPACITY: i64 = 20;
pub const DEFAULT_KCP_READ_BUF_SIZE: i64 = 2;
pub const DEFAULT_KCP_WRITE_BUF_SIZE: i64 = 2;
/// Stored in `mux` when no positive concurrency is configured.
pub const DEFAULT_MUX: i64 = -1;
