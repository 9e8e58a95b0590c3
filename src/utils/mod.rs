pub mod base64;
pub mod url;

// Re-export common utilities
pub use self::base64::{decode_base64, decode_base64_string};
pub use self::url::{parse_query, percent_decode, percent_encode};
