pub mod explodes;
pub mod subparser;

pub use explodes::{explode, explode_conf_content, explode_link};
pub use subparser::{detect_protocol, parse_subscription};
