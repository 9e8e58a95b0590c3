pub mod clash;
pub mod links;
pub mod useragent;

// Re-export format converters
pub use clash::{render, render_proxies, ClashProxy};
pub use links::{to_share_link, to_shadowsocks_link, to_trojan_link, to_vmess_link};
pub use useragent::random_user_agents;
