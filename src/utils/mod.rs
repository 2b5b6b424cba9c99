pub mod client_id;
pub mod config;
pub mod rate_limit;
