pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod init;
pub mod rate_limiter;
pub mod resources;

// Re-export key types for convenience
pub use client::{ApiClient, Credentials, ResultInfo, DEFAULT_BASE_URL};
pub use config::{ApiConfig, Config, LoggingConfig, RateLimits};
pub use error::{Error, Result};
pub use init::{initialize_config, InitOptions};
pub use rate_limiter::RateLimiter;
pub use resources::{Account, DnsRecord, NewRecord, Zone};
