// Core modules
pub mod api;
pub mod config;
pub mod context;
pub mod execution;
pub mod indicators;
pub mod journal;
pub mod models;
pub mod oracle;
pub mod reflection;
pub mod trader;

// Re-export commonly used types
pub use config::Config;
pub use models::*;
pub use oracle::DecisionOracle;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
