//! Cross-cutting plumbing shared by Edemy services: config loading, the
//! common error envelope, health probes, request ids and tracing setup.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;

pub use config::Config;
pub use error::AppError;
