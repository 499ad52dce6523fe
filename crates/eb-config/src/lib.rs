//! echoback server configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for echoback.toml
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Environment overrides for bind address and port
//! - Semantic validation with stable error codes

pub mod resolve;
pub mod server;
pub mod validate;

pub use resolve::{load_config, resolve_config, ConfigPath, ConfigSource, LoadedConfig};
pub use server::{RoutingConfig, ServerConfig};
pub use validate::{validate_config, ValidationError, ValidationResult};
