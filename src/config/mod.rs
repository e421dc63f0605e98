//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)          CLI flags
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig ← overrides applied in main.rs
//!     → handed to startup, immutable afterwards
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload, the munger registry is
//!   built from it exactly once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DaemonConfig, ListenerConfig, MungingConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
