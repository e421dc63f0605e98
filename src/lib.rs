//! Docker Engine API proxy that rewrites client paths for a daemon running
//! in another filesystem namespace.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod munger;
pub mod mungers;
pub mod observability;
pub mod translate;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use munger::{MungeError, MungerRegistry};
