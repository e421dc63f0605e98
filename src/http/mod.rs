//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request munger lookup (munger::MungerRegistry)
//!     → request.rs (re-target at daemon, strip hop-by-hop headers)
//!     → hyper client → Docker daemon
//!     → response.rs (wrap daemon response)
//!     → response munger lookup
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
