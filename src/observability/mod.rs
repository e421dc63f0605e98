//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! server + mungers produce:
//!     → logging.rs (structured log events, request ids as fields)
//!     → metrics.rs (request and munge counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every munger log line
//! - Metrics are cheap; the exporter is off unless configured

pub mod logging;
pub mod metrics;
