//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build munger registry → Build server → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - The registry is complete before the listener is bound, so no request
//!   can observe a partially registered set of mungers
//! - Fail fast: any startup error is fatal

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, StartupError};
