//! Munger framework.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     mungers::default_registry()
//!     → MungerRegistry::register_request / register_response
//!     → Arc<MungerRegistry> (frozen)
//!
//! Per request:
//!     registry.requests().lookup(method, path)
//!     → Munger::munge(request, context, params)
//!         → body.rs (read_json / replace_json)
//!         → bind.rs (parse / format)
//!         → translate (classifier, translator)
//!     → forward to daemon
//!     → registry.responses().lookup(...) → Munger::munge(response, ...)
//! ```
//!
//! # Design Decisions
//! - Registration needs `&mut MungerRegistry`; once shared behind `Arc` the
//!   registry is read-only, so lookups need no locking
//! - Concurrent registration is not supported
//! - A munger either succeeds or leaves the message as it found it

pub mod bind;
pub mod body;
pub mod error;
pub mod registry;

use std::collections::HashMap;

use async_trait::async_trait;

pub use bind::{format_bind, BindParseError, BindSpec};
pub use body::{read_json, replace_json, HttpMessage};
pub use error::{MungeError, RegistryError, Result};
pub use registry::{MungerMatch, MungerRegistry, MungerTable, PathPattern};

/// Values captured from `{name}` segments of the matched path pattern.
pub type TemplateParams = HashMap<String, String>;

/// State shared by the request and response mungers of one exchange.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request_id: String,
    values: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            values: HashMap::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A handler that inspects and optionally rewrites an intercepted message.
///
/// `M` is the message role: `Request<Body>` for request mungers,
/// `Response<Body>` for response mungers.
#[async_trait]
pub trait Munger<M: HttpMessage>: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn munge(
        &self,
        message: &mut M,
        context: &mut RequestContext,
        params: &TemplateParams,
    ) -> Result<()>;
}
