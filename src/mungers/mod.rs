//! Docker API mungers and their registration.
//!
//! Every munger the proxy runs is listed in [`registry_with`]; nothing
//! registers itself.

pub mod containers_create;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};

use crate::config::MungingConfig;
use crate::munger::{Munger, MungerRegistry, RegistryError};
use crate::translate::{BindClassifier, HostPathClassifier, MountRootTranslator, PathTranslator};

pub use containers_create::ContainersCreate;

type RequestMungers = Vec<(Method, &'static str, Arc<dyn Munger<Request<Body>>>)>;
type ResponseMungers = Vec<(Method, &'static str, Arc<dyn Munger<Response<Body>>>)>;

/// Build the registry from configuration, using the drive-letter translator.
pub fn default_registry(config: &MungingConfig) -> Result<MungerRegistry, RegistryError> {
    registry_with(
        Arc::new(HostPathClassifier),
        Arc::new(MountRootTranslator::new(config.mount_root.as_str())),
        config.max_body_bytes,
    )
}

/// Build the registry with explicit path capabilities.
pub fn registry_with(
    classifier: Arc<dyn BindClassifier>,
    translator: Arc<dyn PathTranslator>,
    max_body_bytes: usize,
) -> Result<MungerRegistry, RegistryError> {
    let containers_create: Arc<dyn Munger<Request<Body>>> =
        Arc::new(ContainersCreate::new(classifier, translator, max_body_bytes));

    let requests: RequestMungers = vec![(Method::POST, "/containers/create", containers_create)];
    let responses: ResponseMungers = Vec::new();

    let mut registry = MungerRegistry::new();
    for (method, pattern, munger) in requests {
        registry.register_request(method, pattern, munger)?;
    }
    for (method, pattern, munger) in responses {
        registry.register_response(method, pattern, munger)?;
    }

    tracing::info!(
        request_mungers = registry.requests().len(),
        response_mungers = registry.responses().len(),
        "Munger registry built"
    );
    Ok(registry)
}
