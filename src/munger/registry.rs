//! Munger lookup by method and path pattern.
//!
//! # Responsibilities
//! - Compile path patterns (`/containers/{id}/json`)
//! - Reject duplicate (method, pattern) registrations at startup
//! - Look up the munger for a request path, capturing template params
//!
//! # Design Decisions
//! - Patterns are segment lists; `{name}` matches one non-empty segment
//! - A leading Docker API version segment (`/v1.43`) is ignored on lookup
//! - Patterns with the same shape are duplicates even if param names differ
//! - First registration order is lookup order

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};

use crate::munger::error::RegistryError;
use crate::munger::{HttpMessage, Munger, TemplateParams};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    fn same_shape(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Param(_), Segment::Param(_)) => true,
            _ => false,
        }
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, RegistryError> {
        let invalid = |reason| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(invalid("pattern must start with '/'"));
        };

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(invalid("empty path segment"));
            }
            if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(invalid("template parameter has no name"));
                }
                segments.push(Segment::Param(name.to_string()));
            } else if segment.contains(['{', '}']) {
                return Err(invalid("template parameter must span a whole segment"));
            } else {
                segments.push(Segment::Literal(segment.to_string()));
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn same_shape(&self, other: &PathPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Match an unversioned request path, returning captured params.
    fn captures(&self, path_segments: &[&str]) -> Option<TemplateParams> {
        if path_segments.len() != self.segments.len() {
            return None;
        }
        let mut params = TemplateParams::new();
        for (segment, value) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Literal(literal) if literal.as_str() == *value => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if value.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }
        Some(params)
    }
}

struct MungerEntry<M: HttpMessage> {
    method: Method,
    pattern: PathPattern,
    munger: Arc<dyn Munger<M>>,
}

/// A matched munger and the params captured from the path.
pub struct MungerMatch<'a, M: HttpMessage> {
    pub munger: &'a dyn Munger<M>,
    pub pattern: &'a str,
    pub params: TemplateParams,
}

/// Mungers for one message role.
pub struct MungerTable<M: HttpMessage> {
    entries: Vec<MungerEntry<M>>,
}

impl<M: HttpMessage> MungerTable<M> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn register(
        &mut self,
        method: Method,
        pattern: &str,
        munger: Arc<dyn Munger<M>>,
    ) -> Result<(), RegistryError> {
        let pattern = PathPattern::parse(pattern)?;
        let duplicate = self
            .entries
            .iter()
            .any(|entry| entry.method == method && entry.pattern.same_shape(&pattern));
        if duplicate {
            return Err(RegistryError::DuplicateMunger {
                role: M::ROLE,
                method,
                pattern: pattern.raw,
            });
        }

        tracing::debug!(
            role = M::ROLE,
            method = %method,
            pattern = %pattern.raw,
            munger = munger.name(),
            "Registered munger"
        );
        self.entries.push(MungerEntry {
            method,
            pattern,
            munger,
        });
        Ok(())
    }

    /// Find the munger for `method` and `path` (query string excluded).
    pub fn lookup(&self, method: &Method, path: &str) -> Option<MungerMatch<'_, M>> {
        let segments = unversioned_segments(path);
        self.entries
            .iter()
            .filter(|entry| entry.method == *method)
            .find_map(|entry| {
                entry.pattern.captures(&segments).map(|params| MungerMatch {
                    munger: entry.munger.as_ref(),
                    pattern: entry.pattern.as_str(),
                    params,
                })
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide munger registry.
///
/// Built once during startup, before any request is served, then shared
/// read-only. Registration is not thread-safe and must not race with lookups.
pub struct MungerRegistry {
    requests: MungerTable<Request<Body>>,
    responses: MungerTable<Response<Body>>,
}

impl MungerRegistry {
    pub fn new() -> Self {
        Self {
            requests: MungerTable::new(),
            responses: MungerTable::new(),
        }
    }

    /// Register a request munger. Fails if (method, pattern) is taken.
    pub fn register_request(
        &mut self,
        method: Method,
        pattern: &str,
        munger: Arc<dyn Munger<Request<Body>>>,
    ) -> Result<(), RegistryError> {
        self.requests.register(method, pattern, munger)
    }

    /// Register a response munger. Fails if (method, pattern) is taken.
    pub fn register_response(
        &mut self,
        method: Method,
        pattern: &str,
        munger: Arc<dyn Munger<Response<Body>>>,
    ) -> Result<(), RegistryError> {
        self.responses.register(method, pattern, munger)
    }

    pub fn requests(&self) -> &MungerTable<Request<Body>> {
        &self.requests
    }

    pub fn responses(&self) -> &MungerTable<Response<Body>> {
        &self.responses
    }
}

impl Default for MungerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `path` into segments, dropping a leading `v1.43`-style version.
fn unversioned_segments(path: &str) -> Vec<&str> {
    let path = path.split('?').next().unwrap_or_default();
    let mut segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    if segments.len() > 1 && is_api_version(segments[0]) {
        segments.remove(0);
    }
    segments
}

fn is_api_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .map(|version| {
            !version.is_empty()
                && !version.starts_with('.')
                && !version.ends_with('.')
                && !version.contains("..")
                && version.chars().all(|c| c.is_ascii_digit() || c == '.')
        })
        .unwrap_or(false)
}
