//! Client-to-daemon path translation.
//!
//! # Responsibilities
//! - Decide whether the host side of a bind is a filesystem path or a named volume
//! - Map a client-visible path to the path the daemon resolves
//!
//! # Design Decisions
//! - Both concerns are traits so mungers can be driven by stubs in tests
//! - Classification has exactly two outcomes, see [`MountKind`]
//! - Translation is pure: no filesystem access, no caching

pub mod mount_root;

use thiserror::Error;

pub use mount_root::{HostPathClassifier, MountRootTranslator};

/// What the host side of a bind refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// A path in the client's filesystem namespace.
    PathMount,
    /// A Docker named volume, resolved by the daemon itself.
    NamedVolume,
}

impl MountKind {
    pub fn is_path(self) -> bool {
        matches!(self, MountKind::PathMount)
    }
}

/// Errors produced while translating a client path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("path is empty")]
    Empty,

    #[error("path {0:?} is not absolute")]
    Relative(String),

    #[error("UNC path {0:?} has no equivalent in the daemon namespace")]
    Unc(String),

    #[error("path {path:?} is not supported: {reason}")]
    Unsupported { path: String, reason: String },
}

/// Classifies the host field of a bind string.
pub trait BindClassifier: Send + Sync {
    fn classify(&self, host: &str) -> MountKind;
}

/// Maps a host path from the client's namespace into the daemon's namespace.
pub trait PathTranslator: Send + Sync {
    /// Returns the daemon-visible equivalent of `client_path`.
    fn translate(&self, client_path: &str) -> Result<String, TranslationError>;
}

impl<F> BindClassifier for F
where
    F: Fn(&str) -> MountKind + Send + Sync,
{
    fn classify(&self, host: &str) -> MountKind {
        self(host)
    }
}

impl<F> PathTranslator for F
where
    F: Fn(&str) -> Result<String, TranslationError> + Send + Sync,
{
    fn translate(&self, client_path: &str) -> Result<String, TranslationError> {
        self(client_path)
    }
}
