//! Bind-mount string grammar.
//!
//! ```text
//! bind    = host ":" container [ ":" options ]
//! host    = drive-path | path | volume-name
//! ```
//!
//! A host starting with a drive letter (`C:\`, `C:/`) keeps its colon; every
//! other colon separates fields. Only `options` may be empty.

use crate::translate::{BindClassifier, MountKind};

/// One parsed bind entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindSpec {
    pub host: String,
    pub container: String,
    /// `None` when the bind has no options segment at all; `Some("")` when it
    /// ends with an explicit, empty `:`.
    pub options: Option<String>,
    pub kind: MountKind,
}

/// Why a raw bind string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindParseError {
    MissingContainer,
    TooManyFields,
    EmptyHost,
    EmptyContainer,
}

impl BindParseError {
    pub fn reason(self) -> &'static str {
        match self {
            Self::MissingContainer => "expected host:container[:options]",
            Self::TooManyFields => "too many ':' separated fields",
            Self::EmptyHost => "host is empty",
            Self::EmptyContainer => "container path is empty",
        }
    }
}

impl std::fmt::Display for BindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

impl std::error::Error for BindParseError {}

impl BindSpec {
    /// Parse a raw bind string, classifying its host with `classifier`.
    pub fn parse(raw: &str, classifier: &dyn BindClassifier) -> Result<Self, BindParseError> {
        // Skip over the drive colon so it is not taken as a separator.
        let skip = if has_drive_prefix(raw) { 2 } else { 0 };
        let (drive, tail) = raw.split_at(skip);

        let mut fields = tail.splitn(4, ':');
        let host_tail = fields.next().unwrap_or_default();
        let container = fields.next().ok_or(BindParseError::MissingContainer)?;
        let options = fields.next();
        if fields.next().is_some() {
            return Err(BindParseError::TooManyFields);
        }

        let host = format!("{drive}{host_tail}");
        if host.is_empty() {
            return Err(BindParseError::EmptyHost);
        }
        if container.is_empty() {
            return Err(BindParseError::EmptyContainer);
        }

        let kind = classifier.classify(&host);
        Ok(Self {
            host,
            container: container.to_string(),
            options: options.map(str::to_string),
            kind,
        })
    }

    pub fn is_path_mount(&self) -> bool {
        self.kind.is_path()
    }

    /// Reassemble the bind string.
    pub fn format(&self) -> String {
        format_bind(&self.host, &self.container, self.options.as_deref())
    }
}

/// Builds `host:container` or `host:container:options`.
pub fn format_bind(host: &str, container: &str, options: Option<&str>) -> String {
    match options {
        Some(options) => format!("{host}:{container}:{options}"),
        None => format!("{host}:{container}"),
    }
}

/// `C:\...` or `C:/...`; a bare `C:` is not treated as a drive.
fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}
