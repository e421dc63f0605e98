//! Drive-letter translation onto a mount root.
//!
//! A daemon running inside a Linux subsystem sees the client's drives under a
//! common root, e.g. `C:\Users\foo` is `/mnt/c/Users/foo`.

use crate::translate::{BindClassifier, MountKind, PathTranslator, TranslationError};

/// Translates `X:\...` client paths to `{mount_root}/x/...`.
#[derive(Debug, Clone)]
pub struct MountRootTranslator {
    mount_root: String,
}

impl MountRootTranslator {
    /// Create a translator rooted at `mount_root` (e.g. `/mnt`).
    pub fn new(mount_root: impl Into<String>) -> Self {
        let mount_root = mount_root.into();
        Self {
            mount_root: mount_root.trim_end_matches('/').to_string(),
        }
    }

    pub fn mount_root(&self) -> &str {
        if self.mount_root.is_empty() {
            "/"
        } else {
            &self.mount_root
        }
    }
}

impl Default for MountRootTranslator {
    fn default() -> Self {
        Self::new("/mnt")
    }
}

impl PathTranslator for MountRootTranslator {
    fn translate(&self, client_path: &str) -> Result<String, TranslationError> {
        if client_path.is_empty() {
            return Err(TranslationError::Empty);
        }
        if client_path.starts_with("\\\\") || client_path.starts_with("//") {
            return Err(TranslationError::Unc(client_path.to_string()));
        }
        // Already a path in the daemon's namespace.
        if client_path.starts_with('/') {
            return Ok(client_path.to_string());
        }

        let Some(drive) = drive_letter(client_path) else {
            return Err(TranslationError::Relative(client_path.to_string()));
        };
        let rest = &client_path[2..];
        if !rest.starts_with(['\\', '/']) {
            // `C:foo` is relative to the drive's current directory.
            return Err(TranslationError::Relative(client_path.to_string()));
        }

        let mut translated = format!("{}/{}", self.mount_root, drive.to_ascii_lowercase());
        for component in rest.split(['\\', '/']).filter(|c| !c.is_empty()) {
            if component == ".." {
                return Err(TranslationError::Unsupported {
                    path: client_path.to_string(),
                    reason: "parent directory components are not allowed".to_string(),
                });
            }
            translated.push('/');
            translated.push_str(component);
        }
        Ok(translated)
    }
}

/// Returns the drive letter when `path` starts with `X:`.
pub(crate) fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => Some(letter),
        _ => None,
    }
}

/// Classifies bind hosts using Docker's volume name syntax.
///
/// `[a-zA-Z0-9][a-zA-Z0-9_.-]+` is a named volume; everything else is
/// treated as a path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPathClassifier;

impl BindClassifier for HostPathClassifier {
    fn classify(&self, host: &str) -> MountKind {
        let mut chars = host.chars();
        let valid_volume = match chars.next() {
            Some(first) if first.is_ascii_alphanumeric() && host.len() > 1 => {
                chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            }
            _ => false,
        };
        if valid_volume {
            MountKind::NamedVolume
        } else {
            MountKind::PathMount
        }
    }
}
