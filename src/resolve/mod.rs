//! Path resolution between the filesystem and request space.
//!
//! The [`Resolver`] trait is the seam the HTML transform and the reload
//! notifier go through. Implementations must be pure and synchronous.
//! [`RootResolver`] maps a single project root onto `/`.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Path resolution errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("`{}` is outside the project root", .0.display())]
    OutsideRoot(PathBuf),

    #[error("public path `{0}` must start with `/`")]
    NotAbsolute(String),

    #[error("public path `{0}` escapes the project root")]
    Escapes(String),

    #[error("public path `{0}` is not valid percent-encoded UTF-8")]
    InvalidEncoding(String),
}

/// Maps request paths and filesystem paths into each other.
pub trait Resolver: Send + Sync {
    /// Canonicalize a public (request) path into the importer graph key space.
    fn normalize_public_path(&self, path: &str) -> Result<String, ResolveError>;

    /// Map a filesystem path to the request path that serves it.
    fn file_to_request(&self, file: &Path) -> Result<String, ResolveError>;
}

/// Resolver for a project served from a single root directory.
#[derive(Debug, Clone)]
pub struct RootResolver {
    root: PathBuf,
}

impl RootResolver {
    /// Create a resolver for `root`.
    ///
    /// The root is canonicalized when possible so watcher events, which
    /// report canonical paths on most platforms, map back correctly.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative(&self, file: &Path) -> Option<PathBuf> {
        if let Ok(rel) = file.strip_prefix(&self.root) {
            return Some(rel.to_path_buf());
        }
        let canonical = file.canonicalize().ok()?;
        canonical.strip_prefix(&self.root).ok().map(Path::to_path_buf)
    }
}

impl Resolver for RootResolver {
    fn normalize_public_path(&self, path: &str) -> Result<String, ResolveError> {
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_err(|_| ResolveError::InvalidEncoding(path.to_string()))?;

        if !decoded.starts_with('/') {
            return Err(ResolveError::NotAbsolute(path.to_string()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for part in decoded.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ResolveError::Escapes(path.to_string()));
                    }
                }
                seg => segments.push(seg),
            }
        }

        let mut normalized = format!("/{}", segments.join("/"));
        if decoded.ends_with('/') && !segments.is_empty() {
            normalized.push('/');
        }
        Ok(normalized)
    }

    fn file_to_request(&self, file: &Path) -> Result<String, ResolveError> {
        let rel = self
            .relative(file)
            .ok_or_else(|| ResolveError::OutsideRoot(file.to_path_buf()))?;

        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Ok(format!("/{}", parts.join("/")))
    }
}
