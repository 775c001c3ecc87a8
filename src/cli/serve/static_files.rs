//! Static file handler: URL → file under the project root → response.

use std::fs::{self, File, Metadata};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;

use crate::core::{Body, ServeResponse};
use crate::utils::mime::{self, types};
use crate::utils::url::clean_url;

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject traversal segments early
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let local = root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Serve the file behind `url`, answering `304` when `if_none_match` matches
/// its current ETag.
pub fn serve(root: &Path, url: &str, if_none_match: Option<&str>) -> Result<ServeResponse> {
    let Some(path) = resolve_path(url, root) else {
        return Ok(ServeResponse::new(404, types::PLAIN, b"404 Not Found".to_vec()));
    };

    let meta = fs::metadata(&path).with_context(|| format!("Failed to stat {}", path.display()))?;
    let etag = etag(&meta);
    let content_type = mime::from_path(&path);

    if if_none_match.is_some_and(|tags| etag_matches(tags, &etag)) {
        return Ok(ServeResponse::empty(304, content_type).with_header("ETag", etag));
    }

    let file = File::open(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(ServeResponse::new(200, content_type, Body::Reader(Box::new(file)))
        .with_header("ETag", etag)
        .with_header("Cache-Control", "no-cache"))
}

/// Weak validator from size and modification time.
fn etag(meta: &Metadata) -> String {
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis());
    format!("W/\"{:x}-{:x}\"", meta.len(), mtime)
}

/// `If-None-Match` may list several tags or be `*`.
fn etag_matches(header: &str, etag: &str) -> bool {
    header
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || strip_weak(tag) == strip_weak(etag))
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Normalize URL: strip query and hash, decode, trim slashes
fn normalize_url(url: &str) -> String {
    let path = clean_url(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}
