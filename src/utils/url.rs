//! URL path utilities.
//!
//! Pure functions over `/`-separated request paths:
//! - `clean_url` strips `?query` and `#hash`
//! - `slash` converts Windows separators
//! - `resolve_url` joins and normalizes like a POSIX `path.resolve`
//! - `is_external_url` detects fully-qualified URLs

/// Strip the query string and hash fragment from a URL.
///
/// # Examples
/// ```ignore
/// assert_eq!(clean_url("/a.js?v=1#top"), "/a.js");
/// ```
#[inline]
pub fn clean_url(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Replace backslashes with forward slashes.
#[inline]
pub fn slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Resolve `target` against the absolute directory `base`.
///
/// An absolute `target` ignores `base`. `.` segments and empty segments are
/// dropped, `..` pops a segment and stops at the root. The result always
/// starts with `/` and never ends with one (except the root itself).
///
/// # Examples
/// ```ignore
/// assert_eq!(resolve_url("/", "src/main.js"), "/src/main.js");
/// assert_eq!(resolve_url("/pages", "../a.js"), "/a.js");
/// assert_eq!(resolve_url("/", "../../a.js"), "/a.js");
/// ```
pub fn resolve_url(base: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let joined = if target.starts_with('/') {
        [target, ""]
    } else {
        [base, target]
    };

    for part in joined.iter().flat_map(|p| p.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            seg => segments.push(seg),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Directory part of a request path (`/pages/about.html` → `/pages`).
#[inline]
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

/// Check if a reference points outside the project (has a scheme, is
/// protocol-relative or is a data URL).
///
/// A valid scheme must have at least 2 characters before the colon so that
/// Windows drive letters are not mistaken for schemes.
#[inline]
pub fn is_external_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    url.find(':').is_some_and(|pos| {
        pos > 1
            && url[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
