//! Bootstrap snippet placement.

use std::sync::LazyLock;

use regex::Regex;

static HEAD_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").unwrap());

static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<!doctype html>").unwrap());

/// Insert `script` right after the opening `<head>` tag, else right after
/// `<!doctype html>`, else at the very start of the document.
pub fn inject_script(html: &str, script: &str) -> String {
    let at = HEAD_OPEN
        .find(html)
        .or_else(|| DOCTYPE.find(html))
        .map_or(0, |m| m.end());

    let mut out = String::with_capacity(html.len() + script.len());
    out.push_str(&html[..at]);
    out.push_str(script);
    out.push_str(&html[at..]);
    out
}
