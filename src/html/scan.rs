//! Script tag scanner.
//!
//! Lightweight pattern matching over well-formed HTML, not a parser. Each
//! opening `<script ...>` is paired with the next `</script>`; whatever lies
//! between is the body, even if it contains `<script>` text inside a string.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script(?:\s[^>]*)?>").unwrap());

static CLOSE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</script\s*>").unwrap());

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

static TYPE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\stype\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

/// `type` values browsers execute as JavaScript.
const SCRIPT_TYPES: &[&str] = &[
    "module",
    "text/javascript",
    "application/javascript",
    "text/ecmascript",
    "application/ecmascript",
    "application/x-javascript",
];

/// What a `<script>` element holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind<'a> {
    /// Code between the tags, verbatim
    Inline { body: &'a str },
    /// `src` attribute value; any body is ignored
    External { src: &'a str },
}

/// A located `<script>...</script>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRegion<'a> {
    /// Byte range of the whole element in the document
    pub range: Range<usize>,
    pub open_tag: &'a str,
    pub close_tag: &'a str,
    pub kind: ScriptKind<'a>,
}

impl ScriptRegion<'_> {
    /// Whether the body is JavaScript. Data blocks (`importmap`, JSON-LD,
    /// client-side templates) are not.
    pub fn is_code(&self) -> bool {
        match attr(&TYPE_ATTR, self.open_tag).map(str::trim) {
            None | Some("") => true,
            Some(ty) => SCRIPT_TYPES.iter().any(|t| t.eq_ignore_ascii_case(ty)),
        }
    }
}

/// Find every script element in `html`, in document order.
///
/// Self-closing tags and tags without a matching `</script>` are skipped and
/// stay part of the surrounding text.
pub fn scan_scripts(html: &str) -> Vec<ScriptRegion<'_>> {
    let mut regions = Vec::new();
    let mut pos = 0;

    while let Some(open) = OPEN_TAG.find_at(html, pos) {
        let open_tag = open.as_str();
        if open_tag.ends_with("/>") {
            pos = open.end();
            continue;
        }

        let Some(close) = CLOSE_TAG.find_at(html, open.end()) else {
            break;
        };

        let kind = match attr(&SRC_ATTR, open_tag) {
            Some(src) => ScriptKind::External { src },
            None => ScriptKind::Inline {
                body: &html[open.end()..close.start()],
            },
        };

        regions.push(ScriptRegion {
            range: open.start()..close.end(),
            open_tag,
            close_tag: close.as_str(),
            kind,
        });
        pos = close.end();
    }

    regions
}

/// Value of the attribute matched by `pattern` in an opening tag, if present.
fn attr<'a>(pattern: &Regex, open_tag: &'a str) -> Option<&'a str> {
    let caps = pattern.captures(open_tag)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}
