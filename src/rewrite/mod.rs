//! Import specifier rewriting for module scripts.
//!
//! [`ImportRewriter`] is the seam the HTML transform calls for every inline
//! script body. [`SpecifierRewriter`] is the bundled engine: it parses the body
//! as an ES module with oxc and rewrites static import/export specifiers so the
//! browser can fetch them from the dev server.
//!
//! | Specifier           | Rewritten to                       |
//! |---------------------|------------------------------------|
//! | `vue`               | `/@modules/vue`                    |
//! | `./util.js`         | importer-relative, normalized      |
//! | `/src/main.js`      | normalized                         |
//! | `https://...`       | unchanged                          |

pub mod gate;

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::Statement;
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

use crate::resolve::Resolver;
use crate::utils::url::{is_external_url, parent_dir, resolve_url};

pub use gate::ReadyGate;

/// Public path prefix bare module imports are served under.
pub const MODULES_PREFIX: &str = "/@modules/";

/// Import rewriting errors.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to parse module script in {importer}: {message}")]
    Syntax { importer: String, message: String },

    #[error("import rewriter failed to initialize: {0}")]
    Init(String),
}

/// Rewrites import specifiers inside a module source.
pub trait ImportRewriter: Send + Sync {
    /// One-time setup, run through a [`ReadyGate`] before the first rewrite.
    fn init(&self) -> Result<(), RewriteError> {
        Ok(())
    }

    /// Rewrite `source`, imported by `importer`, relative to `root`.
    fn rewrite(
        &self,
        root: &Path,
        source: &str,
        importer: &str,
        resolver: &dyn Resolver,
    ) -> Result<String, RewriteError>;
}

/// oxc-backed rewriter for static imports and re-exports.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpecifierRewriter;

impl SpecifierRewriter {
    pub fn new() -> Self {
        Self
    }
}

impl ImportRewriter for SpecifierRewriter {
    fn rewrite(
        &self,
        _root: &Path,
        source: &str,
        importer: &str,
        resolver: &dyn Resolver,
    ) -> Result<String, RewriteError> {
        // Classic scripts need not parse as modules
        if !source.contains("import") && !source.contains("export") {
            return Ok(source.to_string());
        }
        let literals = specifier_spans(source, importer)?;

        let mut out = String::with_capacity(source.len() + literals.len() * 16);
        let mut last = 0;
        for (start, end) in literals {
            // Span covers the quotes
            let specifier = &source[start + 1..end - 1];
            let Some(rewritten) = resolve_specifier(specifier, importer, resolver) else {
                continue;
            };
            if rewritten == specifier {
                continue;
            }
            out.push_str(&source[last..start + 1]);
            out.push_str(&rewritten);
            last = end - 1;
        }
        out.push_str(&source[last..]);
        Ok(out)
    }
}

/// Byte spans (quotes included) of every static import/export source literal.
fn specifier_spans(source: &str, importer: &str) -> Result<Vec<(usize, usize)>, RewriteError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(RewriteError::Syntax {
            importer: importer.to_string(),
            message: error.to_string(),
        });
    }

    let spans = ret
        .program
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::ImportDeclaration(decl) => Some(decl.source.span),
            Statement::ExportAllDeclaration(decl) => Some(decl.source.span),
            Statement::ExportNamedDeclaration(decl) => decl.source.as_ref().map(|s| s.span),
            _ => None,
        })
        .map(|span| (span.start as usize, span.end as usize))
        .filter(|(start, end)| end - start >= 2)
        .collect();
    Ok(spans)
}

/// Map one specifier to its browser-fetchable form.
///
/// Returns `None` when the specifier should be left alone.
fn resolve_specifier(specifier: &str, importer: &str, resolver: &dyn Resolver) -> Option<String> {
    if specifier.is_empty() || is_external_url(specifier) {
        return None;
    }

    if specifier.starts_with('/') || specifier.starts_with('.') {
        // Checked in decoded form, written back with the author's escapes
        let absolute = resolve_url(parent_dir(importer), specifier);
        return match resolver.normalize_public_path(&absolute) {
            Ok(_) => Some(absolute),
            Err(e) => {
                crate::debug!("rewrite"; "leaving `{}` in {}: {}", specifier, importer, e);
                None
            }
        };
    }

    Some(format!("{MODULES_PREFIX}{specifier}"))
}
