//! HTML document transform.
//!
//! ```text
//! document ─► scan_scripts ─┬─ inline   ─► ImportRewriter ─► reassembled
//!                           └─ external ─► ImporterGraph (tag untouched)
//!                                              │
//!                            inject_script(BootstrapSnippet) ◄┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use super::bootstrap::BootstrapSnippet;
use super::inject::inject_script;
use super::scan::{ScriptKind, ScriptRegion, scan_scripts};
use crate::hmr::ImporterGraph;
use crate::resolve::Resolver;
use crate::rewrite::{ImportRewriter, ReadyGate, RewriteError};
use crate::utils::url::{clean_url, is_external_url, resolve_url, slash};

/// Rewrites one HTML document for the browser.
pub struct HtmlTransformer {
    root: PathBuf,
    engine: Arc<dyn ImportRewriter>,
    resolver: Arc<dyn Resolver>,
    graph: Arc<ImporterGraph>,
    snippet: BootstrapSnippet,
    gate: ReadyGate,
}

impl HtmlTransformer {
    pub fn new(
        root: impl Into<PathBuf>,
        engine: Arc<dyn ImportRewriter>,
        resolver: Arc<dyn Resolver>,
        graph: Arc<ImporterGraph>,
        snippet: BootstrapSnippet,
    ) -> Self {
        Self {
            root: root.into(),
            engine,
            resolver,
            graph,
            snippet,
            gate: ReadyGate::new(),
        }
    }

    /// Transform `html`, served at request path `importer`.
    ///
    /// Text outside script elements is copied through unchanged, as are data
    /// blocks such as import maps. The first engine error aborts the whole
    /// document.
    pub async fn transform(&self, importer: &str, html: &str) -> Result<String, RewriteError> {
        let engine = Arc::clone(&self.engine);
        self.gate.wait(move || engine.init()).await?;

        let mut out = String::with_capacity(html.len() + self.snippet.as_str().len());
        let mut last = 0;

        for region in scan_scripts(html) {
            out.push_str(&html[last..region.range.start]);
            match region.kind {
                ScriptKind::Inline { body } if !body.is_empty() && region.is_code() => {
                    self.rewrite_inline(&mut out, &region, body, importer)?;
                }
                ScriptKind::Inline { .. } => out.push_str(&html[region.range.clone()]),
                ScriptKind::External { src } => {
                    self.register_external(src, importer);
                    out.push_str(&html[region.range.clone()]);
                }
            }
            last = region.range.end;
        }
        out.push_str(&html[last..]);

        Ok(inject_script(&out, self.snippet.as_str()))
    }

    fn rewrite_inline(
        &self,
        out: &mut String,
        region: &ScriptRegion<'_>,
        body: &str,
        importer: &str,
    ) -> Result<(), RewriteError> {
        let rewritten = self
            .engine
            .rewrite(&self.root, body, importer, self.resolver.as_ref())?;
        out.push_str(region.open_tag);
        out.push_str(&rewritten);
        out.push_str(region.close_tag);
        Ok(())
    }

    /// Record `importer` as a consumer of the module behind `src`.
    fn register_external(&self, src: &str, importer: &str) {
        let src = src.trim();
        if src.is_empty() || is_external_url(src) {
            return;
        }

        let absolute = resolve_url("/", &slash(src));
        match self.resolver.normalize_public_path(clean_url(&absolute)) {
            Ok(importee) => {
                if self.graph.add_importer(&importee, importer) {
                    crate::debug!("html"; "        {} imports {}", importer, importee);
                }
            }
            Err(e) => crate::debug!("html"; "{}: skipping <script src={:?}>: {}", importer, src, e),
        }
    }
}
