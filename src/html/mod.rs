//! HTML response transform.
//!
//! Runs on a finished response, after the static-file handler produced it:
//!
//! ```text
//! ServeResponse ─► HtmlPlugin::apply
//!                    ├─ not HTML / 304 / no body ─► untouched
//!                    └─ read body ─► ResponseCache ─ hit ─► cached output
//!                                        └─ miss ─► HtmlTransformer ─► store
//! ```

pub mod bootstrap;
pub mod cache;
pub mod inject;
pub mod scan;
pub mod transform;

#[cfg(test)]
mod tests;

use std::io;
use std::sync::Arc;

use thiserror::Error;

pub use bootstrap::{BootstrapSnippet, HMR_CLIENT_PUBLIC_PATH};
pub use cache::ResponseCache;
pub use transform::HtmlTransformer;

use crate::core::{Body, ServeResponse};
use crate::rewrite::RewriteError;

/// Failures while post-processing an HTML response.
#[derive(Debug, Error)]
pub enum HtmlError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("failed to read response body: {0}")]
    Body(#[from] io::Error),
}

/// Middleware step that serves transformed HTML through the cache.
pub struct HtmlPlugin {
    transformer: HtmlTransformer,
    cache: Arc<ResponseCache>,
}

impl HtmlPlugin {
    pub fn new(transformer: HtmlTransformer, cache: Arc<ResponseCache>) -> Self {
        Self { transformer, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn transformer(&self) -> &HtmlTransformer {
        &self.transformer
    }

    /// Replace the body of an HTML response served at `path` with its
    /// transformed form. Other responses pass through untouched.
    pub async fn apply(&self, path: &str, response: &mut ServeResponse) -> Result<(), HtmlError> {
        if response.status == 304 || !response.is_html() {
            return Ok(());
        }
        let Some(body) = response.body.take() else {
            return Ok(());
        };

        let html = match String::from_utf8(body.into_bytes()?) {
            Ok(html) => html,
            Err(e) => {
                crate::debug!("html"; "{}: body is not UTF-8, serving untransformed", path);
                response.body = Some(Body::Bytes(e.into_bytes()));
                return Ok(());
            }
        };
        if html.is_empty() {
            response.body = Some(Body::Bytes(Vec::new()));
            return Ok(());
        }

        let transformed = self.transform_document(path, &html).await?;
        response.body = Some(Body::Bytes(transformed.as_bytes().to_vec()));
        Ok(())
    }

    /// Cached transform of one document.
    ///
    /// Two concurrent misses on the same document both run the transform and
    /// both store; the results are identical.
    pub async fn transform_document(&self, path: &str, html: &str) -> Result<Arc<str>, RewriteError> {
        if let Some(cached) = self.cache.get(html) {
            crate::debug!("html"; "{}: serving from cache", path);
            return Ok(cached);
        }

        let transformed: Arc<str> = self.transformer.transform(path, html).await?.into();
        self.cache.set(html.to_string(), Arc::clone(&transformed));
        Ok(transformed)
    }
}
