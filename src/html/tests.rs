use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::core::{Body, ServeResponse};
use crate::hmr::ImporterGraph;
use crate::resolve::{RootResolver, Resolver};
use crate::rewrite::{ImportRewriter, RewriteError, SpecifierRewriter};
use crate::utils::mime::types;

/// Uppercases script bodies and tags them with the importer; fails on `FAIL`.
#[derive(Default)]
struct TagEngine {
    inits: AtomicUsize,
    calls: AtomicUsize,
}

impl ImportRewriter for TagEngine {
    fn init(&self) -> Result<(), RewriteError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rewrite(
        &self,
        _root: &Path,
        source: &str,
        importer: &str,
        _resolver: &dyn Resolver,
    ) -> Result<String, RewriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if source.contains("FAIL") {
            return Err(RewriteError::Syntax {
                importer: importer.to_string(),
                message: "unexpected token".into(),
            });
        }
        Ok(format!("[{importer}]{}", source.to_uppercase()))
    }
}

struct Fixture {
    plugin: HtmlPlugin,
    engine: Arc<TagEngine>,
    graph: Arc<ImporterGraph>,
}

fn fixture() -> Fixture {
    let engine = Arc::new(TagEngine::default());
    let graph = Arc::new(ImporterGraph::new());
    let transformer = HtmlTransformer::new(
        "/srv/app",
        engine.clone(),
        Arc::new(RootResolver::new("/srv/app")),
        Arc::clone(&graph),
        BootstrapSnippet::default(),
    );
    Fixture {
        plugin: HtmlPlugin::new(transformer, Arc::new(ResponseCache::default())),
        engine,
        graph,
    }
}

fn snippet() -> String {
    BootstrapSnippet::default().as_str().to_string()
}

fn html_response(body: &str) -> ServeResponse {
    ServeResponse::new(200, types::HTML, body.to_string())
}

fn body_text(response: ServeResponse) -> String {
    String::from_utf8(response.body.unwrap().into_bytes().unwrap()).unwrap()
}

// =============================================================================
// HtmlTransformer
// =============================================================================

#[tokio::test]
async fn test_document_without_scripts_only_gains_snippet() {
    let fx = fixture();
    let html = "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>";

    let out = fx.plugin.transformer().transform("/index.html", html).await.unwrap();

    assert_eq!(
        out,
        format!(
            "<!DOCTYPE html><html><head>{}<title>t</title></head><body><p>x</p></body></html>",
            snippet()
        )
    );
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 0);
    assert!(fx.graph.is_empty());
}

#[tokio::test]
async fn test_inline_script_rewritten_in_place() {
    let fx = fixture();
    let html = "<head></head><body><script type=\"module\">import a</script><p>after</p></body>";

    let out = fx.plugin.transformer().transform("/index.html", html).await.unwrap();

    assert_eq!(
        out,
        format!(
            "<head>{}</head><body><script type=\"module\">[/index.html]IMPORT A</script><p>after</p></body>",
            snippet()
        )
    );
}

#[tokio::test]
async fn test_empty_inline_script_skips_engine() {
    let fx = fixture();
    let out = fx
        .plugin
        .transformer()
        .transform("/index.html", "<script></script>")
        .await
        .unwrap();

    assert_eq!(out, format!("{}<script></script>", snippet()));
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_external_scripts_register_canonical_keys() {
    let fx = fixture();
    let html = concat!(
        "<script src=\"./main.js?v=3#top\"></script>",
        "<script src='\\src\\app.js'></script>",
        "<script src=\"/lib/../vendor/x.js\"></script>",
        "<script src=\"https://cdn.example.com/x.js\"></script>",
        "<script src=\"//cdn.example.com/y.js\"></script>",
        "<script src=\"\"></script>",
    );

    let out = fx
        .plugin
        .transformer()
        .transform("/pages/about.html", html)
        .await
        .unwrap();

    // Tags are left exactly as written
    assert_eq!(out, format!("{}{}", snippet(), html));
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 0);

    assert!(fx.graph.has_edge("/main.js", "/pages/about.html"));
    assert!(fx.graph.has_edge("/src/app.js", "/pages/about.html"));
    assert!(fx.graph.has_edge("/vendor/x.js", "/pages/about.html"));
    assert_eq!(fx.graph.len(), 3);
}

#[tokio::test]
async fn test_unresolvable_src_left_unregistered() {
    let fx = fixture();
    let html = "<script src=\"/%ff.js\"></script>";

    let out = fx.plugin.transformer().transform("/index.html", html).await.unwrap();

    assert_eq!(out, format!("{}{}", snippet(), html));
    assert!(fx.graph.is_empty());
}

#[tokio::test]
async fn test_data_blocks_bypass_engine() {
    let fx = fixture();
    let html = concat!(
        "<script type=\"importmap\">{\"imports\":{}}</script>",
        "<script type=\"application/ld+json\">{\"@type\":\"Person\"}</script>",
        "<script type=\"text/template\"><p>{{ name }}</p></script>",
    );

    let out = fx.plugin.transformer().transform("/index.html", html).await.unwrap();

    assert_eq!(out, format!("{}{}", snippet(), html));
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bundled_engine_with_data_blocks() {
    let transformer = HtmlTransformer::new(
        "/srv/app",
        Arc::new(SpecifierRewriter::new()),
        Arc::new(RootResolver::new("/srv/app")),
        Arc::new(ImporterGraph::new()),
        BootstrapSnippet::default(),
    );
    let html = concat!(
        "<script type=\"importmap\">{\"imports\":{\"vue\":\"/vue.js\"}}</script>",
        "<script type=\"application/ld+json\">{\"@context\":\"https://schema.org\",\"@type\":\"Person\"}</script>",
        "<script type=\"text/template\"><li>{{ item }}</li></script>",
        "<script type=\"module\">import { createApp } from 'vue'</script>",
    );

    let out = transformer.transform("/index.html", html).await.unwrap();

    assert_eq!(
        out,
        format!("{}{}", snippet(), html.replace("from 'vue'", "from '/@modules/vue'"))
    );
}

#[tokio::test]
async fn test_many_importers_per_dependency() {
    let fx = fixture();
    let html = "<script src=\"/main.js\"></script>";
    let transformer = fx.plugin.transformer();

    transformer.transform("/index.html", html).await.unwrap();
    transformer.transform("/about.html", html).await.unwrap();
    transformer.transform("/index.html", html).await.unwrap();

    assert_eq!(
        fx.graph.importers_of("/main.js"),
        ["/about.html".to_string(), "/index.html".to_string()]
    );
}

#[tokio::test]
async fn test_mixed_scripts_keep_document_order() {
    let fx = fixture();
    let html = "<script>a</script><p>mid</p><script src=\"/x.js\"></script><script>b</script>";

    let out = fx.plugin.transformer().transform("/index.html", html).await.unwrap();

    assert_eq!(
        out,
        format!(
            "{}<script>[/index.html]A</script><p>mid</p><script src=\"/x.js\"></script><script>[/index.html]B</script>",
            snippet()
        )
    );
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 2);
    assert!(fx.graph.has_edge("/x.js", "/index.html"));
}

#[tokio::test]
async fn test_engine_initialized_once() {
    let fx = fixture();
    let transformer = fx.plugin.transformer();
    for i in 0..3 {
        let html = format!("<script>{i}</script>");
        transformer.transform("/index.html", &html).await.unwrap();
    }
    assert_eq!(fx.engine.inits.load(Ordering::SeqCst), 1);
}

// =============================================================================
// HtmlPlugin
// =============================================================================

#[tokio::test]
async fn test_apply_transforms_html_body() {
    let fx = fixture();
    let mut response = html_response("<head></head><script>x</script>");

    fx.plugin.apply("/index.html", &mut response).await.unwrap();

    assert_eq!(
        body_text(response),
        format!("<head>{}</head><script>[/index.html]X</script>", snippet())
    );
}

#[tokio::test]
async fn test_apply_reads_streamed_body() {
    let fx = fixture();
    let reader = std::io::Cursor::new(b"<p>streamed</p>".to_vec());
    let mut response = ServeResponse::new(200, types::HTML, Body::Reader(Box::new(reader)));

    fx.plugin.apply("/index.html", &mut response).await.unwrap();

    assert_eq!(body_text(response), format!("{}<p>streamed</p>", snippet()));
}

#[tokio::test]
async fn test_apply_passes_non_utf8_body_through() {
    let fx = fixture();
    // windows-1252 "café"
    let legacy = b"<p>caf\xe9</p><script>x</script>".to_vec();
    let mut response = ServeResponse::new(200, types::HTML, legacy.clone());

    fx.plugin.apply("/legacy.html", &mut response).await.unwrap();

    assert_eq!(response.body.unwrap().into_bytes().unwrap(), legacy);
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 0);
    assert!(fx.plugin.cache().is_empty());
}

#[tokio::test]
async fn test_second_request_served_from_cache() {
    let fx = fixture();
    let html = "<script>x</script>";

    let mut first = html_response(html);
    fx.plugin.apply("/index.html", &mut first).await.unwrap();
    let mut second = html_response(html);
    fx.plugin.apply("/index.html", &mut second).await.unwrap();

    assert_eq!(body_text(first), body_text(second));
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.plugin.cache().hits(), 1);
    assert_eq!(fx.plugin.cache().len(), 1);
}

#[tokio::test]
async fn test_changed_content_misses_cache() {
    let fx = fixture();
    fx.plugin.transform_document("/index.html", "<script>a</script>").await.unwrap();
    fx.plugin.transform_document("/index.html", "<script>b</script>").await.unwrap();

    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 2);
    assert_eq!(fx.plugin.cache().hits(), 0);
    assert_eq!(fx.plugin.cache().len(), 2);
}

#[tokio::test]
async fn test_rewrite_error_fails_request_and_caches_nothing() {
    let fx = fixture();
    let mut response = html_response("<script>ok</script><script>FAIL</script>");

    let err = fx.plugin.apply("/index.html", &mut response).await.unwrap_err();

    assert!(matches!(
        err,
        HtmlError::Rewrite(RewriteError::Syntax { ref importer, .. }) if importer == "/index.html"
    ));
    assert!(fx.plugin.cache().is_empty());
}

#[tokio::test]
async fn test_apply_skips_non_html_and_not_modified() {
    let fx = fixture();

    let mut js = ServeResponse::new(200, types::JAVASCRIPT, "<script>x</script>".to_string());
    fx.plugin.apply("/main.js", &mut js).await.unwrap();
    assert_eq!(body_text(js), "<script>x</script>");

    let mut not_modified = html_response("<script>x</script>");
    not_modified.status = 304;
    fx.plugin.apply("/index.html", &mut not_modified).await.unwrap();
    assert_eq!(body_text(not_modified), "<script>x</script>");

    let mut head = ServeResponse::empty(200, types::HTML);
    fx.plugin.apply("/index.html", &mut head).await.unwrap();
    assert!(head.body.is_none());

    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 0);
    assert!(fx.plugin.cache().is_empty());
}

#[tokio::test]
async fn test_apply_leaves_empty_body_alone() {
    let fx = fixture();
    let mut response = html_response("");

    fx.plugin.apply("/index.html", &mut response).await.unwrap();

    assert_eq!(body_text(response), "");
    assert!(fx.plugin.cache().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_init() {
    let fx = fixture();
    let plugin = Arc::new(fx.plugin);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let plugin = Arc::clone(&plugin);
            tokio::spawn(async move {
                let html = format!("<script>{i}</script>");
                plugin.transform_document("/index.html", &html).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fx.engine.inits.load(Ordering::SeqCst), 1);
    assert_eq!(fx.engine.calls.load(Ordering::SeqCst), 16);
}
