//! Development server with live reload support.
//!
//! ```text
//! request ─► static_files ─► HtmlPlugin (HTML only) ─► response
//!                                 │
//!                          ImporterGraph ◄── external <script src>
//!                                 │
//! file change ─► WatchActor ─► ReloadNotifier ─► WsActor ─► browser
//! ```

mod lifecycle;
mod response;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use percent_encoding::percent_decode_str;
use tiny_http::{Method, Request, Server};
use tokio::runtime::Handle;

use crate::config::ProjectConfig;
use crate::core::{is_shutdown, register_server};
use crate::hmr::ImporterGraph;
use crate::html::{
    BootstrapSnippet, HMR_CLIENT_PUBLIC_PATH, HtmlPlugin, HtmlTransformer, ResponseCache,
};
use crate::resolve::{Resolver, RootResolver};
use crate::rewrite::{ImportRewriter, SpecifierRewriter};
use crate::utils::url::clean_url;
use crate::{debug, log};

/// Number of request worker threads
const REQUEST_THREADS: usize = 4;

/// Everything a request worker needs.
struct ServeContext {
    root: PathBuf,
    plugin: HtmlPlugin,
    snippet: BootstrapSnippet,
    ws_port: u16,
    runtime: Handle,
}

/// Serve `config.root` until Ctrl+C.
pub fn serve(config: &ProjectConfig) -> Result<()> {
    let root = config.root.clone();
    let resolver: Arc<dyn Resolver> = Arc::new(RootResolver::new(&root));
    let graph = Arc::new(ImporterGraph::new());
    let engine: Arc<dyn ImportRewriter> = Arc::new(SpecifierRewriter::new());
    let snippet = BootstrapSnippet::new(&config.transform.mode);

    let transformer = HtmlTransformer::new(
        root.clone(),
        engine,
        Arc::clone(&resolver),
        Arc::clone(&graph),
        snippet.clone(),
    );
    let cache = Arc::new(ResponseCache::with_capacity(config.transform.cache_capacity));
    let plugin = HtmlPlugin::new(transformer, cache);

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    let actors = lifecycle::Actors::start(config.serve.interface, config.serve.hmr_port)?;
    actors.relay_shutdown(shutdown_rx);
    if config.serve.watch {
        actors.watch(&root, resolver, graph)?;
    }
    debug!("hmr"; "ws://{}:{}", config.serve.interface, actors.ws_port());

    log!("serve"; "http://{}", addr);
    log!("serve"; "serving {}", root.display());

    let ctx = Arc::new(ServeContext {
        root,
        plugin,
        snippet,
        ws_port: actors.ws_port(),
        runtime: actors.handle(),
    });
    run_request_loop(&server, ctx)?;

    actors.shutdown();
    Ok(())
}

fn run_request_loop(server: &Server, ctx: Arc<ServeContext>) -> Result<()> {
    // Transforms block on the async gate; keep them off the accept thread
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let ctx = Arc::clone(&ctx);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();
    let path = request_path(&url);

    if path == HMR_CLIENT_PUBLIC_PATH {
        return response::respond_client_js(request, ctx.ws_port);
    }

    let if_none_match = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("If-None-Match"))
        .map(|h| h.value.to_string());

    let mut served = static_files::serve(&ctx.root, &url, if_none_match.as_deref())?;
    if request.method() == &Method::Head {
        served.body = None;
    }

    if let Err(e) = ctx.runtime.block_on(ctx.plugin.apply(&path, &mut served)) {
        let error = anyhow::Error::from(e);
        log!("error"; "{}: {:#}", path, error);
        return response::respond_transform_error(request, &error, &ctx.snippet);
    }

    response::send(request, served)
}

/// Decoded request path without query or hash; the importer key for HTML.
fn request_path(url: &str) -> String {
    let path = clean_url(url);
    percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| path.to_string())
}
