//! Full-page reload notifications for changed files.
//!
//! ```text
//! watcher --file--> ReloadNotifier --HmrMessage--> Broadcast (WsActor) --> clients
//! ```
//!
//! An `.html` change reloads that page. Any other change reloads the pages
//! that pull the file in through an external `<script src>`, as recorded in
//! the [`ImporterGraph`]. Broadcasts are fire-and-forget: a failed send is
//! logged in verbose mode and the change is dropped.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::graph::ImporterGraph;
use super::message::HmrMessage;
use crate::resolve::Resolver;

/// Broadcast transport errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("broadcast channel is closed")]
    Closed,

    #[error("broadcast channel is full")]
    Full,
}

/// Outbound channel to all connected clients.
pub trait Broadcast: Send + Sync {
    fn send(&self, message: HmrMessage) -> Result<(), BroadcastError>;
}

/// Turns file-change events into reload broadcasts.
pub struct ReloadNotifier {
    resolver: Arc<dyn Resolver>,
    graph: Arc<ImporterGraph>,
    transport: Arc<dyn Broadcast>,
}

impl ReloadNotifier {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        graph: Arc<ImporterGraph>,
        transport: Arc<dyn Broadcast>,
    ) -> Self {
        Self {
            resolver,
            graph,
            transport,
        }
    }

    /// Handle one changed file.
    pub fn on_change(&self, file: &Path) {
        let path = match self.resolver.file_to_request(file) {
            Ok(path) => path,
            Err(e) => {
                crate::debug!("watch"; "ignoring change: {}", e);
                return;
            }
        };

        if path.ends_with(".html") {
            self.reload(path);
        } else {
            self.reload_importing_pages(&path);
        }
    }

    /// Reload every page that registered `path` as an external script.
    fn reload_importing_pages(&self, path: &str) {
        let key = self
            .resolver
            .normalize_public_path(path)
            .unwrap_or_else(|_| path.to_string());

        for importer in self.graph.importers_of(&key) {
            if is_page(&importer) {
                crate::debug!("hmr"; "{} changed, reloading importer {}", key, importer);
                self.reload(importer);
            }
        }
    }

    fn reload(&self, path: String) {
        crate::debug!("hmr"; "{}: cache busted", path);
        let message = HmrMessage::full_reload(path.as_str());
        match self.transport.send(message) {
            Ok(()) => crate::logger::status_reload(&path),
            Err(e) => crate::debug!("hmr"; "reload for {} dropped: {}", path, e),
        }
    }
}

/// Importers recorded by the HTML transform are request paths of pages:
/// either an `.html` file or a directory index.
fn is_page(importer: &str) -> bool {
    importer.ends_with(".html") || importer.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmr::message::now_millis;
    use crate::resolve::RootResolver;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<HmrMessage>>,
    }

    impl Broadcast for Recorder {
        fn send(&self, message: HmrMessage) -> Result<(), BroadcastError> {
            self.sent.lock().push(message);
            Ok(())
        }
    }

    struct Closed;

    impl Broadcast for Closed {
        fn send(&self, _: HmrMessage) -> Result<(), BroadcastError> {
            Err(BroadcastError::Closed)
        }
    }

    fn setup() -> (TempDir, Arc<RootResolver>, Arc<ImporterGraph>, Arc<Recorder>) {
        let dir = TempDir::new().unwrap();
        let resolver = Arc::new(RootResolver::new(dir.path()));
        (
            dir,
            resolver,
            Arc::new(ImporterGraph::new()),
            Arc::new(Recorder::default()),
        )
    }

    #[test]
    fn test_html_change_broadcasts_full_reload() {
        let (_dir, resolver, graph, recorder) = setup();
        let notifier = ReloadNotifier::new(resolver.clone(), graph, recorder.clone());

        let before = now_millis();
        notifier.on_change(&resolver.root().join("pages").join("about.html"));

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            HmrMessage::FullReload { path, timestamp } => {
                assert_eq!(path, "/pages/about.html");
                assert!(*timestamp >= before);
            }
            other => panic!("Expected FullReload, got {other:?}"),
        }
    }

    #[test]
    fn test_every_change_broadcasts() {
        let (_dir, resolver, graph, recorder) = setup();
        let notifier = ReloadNotifier::new(resolver.clone(), graph, recorder.clone());

        let file = resolver.root().join("index.html");
        notifier.on_change(&file);
        notifier.on_change(&file);

        assert_eq!(recorder.sent.lock().len(), 2);
    }

    #[test]
    fn test_unrelated_file_is_ignored() {
        let (_dir, resolver, graph, recorder) = setup();
        let notifier = ReloadNotifier::new(resolver.clone(), graph, recorder.clone());

        notifier.on_change(&resolver.root().join("src").join("main.js"));
        notifier.on_change(Path::new("/definitely/outside/page.html"));

        assert!(recorder.sent.lock().is_empty());
    }

    #[test]
    fn test_script_change_reloads_importing_pages() {
        let (_dir, resolver, graph, recorder) = setup();
        graph.add_importer("/src/main.js", "/index.html");
        graph.add_importer("/src/main.js", "/docs/");
        graph.add_importer("/src/main.js", "/src/other.js");
        let notifier = ReloadNotifier::new(resolver.clone(), graph, recorder.clone());

        notifier.on_change(&resolver.root().join("src").join("main.js"));

        let paths: Vec<_> = recorder
            .sent
            .lock()
            .iter()
            .filter_map(|m| match m {
                HmrMessage::FullReload { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(paths, ["/docs/", "/index.html"]);
    }

    #[test]
    fn test_closed_transport_is_swallowed() {
        let (_dir, resolver, graph, _) = setup();
        let notifier = ReloadNotifier::new(resolver.clone(), graph, Arc::new(Closed));

        // Must not panic or surface the error
        notifier.on_change(&resolver.root().join("index.html"));
    }
}
