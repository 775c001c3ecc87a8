//! FileSystem watcher feeding the reload notifier.
//!
//! ```text
//! notify (sync callback) → std channel → bridge thread → tokio channel → WatchActor → ReloadNotifier
//! ```
//!
//! Every qualifying event is forwarded as is; there is no debouncing, so an
//! editor that writes a file twice produces two reloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{CreateKind, ModifyKind};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::notifier::ReloadNotifier;

/// Directories whose contents never trigger a reload.
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", "target"];

/// Watches the project root and reports changed files.
pub struct WatchActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    notifier: Arc<ReloadNotifier>,
}

impl WatchActor {
    /// Start watching `root` immediately; events buffer until [`run`](Self::run).
    pub fn new(root: &Path, notifier: Arc<ReloadNotifier>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            notify_rx,
            watcher,
            notifier,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        // Keep the watcher alive for the lifetime of the loop
        let _watcher = self.watcher;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        while let Some(event) = async_rx.recv().await {
            for path in changed_files(&event) {
                self.notifier.on_change(&path);
            }
        }
    }
}

/// Files in `event` that count as changed content.
fn changed_files(event: &notify::Event) -> Vec<PathBuf> {
    let relevant = match event.kind {
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        // Atomic saves replace the file instead of writing into it
        EventKind::Create(CreateKind::File | CreateKind::Any) => true,
        _ => false,
    };
    if !relevant {
        return Vec::new();
    }

    let mut paths: Vec<PathBuf> = Vec::with_capacity(event.paths.len());
    for path in &event.paths {
        if is_ignored(path) || paths.contains(path) {
            continue;
        }
        paths.push(path.clone());
    }
    paths
}

fn is_ignored(path: &Path) -> bool {
    if path
        .components()
        .any(|c| IGNORED_DIRS.iter().any(|dir| c.as_os_str() == *dir))
    {
        return true;
    }
    // Editor swap and backup files
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(".#") || name.ends_with('~') || name.ends_with(".swp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{DataChange, MetadataKind, RemoveKind};

    fn make_event(paths: Vec<&str>, kind: EventKind) -> notify::Event {
        notify::Event {
            kind,
            paths: paths.into_iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    fn modify_kind() -> EventKind {
        EventKind::Modify(ModifyKind::Data(DataChange::Any))
    }

    #[test]
    fn test_modify_is_forwarded() {
        let event = make_event(vec!["/app/index.html"], modify_kind());
        assert_eq!(changed_files(&event), [PathBuf::from("/app/index.html")]);
    }

    #[test]
    fn test_create_file_is_forwarded() {
        let event = make_event(vec!["/app/index.html"], EventKind::Create(CreateKind::File));
        assert_eq!(changed_files(&event).len(), 1);
    }

    #[test]
    fn test_remove_and_metadata_are_dropped() {
        let removed = make_event(vec!["/app/index.html"], EventKind::Remove(RemoveKind::File));
        let touched = make_event(
            vec!["/app/index.html"],
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
        );
        assert!(changed_files(&removed).is_empty());
        assert!(changed_files(&touched).is_empty());
    }

    #[test]
    fn test_ignored_paths() {
        let event = make_event(
            vec![
                "/app/node_modules/vue/index.html",
                "/app/.git/index",
                "/app/.index.html.swp",
                "/app/index.html~",
                "/app/about.html",
            ],
            modify_kind(),
        );
        assert_eq!(changed_files(&event), [PathBuf::from("/app/about.html")]);
    }

    #[test]
    fn test_duplicate_paths_in_one_event() {
        let event = make_event(vec!["/app/a.html", "/app/a.html"], modify_kind());
        assert_eq!(changed_files(&event).len(), 1);
    }
}
