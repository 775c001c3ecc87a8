//! One-time readiness gate for the import-rewriting engine.

use tokio::sync::OnceCell;

use super::RewriteError;

/// Memoized initialization shared by every caller.
///
/// The first caller runs the init closure; concurrent callers wait on the
/// same cell and resume together once it completes. A failed init leaves the
/// gate closed so the next caller retries.
#[derive(Debug, Default)]
pub struct ReadyGate {
    cell: OnceCell<()>,
}

impl ReadyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the gate is open, running `init` if nobody has yet.
    pub async fn wait<F>(&self, init: F) -> Result<(), RewriteError>
    where
        F: FnOnce() -> Result<(), RewriteError>,
    {
        self.cell.get_or_try_init(|| async move { init() }).await?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_init_runs_once() {
        let gate = ReadyGate::new();
        let runs = AtomicUsize::new(0);

        for _ in 0..3 {
            gate.wait(|| {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
        }

        assert!(gate.is_ready());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_waiters_share_init() {
        let gate = Arc::new(ReadyGate::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let runs = Arc::clone(&runs);
                tokio::spawn(async move {
                    gate.wait(|| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_init_is_retried() {
        let gate = ReadyGate::new();

        let err = gate
            .wait(|| Err(RewriteError::Init("lexer unavailable".into())))
            .await;
        assert!(err.is_err());
        assert!(!gate.is_ready());

        gate.wait(|| Ok(())).await.unwrap();
        assert!(gate.is_ready());
    }
}
