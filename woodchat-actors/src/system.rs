//! Shutdown signalling and task tracking for the actor set.
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::{sync::broadcast, task::JoinSet};
use tracing::{debug, warn};

/// Cloneable stop signal shared by actor loops, feeders and the HTTP server.
///
/// The signal fires at most once. [`ShutdownHandle::wait`] also resolves for
/// callers that start waiting after it fired.
#[derive(Clone)]
pub struct ShutdownHandle {
    fired: Arc<AtomicBool>,
    tx: broadcast::Sender<()>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    pub fn signal(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(());
        }
    }

    pub fn is_signalled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        // Subscribe before checking the flag so a concurrent signal is not lost.
        let mut rx = self.tx.subscribe();
        if self.is_signalled() {
            return;
        }
        let _ = rx.recv().await;
    }
}

/// Named tasks started under one [`ShutdownHandle`].
pub struct ActorSystem {
    tasks: JoinSet<(String, Result<()>)>,
    shutdown: ShutdownHandle,
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorSystem {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            shutdown: ShutdownHandle::new(),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn track(
        &mut self,
        name: impl Into<String>,
        fut: impl Future<Output = Result<()>> + Send + 'static,
    ) {
        let name = name.into();
        self.tasks.spawn(async move { (name, fut.await) });
    }

    pub fn tracked(&self) -> usize {
        self.tasks.len()
    }

    /// Fire the shutdown signal and join every tracked task.
    ///
    /// All tasks are joined even after one fails; the first failure is returned.
    pub async fn graceful_shutdown(mut self) -> Result<()> {
        self.shutdown.signal();
        let mut first_err = None;
        while let Some(joined) = self.tasks.join_next().await {
            let err = match joined {
                Ok((name, Ok(()))) => {
                    debug!(task = %name, "system.task_done");
                    continue;
                }
                Ok((name, Err(e))) => {
                    warn!(task = %name, error = %e, "system.task_failed");
                    e
                }
                Err(e) => {
                    warn!(error = %e, "system.task_panicked");
                    anyhow::Error::new(e)
                }
            };
            first_err.get_or_insert(err);
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_reaches_tracked_tasks() {
        let mut sys = ActorSystem::new();
        let handle = sys.shutdown_handle();
        sys.track("waiter", async move {
            handle.wait().await;
            Ok(())
        });
        assert_eq!(sys.tracked(), 1);
        sys.graceful_shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn late_waiters_see_an_earlier_signal() {
        let handle = ShutdownHandle::new();
        handle.signal();
        handle.signal();
        assert!(handle.is_signalled());
        tokio::time::timeout(std::time::Duration::from_secs(1), handle.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn every_task_is_joined_and_the_first_error_wins() {
        let mut sys = ActorSystem::new();
        let handle = sys.shutdown_handle();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        sys.track("store", async { anyhow::bail!("store gone") });
        sys.track("faq", async move {
            handle.wait().await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        let err = sys.graceful_shutdown().await.unwrap_err();
        assert_eq!(err.to_string(), "store gone");
        assert!(finished.load(Ordering::SeqCst));
    }
}
