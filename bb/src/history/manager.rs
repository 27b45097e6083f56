//! HistoryManager - actor that owns the HistoryStore
//!
//! Processes commands via channels for serialized access to the build window.

use stepstore::{Build, HistoryStore, ReferenceRequest, ResolvedReference, resolve};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::messages::{HistoryCommand, HistoryManagerError, HistoryResponse, HistoryStats};

/// Handle to send commands to the HistoryManager
#[derive(Clone)]
pub struct HistoryManager {
    tx: mpsc::Sender<HistoryCommand>,
}

impl HistoryManager {
    /// Spawn a new HistoryManager actor holding at most `capacity` builds
    pub fn spawn(capacity: usize) -> Self {
        debug!(%capacity, "spawn: called");
        let store = HistoryStore::new(capacity);
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(actor_loop(store, rx));

        info!(capacity, "HistoryManager spawned");
        Self { tx }
    }

    /// Record a new build as the most recent; returns the number of builds held
    pub async fn push(&self, build: Build) -> HistoryResponse<usize> {
        debug!(steps = build.len(), "push: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HistoryCommand::Push { build, reply: reply_tx })
            .await
            .map_err(|_| HistoryManagerError::ChannelError)?;
        reply_rx.await.map_err(|_| HistoryManagerError::ChannelError)?
    }

    /// Fetch the build `offset` pushes ago (1 = most recent)
    pub async fn get(&self, offset: usize) -> HistoryResponse<Build> {
        debug!(%offset, "get: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HistoryCommand::Get { offset, reply: reply_tx })
            .await
            .map_err(|_| HistoryManagerError::ChannelError)?;
        reply_rx.await.map_err(|_| HistoryManagerError::ChannelError)?
    }

    /// Validate a parsed reference against the current window
    pub async fn resolve(&self, request: ReferenceRequest) -> HistoryResponse<ResolvedReference> {
        debug!(?request, "resolve: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HistoryCommand::Resolve {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| HistoryManagerError::ChannelError)?;
        reply_rx.await.map_err(|_| HistoryManagerError::ChannelError)?
    }

    pub async fn stats(&self) -> HistoryResponse<HistoryStats> {
        debug!("stats: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HistoryCommand::Stats { reply: reply_tx })
            .await
            .map_err(|_| HistoryManagerError::ChannelError)?;
        reply_rx.await.map_err(|_| HistoryManagerError::ChannelError)?
    }

    /// Stop the actor; later calls fail with `ChannelError`
    pub async fn shutdown(&self) -> Result<(), HistoryManagerError> {
        debug!("shutdown: called");
        self.tx
            .send(HistoryCommand::Shutdown)
            .await
            .map_err(|_| HistoryManagerError::ChannelError)
    }
}

async fn actor_loop(mut store: HistoryStore, mut rx: mpsc::Receiver<HistoryCommand>) {
    debug!("actor_loop: called");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            HistoryCommand::Push { build, reply } => {
                debug!(steps = build.len(), "actor_loop: Push command");
                store.push(build);
                let _ = reply.send(Ok(store.len()));
            }

            HistoryCommand::Get { offset, reply } => {
                debug!(%offset, "actor_loop: Get command");
                let result = store.get(offset).cloned().map_err(HistoryManagerError::from);
                let _ = reply.send(result);
            }

            HistoryCommand::Resolve { request, reply } => {
                debug!(?request, "actor_loop: Resolve command");
                let result = resolve(&request, &store).map_err(HistoryManagerError::from);
                let _ = reply.send(result);
            }

            HistoryCommand::Stats { reply } => {
                debug!("actor_loop: Stats command");
                let stats = HistoryStats {
                    capacity: store.capacity(),
                    stored: store.len(),
                    pushes: store.pushes(),
                    most_recent_steps: store.most_recent_step_count(),
                };
                let _ = reply.send(Ok(stats));
            }

            HistoryCommand::Shutdown => {
                info!("HistoryManager shutting down");
                break;
            }
        }
    }

    debug!("actor_loop: exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepstore::{HistoryError, Reference, parse, segment};

    fn build_of(text: &str) -> Build {
        Build::from_segmentation(&segment(text))
    }

    #[tokio::test]
    async fn test_push_and_get() {
        let manager = HistoryManager::spawn(2);

        assert_eq!(manager.push(build_of("#### Step 1: Cut")).await.unwrap(), 1);
        assert_eq!(manager.push(build_of("#### Step 1: Sand\n#### Step 2: Oil")).await.unwrap(), 2);

        let latest = manager.get(1).await.unwrap();
        assert_eq!(latest.len(), 2);
        let older = manager.get(2).await.unwrap();
        assert_eq!(older.steps[0].text, "#### Step 1: Cut");

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_outside_window() {
        let manager = HistoryManager::spawn(2);
        manager.push(build_of("#### Step 1: Cut")).await.unwrap();

        let err = manager.get(3).await.unwrap_err();
        assert!(matches!(
            err,
            HistoryManagerError::Lookup(HistoryError::OutOfWindow { offset: 3, capacity: 2 })
        ));

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_inside_actor() {
        let manager = HistoryManager::spawn(2);
        manager
            .push(build_of("#### Step 1: Cut\n#### Step 2: Sand\n#### Step 3: Oil"))
            .await
            .unwrap();

        let request = parse("explain step 2 from the previous build").unwrap();
        let resolved = manager.resolve(request).await.unwrap();
        assert_eq!(
            resolved.reference,
            Reference {
                step_index: 2,
                build_offset: 1
            }
        );
        assert_eq!(resolved.target, "#### Step 2: Sand");

        let request = parse("explain step 9 from the previous build").unwrap();
        let err = manager.resolve(request).await.unwrap_err();
        assert!(matches!(
            err,
            HistoryManagerError::Lookup(HistoryError::StepOutOfRange { step: 9, len: 3 })
        ));

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stats() {
        let manager = HistoryManager::spawn(3);
        assert_eq!(manager.stats().await.unwrap().stored, 0);

        manager.push(build_of("#### Step 1: Cut\n#### Step 2: Sand")).await.unwrap();
        let stats = manager.stats().await.unwrap();
        assert_eq!(stats.capacity, 3);
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.pushes, 1);
        assert_eq!(stats.most_recent_steps, 2);

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_calls_after_shutdown_fail() {
        let manager = HistoryManager::spawn(2);
        manager.shutdown().await.unwrap();

        // Give the actor a chance to exit and drop its receiver
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let err = manager.stats().await.unwrap_err();
        assert!(matches!(err, HistoryManagerError::ChannelError));
    }

    #[tokio::test]
    async fn test_concurrent_pushes_are_serialized() {
        let manager = HistoryManager::spawn(2);

        let mut handles = Vec::new();
        for i in 1..=10 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.push(build_of(&format!("#### Step 1: Build {}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = manager.stats().await.unwrap();
        assert_eq!(stats.pushes, 10);
        assert_eq!(stats.stored, 2);

        manager.shutdown().await.unwrap();
    }
}
