use std::future::Future;

use tokio::{
    runtime::{Handle, Runtime},
    sync::broadcast,
    task::JoinHandle,
};
use tracing::debug;

/// Application-lifetime runtime context. Everything the dashboard polls runs
/// on this runtime; dropping the executor tears all of it down.
pub struct DashExecutor {
    runtime: Runtime,
    shutdown: broadcast::Sender<()>,
}

impl DashExecutor {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("checkpointz-dash")
            .enable_all()
            .build()?;
        Ok(Self::with_runtime(runtime))
    }

    /// Creates a new executor with an existing runtime
    pub fn with_runtime(runtime: Runtime) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self { runtime, shutdown }
    }

    /// Handle handed to components that spawn their own background work.
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    /// Spawns a task that resolves to `None` once shutdown is triggered.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let mut shutdown = self.shutdown.subscribe();
        self.runtime.spawn(async move {
            tokio::select! {
                result = future => Some(result),
                _ = shutdown.recv() => None,
            }
        })
    }

    /// Spawns a task that also stops on Ctrl-C. The task receives the shutdown
    /// receiver so it can clean up on its own terms.
    pub fn spawn_cancellable<F, Fut, T>(&self, future_fn: F) -> JoinHandle<Option<T>>
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send,
        T: Send + 'static,
    {
        let shutdown = self.shutdown.subscribe();
        self.runtime.spawn(async move {
            let future = future_fn(shutdown);
            tokio::select! {
                result = future => Some(result),
                _ = tokio::signal::ctrl_c() => {
                    debug!("Ctrl-C received, cancelling task");
                    None
                }
            }
        })
    }

    /// Runs the foreground future to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Triggers a shutdown signal to all spawned tasks
    pub fn shutdown(&self) {
        debug!("Shutting down executor");
        let _ = self.shutdown.send(());
    }
}
