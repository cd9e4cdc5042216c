//! Serving the receiver in the background of a discovery run.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::routes::router;
use crate::state::ReceiverState;

/// Handle to a receiver running on a background task.
///
/// Dropping the handle without calling [`ReceiverHandle::shutdown`] leaves the
/// server running until the runtime stops.
#[derive(Debug)]
pub struct ReceiverHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ReceiverHandle {
    /// Address the listener actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, drain in-flight requests and wait for exit.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .context("join notification receiver task")?
            .context("serve notification receiver")?;
        debug!(addr = %self.local_addr, "notification receiver stopped");
        Ok(())
    }
}

/// Bind `addr` and serve the receiver on a spawned task.
pub async fn spawn(addr: SocketAddr, state: ReceiverState) -> Result<ReceiverHandle> {
    let listener = bind(addr).await?;
    let local_addr = listener
        .local_addr()
        .context("read notification receiver address")?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let secret_required = state.requires_secret();

    let app = router(state);
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    info!(addr = %local_addr, secret_required, "notification receiver listening");
    Ok(ReceiverHandle {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Serve the receiver on the current task until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, state: ReceiverState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        secret_required = state.requires_secret(),
        "notification receiver listening"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve notification receiver")
}

async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind notification receiver on {addr}"))
}
