//! Cooperative stop signal for the monitor loop, plus the process signal
//! hook that trips it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One-shot stop flag. Once requested it stays requested.
#[derive(Debug, Default)]
pub struct StopSignal {
    requested: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake anyone in [`StopSignal::wait`]. Returns true
    /// only for the call that actually flipped the flag.
    pub fn request(&self) -> bool {
        let first = !self.requested.swap(true, Ordering::AcqRel);
        if first {
            self.notify.notify_waiters();
        }
        first
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolves once a stop has been requested, immediately if it already was.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent request() can't slip between.
            notified.as_mut().enable();
            if self.is_requested() {
                return;
            }
            notified.await;
        }
    }
}

/// Request `stop` when the process receives SIGINT or SIGTERM. On unix the
/// signal streams are registered before this returns, so a signal arriving
/// right after the call is not lost.
pub fn install_shutdown_handler(stop: Arc<StopSignal>) -> JoinHandle<()> {
    let shutdown = shutdown_signal();
    tokio::spawn(async move {
        shutdown.await;
        stop.request();
    })
}

#[cfg(unix)]
fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate())
        .map_err(|e| warn!("failed to install SIGTERM handler: {e}"))
        .ok();
    let sigint = signal(SignalKind::interrupt())
        .map_err(|e| warn!("failed to install SIGINT handler: {e}"))
        .ok();
    async move {
        tokio::select! {
            _ = recv_or_pending(sigterm) => info!("received SIGTERM, stopping job count monitor"),
            _ = recv_or_pending(sigint) => info!("received SIGINT, stopping job count monitor"),
        }
    }
}

/// Without a handler there is nothing to wait for; never resolve.
#[cfg(unix)]
async fn recv_or_pending(stream: Option<tokio::signal::unix::Signal>) {
    match stream {
        Some(mut s) => {
            s.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(not(unix))]
fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c, stopping job count monitor"),
            Err(e) => {
                warn!("failed to install ctrl-c handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
}
