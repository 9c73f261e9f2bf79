//! Graceful shutdown coordination.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Coordinates stopping the accept loop and open connections.
///
/// Clones share state. Listeners obtained through [`subscribe`] observe a
/// shutdown requested before they subscribed as well.
///
/// [`subscribe`]: ShutdownCoordinator::subscribe
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	timeout: Duration,
	shutdown_tx: Arc<watch::Sender<bool>>,
	complete_tx: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
	/// Creates a coordinator that waits at most `timeout` for the server to
	/// report completion.
	pub fn new(timeout: Duration) -> Self {
		let (shutdown_tx, _) = watch::channel(false);
		let (complete_tx, _) = watch::channel(false);
		Self {
			timeout,
			shutdown_tx: Arc::new(shutdown_tx),
			complete_tx: Arc::new(complete_tx),
		}
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Returns a receiver whose value turns `true` once shutdown is requested.
	pub fn subscribe(&self) -> watch::Receiver<bool> {
		self.shutdown_tx.subscribe()
	}

	/// Requests shutdown.
	pub fn shutdown(&self) {
		self.shutdown_tx.send_replace(true);
	}

	pub fn is_shutting_down(&self) -> bool {
		*self.shutdown_tx.borrow()
	}

	/// Called by the server once it has stopped accepting connections and
	/// every open connection has finished.
	pub fn notify_shutdown_complete(&self) {
		self.complete_tx.send_replace(true);
	}

	pub fn is_shutdown_complete(&self) -> bool {
		*self.complete_tx.borrow()
	}

	/// Waits for [`notify_shutdown_complete`](Self::notify_shutdown_complete),
	/// bounded by the timeout. Returns `false` if the timeout elapsed first.
	pub async fn wait_for_shutdown(&self) -> bool {
		let mut complete = self.complete_tx.subscribe();
		match tokio::time::timeout(self.timeout, complete.wait_for(|done| *done)).await {
			Ok(_) => true,
			Err(_) => {
				tracing::warn!(timeout = ?self.timeout, "server did not stop in time");
				false
			}
		}
	}
}

/// Resolves when the process receives ctrl-c (or SIGTERM on unix).
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %err, "failed to install ctrl-c handler");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {}
		_ = terminate => {}
	}
	tracing::info!("shutdown signal received");
}
