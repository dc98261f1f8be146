// Cancellation Token (scoped, one-way shutdown signal)
//
// Each logical operation owns its own channel; nothing here is global.

use std::sync::Arc;

use futures::future::select_all;
use tokio::sync::watch;

/// Observable state of a cancellation token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationState {
    Running,
    ShutdownRequested,
}

/// Read side of a cancellation scope
///
/// Cheap to clone; every clone observes the same one-way flag. A child token
/// additionally observes every ancestor scope.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    scopes: Arc<[watch::Receiver<bool>]>,
}

impl CancellationToken {
    /// A token that is never cancelled (for one-shot tools and tests)
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self {
            scopes: Arc::from(vec![rx]),
        }
    }

    /// Check if shutdown was requested in this scope or any parent
    pub fn is_cancelled(&self) -> bool {
        self.scopes.iter().any(|rx| *rx.borrow())
    }

    pub fn state(&self) -> CancellationState {
        if self.is_cancelled() {
            CancellationState::ShutdownRequested
        } else {
            CancellationState::Running
        }
    }

    /// Wait until shutdown is requested
    ///
    /// Never resolves for a scope whose source has been dropped uncancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let waits = self
            .scopes
            .iter()
            .cloned()
            .map(|rx| Box::pin(wait_for_cancel(rx)));
        select_all(waits).await;
    }

    /// Derive a nested scope that is cancelled by its own source or by this one
    pub fn child(&self) -> (CancellationSource, CancellationToken) {
        let (tx, rx) = watch::channel(false);
        let mut scopes: Vec<_> = self.scopes.iter().cloned().collect();
        scopes.push(rx);
        (
            CancellationSource { tx },
            CancellationToken {
                scopes: Arc::from(scopes),
            },
        )
    }
}

async fn wait_for_cancel(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        // Sender dropped without cancelling: this scope can no longer fire.
        std::future::pending::<()>().await;
    }
}

/// Write side of a cancellation scope
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    /// Request shutdown. Returns true only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Create a cancellation scope
pub fn cancellation_channel() -> (CancellationSource, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (
        CancellationSource { tx },
        CancellationToken {
            scopes: Arc::from(vec![rx]),
        },
    )
}
