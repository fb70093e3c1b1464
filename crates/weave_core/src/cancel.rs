//! Request-scoped cancellation.
//!
//! Schema assembly is not cancellable; request-scoped work (filter
//! application, query resolution) polls a [`CancellationSignal`].

use tokio::sync::watch;

/// The owning side of a cancellation signal.
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSource {
    /// Creates a source that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Returns a signal observing this source.
    #[must_use]
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Cancels every signal created from this source.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once `cancel` has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// A cheap, cloneable view of a cancellation source.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancellationSignal {
    /// A signal that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Returns true if the source has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Waits until the source is cancelled.
    ///
    /// Never completes for [`CancellationSignal::never`] or when the source is
    /// dropped without cancelling.
    pub async fn cancelled(&mut self) {
        match self.rx.as_mut() {
            Some(rx) => {
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}
