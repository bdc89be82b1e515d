//! Cooperative cancellation for reconciliation passes.
//!
//! A [`CancelHandle`] flips a `watch` channel; every [`CancelSignal`] cloned
//! from it observes the change at its next check. Checks happen before each
//! request, so an in-flight request finishes but nothing after it starts.

use tokio::sync::watch;

use crate::errors::Error;

/// Owner side: cancels every signal derived from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observer side, threaded through every suspension point.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelSignal { rx: Some(rx) })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

impl CancelSignal {
    /// A signal that is never cancelled.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Returns [`Error::Cancelled`] once the owning handle has cancelled.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_observe_cancellation() {
        let (handle, signal) = CancelHandle::new();
        let late = handle.signal();
        assert!(signal.check().is_ok());

        handle.cancel();
        assert!(matches!(signal.check(), Err(Error::Cancelled)));
        assert!(late.is_cancelled());
        assert!(!CancelSignal::never().is_cancelled());
    }
}
