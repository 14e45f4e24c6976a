//! Deadline and teardown plumbing shared by every probe

use crate::classify::ErrorCategory;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a bounded call did not complete
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("deadline exceeded")]
    Timeout,
    #[error("collector stopped")]
    Cancelled,
}

impl Interrupted {
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::Timeout => ErrorCategory::Timeout,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

/// Receiving side of a collector's teardown signal
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Linked trigger and signal; sending `true` cancels every clone
    pub fn pair() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self::new(rx))
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once teardown is signalled; pends forever if the trigger is gone
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Deadline plus teardown signal for one probe invocation
#[derive(Debug, Clone)]
pub struct ProbeContext {
    deadline: Instant,
    cancel: CancelSignal,
}

impl ProbeContext {
    pub fn new(timeout: Duration, cancel: CancelSignal) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            cancel,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// A child context whose deadline is at most `timeout` from now
    pub fn narrowed(&self, timeout: Duration) -> Self {
        Self {
            deadline: self.deadline.min(Instant::now() + timeout),
            cancel: self.cancel.clone(),
        }
    }

    /// Drive `fut` until it completes, the deadline passes or teardown fires
    pub async fn call<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            out = tokio::time::timeout_at(self.deadline, fut) => {
                out.map_err(|_| Interrupted::Timeout)
            }
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.call(tokio::time::sleep(duration)).await
    }
}
