//! One-shot completion handed to every extension invocation.
//!
//! A [`Completion`] mirrors the `(error, ...results)` callback convention.
//! Handles are cheap to clone so a user function can complete from a spawned
//! task; only the first call across all clones is observed.

use std::sync::Arc;

use extensibility::{ExtensibilityError, UserError};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::warn;

/// What an invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Positional results, or the encoder message if a result could not be
    /// encoded as JSON.
    Success(Result<Vec<Value>, String>),
    Failure(ExtensibilityError),
}

/// Settles an invocation exactly once.
#[derive(Debug, Clone)]
pub struct Completion {
    latch: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

/// Receiving side of a [`Completion`].
#[derive(Debug)]
pub struct PendingOutcome {
    receiver: oneshot::Receiver<Outcome>,
}

/// Creates a completion together with the future side that observes it.
pub fn completion() -> (Completion, PendingOutcome) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion {
            latch: Arc::new(Mutex::new(Some(sender))),
        },
        PendingOutcome { receiver },
    )
}

impl Completion {
    /// Delivers `outcome` if nothing was delivered yet.
    ///
    /// Returns `false` when the completion had already been settled; the
    /// outcome is then discarded.
    pub fn settle(&self, outcome: Outcome) -> bool {
        let Some(sender) = self.latch.lock().take() else {
            warn!("Completion invoked more than once; ignoring");
            return false;
        };
        // The waiting side may be gone already; the invocation is still settled.
        let _ = sender.send(outcome);
        true
    }

    pub fn fail(&self, error: impl Into<ExtensibilityError>) -> bool {
        self.settle(Outcome::Failure(error.into()))
    }

    /// Fails with an author-raised error.
    pub fn error(&self, error: impl Into<UserError>) -> bool {
        self.fail(ExtensibilityError::User(error.into()))
    }

    /// Succeeds with a single result.
    pub fn succeed<T: Serialize + ?Sized>(&self, result: &T) -> bool {
        let encoded = serde_json::to_value(result)
            .map(|value| vec![value])
            .map_err(|e| e.to_string());
        self.settle(Outcome::Success(encoded))
    }

    /// Succeeds with several positional results.
    pub fn succeed_with(&self, results: Vec<Value>) -> bool {
        self.settle(Outcome::Success(Ok(results)))
    }

    /// Succeeds without a result.
    pub fn done(&self) -> bool {
        self.succeed_with(Vec::new())
    }

    /// Node-style `(error, ...results)` entry point.
    pub fn callback(&self, error: Option<UserError>, results: Vec<Value>) -> bool {
        match error {
            Some(error) => self.error(error),
            None => self.succeed_with(results),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.latch.lock().is_none()
    }
}

impl PendingOutcome {
    /// Waits for the first outcome.
    ///
    /// Resolves to [`ExtensibilityError::Incomplete`] if every handle was
    /// dropped without settling.
    pub async fn wait(self) -> Outcome {
        self.receiver
            .await
            .unwrap_or(Outcome::Failure(ExtensibilityError::Incomplete))
    }
}
