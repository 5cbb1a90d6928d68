//! Native chooser seam
//!
//! A chooser is handed a [`SelectionRequest`] and completes it with the
//! user's decision, either before `present` returns (modal) or later from
//! any thread (activity-result style).

use crate::session::SelectionSession;
use core_types::RequestCode;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// What the user decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChooserOutcome {
    /// A location, as the native chooser reports it
    Chosen(String),
    /// The chooser was dismissed
    Cancelled,
}

/// Error type for presenting a chooser
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChooserError {
    #[error("No active window to present the chooser")]
    NoActiveWindow,

    #[error("Chooser failed: {0}")]
    Failed(String),
}

/// Token that completes one pending selection
///
/// Dropping an uncompleted request counts as cancellation, so the waiting
/// side is never left blocked.
pub struct SelectionRequest {
    code: RequestCode,
    session: Arc<SelectionSession>,
    completed: bool,
}

impl SelectionRequest {
    pub(crate) fn new(code: RequestCode, session: Arc<SelectionSession>) -> Self {
        Self {
            code,
            session,
            completed: false,
        }
    }

    pub fn code(&self) -> RequestCode {
        self.code
    }

    /// Delivers the outcome; false if the selection is no longer pending
    pub fn complete(mut self, outcome: ChooserOutcome) -> bool {
        self.completed = true;
        self.session.deliver(self.code, outcome)
    }
}

impl Drop for SelectionRequest {
    fn drop(&mut self) {
        if !self.completed {
            self.session.deliver(self.code, ChooserOutcome::Cancelled);
        }
    }
}

/// Presents the native "choose a directory" UI
pub trait DirectoryChooser: Send + Sync {
    fn present(&self, request: SelectionRequest) -> Result<(), ChooserError>;
}

/// Modal chooser answering from a prepared script
///
/// Each presentation consumes the next scripted answer; an exhausted script
/// cancels.
#[derive(Default)]
pub struct ScriptedChooser {
    script: Mutex<VecDeque<Result<ChooserOutcome, ChooserError>>>,
}

impl ScriptedChooser {
    pub fn new(outcomes: impl IntoIterator<Item = ChooserOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().map(Ok).collect()),
        }
    }

    /// Queues an outcome
    pub fn push(&self, outcome: ChooserOutcome) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(outcome));
    }

    /// Queues a presentation failure
    pub fn push_failure(&self, error: ChooserError) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl DirectoryChooser for ScriptedChooser {
    fn present(&self, request: SelectionRequest) -> Result<(), ChooserError> {
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(outcome)) => {
                request.complete(outcome);
                Ok(())
            }
            Some(Err(error)) => Err(error),
            None => {
                request.complete(ChooserOutcome::Cancelled);
                Ok(())
            }
        }
    }
}

/// Chooser whose result arrives later, possibly from another thread
#[derive(Default)]
pub struct DeferredChooser {
    pending: Mutex<Option<SelectionRequest>>,
    presented: Condvar,
}

impl DeferredChooser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the presented request, if any
    pub fn take_request(&self) -> Option<SelectionRequest> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Waits up to `timeout` for a request to be presented
    pub fn wait_request(&self, timeout: Duration) -> Option<SelectionRequest> {
        let guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut guard, _) = self
            .presented
            .wait_timeout_while(guard, timeout, |pending| pending.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        guard.take()
    }
}

impl DirectoryChooser for DeferredChooser {
    fn present(&self, request: SelectionRequest) -> Result<(), ChooserError> {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(request);
        self.presented.notify_all();
        Ok(())
    }
}
