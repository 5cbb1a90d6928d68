//! Pending selection state

use crate::chooser::ChooserOutcome;
use core_types::RequestCode;
use std::mem;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Error type for directory selection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("A directory selection is already in progress")]
    InFlight,
}

enum SessionState {
    Idle,
    Awaiting {
        code: RequestCode,
        reply: oneshot::Sender<ChooserOutcome>,
    },
}

/// Holds at most one pending result continuation
pub struct SelectionSession {
    state: Mutex<SessionState>,
    next_code: AtomicU32,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
            next_code: AtomicU32::new(RequestCode::FIRST.value()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves to `AwaitingUserChoice` under a fresh request code
    pub fn begin(
        &self,
    ) -> Result<(RequestCode, oneshot::Receiver<ChooserOutcome>), SelectionError> {
        let mut state = self.lock();
        if matches!(*state, SessionState::Awaiting { .. }) {
            return Err(SelectionError::InFlight);
        }

        let code = RequestCode::new(self.next_code.fetch_add(1, Ordering::SeqCst));
        let (reply, receiver) = oneshot::channel();
        *state = SessionState::Awaiting { code, reply };
        Ok((code, receiver))
    }

    /// Completes the pending request tagged `code`
    ///
    /// Returns false, and changes nothing, when no request with that code
    /// is pending.
    pub fn deliver(&self, code: RequestCode, outcome: ChooserOutcome) -> bool {
        let mut state = self.lock();
        match &*state {
            SessionState::Awaiting { code: pending, .. } if *pending == code => {}
            _ => return false,
        }
        if let SessionState::Awaiting { reply, .. } = mem::replace(&mut *state, SessionState::Idle)
        {
            // The waiting side may already be gone; the slot is cleared either way.
            let _ = reply.send(outcome);
        }
        true
    }

    /// Clears the pending request tagged `code` without delivering anything
    pub fn abandon(&self, code: RequestCode) {
        let mut state = self.lock();
        if matches!(&*state, SessionState::Awaiting { code: pending, .. } if *pending == code) {
            *state = SessionState::Idle;
        }
    }

    /// Request code of the pending selection, if any
    pub fn pending_code(&self) -> Option<RequestCode> {
        match &*self.lock() {
            SessionState::Awaiting { code, .. } => Some(*code),
            SessionState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_code().is_some()
    }
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new()
    }
}
