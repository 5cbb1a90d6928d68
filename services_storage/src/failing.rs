//! # Failing Document Provider
//!
//! A DocumentProvider wrapper that can simulate failures for testing
//! all-or-nothing traversal and write paths.

use crate::documents::{DocumentProvider, DocumentRecord};
use core_types::{AccessError, AccessResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Policy for when failures should occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Fail child queries after N successful ones
    AfterChildQueries(usize),
    /// Fail every operation touching the listed document ids
    OnDocuments(Vec<String>),
    /// Fail every content read
    Reads,
    /// Fail every create, delete and content write
    Writes,
}

/// Wrapper around a DocumentProvider that can simulate failures
pub struct FailingDocumentProvider<P: DocumentProvider> {
    inner: P,
    policy: Mutex<FailurePolicy>,
    child_queries: AtomicUsize,
}

impl<P: DocumentProvider> FailingDocumentProvider<P> {
    /// Create a new failing provider with the given policy
    pub fn new(inner: P, policy: FailurePolicy) -> Self {
        Self {
            inner,
            policy: Mutex::new(policy),
            child_queries: AtomicUsize::new(0),
        }
    }

    /// Number of successful child queries so far
    pub fn child_query_count(&self) -> usize {
        self.child_queries.load(Ordering::SeqCst)
    }

    /// Reset the failure policy
    pub fn set_policy(&self, policy: FailurePolicy) {
        *self.policy.lock().unwrap_or_else(PoisonError::into_inner) = policy;
        self.child_queries.store(0, Ordering::SeqCst);
    }

    fn policy(&self) -> FailurePolicy {
        self.policy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_document(&self, document_id: &str) -> AccessResult<()> {
        match self.policy() {
            FailurePolicy::OnDocuments(ids) if ids.iter().any(|id| id == document_id) => {
                Err(injected(document_id))
            }
            _ => Ok(()),
        }
    }

    fn check_write(&self, document_id: &str) -> AccessResult<()> {
        self.check_document(document_id)?;
        if self.policy() == FailurePolicy::Writes {
            return Err(injected(document_id));
        }
        Ok(())
    }
}

fn injected(document_id: &str) -> AccessError {
    AccessError::io_failure(document_id, "injected failure")
}

impl<P: DocumentProvider> DocumentProvider for FailingDocumentProvider<P> {
    fn authority(&self) -> &str {
        self.inner.authority()
    }

    fn query(&self, document_id: &str) -> AccessResult<DocumentRecord> {
        self.check_document(document_id)?;
        self.inner.query(document_id)
    }

    fn query_children(&self, document_id: &str) -> AccessResult<Vec<DocumentRecord>> {
        self.check_document(document_id)?;
        if let FailurePolicy::AfterChildQueries(n) = self.policy() {
            if self.child_query_count() >= n {
                return Err(injected(document_id));
            }
        }
        let children = self.inner.query_children(document_id)?;
        self.child_queries.fetch_add(1, Ordering::SeqCst);
        Ok(children)
    }

    fn create_document(
        &self,
        parent_id: &str,
        mime_type: &str,
        display_name: &str,
    ) -> AccessResult<DocumentRecord> {
        self.check_write(parent_id)?;
        self.inner.create_document(parent_id, mime_type, display_name)
    }

    fn delete_document(&self, document_id: &str) -> AccessResult<()> {
        self.check_write(document_id)?;
        self.inner.delete_document(document_id)
    }

    fn read_document(&self, document_id: &str) -> AccessResult<Vec<u8>> {
        self.check_document(document_id)?;
        if self.policy() == FailurePolicy::Reads {
            return Err(injected(document_id));
        }
        self.inner.read_document(document_id)
    }

    fn write_document(&self, document_id: &str, bytes: &[u8]) -> AccessResult<()> {
        self.check_write(document_id)?;
        self.inner.write_document(document_id, bytes)
    }

    fn is_writable(&self, document_id: &str) -> AccessResult<bool> {
        self.check_document(document_id)?;
        self.inner.is_writable(document_id)
    }
}
