use tokio::task::JoinHandle;

use crate::domain::{FieldErrors, SubmissionOutcome};
use crate::error::FormResult;

/// What `submit` did with the current values
#[derive(Debug)]
pub enum SubmitResult {
    /// Local validation failed; the action was not invoked.
    Rejected(FieldErrors),
    /// The action is running out-of-band.
    Dispatched(SubmissionHandle),
}

impl SubmitResult {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, SubmitResult::Dispatched(_))
    }

    pub fn into_handle(self) -> Option<SubmissionHandle> {
        match self {
            SubmitResult::Dispatched(handle) => Some(handle),
            SubmitResult::Rejected(_) => None,
        }
    }
}

/// How a resolved submission affected the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome was the latest issued and is now reflected in the form.
    Applied(SubmissionOutcome),
    /// A later submission (or a reset) was issued first; the outcome was dropped.
    Superseded { seq: u64, latest: u64 },
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied(_))
    }
}

/// Handle to an in-flight submission. Dropping it does not cancel the action.
#[derive(Debug)]
pub struct SubmissionHandle {
    seq: u64,
    task: JoinHandle<Resolution>,
}

impl SubmissionHandle {
    pub(crate) fn new(seq: u64, task: JoinHandle<Resolution>) -> Self {
        Self { seq, task }
    }

    /// Sequence number assigned when the submission was issued
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the action to resolve and its outcome to be reconciled.
    pub async fn resolved(self) -> FormResult<Resolution> {
        Ok(self.task.await?)
    }
}
