//! Shared error types for the services crate.

use thiserror::Error;

use idiom_core::scheduler::SchedulerError;
use idiom_core::session::SessionError;
use storage::DatasetError;

/// Errors emitted by `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl StudyError {
    /// True when the error only means "there is no card to act on".
    #[must_use]
    pub fn is_empty_deck(&self) -> bool {
        matches!(self, StudyError::Session(SessionError::EmptyDeck))
    }
}
