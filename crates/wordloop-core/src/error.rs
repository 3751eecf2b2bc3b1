//! Error types.
//!
//! `StoreError` is defined here rather than in `wordloop-store` so the quiz
//! service can downcast collaborator errors and recover from a lost
//! get-or-create race without string matching.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{QuizId, WordId};

/// Failures reported by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A quiz for this (user, date) already exists.
    #[error("quiz already exists for user '{user_id}' on {for_date}")]
    DuplicateQuiz { user_id: String, for_date: NaiveDate },

    /// The backing store could not be reached or is in an unusable state.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Returns `true` if this error signals a uniqueness violation that the
    /// caller should resolve by re-reading.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::DuplicateQuiz { .. })
    }
}

/// Errors surfaced by the quiz service to its callers.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Caller input was rejected before touching the store.
    #[error("invalid input: {0}")]
    Validation(String),

    /// No quiz with this id belongs to the user.
    #[error("quiz {quiz_id} not found")]
    QuizNotFound { quiz_id: QuizId },

    /// The user has no review row for this word.
    #[error("review for word {word_id} not found")]
    ReviewNotFound { word_id: WordId },

    /// The quiz has already been graded.
    #[error("quiz {quiz_id} already submitted")]
    AlreadySubmitted { quiz_id: QuizId },

    /// The store failed; propagated without retry.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl QuizError {
    /// Returns `true` for errors caused by the caller rather than the store.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, QuizError::Store(_))
    }
}
