//! Collaborator traits implemented by the store backends.
//!
//! The quiz pipeline only talks to persistence through these async traits; the
//! `wordloop-store` crate provides in-memory and SQLite implementations.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{GradeSignal, NewLookup, NewQuiz, Quiz, QuizId, Review, Word, WordId, WordRecord};
use crate::report::DueWord;
use crate::updater::ReviewUpdater;

// ---------------------------------------------------------------------------
// Quiz builder inputs
// ---------------------------------------------------------------------------

/// Read side consumed by the quiz builder.
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Words whose review is due on or before `as_of`, in review insertion
    /// order, at most `limit`.
    async fn due_reviews(
        &self,
        user_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Vec<WordRecord>>;

    /// Distinct words the user looked up most recently, newest first, skipping
    /// `exclude`, at most `limit`.
    async fn recent_lookups(
        &self,
        user_id: &str,
        exclude: &HashSet<WordId>,
        limit: usize,
    ) -> anyhow::Result<Vec<WordRecord>>;
}

// ---------------------------------------------------------------------------
// Review rows
// ---------------------------------------------------------------------------

/// Review persistence consumed by the review updater.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn review(&self, user_id: &str, word_id: WordId) -> anyhow::Result<Option<Review>>;

    /// Insert or overwrite the review row for `(review.user_id, review.word_id)`.
    async fn upsert_review(&self, review: &Review) -> anyhow::Result<()>;

    /// Due reviews joined to their lemma, earliest due first.
    async fn due_list(
        &self,
        user_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Vec<DueWord>>;
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// Result of an atomic submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The quiz was marked done; carries the number of review rows written.
    Committed { reviews_updated: usize },
    /// The quiz was already done. Nothing was written.
    AlreadySubmitted,
    /// No quiz with this id belongs to the user. Nothing was written.
    NotFound,
}

/// Daily quiz persistence.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_quiz(&self, user_id: &str, for_date: NaiveDate) -> anyhow::Result<Option<Quiz>>;

    /// Persist a new quiz. Must fail with
    /// [`StoreError::DuplicateQuiz`](crate::error::StoreError::DuplicateQuiz)
    /// if one already exists for the same (user, date).
    async fn insert_quiz(&self, quiz: &NewQuiz) -> anyhow::Result<Quiz>;

    async fn load_quiz(&self, user_id: &str, quiz_id: QuizId) -> anyhow::Result<Option<Quiz>>;

    /// Mark the quiz done and apply every grade signal through `updater`, as
    /// one all-or-nothing unit. Signals for words without a review row are
    /// skipped.
    async fn commit_submission(
        &self,
        user_id: &str,
        quiz_id: QuizId,
        signals: &[GradeSignal],
        updater: &ReviewUpdater,
    ) -> anyhow::Result<CommitOutcome>;
}

// ---------------------------------------------------------------------------
// Words and lookups
// ---------------------------------------------------------------------------

/// Word and lookup persistence used by the lookup and search operations.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Record a lookup: upsert the word (filling missing enrichment), append
    /// the lookup row and, on the user's first lookup of the word, create its
    /// review row due on `lookup.first_due` with a one-day interval.
    async fn record_lookup(&self, lookup: &NewLookup) -> anyhow::Result<Word>;

    async fn word_by_lemma(&self, lemma: &str) -> anyhow::Result<Option<Word>>;

    /// Case-insensitive prefix or substring match on lemma, ordered by lemma.
    async fn search_words(&self, query: &str, take: usize) -> anyhow::Result<Vec<Word>>;
}

/// Everything the quiz service needs from one backend.
pub trait Store: WordSource + ReviewStore + QuizStore + WordStore {}

impl<T> Store for T where T: WordSource + ReviewStore + QuizStore + WordStore {}
