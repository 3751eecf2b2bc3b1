//! Request-level orchestration.
//!
//! `QuizService` ties the builder, grader and updater to a store. Every call
//! is independent: the only shared mutable state is the store itself.

use std::sync::Arc;

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builder::{BuilderConfig, QuizBuilder};
use crate::error::{QuizError, StoreError};
use crate::grader::grade_quiz;
use crate::model::{
    Enrichment, NewLookup, NewQuiz, QuizId, SubmittedAnswer, Word, WordId, DEFAULT_QUIZ_SIZE,
    MAX_GRADE, MAX_QUIZ_SIZE,
};
use crate::report::{DueWord, QuizView, ScheduleUpdate, SubmissionReport};
use crate::scheduler::{next_review, Clock, SystemClock};
use crate::traits::{CommitOutcome, Store};
use crate::updater::ReviewUpdater;
use crate::wordlist::WordList;

/// Default length of the due-today list.
pub const DEFAULT_DUE_LIMIT: usize = 20;

/// Upper bound for word search results.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Configuration for the quiz service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Items per quiz when the caller does not ask for a size.
    pub default_count: usize,
    pub builder: BuilderConfig,
    /// Seed for option sampling; `None` draws from OS entropy per request.
    pub seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_QUIZ_SIZE,
            builder: BuilderConfig::default(),
            seed: None,
        }
    }
}

/// Lookup parameters accepted by [`QuizService::record_lookup`].
#[derive(Debug, Clone, Default)]
pub struct LookupRequest {
    pub text: String,
    pub source: Option<String>,
    pub sentence: Option<String>,
    pub enrichment: Enrichment,
}

/// Outcome of importing a word list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// The quiz service.
pub struct QuizService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

fn require_user(user_id: &str) -> Result<(), QuizError> {
    if user_id.trim().is_empty() {
        return Err(QuizError::Validation("userId is required".into()));
    }
    Ok(())
}

/// Trim and lowercase a looked-up term. `None` if nothing is left.
pub fn normalize_lemma(text: &str) -> Option<String> {
    let lemma = text.trim().to_lowercase();
    (!lemma.is_empty()).then_some(lemma)
}

fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StoreError>()
        .is_some_and(StoreError::is_conflict)
}

impl QuizService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Service on the wall clock.
    pub fn with_system_clock(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        Self::new(store, Arc::new(SystemClock), config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Return today's quiz for the user, building and storing it on the first
    /// request of the day.
    pub async fn today_quiz(
        &self,
        user_id: &str,
        count: Option<usize>,
    ) -> Result<QuizView, QuizError> {
        let mut rng = self.rng();
        self.today_quiz_with_rng(user_id, count, &mut rng).await
    }

    /// [`today_quiz`](Self::today_quiz) with a caller-supplied randomness
    /// source.
    pub async fn today_quiz_with_rng<R: Rng + Send>(
        &self,
        user_id: &str,
        count: Option<usize>,
        rng: &mut R,
    ) -> Result<QuizView, QuizError> {
        require_user(user_id)?;
        let count = count.unwrap_or(self.config.default_count);
        if !(1..=MAX_QUIZ_SIZE).contains(&count) {
            return Err(QuizError::Validation(format!(
                "count must be between 1 and {MAX_QUIZ_SIZE}"
            )));
        }

        let today = self.clock.today();
        if let Some(existing) = self.store.find_quiz(user_id, today).await? {
            return Ok(QuizView::from(&existing));
        }

        let items = QuizBuilder::new(self.store.as_ref(), self.config.builder.clone())
            .build(user_id, count, today, rng)
            .await?;

        let new_quiz = NewQuiz {
            user_id: user_id.to_string(),
            for_date: today,
            items,
        };

        match self.store.insert_quiz(&new_quiz).await {
            Ok(quiz) => {
                tracing::info!(
                    user_id,
                    quiz_id = quiz.id,
                    items = quiz.items.len(),
                    "created daily quiz"
                );
                Ok(QuizView::from(&quiz))
            }
            Err(e) if is_conflict(&e) => {
                tracing::debug!(user_id, %today, "daily quiz created concurrently, reloading");
                let winner = self
                    .store
                    .find_quiz(user_id, today)
                    .await?
                    .ok_or_else(|| anyhow!("quiz for {today} missing after insert conflict"))?;
                Ok(QuizView::from(&winner))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Grade a submission, mark the quiz done and reschedule every answered
    /// word that has a review row.
    pub async fn submit(
        &self,
        user_id: &str,
        quiz_id: QuizId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmissionReport, QuizError> {
        require_user(user_id)?;

        let quiz = self
            .store
            .load_quiz(user_id, quiz_id)
            .await?
            .ok_or(QuizError::QuizNotFound { quiz_id })?;
        if quiz.done {
            return Err(QuizError::AlreadySubmitted { quiz_id });
        }

        let grading = grade_quiz(&quiz, answers);
        let updater = ReviewUpdater::new(self.clock.today());

        match self
            .store
            .commit_submission(user_id, quiz_id, &grading.signals, &updater)
            .await?
        {
            CommitOutcome::Committed { reviews_updated } => {
                tracing::info!(
                    user_id,
                    quiz_id,
                    correct = grading.correct,
                    total = grading.total,
                    reviews_updated,
                    "quiz submitted"
                );
            }
            CommitOutcome::AlreadySubmitted => {
                return Err(QuizError::AlreadySubmitted { quiz_id });
            }
            CommitOutcome::NotFound => return Err(QuizError::QuizNotFound { quiz_id }),
        }

        Ok(SubmissionReport {
            quiz_id,
            total: grading.total,
            correct: grading.correct,
            score: grading.score,
            details: grading.details,
        })
    }

    /// Grade one word directly with the full 0..=5 range.
    pub async fn manual_grade(
        &self,
        user_id: &str,
        word_id: WordId,
        grade: i32,
    ) -> Result<ScheduleUpdate, QuizError> {
        require_user(user_id)?;
        let grade = u8::try_from(grade)
            .ok()
            .filter(|g| *g <= MAX_GRADE)
            .ok_or_else(|| {
                QuizError::Validation(format!("grade must be between 0 and {MAX_GRADE}"))
            })?;

        let review = self
            .store
            .review(user_id, word_id)
            .await?
            .ok_or(QuizError::ReviewNotFound { word_id })?;

        let updated = ReviewUpdater::new(self.clock.today()).apply(&review, grade);
        self.store.upsert_review(&updated).await?;

        tracing::info!(
            user_id,
            word_id,
            grade,
            next_interval_days = updated.next_interval_days,
            "manual grade applied"
        );
        Ok(ScheduleUpdate {
            due_date: updated.due_date,
            next_interval_days: updated.next_interval_days,
        })
    }

    /// Record a word lookup; the first lookup of a word by a user schedules
    /// its first review for tomorrow.
    pub async fn record_lookup(
        &self,
        user_id: &str,
        request: LookupRequest,
    ) -> Result<Word, QuizError> {
        require_user(user_id)?;
        let lemma = normalize_lemma(&request.text)
            .ok_or_else(|| QuizError::Validation("text is required".into()))?;

        let lookup = NewLookup {
            user_id: user_id.to_string(),
            lemma,
            source: request.source,
            sentence: request.sentence,
            enrichment: request.enrichment,
            looked_up_at: self.clock.now(),
            first_due: next_review(None, 0, self.clock.today()).due_date,
        };
        let word = self.store.record_lookup(&lookup).await?;
        tracing::debug!(user_id, word_id = word.id, lemma = %word.lemma, "lookup recorded");
        Ok(word)
    }

    /// Import every entry of a word list as a lookup. Entries with an empty
    /// lemma are skipped.
    pub async fn import_word_list(
        &self,
        user_id: &str,
        list: &WordList,
    ) -> Result<ImportSummary, QuizError> {
        require_user(user_id)?;
        let mut summary = ImportSummary::default();

        for entry in &list.entries {
            if normalize_lemma(&entry.lemma).is_none() {
                summary.skipped += 1;
                continue;
            }
            self.record_lookup(
                user_id,
                LookupRequest {
                    text: entry.lemma.clone(),
                    source: Some(list.source.clone()),
                    sentence: entry.sentence.clone(),
                    enrichment: entry.enrichment.clone(),
                },
            )
            .await?;
            summary.imported += 1;
        }

        tracing::info!(
            user_id,
            list = %list.id,
            imported = summary.imported,
            skipped = summary.skipped,
            "word list imported"
        );
        Ok(summary)
    }

    /// Words due today or earlier, earliest first.
    pub async fn due_today(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<DueWord>, QuizError> {
        require_user(user_id)?;
        let limit = limit.unwrap_or(DEFAULT_DUE_LIMIT);
        if limit < 1 {
            return Err(QuizError::Validation("limit must be at least 1".into()));
        }
        Ok(self
            .store
            .due_list(user_id, self.clock.today(), limit)
            .await?)
    }

    /// Search stored words by lemma.
    pub async fn search_words(&self, query: &str, take: usize) -> Result<Vec<Word>, QuizError> {
        let query = normalize_lemma(query)
            .ok_or_else(|| QuizError::Validation("query is required".into()))?;
        let take = take.clamp(1, MAX_SEARCH_RESULTS);
        Ok(self.store.search_words(&query, take).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_lemma("  Serene \n").as_deref(), Some("serene"));
        assert_eq!(normalize_lemma("   "), None);
    }

    #[test]
    fn conflict_detection_uses_downcast() {
        let conflict: anyhow::Error = StoreError::DuplicateQuiz {
            user_id: "u1".into(),
            for_date: chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        }
        .into();
        assert!(is_conflict(&conflict));
        assert!(!is_conflict(&anyhow!("quiz already exists")));
        assert!(!is_conflict(&StoreError::Unavailable("down".into()).into()));
    }

    #[test]
    fn default_config_builds_twelve_items() {
        let config = ServiceConfig::default();
        assert_eq!(config.default_count, 12);
        assert_eq!(config.builder.choice_options, 4);
        assert!(config.seed.is_none());
    }
}
