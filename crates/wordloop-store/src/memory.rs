//! In-process store for tests and throwaway sessions.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use wordloop_core::error::StoreError;
use wordloop_core::model::{
    GradeSignal, NewLookup, NewQuiz, Quiz, QuizId, Review, Word, WordId, WordRecord,
};
use wordloop_core::report::DueWord;
use wordloop_core::traits::{
    CommitOutcome, QuizStore, ReviewStore, WordSource, WordStore,
};
use wordloop_core::updater::ReviewUpdater;

#[derive(Debug, Clone)]
struct LookupRow {
    user_id: String,
    word_id: WordId,
    looked_up_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// `id == index + 1`.
    words: Vec<Word>,
    lookups: Vec<LookupRow>,
    /// Insertion order doubles as review id order.
    reviews: Vec<Review>,
    /// `id == index + 1`.
    quizzes: Vec<Quiz>,
}

impl MemoryState {
    fn word(&self, id: WordId) -> Option<&Word> {
        usize::try_from(id - 1).ok().and_then(|i| self.words.get(i))
    }

    fn review_mut(&mut self, user_id: &str, word_id: WordId) -> Option<&mut Review> {
        self.reviews
            .iter_mut()
            .find(|r| r.user_id == user_id && r.word_id == word_id)
    }

    fn quiz_mut(&mut self, user_id: &str, quiz_id: QuizId) -> Option<&mut Quiz> {
        self.quizzes
            .iter_mut()
            .find(|q| q.id == quiz_id && q.user_id == user_id)
    }
}

/// A store that keeps everything in memory behind a mutex.
///
/// Every operation runs under a single lock, so submissions are trivially
/// atomic and the (user, date) quiz uniqueness check cannot race.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Number of stored quizzes, across all users.
    pub fn quiz_count(&self) -> anyhow::Result<usize> {
        Ok(self.lock()?.quizzes.len())
    }
}

#[async_trait]
impl WordSource for MemoryStore {
    async fn due_reviews(
        &self,
        user_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Vec<WordRecord>> {
        let state = self.lock()?;
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id && r.due_date <= as_of)
            .filter_map(|r| state.word(r.word_id))
            .take(limit)
            .map(Word::to_record)
            .collect())
    }

    async fn recent_lookups(
        &self,
        user_id: &str,
        exclude: &HashSet<WordId>,
        limit: usize,
    ) -> anyhow::Result<Vec<WordRecord>> {
        let state = self.lock()?;

        // Newest first; later insertion wins ties.
        let mut rows: Vec<(usize, &LookupRow)> = state
            .lookups
            .iter()
            .enumerate()
            .filter(|(_, l)| l.user_id == user_id && !exclude.contains(&l.word_id))
            .collect();
        rows.sort_by(|(ia, a), (ib, b)| {
            b.looked_up_at.cmp(&a.looked_up_at).then(ib.cmp(ia))
        });

        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .filter(|(_, l)| seen.insert(l.word_id))
            .filter_map(|(_, l)| state.word(l.word_id))
            .take(limit)
            .map(Word::to_record)
            .collect())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn review(&self, user_id: &str, word_id: WordId) -> anyhow::Result<Option<Review>> {
        let state = self.lock()?;
        Ok(state
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.word_id == word_id)
            .cloned())
    }

    async fn upsert_review(&self, review: &Review) -> anyhow::Result<()> {
        let mut state = self.lock()?;
        match state.review_mut(&review.user_id, review.word_id) {
            Some(existing) => *existing = review.clone(),
            None => state.reviews.push(review.clone()),
        }
        Ok(())
    }

    async fn due_list(
        &self,
        user_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Vec<DueWord>> {
        let state = self.lock()?;
        let mut due: Vec<DueWord> = state
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id && r.due_date <= as_of)
            .filter_map(|r| {
                state.word(r.word_id).map(|w| DueWord {
                    word_id: w.id,
                    lemma: w.lemma.clone(),
                    due_date: r.due_date,
                })
            })
            .collect();
        // Stable sort keeps insertion order among equal dates.
        due.sort_by_key(|d| d.due_date);
        due.truncate(limit);
        Ok(due)
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn find_quiz(&self, user_id: &str, for_date: NaiveDate) -> anyhow::Result<Option<Quiz>> {
        let state = self.lock()?;
        Ok(state
            .quizzes
            .iter()
            .find(|q| q.user_id == user_id && q.for_date == for_date)
            .cloned())
    }

    async fn insert_quiz(&self, quiz: &NewQuiz) -> anyhow::Result<Quiz> {
        let mut state = self.lock()?;
        if state
            .quizzes
            .iter()
            .any(|q| q.user_id == quiz.user_id && q.for_date == quiz.for_date)
        {
            return Err(StoreError::DuplicateQuiz {
                user_id: quiz.user_id.clone(),
                for_date: quiz.for_date,
            }
            .into());
        }

        let stored = Quiz {
            id: state.quizzes.len() as QuizId + 1,
            user_id: quiz.user_id.clone(),
            for_date: quiz.for_date,
            items: quiz.items.clone(),
            done: false,
        };
        state.quizzes.push(stored.clone());
        Ok(stored)
    }

    async fn load_quiz(&self, user_id: &str, quiz_id: QuizId) -> anyhow::Result<Option<Quiz>> {
        let state = self.lock()?;
        Ok(state
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id && q.user_id == user_id)
            .cloned())
    }

    async fn commit_submission(
        &self,
        user_id: &str,
        quiz_id: QuizId,
        signals: &[GradeSignal],
        updater: &ReviewUpdater,
    ) -> anyhow::Result<CommitOutcome> {
        let mut state = self.lock()?;

        match state.quiz_mut(user_id, quiz_id) {
            None => return Ok(CommitOutcome::NotFound),
            Some(quiz) if quiz.done => return Ok(CommitOutcome::AlreadySubmitted),
            Some(quiz) => quiz.done = true,
        }

        let mut reviews_updated = 0;
        for signal in signals {
            if let Some(review) = state.review_mut(user_id, signal.word_id) {
                *review = updater.apply_quiz_result(review, signal.correct);
                reviews_updated += 1;
            }
        }
        Ok(CommitOutcome::Committed { reviews_updated })
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    async fn record_lookup(&self, lookup: &NewLookup) -> anyhow::Result<Word> {
        let mut state = self.lock()?;

        let word_id = match state.words.iter().position(|w| w.lemma == lookup.lemma) {
            Some(index) => {
                let word = &mut state.words[index];
                let enrichment = &lookup.enrichment;
                if word.synonyms.is_none() {
                    word.synonyms = enrichment.synonyms.clone();
                }
                if word.antonyms.is_none() {
                    word.antonyms = enrichment.antonyms.clone();
                }
                if word.collocations.is_none() {
                    word.collocations = enrichment.collocations.clone();
                }
                word.id
            }
            None => {
                let id = state.words.len() as WordId + 1;
                state.words.push(Word {
                    id,
                    lemma: lookup.lemma.clone(),
                    synonyms: lookup.enrichment.synonyms.clone(),
                    antonyms: lookup.enrichment.antonyms.clone(),
                    collocations: lookup.enrichment.collocations.clone(),
                    created_at: lookup.looked_up_at,
                });
                id
            }
        };

        if state.review_mut(&lookup.user_id, word_id).is_none() {
            state.reviews.push(Review {
                user_id: lookup.user_id.clone(),
                word_id,
                due_date: lookup.first_due,
                last_grade: None,
                next_interval_days: 1,
            });
        }

        state.lookups.push(LookupRow {
            user_id: lookup.user_id.clone(),
            word_id,
            looked_up_at: lookup.looked_up_at,
        });

        state
            .word(word_id)
            .cloned()
            .ok_or_else(|| StoreError::Corrupt(format!("word {word_id} vanished")).into())
    }

    async fn word_by_lemma(&self, lemma: &str) -> anyhow::Result<Option<Word>> {
        let state = self.lock()?;
        Ok(state.words.iter().find(|w| w.lemma == lemma).cloned())
    }

    async fn search_words(&self, query: &str, take: usize) -> anyhow::Result<Vec<Word>> {
        let state = self.lock()?;
        let query = query.to_lowercase();
        let mut matches: Vec<Word> = state
            .words
            .iter()
            .filter(|w| w.lemma.to_lowercase().contains(&query))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.lemma.cmp(&b.lemma));
        matches.truncate(take);
        Ok(matches)
    }
}
