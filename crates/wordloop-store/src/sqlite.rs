//! SQLite backend.
//!
//! A single connection guarded by a mutex; every call runs on the blocking
//! pool. Uniqueness of words, reviews and daily quizzes is enforced by table
//! constraints, and submissions run inside an immediate transaction so that
//! concurrent processes sharing the file serialize on the write lock.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};

use wordloop_core::error::StoreError;
use wordloop_core::model::{
    GradeSignal, NewLookup, NewQuiz, Quiz, QuizId, QuizItem, Review, Word, WordId, WordRecord,
};
use wordloop_core::report::DueWord;
use wordloop_core::traits::{CommitOutcome, QuizStore, ReviewStore, WordSource, WordStore};
use wordloop_core::updater::ReviewUpdater;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS words (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    lemma        TEXT NOT NULL UNIQUE,
    synonyms     TEXT,
    antonyms     TEXT,
    collocations TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lookups (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL,
    word_id    INTEGER NOT NULL REFERENCES words(id),
    source     TEXT,
    sentence   TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_lookups_user ON lookups(user_id, created_at);

CREATE TABLE IF NOT EXISTS reviews (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id            TEXT NOT NULL,
    word_id            INTEGER NOT NULL REFERENCES words(id),
    due_date           TEXT NOT NULL,
    last_grade         INTEGER,
    next_interval_days INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, word_id)
);
CREATE INDEX IF NOT EXISTS idx_reviews_due ON reviews(user_id, due_date);

CREATE TABLE IF NOT EXISTS quizzes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      TEXT NOT NULL,
    for_date     TEXT NOT NULL,
    payload_json TEXT NOT NULL,
    done         INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, for_date)
);
";

const WORD_COLUMNS: &str = "w.id, w.lemma, w.synonyms, w.antonyms, w.collocations, w.created_at";
const REVIEW_COLUMNS: &str = "user_id, word_id, due_date, last_grade, next_interval_days";
const QUIZ_COLUMNS: &str = "id, user_id, for_date, payload_json, done";

/// Store backed by a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Self::init(conn)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA).context("failed to apply schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".into()))?;
            f(&mut guard)
        })
        .await
        .context("sqlite task failed")?
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

fn encode_list(list: &Option<Vec<String>>) -> Result<Option<String>> {
    Ok(list.as_ref().map(serde_json::to_string).transpose()?)
}

fn decode_json<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| decode_json(idx, &s)).transpose()
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        lemma: row.get(1)?,
        synonyms: json_list(row, 2)?,
        antonyms: json_list(row, 3)?,
        collocations: json_list(row, 4)?,
        created_at: row.get(5)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<WordRecord> {
    word_from_row(row).map(|w| w.to_record())
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        user_id: row.get(0)?,
        word_id: row.get(1)?,
        due_date: row.get(2)?,
        last_grade: row.get(3)?,
        next_interval_days: row.get(4)?,
    })
}

fn quiz_from_row(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    let payload: String = row.get(3)?;
    let items: Vec<QuizItem> = decode_json(3, &payload)?;
    Ok(Quiz {
        id: row.get(0)?,
        user_id: row.get(1)?,
        for_date: row.get(2)?,
        items,
        done: row.get(4)?,
    })
}

fn write_review(conn: &Connection, review: &Review) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, word_id) DO UPDATE SET
                 due_date = excluded.due_date,
                 last_grade = excluded.last_grade,
                 next_interval_days = excluded.next_interval_days"
        ),
        params![
            review.user_id,
            review.word_id,
            review.due_date,
            review.last_grade,
            review.next_interval_days
        ],
    )
}

fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl WordSource for SqliteStore {
    async fn due_reviews(
        &self,
        user_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<WordRecord>> {
        let user_id = user_id.to_string();
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WORD_COLUMNS} FROM reviews r JOIN words w ON w.id = r.word_id
                 WHERE r.user_id = ?1 AND r.due_date <= ?2
                 ORDER BY r.id LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![user_id, as_of, limit as i64], record_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn recent_lookups(
        &self,
        user_id: &str,
        exclude: &HashSet<WordId>,
        limit: usize,
    ) -> Result<Vec<WordRecord>> {
        let mut values: Vec<Value> = vec![user_id.to_string().into(), (limit as i64).into()];
        let filter = if exclude.is_empty() {
            String::new()
        } else {
            let placeholders: Vec<String> =
                (0..exclude.len()).map(|i| format!("?{}", i + 3)).collect();
            values.extend(exclude.iter().map(|id| Value::Integer(*id)));
            format!("AND l.word_id NOT IN ({})", placeholders.join(", "))
        };

        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WORD_COLUMNS} FROM lookups l JOIN words w ON w.id = l.word_id
                 WHERE l.user_id = ?1 {filter}
                 GROUP BY w.id
                 ORDER BY MAX(l.created_at) DESC, MAX(l.id) DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params_from_iter(values), record_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn review(&self, user_id: &str, word_id: WordId) -> Result<Option<Review>> {
        let user_id = user_id.to_string();
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = ?1 AND word_id = ?2"),
                    params![user_id, word_id],
                    review_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn upsert_review(&self, review: &Review) -> Result<()> {
        let review = review.clone();
        self.call(move |conn| {
            write_review(conn, &review)?;
            Ok(())
        })
        .await
    }

    async fn due_list(&self, user_id: &str, as_of: NaiveDate, limit: usize) -> Result<Vec<DueWord>> {
        let user_id = user_id.to_string();
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT r.word_id, w.lemma, r.due_date FROM reviews r JOIN words w ON w.id = r.word_id
                 WHERE r.user_id = ?1 AND r.due_date <= ?2
                 ORDER BY r.due_date, r.id LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![user_id, as_of, limit as i64], |row| {
                Ok(DueWord {
                    word_id: row.get(0)?,
                    lemma: row.get(1)?,
                    due_date: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }
}

#[async_trait]
impl QuizStore for SqliteStore {
    async fn find_quiz(&self, user_id: &str, for_date: NaiveDate) -> Result<Option<Quiz>> {
        let user_id = user_id.to_string();
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE user_id = ?1 AND for_date = ?2"),
                    params![user_id, for_date],
                    quiz_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn insert_quiz(&self, quiz: &NewQuiz) -> Result<Quiz> {
        let payload = serde_json::to_string(&quiz.items).context("failed to encode quiz items")?;
        let quiz = quiz.clone();
        self.call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO quizzes (user_id, for_date, payload_json, done) VALUES (?1, ?2, ?3, 0)",
                params![quiz.user_id, quiz.for_date, payload],
            );
            match inserted {
                Ok(_) => Ok(Quiz {
                    id: conn.last_insert_rowid(),
                    user_id: quiz.user_id,
                    for_date: quiz.for_date,
                    items: quiz.items,
                    done: false,
                }),
                Err(e) if is_constraint_violation(&e) => Err(StoreError::DuplicateQuiz {
                    user_id: quiz.user_id,
                    for_date: quiz.for_date,
                }
                .into()),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn load_quiz(&self, user_id: &str, quiz_id: QuizId) -> Result<Option<Quiz>> {
        let user_id = user_id.to_string();
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1 AND user_id = ?2"),
                    params![quiz_id, user_id],
                    quiz_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn commit_submission(
        &self,
        user_id: &str,
        quiz_id: QuizId,
        signals: &[GradeSignal],
        updater: &ReviewUpdater,
    ) -> Result<CommitOutcome> {
        let user_id = user_id.to_string();
        let signals = signals.to_vec();
        let updater = *updater;
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let claimed = tx.execute(
                "UPDATE quizzes SET done = 1 WHERE id = ?1 AND user_id = ?2 AND done = 0",
                params![quiz_id, user_id],
            )?;
            if claimed == 0 {
                let exists = tx
                    .query_row(
                        "SELECT 1 FROM quizzes WHERE id = ?1 AND user_id = ?2",
                        params![quiz_id, user_id],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some();
                // Dropping `tx` rolls back.
                return Ok(if exists {
                    CommitOutcome::AlreadySubmitted
                } else {
                    CommitOutcome::NotFound
                });
            }

            let mut reviews_updated = 0;
            for signal in &signals {
                let review = tx
                    .query_row(
                        &format!(
                            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = ?1 AND word_id = ?2"
                        ),
                        params![user_id, signal.word_id],
                        review_from_row,
                    )
                    .optional()?;
                if let Some(review) = review {
                    write_review(&tx, &updater.apply_quiz_result(&review, signal.correct))?;
                    reviews_updated += 1;
                }
            }

            tx.commit()?;
            Ok(CommitOutcome::Committed { reviews_updated })
        })
        .await
    }
}

#[async_trait]
impl WordStore for SqliteStore {
    async fn record_lookup(&self, lookup: &NewLookup) -> Result<Word> {
        let synonyms = encode_list(&lookup.enrichment.synonyms)?;
        let antonyms = encode_list(&lookup.enrichment.antonyms)?;
        let collocations = encode_list(&lookup.enrichment.collocations)?;
        let lookup = lookup.clone();

        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            tx.execute(
                "INSERT INTO words (lemma, synonyms, antonyms, collocations, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (lemma) DO UPDATE SET
                     synonyms = COALESCE(words.synonyms, excluded.synonyms),
                     antonyms = COALESCE(words.antonyms, excluded.antonyms),
                     collocations = COALESCE(words.collocations, excluded.collocations)",
                params![lookup.lemma, synonyms, antonyms, collocations, lookup.looked_up_at],
            )?;
            let word_id: WordId = tx.query_row(
                "SELECT id FROM words WHERE lemma = ?1",
                params![lookup.lemma],
                |row| row.get(0),
            )?;

            tx.execute(
                &format!("INSERT OR IGNORE INTO reviews ({REVIEW_COLUMNS}) VALUES (?1, ?2, ?3, NULL, 1)"),
                params![lookup.user_id, word_id, lookup.first_due],
            )?;
            tx.execute(
                "INSERT INTO lookups (user_id, word_id, source, sentence, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    lookup.user_id,
                    word_id,
                    lookup.source,
                    lookup.sentence,
                    lookup.looked_up_at
                ],
            )?;

            let word = tx.query_row(
                &format!("SELECT {WORD_COLUMNS} FROM words w WHERE w.id = ?1"),
                params![word_id],
                word_from_row,
            )?;
            tx.commit()?;
            Ok(word)
        })
        .await
    }

    async fn word_by_lemma(&self, lemma: &str) -> Result<Option<Word>> {
        let lemma = lemma.to_string();
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {WORD_COLUMNS} FROM words w WHERE w.lemma = ?1"),
                    params![lemma],
                    word_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn search_words(&self, query: &str, take: usize) -> Result<Vec<Word>> {
        let pattern = like_pattern(query);
        self.call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WORD_COLUMNS} FROM words w
                 WHERE w.lemma LIKE ?1 ESCAPE '\\'
                 ORDER BY w.lemma LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![pattern, take as i64], word_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }
}
