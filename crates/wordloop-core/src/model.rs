//! Core data model types for wordloop.
//!
//! Words, per-user review rows, daily quizzes and their items. These types are
//! shared by the scheduler, the quiz pipeline and every store implementation.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned word identifier.
pub type WordId = i64;

/// Store-assigned quiz identifier.
pub type QuizId = i64;

/// Highest grade accepted by the scheduler.
pub const MAX_GRADE: u8 = 5;

/// Grade recorded for a correctly answered quiz item.
pub const QUIZ_CORRECT_GRADE: u8 = 4;

/// Grade recorded for an incorrectly answered quiz item.
pub const QUIZ_INCORRECT_GRADE: u8 = 2;

/// Default number of items in a daily quiz.
pub const DEFAULT_QUIZ_SIZE: usize = 12;

/// Largest daily quiz a caller may ask for.
pub const MAX_QUIZ_SIZE: usize = 200;

/// A dictionary entry. Owned by the lookup/enrichment side; read-only to the
/// quiz pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    /// Lowercase headword, unique across the store.
    pub lemma: String,
    /// `None` means the word has not been enriched yet.
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    #[serde(default)]
    pub antonyms: Option<Vec<String>>,
    #[serde(default)]
    pub collocations: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Word {
    /// Whether any enrichment list is still missing.
    pub fn needs_enrichment(&self) -> bool {
        self.synonyms.is_none() || self.antonyms.is_none() || self.collocations.is_none()
    }

    pub fn to_record(&self) -> WordRecord {
        WordRecord {
            id: self.id,
            lemma: self.lemma.clone(),
            synonyms: self.synonyms.clone().unwrap_or_default(),
            antonyms: self.antonyms.clone().unwrap_or_default(),
            collocations: self.collocations.clone().unwrap_or_default(),
        }
    }
}

/// The word shape handed to the quiz builder by both the due-review and the
/// recent-lookup queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: WordId,
    pub lemma: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default)]
    pub collocations: Vec<String>,
}

/// Enrichment data supplied alongside a lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    #[serde(default)]
    pub antonyms: Option<Vec<String>>,
    #[serde(default)]
    pub collocations: Option<Vec<String>>,
}

/// A lookup request as recorded by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLookup {
    pub user_id: String,
    /// Already normalised (trimmed, lowercase).
    pub lemma: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub enrichment: Enrichment,
    pub looked_up_at: DateTime<Utc>,
    /// Due date given to the review row if this is the user's first lookup of
    /// the word.
    pub first_due: NaiveDate,
}

/// Per-(user, word) scheduling state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: String,
    pub word_id: WordId,
    pub due_date: NaiveDate,
    /// Last grade in 0..=5; `None` until first graded.
    pub last_grade: Option<u8>,
    /// Zero means "never scheduled".
    pub next_interval_days: u32,
}

/// Quiz item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Spell,
    Choice,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Spell => write!(f, "spell"),
            ItemKind::Choice => write!(f, "choice"),
        }
    }
}

/// A single question inside a quiz, including its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    /// Opaque token, unique within the quiz.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub word_id: WordId,
    pub prompt: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Gold answer; never leaves the server.
    pub answer: String,
}

/// A quiz that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuiz {
    pub user_id: String,
    pub for_date: NaiveDate,
    pub items: Vec<QuizItem>,
}

/// A persisted daily quiz. At most one exists per (user, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub user_id: String,
    pub for_date: NaiveDate,
    pub items: Vec<QuizItem>,
    pub done: bool,
}

/// An answer submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Correctness of one answered item, fed back into the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeSignal {
    pub word_id: WordId,
    pub correct: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_display_matches_wire_name() {
        for kind in [ItemKind::Spell, ItemKind::Choice] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{kind}\""));
        }
    }

    #[test]
    fn quiz_item_serializes_kind_as_type() {
        let item = QuizItem {
            id: "abc".into(),
            kind: ItemKind::Spell,
            word_id: 7,
            prompt: "Fill in the missing letters: c_t".into(),
            hint: None,
            options: None,
            answer: "cat".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "spell");
        assert_eq!(json["wordId"], 7);
    }

    #[test]
    fn word_record_flattens_missing_enrichment() {
        let word = Word {
            id: 1,
            lemma: "serene".into(),
            synonyms: None,
            antonyms: Some(vec!["agitated".into()]),
            collocations: None,
            created_at: Utc::now(),
        };
        assert!(word.needs_enrichment());
        let record = word.to_record();
        assert!(record.synonyms.is_empty());
        assert_eq!(record.antonyms, vec!["agitated"]);
    }
}
