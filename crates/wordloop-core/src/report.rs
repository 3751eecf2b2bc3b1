//! Response shapes returned to clients, with JSON persistence.
//!
//! None of these types carry gold answers except [`ItemDetail`], which is only
//! produced after a quiz has been graded.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{ItemKind, Quiz, QuizId, QuizItem, WordId};

/// Today's quiz as shown to the learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub quiz_id: QuizId,
    pub for_date: NaiveDate,
    pub done: bool,
    pub items: Vec<QuizItemView>,
}

/// A quiz item without its answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItemView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub word_id: WordId,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<&QuizItem> for QuizItemView {
    fn from(item: &QuizItem) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind,
            word_id: item.word_id,
            prompt: item.prompt.clone(),
            hint: item.hint.clone(),
            options: item.options.clone(),
        }
    }
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            quiz_id: quiz.id,
            for_date: quiz.for_date,
            done: quiz.done,
            items: quiz.items.iter().map(QuizItemView::from).collect(),
        }
    }
}

/// Per-item grading outcome, sufficient for a client-side review screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub word_id: WordId,
    pub prompt: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub correct: bool,
}

/// Response to a quiz submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub quiz_id: QuizId,
    pub total: usize,
    pub correct: usize,
    pub score: f64,
    pub details: Vec<ItemDetail>,
}

impl SubmissionReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SubmissionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Details of the items answered wrongly.
    pub fn mistakes(&self) -> impl Iterator<Item = &ItemDetail> {
        self.details.iter().filter(|d| !d.correct)
    }
}

/// Response to a manual grade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub due_date: NaiveDate,
    pub next_interval_days: u32,
}

/// One entry in the due-today list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueWord {
    pub word_id: WordId,
    pub lemma: String,
    pub due_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> Quiz {
        Quiz {
            id: 9,
            user_id: "u1".into(),
            for_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            items: vec![QuizItem {
                id: "q1".into(),
                kind: ItemKind::Choice,
                word_id: 4,
                prompt: "Which word is a synonym of the target word?\n(Target: serene)".into(),
                hint: None,
                options: Some(vec!["calm".into(), "placid".into()]),
                answer: "calm".into(),
            }],
            done: false,
        }
    }

    #[test]
    fn quiz_view_hides_answers() {
        let view = QuizView::from(&sample_quiz());
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"quizId\":9"));
        assert!(json.contains("\"forDate\":\"2025-09-01\""));
        assert!(json.contains("\"type\":\"choice\""));
        assert!(!json.contains("\"answer\""));
        assert!(!json.contains("\"hint\""));
    }

    #[test]
    fn submission_report_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("quiz-9.json");
        let report = SubmissionReport {
            quiz_id: 9,
            total: 1,
            correct: 0,
            score: 0.0,
            details: vec![ItemDetail {
                question_id: "q1".into(),
                kind: ItemKind::Choice,
                word_id: 4,
                prompt: "p".into(),
                your_answer: "placid".into(),
                correct_answer: "calm".into(),
                correct: false,
            }],
        };
        report.save_json(&path).unwrap();

        let loaded = SubmissionReport::load_json(&path).unwrap();
        assert_eq!(loaded.quiz_id, 9);
        assert_eq!(loaded.mistakes().count(), 1);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"yourAnswer\": \"placid\""));
        assert!(raw.contains("\"correctAnswer\": \"calm\""));
    }
}
