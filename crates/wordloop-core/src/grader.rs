//! Grading of submitted quiz answers against the stored answer key.

use std::collections::{HashMap, HashSet};

use crate::model::{GradeSignal, Quiz, QuizItem, SubmittedAnswer};
use crate::report::ItemDetail;

/// Result of grading one submission. Pure: nothing is persisted here.
#[derive(Debug, Clone)]
pub struct Grading {
    /// Items in the quiz, answered or not.
    pub total: usize,
    pub correct: usize,
    /// Percentage of all quiz items answered correctly, one decimal place.
    pub score: f64,
    /// One entry per graded answer, in submission order.
    pub details: Vec<ItemDetail>,
    /// One entry per graded answer, in submission order.
    pub signals: Vec<GradeSignal>,
}

/// Trimmed, case-insensitive exact comparison.
pub fn answers_match(submitted: &str, gold: &str) -> bool {
    submitted.trim().to_lowercase() == gold.trim().to_lowercase()
}

/// `round(100 * correct / max(1, total), 1)`, ties to even.
pub fn score_percent(correct: usize, total: usize) -> f64 {
    let raw = 100.0 * correct as f64 / total.max(1) as f64;
    (raw * 10.0).round_ties_even() / 10.0
}

/// Grade `answers` against `quiz`.
///
/// Answers naming an unknown item are ignored. When an item is answered more
/// than once, only the first answer counts.
pub fn grade_quiz(quiz: &Quiz, answers: &[SubmittedAnswer]) -> Grading {
    let key: HashMap<&str, &QuizItem> = quiz
        .items
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut graded = HashSet::new();
    let mut details = Vec::new();
    let mut signals = Vec::new();
    let mut correct = 0;

    for answer in answers {
        let Some(item) = key.get(answer.question_id.as_str()) else {
            continue;
        };
        if !graded.insert(item.id.as_str()) {
            continue;
        }

        let your_answer = answer.answer.as_deref().unwrap_or_default().trim().to_string();
        let is_correct = answers_match(&your_answer, &item.answer);
        if is_correct {
            correct += 1;
        }

        details.push(ItemDetail {
            question_id: item.id.clone(),
            kind: item.kind,
            word_id: item.word_id,
            prompt: item.prompt.clone(),
            your_answer,
            correct_answer: item.answer.trim().to_string(),
            correct: is_correct,
        });
        signals.push(GradeSignal {
            word_id: item.word_id,
            correct: is_correct,
        });
    }

    let total = quiz.items.len();
    Grading {
        total,
        correct,
        score: score_percent(correct, total),
        details,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use chrono::NaiveDate;

    fn item(id: &str, word_id: i64, answer: &str) -> QuizItem {
        QuizItem {
            id: id.into(),
            kind: ItemKind::Spell,
            word_id,
            prompt: format!("prompt {id}"),
            hint: None,
            options: None,
            answer: answer.into(),
        }
    }

    fn quiz(items: Vec<QuizItem>) -> Quiz {
        Quiz {
            id: 1,
            user_id: "u1".into(),
            for_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            items,
            done: false,
        }
    }

    fn answer(id: &str, text: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: id.into(),
            answer: Some(text.into()),
        }
    }

    fn five_item_quiz() -> Quiz {
        quiz(vec![
            item("q1", 1, "alpha"),
            item("q2", 2, "beta"),
            item("q3", 3, "gamma"),
            item("q4", 4, "delta"),
            item("q5", 5, "epsilon"),
        ])
    }

    #[test]
    fn three_of_five_scores_sixty() {
        let answers = vec![
            answer("q1", "alpha"),
            answer("q2", "beta"),
            answer("q3", "gamma"),
            answer("q4", "wrong"),
            answer("q5", "wrong"),
        ];
        let g = grade_quiz(&five_item_quiz(), &answers);
        assert_eq!(g.total, 5);
        assert_eq!(g.correct, 3);
        assert_eq!(g.score, 60.0);
        assert_eq!(g.details.len(), 5);
    }

    #[test]
    fn unanswered_items_count_against_score() {
        let answers = vec![
            answer("q1", "alpha"),
            answer("q2", "beta"),
            answer("q3", "gamma"),
            answer("q4", "wrong"),
        ];
        let g = grade_quiz(&five_item_quiz(), &answers);
        assert_eq!(g.correct, 3);
        assert_eq!(g.score, 60.0);
        assert_eq!(g.signals.len(), 4);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let q = quiz(vec![item("q1", 1, "Resilience")]);
        let g = grade_quiz(&q, &[answer("q1", "  resilience ")]);
        assert_eq!(g.correct, 1);
        assert_eq!(g.details[0].your_answer, "resilience");
        assert_eq!(g.details[0].correct_answer, "Resilience");
        assert!(g.signals[0].correct);
    }

    #[test]
    fn no_partial_credit() {
        let q = quiz(vec![item("q1", 1, "resilience")]);
        let g = grade_quiz(&q, &[answer("q1", "resilence")]);
        assert_eq!(g.correct, 0);
        assert!(!g.details[0].correct);
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let g = grade_quiz(&five_item_quiz(), &[answer("nope", "alpha"), answer("q1", "alpha")]);
        assert_eq!(g.correct, 1);
        assert_eq!(g.details.len(), 1);
        assert_eq!(g.details[0].question_id, "q1");
    }

    #[test]
    fn repeated_answers_grade_once() {
        let g = grade_quiz(
            &five_item_quiz(),
            &[answer("q1", "alpha"), answer("q1", "alpha"), answer("q1", "alpha")],
        );
        assert_eq!(g.correct, 1);
        assert_eq!(g.score, 20.0);
        assert_eq!(g.signals.len(), 1);
    }

    #[test]
    fn missing_answer_is_wrong() {
        let q = quiz(vec![item("q1", 1, "alpha")]);
        let g = grade_quiz(
            &q,
            &[SubmittedAnswer {
                question_id: "q1".into(),
                answer: None,
            }],
        );
        assert_eq!(g.correct, 0);
        assert_eq!(g.details[0].your_answer, "");
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let g = grade_quiz(&quiz(vec![]), &[answer("q1", "x")]);
        assert_eq!(g.total, 0);
        assert_eq!(g.score, 0.0);
    }

    #[test]
    fn score_rounds_to_one_decimal() {
        assert_eq!(score_percent(1, 3), 33.3);
        assert_eq!(score_percent(2, 3), 66.7);
        assert_eq!(score_percent(12, 12), 100.0);
    }
}
