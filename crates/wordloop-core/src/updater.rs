//! Applies grades to review rows.

use chrono::NaiveDate;

use crate::model::{Review, QUIZ_CORRECT_GRADE, QUIZ_INCORRECT_GRADE};
use crate::scheduler::{next_review, Schedule};

/// Turns a grade into an updated review row, evaluated against a fixed date.
///
/// Quiz results only ever produce grade 4 (correct) or 2 (incorrect); the full
/// 0..=5 range is reserved for manual grading.
#[derive(Debug, Clone, Copy)]
pub struct ReviewUpdater {
    today: NaiveDate,
}

impl ReviewUpdater {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Grade recorded for a graded quiz item.
    pub fn quiz_grade(correct: bool) -> u8 {
        if correct {
            QUIZ_CORRECT_GRADE
        } else {
            QUIZ_INCORRECT_GRADE
        }
    }

    /// Schedule the next review for `review` after receiving `grade`.
    pub fn schedule(&self, review: &Review, grade: u8) -> Schedule {
        let previous = if review.next_interval_days == 0 {
            1
        } else {
            review.next_interval_days
        };
        next_review(Some(grade), previous, self.today)
    }

    /// Return `review` with grade, interval and due date overwritten.
    pub fn apply(&self, review: &Review, grade: u8) -> Review {
        let schedule = self.schedule(review, grade);
        Review {
            last_grade: Some(grade),
            next_interval_days: schedule.next_interval_days,
            due_date: schedule.due_date,
            ..review.clone()
        }
    }

    /// Apply a quiz result.
    pub fn apply_quiz_result(&self, review: &Review, correct: bool) -> Review {
        self.apply(review, Self::quiz_grade(correct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn review(interval: u32) -> Review {
        Review {
            user_id: "u1".into(),
            word_id: 42,
            due_date: today(),
            last_grade: None,
            next_interval_days: interval,
        }
    }

    #[test]
    fn correct_answer_grades_four() {
        let updated = ReviewUpdater::new(today()).apply_quiz_result(&review(5), true);
        assert_eq!(updated.last_grade, Some(4));
        assert_eq!(updated.next_interval_days, 11);
        assert_eq!(updated.due_date, today() + Days::new(11));
        assert_eq!(updated.word_id, 42);
    }

    #[test]
    fn incorrect_answer_grades_two_and_resets() {
        let updated = ReviewUpdater::new(today()).apply_quiz_result(&review(30), false);
        assert_eq!(updated.last_grade, Some(2));
        assert_eq!(updated.next_interval_days, 1);
        assert_eq!(updated.due_date, today() + Days::new(1));
    }

    #[test]
    fn unscheduled_review_uses_one_day_base() {
        let updater = ReviewUpdater::new(today());
        assert_eq!(
            updater.apply(&review(0), 5).next_interval_days,
            updater.apply(&review(1), 5).next_interval_days
        );
    }

    #[test]
    fn manual_grade_keeps_full_range() {
        let updater = ReviewUpdater::new(today());
        assert_eq!(updater.apply(&review(10), 5).next_interval_days, 28);
        assert_eq!(updater.apply(&review(10), 3).next_interval_days, 17);
        assert_eq!(updater.apply(&review(10), 0).next_interval_days, 1);
    }
}
