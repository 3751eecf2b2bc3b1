//! Review interval scheduling.
//!
//! A simplified SM-2 style policy: a failing (or missing) grade resets the
//! interval to one day, a passing grade stretches the previous interval by a
//! grade-dependent multiplier. All dates are UTC calendar dates.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest grade that counts as a pass.
pub const PASSING_GRADE: u8 = 3;

/// Shortest interval after a passing grade.
const MIN_PASSING_INTERVAL: u32 = 2;

/// Longest interval the scheduler hands out, roughly a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Outcome of a scheduling decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub next_interval_days: u32,
    pub due_date: NaiveDate,
}

/// Source of the current time. Injected so scheduling and lookup timestamps
/// stay deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to midnight UTC of one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}

fn multiplier(grade: u8) -> f64 {
    match grade {
        3 => 1.7,
        4 => 2.2,
        5 => 2.8,
        _ => 1.5,
    }
}

/// Compute the next interval and due date.
///
/// `previous_interval_days` below one is treated as one. Intervals are capped
/// at [`MAX_INTERVAL_DAYS`] and due dates saturate at the last representable
/// date.
pub fn next_review(
    last_grade: Option<u8>,
    previous_interval_days: u32,
    today: NaiveDate,
) -> Schedule {
    let next_interval_days = match last_grade {
        Some(grade) if grade >= PASSING_GRADE => {
            let stretched =
                (f64::from(previous_interval_days.max(1)) * multiplier(grade)).round_ties_even();
            (stretched as u32).clamp(MIN_PASSING_INTERVAL, MAX_INTERVAL_DAYS)
        }
        _ => 1,
    };

    Schedule {
        next_interval_days,
        due_date: today
            .checked_add_days(Days::new(u64::from(next_interval_days)))
            .unwrap_or(NaiveDate::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn failing_or_missing_grade_resets() {
        for grade in [None, Some(0), Some(1), Some(2)] {
            for prev in [1, 5, 40, 365] {
                let s = next_review(grade, prev, today());
                assert_eq!(s.next_interval_days, 1, "grade {grade:?} prev {prev}");
                assert_eq!(s.due_date, today() + Days::new(1));
            }
        }
    }

    #[test]
    fn passing_grades_stretch_interval() {
        assert_eq!(next_review(Some(3), 1, today()).next_interval_days, 2);
        assert_eq!(next_review(Some(4), 1, today()).next_interval_days, 2);
        assert_eq!(next_review(Some(5), 1, today()).next_interval_days, 3);
        assert_eq!(next_review(Some(4), 10, today()).next_interval_days, 22);
        assert_eq!(next_review(Some(5), 10, today()).next_interval_days, 28);
        assert_eq!(next_review(Some(3), 10, today()).next_interval_days, 17);
    }

    #[test]
    fn due_date_follows_interval() {
        let s = next_review(Some(4), 10, today());
        assert_eq!(s.due_date, NaiveDate::from_ymd_opt(2025, 9, 23).unwrap());
    }

    #[test]
    fn zero_previous_interval_treated_as_one() {
        assert_eq!(
            next_review(Some(5), 0, today()),
            next_review(Some(5), 1, today())
        );
    }

    #[test]
    fn out_of_range_grade_uses_fallback_multiplier() {
        assert_eq!(next_review(Some(9), 10, today()).next_interval_days, 15);
    }

    #[test]
    fn passing_intervals_are_monotonic() {
        for grade in [3, 4, 5] {
            let mut last = 0;
            for prev in 1..=400 {
                let next = next_review(Some(grade), prev, today()).next_interval_days;
                assert!(next >= 2, "grade {grade} prev {prev} gave {next}");
                assert!(next >= last, "grade {grade} not monotonic at prev {prev}");
                last = next;
            }
        }
    }

    #[test]
    fn long_intervals_are_capped() {
        let s = next_review(Some(5), 40_397_890, today());
        assert_eq!(s.next_interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(s.due_date, today() + Days::new(u64::from(MAX_INTERVAL_DAYS)));
        assert_eq!(
            next_review(Some(5), u32::MAX, today()).next_interval_days,
            MAX_INTERVAL_DAYS
        );
    }

    #[test]
    fn repeated_top_grades_stay_in_range() {
        let mut interval = 1;
        for _ in 0..40 {
            let s = next_review(Some(5), interval, today());
            assert!(s.due_date > today());
            assert!(s.due_date.format("%Y").to_string().len() == 4);
            interval = s.next_interval_days;
        }
        assert_eq!(interval, MAX_INTERVAL_DAYS);
    }

    #[test]
    fn due_date_saturates_near_the_end_of_time() {
        let late = NaiveDate::MAX - Days::new(10);
        assert_eq!(next_review(Some(5), 100, late).due_date, NaiveDate::MAX);
    }

    #[test]
    fn fixed_clock_reports_its_date() {
        let clock = FixedClock(today());
        assert_eq!(clock.today(), today());
        assert_eq!(clock.now().date_naive(), today());
        assert_eq!(clock.now().time(), NaiveTime::MIN);
    }
}
