//! SM-2 scheduling core.
//!
//! Grades (0-5):
//! - 0: total blackout
//! - 1-2: incorrect, counts as a lapse
//! - 3: correct with serious difficulty
//! - 4: correct after hesitation
//! - 5: perfect recall
//!
//! Interval growth rounds half away from zero (`f64::round`), so 6 × 1.75 = 10.5 schedules 11 days.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CORRECT_ANSWER_GRADE, DEFAULT_EASE_FACTOR, DEFAULT_INTERVAL_DAYS, INCORRECT_ANSWER_GRADE,
    MAX_GRADE, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR, PASSING_GRADE,
};
use crate::scheduler::error::SchedulerError;
use crate::store::operations::reviews::ReviewRecord;

/// A recall grade in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Grade(u8);

impl Grade {
    /// Caller convention: a correct free-response answer.
    pub const CORRECT_ANSWER: Grade = Grade(CORRECT_ANSWER_GRADE);
    /// Caller convention: an incorrect free-response answer.
    pub const INCORRECT_ANSWER: Grade = Grade(INCORRECT_ANSWER_GRADE);

    pub fn new(value: i64) -> Result<Self, SchedulerError> {
        match u8::try_from(value) {
            Ok(v) if v <= MAX_GRADE => Ok(Grade(v)),
            _ => Err(SchedulerError::InvalidArgument(format!(
                "grade must be between 0 and {MAX_GRADE}, got {value}"
            ))),
        }
    }

    pub fn from_answer(correct: bool) -> Self {
        if correct {
            Self::CORRECT_ANSWER
        } else {
            Self::INCORRECT_ANSWER
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= PASSING_GRADE
    }
}

impl TryFrom<i64> for Grade {
    type Error = SchedulerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewParams {
    pub repetitions: u32,
    pub interval_days: u32,
    pub ease_factor: f64,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            repetitions: 0,
            interval_days: DEFAULT_INTERVAL_DAYS,
            ease_factor: DEFAULT_EASE_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledReview {
    pub params: ReviewParams,
    pub next_review_at: DateTime<Utc>,
}

/// `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)`
pub fn ease_delta(grade: Grade) -> f64 {
    let miss = f64::from(MAX_GRADE - grade.value());
    0.1 - miss * (0.08 + miss * 0.02)
}

pub fn next_ease_factor(ease_factor: f64, grade: Grade) -> f64 {
    (ease_factor + ease_delta(grade)).max(MIN_EASE_FACTOR)
}

fn grown_interval(previous_days: u32, ease_factor: f64) -> u32 {
    let grown = (f64::from(previous_days) * ease_factor).round();
    grown.clamp(1.0, f64::from(MAX_INTERVAL_DAYS)) as u32
}

pub fn schedule(params: ReviewParams, grade: Grade, now: DateTime<Utc>) -> ScheduledReview {
    let ease_factor = next_ease_factor(params.ease_factor, grade);

    let (repetitions, interval_days) = if grade.is_success() {
        let repetitions = params.repetitions.saturating_add(1);
        let interval_days = match repetitions {
            1 => 1,
            2 => 6,
            _ => grown_interval(params.interval_days, ease_factor),
        };
        (repetitions, interval_days)
    } else {
        (0, 1)
    };

    let next_review_at = now
        .checked_add_signed(Duration::days(i64::from(interval_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    ScheduledReview {
        params: ReviewParams {
            repetitions,
            interval_days,
            ease_factor,
        },
        next_review_at,
    }
}

impl ReviewRecord {
    pub fn params(&self) -> ReviewParams {
        ReviewParams {
            repetitions: self.repetitions,
            interval_days: self.interval_days,
            ease_factor: self.ease_factor,
        }
    }

    /// This record after grading at `now`.
    pub fn graded(&self, grade: Grade, now: DateTime<Utc>) -> ReviewRecord {
        let scheduled = schedule(self.params(), grade, now);
        ReviewRecord {
            repetitions: scheduled.params.repetitions,
            interval_days: scheduled.params.interval_days,
            ease_factor: scheduled.params.ease_factor,
            next_review_at: scheduled.next_review_at,
            updated_at: now,
            ..self.clone()
        }
    }
}
