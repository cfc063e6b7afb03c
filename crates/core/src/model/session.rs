use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::Elapsed;

/// Lifecycle of one play-through.
///
/// Moves forward only: `NotStarted → InProgress → (Answering → InProgress)* → GameOver`.
/// Restart is the single way back to `NotStarted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    NotStarted,
    InProgress,
    Answering,
    GameOver,
}

impl SessionPhase {
    /// True while the elapsed-time ticker should run.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, SessionPhase::InProgress | SessionPhase::Answering)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "not_started",
            SessionPhase::InProgress => "in_progress",
            SessionPhase::Answering => "answering",
            SessionPhase::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("correct ({correct}) + incorrect ({incorrect}) exceeds total questions ({total})")]
    CountMismatch {
        total: u32,
        correct: u32,
        incorrect: u32,
    },
}

/// Result of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    elapsed: Elapsed,
    total_questions: u32,
    correct: u32,
    incorrect: u32,
    points: u32,
}

impl SessionSummary {
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` precedes `started_at`,
    /// and `SessionSummaryError::CountMismatch` if more answers were counted than questions exist.
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        elapsed: Elapsed,
        total_questions: u32,
        correct: u32,
        incorrect: u32,
        points: u32,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if correct.saturating_add(incorrect) > total_questions {
            return Err(SessionSummaryError::CountMismatch {
                total: total_questions,
                correct,
                incorrect,
            });
        }

        Ok(Self {
            started_at,
            completed_at,
            elapsed,
            total_questions,
            correct,
            incorrect,
            points,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn elapsed(&self) -> Elapsed {
        self.elapsed
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Whole-number percentage of questions answered correctly.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let percent = u64::from(self.correct) * 100 / u64::from(self.total_questions);
        u32::try_from(percent).unwrap_or(u32::MAX)
    }
}
