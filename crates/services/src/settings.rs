use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Knobs shared by every game mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    /// Questions per session; `None` uses every eligible vocabulary item.
    pub question_count: Option<usize>,
    /// Wrong options offered next to the correct one.
    pub distractors: usize,
    pub points_per_correct: u32,
    /// Pause between showing feedback and moving to the next question.
    pub advance_delay_ms: u64,
    pub auto_advance: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            question_count: None,
            distractors: 3,
            points_per_correct: 10,
            advance_delay_ms: 1_500,
            auto_advance: true,
        }
    }
}

impl GameSettings {
    #[must_use]
    pub fn with_question_count(mut self, count: Option<usize>) -> Self {
        self.question_count = count;
        self
    }

    #[must_use]
    pub fn with_distractors(mut self, distractors: usize) -> Self {
        self.distractors = distractors;
        self
    }

    #[must_use]
    pub fn with_advance_delay_ms(mut self, ms: u64) -> Self {
        self.advance_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    #[must_use]
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}
