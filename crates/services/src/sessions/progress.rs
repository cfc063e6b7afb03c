use serde::Serialize;

use lesson_core::model::SessionPhase;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub phase: SessionPhase,
    pub total: usize,
    /// Zero-based index of the current question.
    pub current: usize,
    pub answered: usize,
    pub score: u32,
}

impl SessionProgress {
    /// Percentage of the session reached, counting the current question.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let reached = (self.current + 1).min(self.total);
        u32::try_from(reached * 100 / self.total).unwrap_or(100)
    }
}
