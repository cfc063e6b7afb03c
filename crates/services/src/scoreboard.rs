use serde::Serialize;

/// Running tally shared by every game screen: points plus right/wrong counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    points: u32,
    total_questions: u32,
    correct: u32,
    incorrect: u32,
    points_per_correct: u32,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Scoreboard {
    #[must_use]
    pub fn new(points_per_correct: u32) -> Self {
        Self {
            points: 0,
            total_questions: 0,
            correct: 0,
            incorrect: 0,
            points_per_correct,
        }
    }

    pub fn answer_correct(&mut self) {
        self.answer_correct_with(self.points_per_correct);
    }

    /// Correct answer worth a custom number of points, e.g. after a reveal penalty.
    pub fn answer_correct_with(&mut self, points: u32) {
        self.correct = self.correct.saturating_add(1);
        self.points = self.points.saturating_add(points);
    }

    pub fn answer_incorrect(&mut self) {
        self.incorrect = self.incorrect.saturating_add(1);
    }

    pub fn set_total_questions(&mut self, total: u32) {
        self.total_questions = total;
    }

    /// Zeroes every counter; the points rule is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.points_per_correct);
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
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
    pub fn points_per_correct(&self) -> u32 {
        self.points_per_correct
    }
}
