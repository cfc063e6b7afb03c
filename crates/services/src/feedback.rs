use serde::Serialize;

use lesson_core::Evaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// What the player sees after submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub question_index: usize,
    pub verdict: Verdict,
    /// Change to the session score (questions answered correctly).
    pub score_delta: u32,
    /// Change to the scoreboard points.
    pub points_delta: u32,
    pub submitted: String,
    pub expected: String,
    pub message: String,
}

impl Feedback {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

/// Turns evaluator output into player-facing feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackPresenter {
    points_per_correct: u32,
}

impl FeedbackPresenter {
    #[must_use]
    pub fn new(points_per_correct: u32) -> Self {
        Self { points_per_correct }
    }

    #[must_use]
    pub fn present(&self, question_index: usize, evaluation: &Evaluation) -> Feedback {
        self.present_revealed(question_index, evaluation, 0)
    }

    /// Like `present`, but every revealed tile costs one point. A correct answer
    /// always earns at least one point.
    #[must_use]
    pub fn present_revealed(
        &self,
        question_index: usize,
        evaluation: &Evaluation,
        revealed: usize,
    ) -> Feedback {
        if evaluation.correct {
            let penalty = u32::try_from(revealed).unwrap_or(u32::MAX);
            let message = if revealed == 0 {
                "Correct!".to_owned()
            } else {
                format!("Correct! ({revealed} tiles revealed)")
            };
            Feedback {
                question_index,
                verdict: Verdict::Correct,
                score_delta: 1,
                points_delta: self.points_per_correct.saturating_sub(penalty).max(1),
                submitted: evaluation.submitted.clone(),
                expected: evaluation.expected.clone(),
                message,
            }
        } else {
            Feedback {
                question_index,
                verdict: Verdict::Incorrect,
                score_delta: 0,
                points_delta: 0,
                submitted: evaluation.submitted.clone(),
                expected: evaluation.expected.clone(),
                message: format!("Incorrect. The answer is: {}", evaluation.expected),
            }
        }
    }
}
