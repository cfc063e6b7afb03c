use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use lesson_core::model::{Question, Response, SessionPhase, SessionSummary};
use lesson_core::time::Elapsed;
use lesson_core::{Clock, evaluate};

use super::progress::SessionProgress;
use super::source::QuestionSource;
use crate::error::SessionError;
use crate::feedback::{Feedback, FeedbackPresenter};
use crate::scoreboard::Scoreboard;
use crate::settings::GameSettings;

/// User action driving the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    Submit,
    Next,
    Restart,
    Reveal,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionAction::Start => "start",
            SessionAction::Submit => "submit",
            SessionAction::Next => "go to next question",
            SessionAction::Restart => "restart",
            SessionAction::Reveal => "reveal a tile",
        })
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a quiz-style game.
///
/// Questions come from the `QuestionSource` on every start and are dropped on restart.
/// Exactly one question is current while the session runs; the score only grows until
/// restart.
pub struct GameSession<S> {
    source: S,
    clock: Clock,
    presenter: FeedbackPresenter,
    phase: SessionPhase,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    scoreboard: Scoreboard,
    elapsed: Elapsed,
    feedback: BTreeMap<usize, Feedback>,
    /// Tiles opened on the current question's hidden picture.
    revealed: BTreeSet<usize>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl<S: QuestionSource> GameSession<S> {
    #[must_use]
    pub fn new(source: S, settings: &GameSettings) -> Self {
        Self {
            source,
            clock: Clock::default(),
            presenter: FeedbackPresenter::new(settings.points_per_correct),
            phase: SessionPhase::NotStarted,
            questions: Vec::new(),
            current: 0,
            score: 0,
            scoreboard: Scoreboard::new(settings.points_per_correct),
            elapsed: Elapsed::default(),
            feedback: BTreeMap::new(),
            revealed: BTreeSet::new(),
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Questions answered correctly so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    #[must_use]
    pub fn elapsed(&self) -> Elapsed {
        self.elapsed
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question on screen; `None` before start and after game over.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase.is_running() {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn feedback_for(&self, index: usize) -> Option<&Feedback> {
        self.feedback.get(&index)
    }

    #[must_use]
    pub fn feedback(&self) -> &BTreeMap<usize, Feedback> {
        &self.feedback
    }

    #[must_use]
    pub fn revealed(&self) -> &BTreeSet<usize> {
        &self.revealed
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            phase: self.phase,
            total: self.questions.len(),
            current: self.current,
            answered: self.feedback.len(),
            score: self.score,
        }
    }

    /// Generate a fresh question list and start the timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is not started,
    /// `SessionError::Empty` if the source produced no questions, and propagates
    /// generator failures. The session stays not started on error.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_phase(SessionAction::Start, SessionPhase::NotStarted)?;

        let questions = self.source.generate()?;
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.reset_state();
        self.scoreboard
            .set_total_questions(u32::try_from(questions.len()).unwrap_or(u32::MAX));
        self.questions = questions;
        self.started_at = Some(self.clock.now());
        self.phase = SessionPhase::InProgress;

        info!(total = self.questions.len(), "session started");
        Ok(())
    }

    /// Judge a response to the current question and record feedback.
    ///
    /// Blank or malformed responses count as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless a question is awaiting an answer.
    pub fn submit(&mut self, response: &Response) -> Result<&Feedback, SessionError> {
        self.expect_phase(SessionAction::Submit, SessionPhase::InProgress)?;
        let Some(question) = self.questions.get(self.current) else {
            return Err(SessionError::Empty);
        };

        let evaluation = evaluate(question, response);
        let feedback = self
            .presenter
            .present_revealed(self.current, &evaluation, self.revealed.len());
        if feedback.is_correct() {
            self.score = self.score.saturating_add(feedback.score_delta);
            self.scoreboard.answer_correct_with(feedback.points_delta);
        } else {
            self.scoreboard.answer_incorrect();
        }
        debug!(
            index = self.current,
            correct = feedback.is_correct(),
            score = self.score,
            "answer submitted"
        );

        self.phase = SessionPhase::Answering;
        let index = self.current;
        Ok(self.feedback.entry(index).or_insert(feedback))
    }

    /// Uncover one tile of the current hidden picture. Returns how many tiles are
    /// open; opening a tile twice changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless a question is awaiting an answer,
    /// `SessionError::NothingToReveal` when the question has no hidden picture, and
    /// `SessionError::NoSuchTile` for a tile outside the grid.
    pub fn reveal_tile(&mut self, tile: usize) -> Result<usize, SessionError> {
        self.expect_phase(SessionAction::Reveal, SessionPhase::InProgress)?;
        let Some(question) = self.questions.get(self.current) else {
            return Err(SessionError::Empty);
        };

        let tiles = question.reveal_tiles();
        if tiles == 0 {
            return Err(SessionError::NothingToReveal {
                kind: question.kind(),
            });
        }
        if tile >= tiles {
            return Err(SessionError::NoSuchTile {
                index: tile,
                len: tiles,
            });
        }

        if self.revealed.insert(tile) {
            debug!(tile, revealed = self.revealed.len(), "tile revealed");
        }
        Ok(self.revealed.len())
    }

    /// Move past the answered question, finishing the game after the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless feedback is being shown.
    pub fn next(&mut self) -> Result<SessionPhase, SessionError> {
        self.expect_phase(SessionAction::Next, SessionPhase::Answering)?;

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.revealed.clear();
            self.phase = SessionPhase::InProgress;
            debug!(index = self.current, "advanced to next question");
        } else {
            self.phase = SessionPhase::GameOver;
            self.completed_at = Some(self.clock.now());
            info!(
                score = self.score,
                total = self.questions.len(),
                elapsed = %self.elapsed,
                "session finished"
            );
        }
        Ok(self.phase)
    }

    /// Discard the session and return to not started. Always allowed.
    pub fn restart(&mut self) {
        self.reset_state();
        self.phase = SessionPhase::NotStarted;
        info!("session restarted");
    }

    /// One second of play time. Returns whether the timer was running.
    pub fn tick(&mut self) -> bool {
        if self.phase.is_running() {
            self.elapsed.tick();
            true
        } else {
            false
        }
    }

    /// Summary of a finished game; `None` until game over.
    ///
    /// # Errors
    ///
    /// Propagates `SessionSummaryError` if the counters are inconsistent.
    pub fn summary(&self) -> Result<Option<SessionSummary>, SessionError> {
        let (SessionPhase::GameOver, Some(started_at), Some(completed_at)) =
            (self.phase, self.started_at, self.completed_at)
        else {
            return Ok(None);
        };

        Ok(Some(SessionSummary::new(
            started_at,
            completed_at,
            self.elapsed,
            self.scoreboard.total_questions(),
            self.scoreboard.correct(),
            self.scoreboard.incorrect(),
            self.scoreboard.points(),
        )?))
    }

    fn expect_phase(&self, action: SessionAction, phase: SessionPhase) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn reset_state(&mut self) {
        self.questions.clear();
        self.current = 0;
        self.score = 0;
        self.scoreboard.reset();
        self.elapsed = Elapsed::default();
        self.feedback.clear();
        self.revealed.clear();
        self.started_at = None;
        self.completed_at = None;
    }
}

impl<S> fmt::Debug for GameSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("elapsed", &self.elapsed)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
