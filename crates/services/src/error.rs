//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{QuestionError, QuestionKind, SessionPhase, SessionSummaryError};

use crate::sessions::SessionAction;

/// Errors emitted by `QuestionGenerator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("vocabulary is empty")]
    EmptyVocabulary,
    #[error("no vocabulary item can produce a {kind} question")]
    NoEligibleItems { kind: QuestionKind },
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by session controllers and the matching board.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("cannot {action} while {}", .phase.as_str())]
    InvalidTransition {
        action: SessionAction,
        phase: SessionPhase,
    },
    #[error("tile {index} does not exist on a board of {len}")]
    NoSuchTile { index: usize, len: usize },
    #[error("{kind} questions have nothing to reveal")]
    NothingToReveal { kind: QuestionKind },
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
