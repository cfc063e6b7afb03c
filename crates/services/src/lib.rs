#![forbid(unsafe_code)]

pub mod error;
pub mod feedback;
pub mod generator;
pub mod matching;
pub mod scoreboard;
pub mod sessions;
pub mod settings;

pub use lesson_core::Clock;
pub use sessions as session;

pub use error::{GeneratorError, SessionError};
pub use feedback::{Feedback, FeedbackPresenter, Verdict};
pub use generator::QuestionGenerator;
pub use matching::{MatchingBoard, Selection, Tile, TileSide};
pub use scoreboard::Scoreboard;
pub use settings::GameSettings;

pub use sessions::{
    FixedQuestions, GameSession, QuestionSource, SessionAction, SessionDriver, SessionEvent,
    SessionProgress, SessionUpdate, VocabQuiz,
};
