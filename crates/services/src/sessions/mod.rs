mod driver;
mod progress;
mod service;
mod source;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use driver::{SessionDriver, SessionEvent, SessionUpdate};
pub use progress::SessionProgress;
pub use service::{GameSession, SessionAction};
pub use source::{FixedQuestions, QuestionSource, VocabQuiz};
