mod ids;
mod question;
mod session;
mod vocab;

pub use ids::{ParseIdError, TileId, VocabId};

pub use question::{
    CLOZE_BLANK, Expected, Prompt, Question, QuestionError, QuestionKind, REVEAL_GRID, Response,
    UnknownQuestionKind,
};
pub use session::{SessionPhase, SessionSummary, SessionSummaryError};
pub use vocab::{ExampleSentence, MediaRef, VocabDraft, VocabError, VocabItem, Vocabulary};
