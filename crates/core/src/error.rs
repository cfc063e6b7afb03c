use thiserror::Error;

use crate::model::{QuestionError, SessionSummaryError, VocabError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Vocab(#[from] VocabError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
