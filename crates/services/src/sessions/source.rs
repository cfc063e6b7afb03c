use std::sync::Arc;

use lesson_core::model::{Question, QuestionKind, Vocabulary};

use crate::error::GeneratorError;
use crate::generator::QuestionGenerator;
use crate::settings::GameSettings;

/// Supplies a fresh question list every time a session starts.
pub trait QuestionSource {
    /// # Errors
    ///
    /// Returns `GeneratorError` when no question list can be built.
    fn generate(&mut self) -> Result<Vec<Question>, GeneratorError>;
}

/// Questions of one kind generated from a shared vocabulary.
pub struct VocabQuiz {
    vocab: Arc<Vocabulary>,
    kind: QuestionKind,
    count: Option<usize>,
    generator: QuestionGenerator,
}

impl VocabQuiz {
    #[must_use]
    pub fn new(vocab: Arc<Vocabulary>, kind: QuestionKind, settings: &GameSettings) -> Self {
        Self {
            vocab,
            kind,
            count: settings.question_count,
            generator: QuestionGenerator::new().with_distractors(settings.distractors),
        }
    }

    /// Swap in a specific generator, e.g. a seeded one.
    #[must_use]
    pub fn with_generator(mut self, generator: QuestionGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }
}

impl QuestionSource for VocabQuiz {
    fn generate(&mut self) -> Result<Vec<Question>, GeneratorError> {
        self.generator.generate(&self.vocab, self.kind, self.count)
    }
}

/// A prepared question list replayed as-is on every start.
#[derive(Debug, Clone, Default)]
pub struct FixedQuestions(pub Vec<Question>);

impl QuestionSource for FixedQuestions {
    fn generate(&mut self) -> Result<Vec<Question>, GeneratorError> {
        Ok(self.0.clone())
    }
}
