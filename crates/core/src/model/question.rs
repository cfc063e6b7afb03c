use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::VocabId;
use crate::model::vocab::MediaRef;
use crate::normalize::normalize_answer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected answer is empty")]
    EmptyAnswer,

    #[error("correct option {index} is out of range for {len} options")]
    CorrectOutOfRange { index: usize, len: usize },

    #[error("option {option:?} appears more than once")]
    DuplicateOption { option: String },

    #[error("select-all question has no correct options")]
    NoCorrectOptions,

    #[error("passage has {blanks} blanks but {words} words to fill")]
    BlankCountMismatch { blanks: usize, words: usize },
}

/// Marker for a gap in a cloze passage.
pub const CLOZE_BLANK: &str = "_____";

/// Side length of the tile grid covering an image-reveal picture.
pub const REVEAL_GRID: usize = 4;

/// The family of game a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Localized meaning shown, pick the English word.
    MeaningToWord,
    /// English word shown, pick the localized meaning.
    WordToMeaning,
    /// Picture shown, pick the English word.
    PictureChoice,
    /// Picture shown, pick the localized meaning.
    PictureToMeaning,
    /// Picture hidden under tiles; every tile opened costs a point.
    ImageReveal,
    /// Picture or audio shown, type the English word.
    Typing,
    /// Audio or example sentence, type the whole sentence.
    SentenceTyping,
    /// Scrambled letters, rebuild the word.
    Anagram,
    /// Scrambled tokens, rebuild the sentence.
    Unjumble,
    /// Meaning shown, select every option that matches.
    SelectAll,
    /// Sentence with the word blanked out, fill every gap.
    Cloze,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 11] = [
        QuestionKind::MeaningToWord,
        QuestionKind::WordToMeaning,
        QuestionKind::PictureChoice,
        QuestionKind::PictureToMeaning,
        QuestionKind::ImageReveal,
        QuestionKind::Typing,
        QuestionKind::SentenceTyping,
        QuestionKind::Anagram,
        QuestionKind::Unjumble,
        QuestionKind::SelectAll,
        QuestionKind::Cloze,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MeaningToWord => "meaning-to-word",
            QuestionKind::WordToMeaning => "word-to-meaning",
            QuestionKind::PictureChoice => "picture-choice",
            QuestionKind::PictureToMeaning => "picture-to-meaning",
            QuestionKind::ImageReveal => "image-reveal",
            QuestionKind::Typing => "typing",
            QuestionKind::SentenceTyping => "sentence-typing",
            QuestionKind::Anagram => "anagram",
            QuestionKind::Unjumble => "unjumble",
            QuestionKind::SelectAll => "select-all",
            QuestionKind::Cloze => "cloze",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown question kind: {0}")]
pub struct UnknownQuestionKind(pub String);

impl FromStr for QuestionKind {
    type Err = UnknownQuestionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownQuestionKind(s.to_owned()))
    }
}

/// What the player is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prompt {
    Text { text: String },
    Image { image: MediaRef },
    /// `text` is what a speech engine reads when no clip is attached.
    Audio { clip: Option<MediaRef>, text: String },
    Letters { hint: String, letters: Vec<char> },
    Tokens { hint: String, tokens: Vec<String> },
    /// Picture covered by a `grid` x `grid` board of tiles.
    Hidden { image: MediaRef, grid: usize },
    /// Text around the gaps (`parts.len()` is one more than the gap count) and the
    /// word bank offered to the player.
    Cloze { parts: Vec<String>, bank: Vec<String> },
}

/// The correct value(s) a response is judged against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expected {
    Text { answer: String },
    Choice { options: Vec<String>, correct: usize },
    Sequence { tokens: Vec<String> },
    Keys { options: Vec<String>, correct: BTreeSet<usize> },
    /// One answer per gap, in order.
    Blanks { answers: Vec<String> },
}

impl Expected {
    /// Human-readable correct answer for feedback messages.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Expected::Text { answer } => answer.clone(),
            Expected::Choice { options, correct } => {
                options.get(*correct).cloned().unwrap_or_default()
            }
            Expected::Sequence { tokens } => tokens.join(" "),
            Expected::Keys { options, correct } => correct
                .iter()
                .filter_map(|i| options.get(*i).map(String::as_str))
                .collect::<Vec<_>>()
                .join(", "),
            Expected::Blanks { answers } => answers.join(", "),
        }
    }

    /// Normalized form of every string that counts as a correct answer.
    ///
    /// Single-answer kinds return one entry; select-all returns each correct key.
    #[must_use]
    pub fn normalized_answers(&self) -> Vec<String> {
        match self {
            Expected::Text { answer } => vec![normalize_answer(answer)],
            Expected::Choice { options, correct } => options
                .get(*correct)
                .map(|o| vec![normalize_answer(o)])
                .unwrap_or_default(),
            Expected::Sequence { tokens } => vec![normalize_answer(&tokens.join(" "))],
            Expected::Keys { options, correct } => correct
                .iter()
                .filter_map(|i| options.get(*i))
                .map(|o| normalize_answer(o))
                .collect(),
            Expected::Blanks { answers } => answers.iter().map(|a| normalize_answer(a)).collect(),
        }
    }
}

/// What the player handed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Response {
    Text(String),
    Option(usize),
    Tokens(Vec<String>),
    Keys(BTreeSet<String>),
}

impl Response {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[must_use]
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keys(keys.into_iter().map(Into::into).collect())
    }
}

/// One generated question. Ephemeral: rebuilt every time a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    source: VocabId,
    kind: QuestionKind,
    prompt: Prompt,
    expected: Expected,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` when the expected value cannot be answered: blank text,
    /// an out-of-range correct option, options that collide after normalization, or a
    /// select-all question without correct keys.
    pub fn new(
        source: VocabId,
        kind: QuestionKind,
        prompt: Prompt,
        expected: Expected,
    ) -> Result<Self, QuestionError> {
        match &expected {
            Expected::Text { answer } => {
                if normalize_answer(answer).is_empty() {
                    return Err(QuestionError::EmptyAnswer);
                }
            }
            Expected::Sequence { tokens } => {
                if normalize_answer(&tokens.join(" ")).is_empty() {
                    return Err(QuestionError::EmptyAnswer);
                }
            }
            Expected::Choice { options, correct } => {
                check_options(options)?;
                if *correct >= options.len() {
                    return Err(QuestionError::CorrectOutOfRange {
                        index: *correct,
                        len: options.len(),
                    });
                }
            }
            Expected::Keys { options, correct } => {
                check_options(options)?;
                if correct.is_empty() {
                    return Err(QuestionError::NoCorrectOptions);
                }
                if let Some(index) = correct.iter().find(|i| **i >= options.len()) {
                    return Err(QuestionError::CorrectOutOfRange {
                        index: *index,
                        len: options.len(),
                    });
                }
            }
            Expected::Blanks { answers } => {
                if answers.is_empty() || answers.iter().any(|a| normalize_answer(a).is_empty()) {
                    return Err(QuestionError::EmptyAnswer);
                }
                if let Prompt::Cloze { parts, .. } = &prompt {
                    if parts.len() != answers.len() + 1 {
                        return Err(QuestionError::BlankCountMismatch {
                            blanks: parts.len().saturating_sub(1),
                            words: answers.len(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            source,
            kind,
            prompt,
            expected,
        })
    }

    /// Cloze question from a passage marked with [`CLOZE_BLANK`] gaps and the words
    /// that fill them, in order. The word bank lists the same words.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::BlankCountMismatch` when gaps and words disagree, and
    /// `QuestionError::EmptyAnswer` for a passage without gaps or a blank word.
    pub fn cloze_passage(
        source: VocabId,
        paragraph: &str,
        words: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let parts: Vec<String> = paragraph.split(CLOZE_BLANK).map(str::to_owned).collect();
        if parts.len() != words.len() + 1 {
            return Err(QuestionError::BlankCountMismatch {
                blanks: parts.len() - 1,
                words: words.len(),
            });
        }
        Self::new(
            source,
            QuestionKind::Cloze,
            Prompt::Cloze {
                parts,
                bank: words.clone(),
            },
            Expected::Blanks { answers: words },
        )
    }

    #[must_use]
    pub fn source(&self) -> VocabId {
        self.source
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    #[must_use]
    pub fn expected(&self) -> &Expected {
        &self.expected
    }

    /// Options to render for choice-style questions; empty for typed answers.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match &self.expected {
            Expected::Choice { options, .. } | Expected::Keys { options, .. } => options,
            Expected::Text { .. } | Expected::Sequence { .. } | Expected::Blanks { .. } => &[],
        }
    }

    /// Number of tiles covering the picture; zero when nothing is hidden.
    #[must_use]
    pub fn reveal_tiles(&self) -> usize {
        match &self.prompt {
            Prompt::Hidden { grid, .. } => grid * grid,
            _ => 0,
        }
    }
}

fn check_options(options: &[String]) -> Result<(), QuestionError> {
    let mut seen = BTreeSet::new();
    for option in options {
        let key = normalize_answer(option);
        if key.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        if !seen.insert(key) {
            return Err(QuestionError::DuplicateOption {
                option: option.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(options: &[&str], correct: usize) -> Result<Question, QuestionError> {
        Question::new(
            VocabId::new(0),
            QuestionKind::MeaningToWord,
            Prompt::Text {
                text: "cây bút".into(),
            },
            Expected::Choice {
                options: options.iter().map(|s| (*s).to_owned()).collect(),
                correct,
            },
        )
    }

    #[test]
    fn choice_rejects_out_of_range_correct() {
        let err = choice(&["pen", "ruler"], 2).unwrap_err();
        assert_eq!(err, QuestionError::CorrectOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn choice_rejects_options_equal_after_normalization() {
        let err = choice(&["Pen", "pen."], 0).unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateOption { .. }));
    }

    #[test]
    fn blank_typed_answer_is_rejected() {
        let err = Question::new(
            VocabId::new(0),
            QuestionKind::Typing,
            Prompt::Text { text: "x".into() },
            Expected::Text { answer: " ?! ".into() },
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer);
    }

    #[test]
    fn keys_need_at_least_one_correct() {
        let err = Question::new(
            VocabId::new(0),
            QuestionKind::SelectAll,
            Prompt::Text { text: "x".into() },
            Expected::Keys {
                options: vec!["a".into(), "b".into()],
                correct: BTreeSet::new(),
            },
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::NoCorrectOptions);
    }

    #[test]
    fn display_shows_the_correct_value() {
        let q = choice(&["pen", "ruler", "book"], 1).unwrap();
        assert_eq!(q.expected().display(), "ruler");
        assert_eq!(q.options().len(), 3);

        let seq = Expected::Sequence {
            tokens: vec!["I".into(), "like".into(), "books.".into()],
        };
        assert_eq!(seq.display(), "I like books.");
        assert_eq!(seq.normalized_answers(), vec!["i like books".to_owned()]);
    }

    #[test]
    fn cloze_passage_needs_one_word_per_gap() {
        let q = Question::cloze_passage(
            VocabId::new(0),
            "I write with a _____ and measure with a _____.",
            vec!["pen".into(), "ruler".into()],
        )
        .unwrap();
        let Prompt::Cloze { parts, bank } = q.prompt() else {
            panic!("expected a cloze prompt");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(bank, &["pen".to_owned(), "ruler".to_owned()]);
        assert_eq!(q.expected().display(), "pen, ruler");

        let err = Question::cloze_passage(VocabId::new(0), "One _____ only.", vec![]).unwrap_err();
        assert_eq!(err, QuestionError::BlankCountMismatch { blanks: 1, words: 0 });
        let err = Question::cloze_passage(VocabId::new(0), "No gaps.", vec![]).unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer);
    }

    #[test]
    fn hidden_picture_reports_its_tiles() {
        let q = Question::new(
            VocabId::new(0),
            QuestionKind::ImageReveal,
            Prompt::Hidden {
                image: MediaRef::parse("img/pen.png").unwrap(),
                grid: REVEAL_GRID,
            },
            Expected::Choice {
                options: vec!["pen".into(), "ruler".into()],
                correct: 0,
            },
        )
        .unwrap();
        assert_eq!(q.reveal_tiles(), 16);
        assert_eq!(choice(&["pen"], 0).unwrap().reveal_tiles(), 0);
    }

    #[test]
    fn kind_parses_from_its_name() {
        for kind in QuestionKind::ALL {
            assert_eq!(kind.as_str().parse::<QuestionKind>().unwrap(), kind);
        }
        assert!("bubble-shooter".parse::<QuestionKind>().is_err());
    }
}
