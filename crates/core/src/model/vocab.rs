use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::VocabId;
use crate::normalize::normalize_answer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VocabError {
    #[error("word must not be empty")]
    EmptyWord,

    #[error("meaning of {word:?} must not be empty")]
    EmptyMeaning { word: String },

    #[error("{word:?} appears more than once (first at {first})")]
    DuplicateWord { word: String, first: VocabId },

    #[error("too many vocabulary items: {len}")]
    TooManyItems { len: usize },
}

/// Path or URL of an image or audio clip attached to a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    /// Returns `None` for blank references so optional media stays truly optional.
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An example sentence in English plus its translation, when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub english: String,
    pub translation: Option<String>,
}

/// Raw vocabulary entry as it appears in lesson data files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabDraft {
    pub word: String,
    #[serde(alias = "vietnameseMeaning")]
    pub meaning: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub example_sentence_en: Option<String>,
    #[serde(default)]
    pub example_sentence_vi: Option<String>,
}

impl VocabDraft {
    #[must_use]
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    #[must_use]
    pub fn with_example(mut self, english: impl Into<String>, translation: Option<String>) -> Self {
        self.example_sentence_en = Some(english.into());
        self.example_sentence_vi = translation;
        self
    }

    /// # Errors
    ///
    /// Returns `VocabError::EmptyWord` or `VocabError::EmptyMeaning` for blank fields.
    pub fn validate(self, id: VocabId) -> Result<VocabItem, VocabError> {
        let word = self.word.trim().to_owned();
        if word.is_empty() {
            return Err(VocabError::EmptyWord);
        }
        let meaning = self.meaning.trim().to_owned();
        if meaning.is_empty() {
            return Err(VocabError::EmptyMeaning { word });
        }

        let example = self
            .example_sentence_en
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .map(|english| ExampleSentence {
                english,
                translation: self
                    .example_sentence_vi
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty()),
            });

        Ok(VocabItem {
            id,
            word,
            meaning,
            image: self.image.and_then(MediaRef::parse),
            audio: self.audio.and_then(MediaRef::parse),
            example,
        })
    }
}

/// A validated word/meaning pair; immutable for the life of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabItem {
    id: VocabId,
    word: String,
    meaning: String,
    image: Option<MediaRef>,
    audio: Option<MediaRef>,
    example: Option<ExampleSentence>,
}

impl VocabItem {
    #[must_use]
    pub fn id(&self) -> VocabId {
        self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn image(&self) -> Option<&MediaRef> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn audio(&self) -> Option<&MediaRef> {
        self.audio.as_ref()
    }

    #[must_use]
    pub fn example(&self) -> Option<&ExampleSentence> {
        self.example.as_ref()
    }
}

/// Ordered source data for a game. Ids are positions in the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    items: Vec<VocabItem>,
}

impl Vocabulary {
    /// Validate drafts in order, assigning ids by position.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or `VocabError::DuplicateWord` when two
    /// entries normalize to the same word.
    pub fn new(drafts: impl IntoIterator<Item = VocabDraft>) -> Result<Self, VocabError> {
        let mut items = Vec::new();
        let mut seen: HashMap<String, VocabId> = HashMap::new();

        for (pos, draft) in drafts.into_iter().enumerate() {
            let id = u32::try_from(pos)
                .map(VocabId::new)
                .map_err(|_| VocabError::TooManyItems { len: pos })?;
            let item = draft.validate(id)?;
            let key = normalize_answer(item.word());
            if let Some(first) = seen.get(&key) {
                return Err(VocabError::DuplicateWord {
                    word: item.word,
                    first: *first,
                });
            }
            seen.insert(key, id);
            items.push(item);
        }

        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[VocabItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: VocabId) -> Option<&VocabItem> {
        self.items.get(id.index())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_drops_blank_media() {
        let item = VocabDraft::new("  pen ", " cây bút ")
            .with_image("   ")
            .with_audio("audio/pen.mp3")
            .validate(VocabId::new(0))
            .unwrap();

        assert_eq!(item.word(), "pen");
        assert_eq!(item.meaning(), "cây bút");
        assert!(item.image().is_none());
        assert_eq!(item.audio().unwrap().as_str(), "audio/pen.mp3");
    }

    #[test]
    fn blank_word_is_rejected() {
        let err = VocabDraft::new(" ", "x").validate(VocabId::new(0)).unwrap_err();
        assert_eq!(err, VocabError::EmptyWord);
    }

    #[test]
    fn blank_meaning_is_rejected() {
        let err = VocabDraft::new("pen", "").validate(VocabId::new(0)).unwrap_err();
        assert!(matches!(err, VocabError::EmptyMeaning { .. }));
    }

    #[test]
    fn vocabulary_rejects_words_equal_after_normalization() {
        let err = Vocabulary::new([
            VocabDraft::new("Ruler", "thước kẻ"),
            VocabDraft::new("pen", "bút"),
            VocabDraft::new("ruler!", "cái thước"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            VocabError::DuplicateWord {
                word: "ruler!".into(),
                first: VocabId::new(0)
            }
        );
    }

    #[test]
    fn example_without_english_is_dropped() {
        let mut draft = VocabDraft::new("book", "quyển sách");
        draft.example_sentence_vi = Some("Đây là quyển sách.".into());
        let item = draft.validate(VocabId::new(0)).unwrap();
        assert!(item.example().is_none());
    }

    #[test]
    fn drafts_deserialize_from_lesson_json() {
        let json = r#"[
            {"word": "eraser", "vietnameseMeaning": "cục tẩy", "image": "img/eraser.png",
             "exampleSentenceEn": "This is my eraser.", "exampleSentenceVi": "Đây là cục tẩy của tôi."}
        ]"#;
        let drafts: Vec<VocabDraft> = serde_json::from_str(json).unwrap();
        let vocab = Vocabulary::new(drafts).unwrap();

        let item = vocab.get(VocabId::new(0)).unwrap();
        assert_eq!(item.meaning(), "cục tẩy");
        assert_eq!(item.image().unwrap().as_str(), "img/eraser.png");
        assert_eq!(item.example().unwrap().english, "This is my eraser.");
    }
}
