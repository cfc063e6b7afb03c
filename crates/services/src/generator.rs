use std::collections::{BTreeSet, HashSet};

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use tracing::debug;

use lesson_core::model::{
    Expected, Prompt, Question, QuestionKind, REVEAL_GRID, VocabItem, Vocabulary,
};
use lesson_core::normalize_answer;

use crate::error::GeneratorError;

const DEFAULT_DISTRACTORS: usize = 3;

/// Builds fresh, shuffled question lists from a vocabulary.
///
/// Every call reshuffles; seed the generator for reproducible sessions.
pub struct QuestionGenerator {
    rng: StdRng,
    distractors: usize,
}

impl Default for QuestionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            distractors: DEFAULT_DISTRACTORS,
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            distractors: DEFAULT_DISTRACTORS,
        }
    }

    /// Number of wrong options next to the correct one. Fewer are used when the
    /// vocabulary cannot supply enough distinct answers.
    #[must_use]
    pub fn with_distractors(mut self, distractors: usize) -> Self {
        self.distractors = distractors;
        self
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Shuffled selection of items able to produce `kind` questions, capped at `count`.
    ///
    /// `None` for `kind` accepts every item.
    pub fn pick<'v>(
        &mut self,
        vocab: &'v Vocabulary,
        kind: Option<QuestionKind>,
        count: Option<usize>,
    ) -> Vec<&'v VocabItem> {
        let mut eligible: Vec<&VocabItem> = vocab
            .items()
            .iter()
            .filter(|item| kind.is_none_or(|kind| is_eligible(item, kind)))
            .collect();
        eligible.shuffle(&mut self.rng);
        if let Some(count) = count {
            eligible.truncate(count);
        }
        eligible
    }

    /// Generate `min(count, eligible)` questions of one kind.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::EmptyVocabulary` for an empty vocabulary and
    /// `GeneratorError::NoEligibleItems` when no item carries what `kind` needs.
    pub fn generate(
        &mut self,
        vocab: &Vocabulary,
        kind: QuestionKind,
        count: Option<usize>,
    ) -> Result<Vec<Question>, GeneratorError> {
        if vocab.is_empty() {
            return Err(GeneratorError::EmptyVocabulary);
        }

        let picked = self.pick(vocab, Some(kind), count);
        if picked.is_empty() && count != Some(0) {
            return Err(GeneratorError::NoEligibleItems { kind });
        }

        let questions = picked
            .into_iter()
            .map(|item| self.build(vocab, item, kind))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(kind = %kind, count = questions.len(), "generated questions");
        Ok(questions)
    }

    /// Fisher–Yates over the letters. A result equal to the word (ignoring case)
    /// gets its first letter swapped with the first different letter, so only words
    /// made of one repeated letter can come back unchanged.
    pub fn scramble_word(&mut self, word: &str) -> Vec<char> {
        let mut letters: Vec<char> = word.chars().collect();
        letters.shuffle(&mut self.rng);

        let scrambled: String = letters.iter().collect();
        if scrambled.to_lowercase() != word.to_lowercase() {
            return letters;
        }
        if let Some(&first) = letters.first() {
            let differs = |c: &char| !c.to_lowercase().eq(first.to_lowercase());
            if let Some(j) = letters.iter().position(differs) {
                letters.swap(0, j);
            }
        }
        letters
    }

    fn build(
        &mut self,
        vocab: &Vocabulary,
        item: &VocabItem,
        kind: QuestionKind,
    ) -> Result<Question, GeneratorError> {
        let (prompt, expected) = match kind {
            QuestionKind::MeaningToWord => (
                Prompt::Text {
                    text: item.meaning().to_owned(),
                },
                self.choice(&word_rivals(vocab, item), item, VocabItem::word),
            ),
            QuestionKind::WordToMeaning => (
                Prompt::Text {
                    text: item.word().to_owned(),
                },
                self.choice(&everything(vocab), item, VocabItem::meaning),
            ),
            QuestionKind::PictureChoice => {
                let image = item
                    .image()
                    .cloned()
                    .ok_or(GeneratorError::NoEligibleItems { kind })?;
                (
                    Prompt::Image { image },
                    self.choice(&word_rivals(vocab, item), item, VocabItem::word),
                )
            }
            QuestionKind::PictureToMeaning => {
                let image = item
                    .image()
                    .cloned()
                    .ok_or(GeneratorError::NoEligibleItems { kind })?;
                (
                    Prompt::Image { image },
                    self.choice(&everything(vocab), item, VocabItem::meaning),
                )
            }
            QuestionKind::ImageReveal => {
                let image = item
                    .image()
                    .cloned()
                    .ok_or(GeneratorError::NoEligibleItems { kind })?;
                (
                    Prompt::Hidden {
                        image,
                        grid: REVEAL_GRID,
                    },
                    self.choice(&word_rivals(vocab, item), item, VocabItem::word),
                )
            }
            QuestionKind::Typing => {
                let prompt = if let Some(image) = item.image() {
                    Prompt::Image {
                        image: image.clone(),
                    }
                } else if let Some(clip) = item.audio() {
                    Prompt::Audio {
                        clip: Some(clip.clone()),
                        text: item.word().to_owned(),
                    }
                } else {
                    Prompt::Text {
                        text: item.meaning().to_owned(),
                    }
                };
                (
                    prompt,
                    Expected::Text {
                        answer: item.word().to_owned(),
                    },
                )
            }
            QuestionKind::SentenceTyping => {
                let example = item
                    .example()
                    .ok_or(GeneratorError::NoEligibleItems { kind })?;
                (
                    Prompt::Audio {
                        clip: None,
                        text: example.english.clone(),
                    },
                    Expected::Text {
                        answer: example.english.clone(),
                    },
                )
            }
            QuestionKind::Anagram => (
                Prompt::Letters {
                    hint: item.meaning().to_owned(),
                    letters: self.scramble_word(item.word()),
                },
                Expected::Text {
                    answer: item.word().to_owned(),
                },
            ),
            QuestionKind::Unjumble => {
                let example = item
                    .example()
                    .ok_or(GeneratorError::NoEligibleItems { kind })?;
                let tokens: Vec<String> =
                    example.english.split_whitespace().map(str::to_owned).collect();
                let mut scrambled = tokens.clone();
                scrambled.shuffle(&mut self.rng);
                let hint = example
                    .translation
                    .clone()
                    .unwrap_or_else(|| item.meaning().to_owned());
                (
                    Prompt::Tokens {
                        hint,
                        tokens: scrambled,
                    },
                    Expected::Sequence { tokens },
                )
            }
            QuestionKind::SelectAll => (
                Prompt::Text {
                    text: item.meaning().to_owned(),
                },
                self.select_all(vocab, item),
            ),
            QuestionKind::Cloze => {
                let (parts, answers) = item
                    .example()
                    .and_then(|e| cloze_gaps(&e.english, item.word()))
                    .ok_or(GeneratorError::NoEligibleItems { kind })?;
                let mut excluded = HashSet::from([normalize_answer(item.word())]);
                let mut bank = sample_from(
                    &mut self.rng,
                    &word_rivals(vocab, item),
                    VocabItem::word,
                    &mut excluded,
                    self.distractors,
                );
                bank.push(item.word().to_owned());
                bank.shuffle(&mut self.rng);
                (Prompt::Cloze { parts, bank }, Expected::Blanks { answers })
            }
        };

        Ok(Question::new(item.id(), kind, prompt, expected)?)
    }

    /// Correct answer plus up to `distractors` distinct wrong ones from `pool`, in
    /// random order.
    fn choice(
        &mut self,
        pool: &[&VocabItem],
        item: &VocabItem,
        answer_of: fn(&VocabItem) -> &str,
    ) -> Expected {
        let answer = answer_of(item).to_owned();
        let mut excluded = HashSet::from([normalize_answer(&answer)]);
        let mut options =
            sample_from(&mut self.rng, pool, answer_of, &mut excluded, self.distractors);

        let correct = self.rng.random_range(0..=options.len());
        options.insert(correct, answer);
        Expected::Choice { options, correct }
    }

    /// Every word sharing this item's meaning is correct; the rest are distractors.
    fn select_all(&mut self, vocab: &Vocabulary, item: &VocabItem) -> Expected {
        let meaning = normalize_answer(item.meaning());
        let right: Vec<String> = vocab
            .items()
            .iter()
            .filter(|other| normalize_answer(other.meaning()) == meaning)
            .map(|other| other.word().to_owned())
            .collect();

        let mut excluded: HashSet<String> = right.iter().map(|w| normalize_answer(w)).collect();
        let wrong_pool: Vec<&VocabItem> = vocab
            .items()
            .iter()
            .filter(|other| normalize_answer(other.meaning()) != meaning)
            .collect();
        let wrong = sample_from(&mut self.rng, &wrong_pool, VocabItem::word, &mut excluded, self.distractors);

        let mut tagged: Vec<(bool, String)> = right
            .into_iter()
            .map(|w| (true, w))
            .chain(wrong.into_iter().map(|w| (false, w)))
            .collect();
        tagged.shuffle(&mut self.rng);

        let correct: BTreeSet<usize> = tagged
            .iter()
            .enumerate()
            .filter_map(|(i, (is_right, _))| is_right.then_some(i))
            .collect();
        let options = tagged.into_iter().map(|(_, w)| w).collect();
        Expected::Keys { options, correct }
    }
}

fn everything(vocab: &Vocabulary) -> Vec<&VocabItem> {
    vocab.items().iter().collect()
}

/// Items whose words cannot also answer a prompt built from `item`'s meaning.
fn word_rivals<'v>(vocab: &'v Vocabulary, item: &VocabItem) -> Vec<&'v VocabItem> {
    let meaning = normalize_answer(item.meaning());
    vocab
        .items()
        .iter()
        .filter(|other| normalize_answer(other.meaning()) != meaning)
        .collect()
}

/// Splits `sentence` around every whole-word occurrence of `word` (ignoring case).
/// Returns the surrounding text and the matched spellings, or `None` without a match.
fn cloze_gaps(sentence: &str, word: &str) -> Option<(Vec<String>, Vec<String>)> {
    let mut parts = Vec::new();
    let mut answers = Vec::new();
    let mut rest = sentence;
    while let Some((start, end)) = find_word(rest, word) {
        parts.push(rest[..start].to_owned());
        answers.push(rest[start..end].to_owned());
        rest = &rest[end..];
    }
    if answers.is_empty() {
        return None;
    }
    parts.push(rest.to_owned());
    Some((parts, answers))
}

/// Byte range of the first whole-word, case-insensitive occurrence of `word`.
fn find_word(haystack: &str, word: &str) -> Option<(usize, usize)> {
    if word.is_empty() {
        return None;
    }
    haystack.char_indices().find_map(|(start, _)| {
        let boundary_before = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        if !boundary_before {
            return None;
        }
        let mut hay = haystack[start..].chars();
        let mut end = start;
        for wanted in word.chars() {
            let found = hay.next()?;
            if !found.to_lowercase().eq(wanted.to_lowercase()) {
                return None;
            }
            end += found.len_utf8();
        }
        let boundary_after = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        boundary_after.then_some((start, end))
    })
}

/// Distinct answers drawn without replacement, skipping anything in `excluded`.
fn sample_from(
    rng: &mut StdRng,
    pool: &[&VocabItem],
    answer_of: fn(&VocabItem) -> &str,
    excluded: &mut HashSet<String>,
    count: usize,
) -> Vec<String> {
    let candidates: Vec<&str> = pool
        .iter()
        .map(|item| answer_of(item))
        .filter(|answer| {
            let key = normalize_answer(answer);
            !key.is_empty() && excluded.insert(key)
        })
        .collect();

    let mut picked: Vec<String> = candidates
        .choose_multiple(rng, count)
        .map(|s| (*s).to_owned())
        .collect();
    picked.shuffle(rng);
    picked
}

fn is_eligible(item: &VocabItem, kind: QuestionKind) -> bool {
    let answer_ok = match kind {
        QuestionKind::WordToMeaning | QuestionKind::PictureToMeaning => {
            !normalize_answer(item.meaning()).is_empty()
        }
        _ => !normalize_answer(item.word()).is_empty(),
    };
    answer_ok
        && match kind {
            QuestionKind::PictureChoice
            | QuestionKind::PictureToMeaning
            | QuestionKind::ImageReveal => item.image().is_some(),
            QuestionKind::Cloze => item
                .example()
                .is_some_and(|e| find_word(&e.english, item.word()).is_some()),
            QuestionKind::SentenceTyping => item
                .example()
                .is_some_and(|e| !normalize_answer(&e.english).is_empty()),
            QuestionKind::Unjumble => item
                .example()
                .is_some_and(|e| e.english.split_whitespace().nth(1).is_some()),
            QuestionKind::MeaningToWord
            | QuestionKind::WordToMeaning
            | QuestionKind::Typing
            | QuestionKind::Anagram
            | QuestionKind::SelectAll => true,
        }
}
