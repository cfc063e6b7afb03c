use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Args, Parser, Subcommand};

use lesson_core::model::{Expected, Question, QuestionKind, Response, UnknownQuestionKind};
use services::{GameSettings, SessionEvent};

#[derive(Debug, Parser)]
#[command(name = "app", version, about = "Vocabulary games in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play one game against a vocabulary file
    Play(PlayArgs),
    /// List the available game modes
    Modes,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// JSON array of {word, meaning, image?, audio?, exampleSentenceEn?, exampleSentenceVi?}
    #[arg(long, env = "LEARN_VOCAB")]
    pub vocab: PathBuf,

    #[arg(long, env = "LEARN_MODE", default_value = "meaning-to-word")]
    pub mode: Mode,

    /// Questions (or pairs) per session; all eligible words when omitted
    #[arg(long, env = "LEARN_COUNT")]
    pub count: Option<usize>,

    #[arg(long, default_value_t = 3)]
    pub distractors: usize,

    /// Wait before the next question after feedback; 0 waits for :next
    #[arg(long, default_value_t = 1_500)]
    pub advance_delay_ms: u64,

    /// Seed for reproducible shuffles
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PlayArgs {
    pub fn settings(&self) -> GameSettings {
        GameSettings::default()
            .with_question_count(self.count)
            .with_distractors(self.distractors)
            .with_advance_delay_ms(self.advance_delay_ms)
            .with_auto_advance(self.advance_delay_ms > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Quiz(QuestionKind),
    Matching,
}

impl Mode {
    pub fn all() -> impl Iterator<Item = Mode> {
        QuestionKind::ALL
            .into_iter()
            .map(Mode::Quiz)
            .chain(std::iter::once(Mode::Matching))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Quiz(kind) => kind.fmt(f),
            Mode::Matching => f.write_str("matching"),
        }
    }
}

impl FromStr for Mode {
    type Err = UnknownQuestionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matching" | "memory" => Ok(Mode::Matching),
            other => other.parse().map(Mode::Quiz),
        }
    }
}

/// Map a typed line to a driver event. Blank lines are ignored.
///
/// Numbers pick options of choice questions (1-based); select-all takes a
/// comma-separated list of numbers or words, and so does a cloze with several gaps.
/// `:open N` uncovers tile N of a hidden picture.
pub fn parse_quiz_input(line: &str, current: Option<&Question>) -> Option<SessionEvent> {
    let line = line.trim();
    match line {
        "" => return None,
        ":q" | ":quit" => return Some(SessionEvent::Quit),
        ":r" | ":restart" => return Some(SessionEvent::Restart),
        ":n" | ":next" => return Some(SessionEvent::Next),
        ":s" | ":start" => return Some(SessionEvent::Start),
        _ => {}
    }
    if let Some(tile) = line.strip_prefix(":open") {
        let tile = tile.trim().parse::<usize>().ok()?;
        return Some(SessionEvent::Reveal(tile.saturating_sub(1)));
    }

    let response = match current.map(Question::expected) {
        Some(Expected::Choice { options, .. }) => match option_index(line, options.len()) {
            Some(index) => Response::Option(index),
            None => Response::text(line),
        },
        Some(Expected::Keys { options, .. }) => Response::keys(line.split(',').map(|part| {
            let part = part.trim();
            option_index(part, options.len())
                .map_or_else(|| part.to_owned(), |i| options[i].clone())
        })),
        _ => Response::text(line),
    };
    Some(SessionEvent::Submit(response))
}

fn option_index(raw: &str, len: usize) -> Option<usize> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchingInput {
    Pick(Vec<usize>),
    Restart,
    Quit,
    Unknown,
}

/// Tile numbers are 1-based, separated by spaces or commas.
pub fn parse_matching_input(line: &str) -> MatchingInput {
    match line.trim() {
        ":q" | ":quit" => MatchingInput::Quit,
        ":r" | ":restart" => MatchingInput::Restart,
        other => {
            let picks: Option<Vec<usize>> = other
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().ok())
                .collect();
            match picks {
                Some(picks) if !picks.is_empty() => MatchingInput::Pick(picks),
                _ => MatchingInput::Unknown,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{Prompt, VocabId};

    fn choice() -> Question {
        Question::new(
            VocabId::new(0),
            QuestionKind::MeaningToWord,
            Prompt::Text {
                text: "cây bút".into(),
            },
            Expected::Choice {
                options: vec!["pen".into(), "ruler".into()],
                correct: 0,
            },
        )
        .unwrap()
    }

    #[test]
    fn cli_parses_play_flags() {
        let cli = Cli::try_parse_from([
            "app", "play", "--vocab", "words.json", "--mode", "anagram", "--count", "5", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.mode, Mode::Quiz(QuestionKind::Anagram));
        assert_eq!(args.settings().question_count, Some(5));
        assert!(args.settings().auto_advance);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = Cli::try_parse_from(["app", "play", "--vocab", "w.json", "--mode", "bubbles"]);
        assert!(err.is_err());
    }

    #[test]
    fn numbers_pick_options() {
        let q = choice();
        assert_eq!(
            parse_quiz_input("2", Some(&q)),
            Some(SessionEvent::Submit(Response::Option(1)))
        );
        assert_eq!(
            parse_quiz_input("7", Some(&q)),
            Some(SessionEvent::Submit(Response::text("7")))
        );
        assert_eq!(parse_quiz_input("  ", Some(&q)), None);
        assert_eq!(parse_quiz_input(":quit", None), Some(SessionEvent::Quit));
    }

    #[test]
    fn trailing_comma_still_answers_select_all() {
        let q = Question::new(
            VocabId::new(0),
            QuestionKind::SelectAll,
            Prompt::Text {
                text: "cặp sách".into(),
            },
            Expected::Keys {
                options: vec!["bag".into(), "desk".into(), "schoolbag".into()],
                correct: [0, 2].into_iter().collect(),
            },
        )
        .unwrap();
        let Some(SessionEvent::Submit(response)) = parse_quiz_input("1,3,", Some(&q)) else {
            panic!("expected a submission");
        };
        assert!(lesson_core::evaluate(&q, &response).correct);
    }

    #[test]
    fn open_uncovers_a_tile() {
        assert_eq!(parse_quiz_input(":open 4", None), Some(SessionEvent::Reveal(3)));
        assert_eq!(parse_quiz_input(":open x", None), None);
    }

    #[test]
    fn matching_input_reads_tile_numbers() {
        assert_eq!(parse_matching_input("3 7"), MatchingInput::Pick(vec![3, 7]));
        assert_eq!(parse_matching_input("1,2"), MatchingInput::Pick(vec![1, 2]));
        assert_eq!(parse_matching_input("x"), MatchingInput::Unknown);
        assert_eq!(parse_matching_input(":r"), MatchingInput::Restart);
    }
}
