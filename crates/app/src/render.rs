use std::fmt::Write as _;

use lesson_core::model::{CLOZE_BLANK, Prompt, Question, QuestionKind, SessionSummary};
use services::{Feedback, MatchingBoard, Selection, TileSide};

pub fn quiz_help(kind: QuestionKind) -> String {
    let how = match kind {
        QuestionKind::MeaningToWord
        | QuestionKind::WordToMeaning
        | QuestionKind::PictureChoice
        | QuestionKind::PictureToMeaning => "type the option number or the answer",
        QuestionKind::ImageReveal => {
            "uncover tiles with `:open N` (each costs a point), then pick the word"
        }
        QuestionKind::Cloze => "fill the gaps, comma separated when there are several",
        QuestionKind::SelectAll => "list every matching option, comma separated",
        QuestionKind::Unjumble => "type the words in the right order",
        QuestionKind::Anagram => "type the word the letters spell",
        QuestionKind::Typing | QuestionKind::SentenceTyping => "type what you see or hear",
    };
    format!("== {kind} == {how}. Commands: :next :restart :quit")
}

pub fn question(index: usize, total: usize, question: &Question) -> String {
    let mut out = format!("\n[{}/{}] ", index + 1, total);
    match question.prompt() {
        Prompt::Text { text } => out.push_str(text),
        Prompt::Image { image } => {
            let _ = write!(out, "picture: {}", image.as_str());
        }
        Prompt::Audio { clip, text } => match clip {
            Some(clip) => {
                let _ = write!(out, "listen: {}", clip.as_str());
            }
            None => {
                let _ = write!(out, "listen: \"{text}\"");
            }
        },
        Prompt::Letters { hint, letters } => {
            let letters: Vec<String> = letters.iter().map(|c| c.to_uppercase().to_string()).collect();
            let _ = write!(out, "{hint}  [{}]", letters.join(" "));
        }
        Prompt::Tokens { hint, tokens } => {
            let _ = write!(out, "{hint}  [{}]", tokens.join(" / "));
        }
        Prompt::Hidden { image, grid } => {
            let _ = write!(out, "hidden picture {} under {grid}x{grid} tiles", image.as_str());
        }
        Prompt::Cloze { parts, bank } => {
            let _ = write!(out, "{}  (words: {})", parts.join(CLOZE_BLANK), bank.join(", "));
        }
    }
    for (i, option) in question.options().iter().enumerate() {
        let _ = write!(out, "\n  {}. {option}", i + 1);
    }
    out
}

pub fn revealed(tile: usize, revealed: usize, tiles: usize) -> String {
    format!("tile {} uncovered ({revealed}/{tiles} open)", tile + 1)
}

pub fn feedback(feedback: &Feedback) -> String {
    if feedback.is_correct() {
        format!("{} (+{})", feedback.message, feedback.points_delta)
    } else {
        feedback.message.clone()
    }
}

pub fn summary(summary: &SessionSummary) -> String {
    format!(
        "\nGame over: {}/{} correct ({}%), {} points in {}",
        summary.correct(),
        summary.total_questions(),
        summary.accuracy_percent(),
        summary.points(),
        summary.elapsed()
    )
}

pub fn matching_help() -> String {
    "== matching == pick two tiles by number (e.g. `3 7`). Commands: :restart :quit".to_owned()
}

pub fn board(board: &MatchingBoard) -> String {
    let mut out = format!(
        "pairs {}/{}  moves {}  time {}",
        board.matched_pairs(),
        board.total_pairs(),
        board.moves(),
        board.elapsed()
    );
    for (i, tile) in board.tiles().iter().enumerate() {
        let marker = match tile.side {
            TileSide::Word => "EN",
            TileSide::Meaning => "VI",
        };
        let text = if tile.matched { "✓" } else { tile.text.as_str() };
        let _ = write!(out, "\n  {:>2}. [{marker}] {text}", i + 1);
    }
    out
}

pub fn selection(board: &MatchingBoard, selection: &Selection) -> String {
    match selection {
        Selection::Ignored => "(ignored)".to_owned(),
        Selection::Pending { .. } => match board.selected() {
            Some(tile) => format!("picked: {}", tile.text),
            None => "picked".to_owned(),
        },
        Selection::Matched { .. } => "Match!".to_owned(),
        Selection::Mismatched { .. } => "Not a pair.".to_owned(),
        Selection::Completed { moves, elapsed, .. } => {
            format!("All pairs matched in {moves} moves ({elapsed}). :restart to play again")
        }
    }
}
