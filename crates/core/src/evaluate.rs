//! Judging a response against a question's expected value.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Expected, Question, Response};
use crate::normalize::normalize_answer;

/// Outcome of judging a single response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub correct: bool,
    /// Normalized form of what was submitted, empty for blank input.
    pub submitted: String,
    /// Correct answer as it should be shown to the player.
    pub expected: String,
}

/// Exact match after normalization; no partial credit.
///
/// Blank input and responses of the wrong shape are simply incorrect.
#[must_use]
pub fn evaluate(question: &Question, response: &Response) -> Evaluation {
    let expected = question.expected();
    let submitted = submitted_text(expected, response);
    let correct = !submitted.is_empty() && matches(expected, response);

    Evaluation {
        correct,
        submitted,
        expected: expected.display(),
    }
}

fn matches(expected: &Expected, response: &Response) -> bool {
    match (expected, response) {
        (Expected::Text { answer }, Response::Text(text)) => same(answer, text),
        (Expected::Text { answer }, Response::Tokens(tokens)) => same(answer, &tokens.join(" ")),

        (Expected::Choice { correct, .. }, Response::Option(picked)) => picked == correct,
        (Expected::Choice { options, correct }, Response::Text(text)) => options
            .get(*correct)
            .is_some_and(|option| same(option, text)),

        (Expected::Sequence { tokens }, Response::Tokens(given)) => {
            same(&tokens.join(" "), &given.join(" "))
        }
        (Expected::Sequence { tokens }, Response::Text(text)) => same(&tokens.join(" "), text),

        (Expected::Blanks { answers }, Response::Tokens(given)) => {
            given.len() == answers.len() && answers.iter().zip(given).all(|(a, g)| same(a, g))
        }
        (Expected::Blanks { answers }, Response::Text(text)) => {
            let given: Vec<&str> = if answers.len() == 1 {
                vec![text.as_str()]
            } else {
                text.split(',').collect()
            };
            given.len() == answers.len() && answers.iter().zip(given).all(|(a, g)| same(a, g))
        }

        (Expected::Keys { .. }, Response::Keys(keys)) => {
            let wanted: BTreeSet<String> = expected.normalized_answers().into_iter().collect();
            given_keys(keys) == wanted
        }

        _ => false,
    }
}

fn same(expected: &str, given: &str) -> bool {
    let given = normalize_answer(given);
    !given.is_empty() && given == normalize_answer(expected)
}

fn submitted_text(expected: &Expected, response: &Response) -> String {
    match response {
        Response::Text(text) => normalize_answer(text),
        Response::Tokens(tokens) => match expected {
            Expected::Blanks { .. } => tokens
                .iter()
                .map(|t| normalize_answer(t))
                .collect::<Vec<_>>()
                .join(", "),
            _ => normalize_answer(&tokens.join(" ")),
        },
        Response::Option(index) => match expected {
            Expected::Choice { options, .. } | Expected::Keys { options, .. } => options
                .get(*index)
                .map(|o| normalize_answer(o))
                .unwrap_or_default(),
            Expected::Text { .. } | Expected::Sequence { .. } | Expected::Blanks { .. } => {
                String::new()
            }
        },
        Response::Keys(keys) => given_keys(keys).into_iter().collect::<Vec<_>>().join(", "),
    }
}

/// Normalized keys with blank entries dropped.
fn given_keys(keys: &BTreeSet<String>) -> BTreeSet<String> {
    keys.iter()
        .map(|k| normalize_answer(k))
        .filter(|k| !k.is_empty())
        .collect()
}
