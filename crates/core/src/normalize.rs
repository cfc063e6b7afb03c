//! Answer normalization shared by every question kind.

/// Canonical comparison form of a user answer or an expected answer.
///
/// Lowercases, drops every character that is neither alphanumeric nor whitespace,
/// then collapses whitespace runs into single spaces (which also trims the ends).
/// The rules are locale-naive: `char::to_lowercase` and `char::is_alphanumeric` only.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(stripped.len());
    for word in stripped.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// True when the answer carries nothing to compare after normalization.
#[must_use]
pub fn is_blank(raw: &str) -> bool {
    normalize_answer(raw).is_empty()
}
