// Line-context analysis: which earlier line should the next one rhyme with,
// and what is its last word. Pure string work on the text before the cursor.

use super::{byte_offset, TargetMode};
use regex::Regex;
use std::sync::OnceLock;

// A letter run (hyphenated compounds allowed) followed by trailing non-letters
// up to the end of the line. The leftmost match that reaches `$` is the last word.
const TRAILING_WORD_PATTERN: &str = r"([\p{L}-]+)[^\p{L}]*$";

fn trailing_word_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(TRAILING_WORD_PATTERN).ok())
        .as_ref()
}

/// Extract the lower-cased target word for a rhyme query.
///
/// Only the text strictly before `cursor` (a character offset) is looked at,
/// so whatever sits below the cursor never changes the answer. Returns `None`
/// when there is no qualifying line or the line has no letters.
pub fn analyze(full_text: &str, cursor: usize, mode: TargetMode) -> Option<String> {
    let before_cursor = &full_text[..byte_offset(full_text, cursor)];
    let lines: Vec<&str> = before_cursor.split('\n').collect();

    let target = find_target_line(&lines, mode)?;
    trailing_word(target)
}

/// Bounded backward scan for the target line.
///
/// The final segment is the line being started, so the candidate sits
/// `mode.lines_back()` segments before it. Blank lines are skipped walking
/// towards the top; `None` once the scan runs out of lines. The returned line
/// is trimmed.
pub fn find_target_line<'a>(lines: &[&'a str], mode: TargetMode) -> Option<&'a str> {
    let last_index = lines.len().checked_sub(1)?;
    let candidate = last_index.checked_sub(mode.lines_back())?;

    lines[..=candidate]
        .iter()
        .rev()
        .copied()
        .map(str::trim)
        .find(|line| !line.is_empty())
}

/// Last word of a single line, lower-cased.
pub fn trailing_word(line: &str) -> Option<String> {
    let captures = trailing_word_regex()?.captures(line.trim())?;
    let word = captures.get(1)?.as_str().trim_matches('-');

    if word.chars().any(char::is_alphabetic) {
        Some(word.to_lowercase())
    } else {
        None
    }
}
