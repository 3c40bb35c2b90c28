// Composer - the rhyme-assist logic behind the lyrics editor
// Works on plain strings + cursor offsets so it never needs the terminal

pub mod analyzer;  // finds the target line and its last word
pub mod assistant; // trigger policy, request tagging, live result
pub mod insert;    // splices a chosen rhyme into the lyrics
pub mod pager;     // 3-at-a-time windows over the suggestion lists

pub use analyzer::{analyze, find_target_line, trailing_word};
pub use assistant::{QueryOrigin, RhymeAssistant, RhymeRequest, RhymeResponse};
pub use insert::insert;
pub use pager::{PageWindow, SuggestionPager, PAGE_SIZE};

use crate::rhyme::RhymeSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which earlier line the rhyme should answer.
///
/// `Last` rhymes with the line just finished (AABB), `Penultimate` with the
/// one before it (ABAB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    #[default]
    Last,
    Penultimate,
}

impl TargetMode {
    /// How many segments back from the final (fresh) line the candidate sits.
    pub fn lines_back(self) -> usize {
        match self {
            TargetMode::Last => 1,
            TargetMode::Penultimate => 2,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TargetMode::Last => TargetMode::Penultimate,
            TargetMode::Penultimate => TargetMode::Last,
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetMode::Last => write!(f, "Last line (AABB)"),
            TargetMode::Penultimate => write!(f, "Penultimate line (ABAB)"),
        }
    }
}

/// The two suggestion boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhymeList {
    Perfect,
    Phonetic,
}

impl RhymeList {
    pub fn other(self) -> Self {
        match self {
            RhymeList::Perfect => RhymeList::Phonetic,
            RhymeList::Phonetic => RhymeList::Perfect,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RhymeList::Perfect => "Perfect",
            RhymeList::Phonetic => "Phonetic / Flow",
        }
    }
}

/// Suggestions currently on screen. Replaced as a whole, never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhymeResult {
    pub target_word: String,
    pub perfect: Vec<String>,
    pub phonetic: Vec<String>,
}

impl RhymeResult {
    pub fn new(target_word: String, rhymes: RhymeSet) -> Self {
        Self {
            target_word,
            perfect: rhymes.perfect,
            phonetic: rhymes.phonetic,
        }
    }

    pub fn list(&self, which: RhymeList) -> &[String] {
        match which {
            RhymeList::Perfect => &self.perfect,
            RhymeList::Phonetic => &self.phonetic,
        }
    }
}

/// Byte position of the `chars`-th character, clamped to the end of `text`.
pub fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// Length of `text` in characters - the unit every cursor offset uses.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
