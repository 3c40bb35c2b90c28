// lyricpad library - core modules for the terminal songwriting pad
// Everything except `ui` works without a terminal, which keeps it testable

pub mod composer; // line context, paging, insertion, request tagging
pub mod config;   // settings and preferences
pub mod rhyme;    // rhyme provider (Gemini)
pub mod store;    // projects, notes, media, autosave
#[cfg(feature = "tui")]
pub mod ui;       // terminal interface

// Export the stuff other modules actually use
pub use composer::{RhymeAssistant, RhymeList, RhymeResult, TargetMode};
pub use config::Config;
pub use rhyme::{GeminiClient, RhymeProvider, RhymeSet};
pub use store::{MediaState, NoteBoard, ProjectStore};
