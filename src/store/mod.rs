// In-memory state for the writing session: projects, sticky notes, media
// Nothing here touches disk - everything lives as long as the app runs

pub mod autosave; // debounced "save the draft" instead of saving every keystroke
pub mod media;    // the one reference track a project can carry
pub mod notes;    // global sticky notes
pub mod projects; // songs being written

pub use autosave::AutosaveDebouncer;
pub use media::{AudioFormat, MediaError, MediaState};
pub use notes::{Note, NoteBoard};
pub use projects::{Project, ProjectStore};

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("project {0} not found")]
    ProjectNotFound(Uuid),
    #[error("no project is selected")]
    NoCurrentProject,
    #[error("note {0} not found")]
    NoteNotFound(Uuid),
}
