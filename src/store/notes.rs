use super::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// A quick idea, shared by every project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Sticky notes, newest first.
#[derive(Debug, Default)]
pub struct NoteBoard {
    notes: Vec<Note>,
}

impl NoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Add an empty note at the top and return its id.
    pub fn add_note(&mut self) -> Uuid {
        let note = Note {
            id: Uuid::new_v4(),
            content: String::new(),
            created_at: Utc::now(),
        };
        let id = note.id;
        self.notes.insert(0, note);
        debug!("Added note {}", id);
        id
    }

    pub fn update_note(&mut self, id: Uuid, content: &str) -> Result<(), StoreError> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::NoteNotFound(id))?;
        note.content = content.to_string();
        Ok(())
    }

    pub fn delete_note(&mut self, id: Uuid) -> Result<Note, StoreError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(StoreError::NoteNotFound(id))?;
        debug!("Deleted note {}", id);
        Ok(self.notes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_prepends_empty_note() {
        let mut board = NoteBoard::new();
        let first = board.add_note();
        let second = board.add_note();

        assert_eq!(board.notes().len(), 2);
        assert_eq!(board.notes()[0].id, second);
        assert_eq!(board.notes()[1].id, first);
        assert!(board.notes()[0].content.is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let mut board = NoteBoard::new();
        let id = board.add_note();
        board.update_note(id, "rhyme 'saudade' with 'cidade'").unwrap();
        assert_eq!(board.get(id).unwrap().content, "rhyme 'saudade' with 'cidade'");

        let removed = board.delete_note(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(board.is_empty());
    }

    #[test]
    fn test_unknown_note_is_an_error() {
        let mut board = NoteBoard::new();
        let missing = Uuid::new_v4();
        assert_eq!(board.update_note(missing, "x"), Err(StoreError::NoteNotFound(missing)));
        assert_eq!(board.delete_note(missing), Err(StoreError::NoteNotFound(missing)));
    }
}
