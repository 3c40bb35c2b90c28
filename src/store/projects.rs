use super::{MediaState, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_PROJECT_TITLE: &str = "New Song";
pub const UNTITLED_PROJECT_TITLE: &str = "Untitled Project";

/// A song in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub lyrics: String,
    pub media: MediaState,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            lyrics: String::new(),
            media: MediaState::None,
            updated_at: Utc::now(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// First few characters of the lyrics for the project list.
    pub fn lyrics_preview(&self, max_chars: usize) -> String {
        if self.lyrics.trim().is_empty() {
            return "No lyrics yet...".to_string();
        }
        let flat = self.lyrics.replace('\n', " / ");
        if flat.chars().count() > max_chars {
            format!("{}...", flat.chars().take(max_chars).collect::<String>())
        } else {
            flat
        }
    }
}

/// All projects plus which one is open. Newest projects come first.
#[derive(Debug)]
pub struct ProjectStore {
    projects: Vec<Project>,
    current: Option<Uuid>,
}

impl ProjectStore {
    /// Starts with a single empty project already selected.
    pub fn new() -> Self {
        let project = Project::new(DEFAULT_PROJECT_TITLE);
        let current = Some(project.id);
        Self {
            projects: vec![project],
            current,
        }
    }

    pub fn list_projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Create an empty project at the top of the list and switch to it.
    pub fn create_project(&mut self) -> &Project {
        let project = Project::new(UNTITLED_PROJECT_TITLE);
        info!("Created new project {}", project.id);
        self.current = Some(project.id);
        self.projects.insert(0, project);
        &self.projects[0]
    }

    pub fn select_project(&mut self, id: Uuid) -> Result<&Project, StoreError> {
        let index = self.index_of(id)?;
        self.current = Some(id);
        Ok(&self.projects[index])
    }

    /// Delete a project. When it was the open one, the first remaining project
    /// is opened instead, or a fresh one when nothing is left. Returns the
    /// project that is open afterwards.
    pub fn delete_project(&mut self, id: Uuid) -> Result<&Project, StoreError> {
        let index = self.index_of(id)?;
        let removed = self.projects.remove(index);
        info!("Deleted project '{}' ({})", removed.display_title(), removed.id);

        if self.current == Some(id) {
            match self.projects.first().map(|p| p.id) {
                Some(first) => self.current = Some(first),
                None => {
                    self.create_project();
                }
            }
        }

        self.current_project().ok_or(StoreError::NoCurrentProject)
    }

    /// Write the working draft back into the open project.
    pub fn save_current_state(
        &mut self,
        title: &str,
        lyrics: &str,
        media: &MediaState,
    ) -> Result<(), StoreError> {
        let id = self.current.ok_or(StoreError::NoCurrentProject)?;
        let index = self.index_of(id)?;

        let project = &mut self.projects[index];
        project.title = title.to_string();
        project.lyrics = lyrics.to_string();
        project.media = media.clone();
        project.updated_at = Utc::now();
        Ok(())
    }

    fn index_of(&self, id: Uuid) -> Result<usize, StoreError> {
        self.projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::ProjectNotFound(id))
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}
