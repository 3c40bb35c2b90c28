// Project picker overlay - fuzzy filter over project titles

use super::editor::TextBuffer;
use crate::store::Project;
use fuzzy_matcher::{clangd::ClangdMatcher, FuzzyMatcher};
use uuid::Uuid;

pub struct ProjectPicker {
    pub query: TextBuffer,
    selected: usize,
    matcher: ClangdMatcher,
}

impl ProjectPicker {
    /// Open the picker with `current` highlighted.
    pub fn new(projects: &[Project], current: Option<Uuid>) -> Self {
        let selected = current
            .and_then(|id| projects.iter().position(|p| p.id == id))
            .unwrap_or(0);
        Self {
            query: TextBuffer::single_line(),
            selected,
            matcher: ClangdMatcher::default(),
        }
    }

    /// Indices into `projects` that match the query, best match first.
    /// An empty query keeps the store order.
    pub fn matches(&self, projects: &[Project]) -> Vec<usize> {
        let query = self.query.text().trim();
        if query.is_empty() {
            return (0..projects.len()).collect();
        }

        let mut scored: Vec<(i64, usize)> = projects
            .iter()
            .enumerate()
            .filter_map(|(index, project)| {
                self.matcher
                    .fuzzy_match(project.display_title(), query)
                    .map(|score| (score, index))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, index)| index).collect()
    }

    /// Highlighted row, clamped to the current match count.
    pub fn selected_row(&self, match_count: usize) -> usize {
        self.selected.min(match_count.saturating_sub(1))
    }

    pub fn selected_project(&self, projects: &[Project]) -> Option<Uuid> {
        let matches = self.matches(projects);
        matches
            .get(self.selected_row(matches.len()))
            .map(|&index| projects[index].id)
    }

    pub fn move_selection(&mut self, delta: i32, match_count: usize) {
        if match_count == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected_row(match_count);
        self.selected = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (current + delta as usize).min(match_count - 1)
        };
    }

    /// Typing changes the match set, so jump back to the top.
    pub fn reset_selection(&mut self) {
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projects(titles: &[&str]) -> Vec<Project> {
        titles.iter().map(|t| Project::new(*t)).collect()
    }

    #[test]
    fn test_empty_query_lists_everything() {
        let list = projects(&["Verão", "Saudade", "Night Drive"]);
        let picker = ProjectPicker::new(&list, None);
        assert_eq!(picker.matches(&list), vec![0, 1, 2]);
    }

    #[test]
    fn test_fuzzy_filter() {
        let list = projects(&["Verão", "Saudade", "Night Drive"]);
        let mut picker = ProjectPicker::new(&list, None);
        picker.query.set_text("ndr");
        assert_eq!(picker.matches(&list), vec![2]);
        assert_eq!(picker.selected_project(&list), Some(list[2].id));

        picker.query.set_text("zzz");
        assert!(picker.matches(&list).is_empty());
        assert_eq!(picker.selected_project(&list), None);
    }

    #[test]
    fn test_starts_on_current_and_clamps_movement() {
        let list = projects(&["a song", "b song", "c song"]);
        let mut picker = ProjectPicker::new(&list, Some(list[1].id));
        assert_eq!(picker.selected_project(&list), Some(list[1].id));

        picker.move_selection(5, 3);
        assert_eq!(picker.selected_row(3), 2);
        picker.move_selection(-10, 3);
        assert_eq!(picker.selected_row(3), 0);
    }
}
