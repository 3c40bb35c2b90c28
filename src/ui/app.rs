use super::editor::{EditOutcome, TextBuffer};
use super::picker::ProjectPicker;
use super::{components, AppEvent, EventHandler, TerminalManager};
use crate::composer::{insert, RhymeAssistant, RhymeList, RhymeRequest, RhymeResponse, TargetMode};
use crate::config::Config;
use crate::rhyme::RhymeProvider;
use crate::store::{AutosaveDebouncer, MediaState, NoteBoard, Project, ProjectStore};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Which pane receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Title,
    Lyrics,
    Search,
    Suggestions,
    Notes,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Title => Focus::Lyrics,
            Focus::Lyrics => Focus::Search,
            Focus::Search => Focus::Suggestions,
            Focus::Suggestions => Focus::Notes,
            Focus::Notes => Focus::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Title => Focus::Notes,
            Focus::Lyrics => Focus::Title,
            Focus::Search => Focus::Lyrics,
            Focus::Suggestions => Focus::Search,
            Focus::Notes => Focus::Suggestions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPromptKind {
    YouTube,
    LocalFile,
}

pub struct MediaPrompt {
    pub kind: MediaPromptKind,
    pub input: TextBuffer,
}

pub enum Overlay {
    Projects(ProjectPicker),
    Media(MediaPrompt),
    Help,
}

pub struct App {
    config: Config,
    provider: Arc<dyn RhymeProvider>,
    events: mpsc::UnboundedSender<AppEvent>,

    // Collections
    pub(super) store: ProjectStore,
    pub(super) notes: NoteBoard,

    // Working draft of the open project
    pub(super) title: TextBuffer,
    pub(super) lyrics: TextBuffer,
    pub(super) media: MediaState,
    autosave: AutosaveDebouncer,

    // Rhyme panel
    pub(super) assistant: RhymeAssistant,
    pub(super) search: TextBuffer,
    pub(super) active_list: RhymeList,
    pub(super) suggestion_index: usize,

    // Notes pane
    pub(super) note_index: usize,
    pub(super) note_editor: TextBuffer,

    // UI State
    pub(super) focus: Focus,
    pub(super) overlay: Option<Overlay>,
    pub(super) status_message: Option<(String, Instant)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        provider: Arc<dyn RhymeProvider>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let autosave = AutosaveDebouncer::new(config.editor.autosave_delay());
        let assistant = RhymeAssistant::new(config.editor.default_target_mode);
        let overlay = config.ui.show_help.then_some(Overlay::Help);

        let mut app = Self {
            config,
            provider,
            events,
            store: ProjectStore::new(),
            notes: NoteBoard::new(),
            title: TextBuffer::single_line(),
            lyrics: TextBuffer::multiline(),
            media: MediaState::None,
            autosave,
            assistant,
            search: TextBuffer::single_line(),
            active_list: RhymeList::Perfect,
            suggestion_index: 0,
            note_index: 0,
            note_editor: TextBuffer::multiline(),
            focus: Focus::Lyrics,
            overlay,
            status_message: None,
            should_quit: false,
        };

        if let Some(project) = app.store.current_project().cloned() {
            app.load_draft(&project);
        }
        app
    }

    pub async fn run(&mut self, terminal: &mut TerminalManager, events: &mut EventHandler) -> Result<()> {
        while !self.should_quit {
            let app: &App = self;
            terminal.draw(|f| components::render(f, app))?;

            match events.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        self.flush_draft();
        info!("Session closed with {} project(s)", self.store.list_projects().len());
        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::Tick => self.on_tick(Instant::now()),
            AppEvent::RhymesArrived(response) => self.on_rhymes(response),
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.autosave.should_flush(now) {
            self.flush_draft();
        }

        let expired = self
            .status_message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() >= self.config.ui.status_duration());
        if expired {
            self.status_message = None;
        }
    }

    fn on_rhymes(&mut self, response: RhymeResponse) {
        let word = response.word.clone();
        if self.assistant.apply(response) {
            self.suggestion_index = 0;
            if let Some(result) = self.assistant.result() {
                debug!(
                    "Showing rhymes for '{}' ({} perfect, {} phonetic)",
                    word,
                    result.perfect.len(),
                    result.phonetic.len()
                );
            }
        }
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some((message.to_string(), Instant::now()));
    }

    // ---- keys ----

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        match key.code {
            KeyCode::F(1) => {
                self.overlay = Some(Overlay::Help);
                return;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        if ctrl {
            match key.code {
                KeyCode::Char('t') => self.toggle_target_mode(),
                KeyCode::Char('p') => self.open_project_picker(),
                KeyCode::Char('n') => self.add_note(),
                KeyCode::Char('y') => self.open_media_prompt(MediaPromptKind::YouTube),
                KeyCode::Char('o') => self.open_media_prompt(MediaPromptKind::LocalFile),
                KeyCode::Char('x') => self.set_media(MediaState::None),
                KeyCode::Char('d') if self.focus == Focus::Notes => self.delete_selected_note(),
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Title => self.handle_title_key(key),
            Focus::Lyrics => self.handle_lyrics_key(key),
            Focus::Search => self.handle_search_key(key),
            Focus::Suggestions => self.handle_suggestions_key(key),
            Focus::Notes => self.handle_notes_key(key),
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.focus = Focus::Lyrics;
            return;
        }
        if self.title.handle_key(key) == EditOutcome::Edited {
            self.autosave.mark_dirty(Instant::now());
        }
    }

    fn handle_lyrics_key(&mut self, key: KeyEvent) {
        match self.lyrics.handle_key(key) {
            EditOutcome::Newline => {
                self.autosave.mark_dirty(Instant::now());
                // Enter finished a line: look back for a word to rhyme with
                if let Some(request) = self.assistant.on_enter(self.lyrics.text(), self.lyrics.cursor()) {
                    self.spawn_rhyme_request(request);
                }
            }
            EditOutcome::Edited => self.autosave.mark_dirty(Instant::now()),
            EditOutcome::Moved | EditOutcome::Ignored => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            match self.assistant.manual_search(self.search.text()) {
                Some(request) => self.spawn_rhyme_request(request),
                None => self.set_status("Type a word to search for rhymes"),
            }
            return;
        }
        self.search.handle_key(key);
    }

    fn handle_suggestions_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Down => {
                self.active_list = self.active_list.other();
                self.suggestion_index = 0;
            }
            KeyCode::Left => {
                self.suggestion_index = self.suggestion_index.saturating_sub(1);
            }
            KeyCode::Right => {
                let visible = self.assistant.visible(self.active_list).len();
                self.suggestion_index = (self.suggestion_index + 1).min(visible.saturating_sub(1));
            }
            KeyCode::Char('[') | KeyCode::PageUp => {
                self.assistant.page_backward(self.active_list);
                self.suggestion_index = 0;
            }
            KeyCode::Char(']') | KeyCode::PageDown => {
                self.assistant.page_forward(self.active_list);
                self.suggestion_index = 0;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.insert_suggestion_at(self.suggestion_index);
            }
            KeyCode::Char(c @ '1'..='3') => {
                let slot = c as usize - '1' as usize;
                self.insert_suggestion_at(slot);
            }
            KeyCode::Esc => self.focus = Focus::Lyrics,
            _ => {}
        }
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::PageUp => self.select_note(self.note_index.saturating_sub(1)),
            KeyCode::PageDown => self.select_note(self.note_index + 1),
            _ => {
                let Some(id) = self.notes.notes().get(self.note_index).map(|n| n.id) else {
                    return;
                };
                if self.note_editor.handle_key(key) == EditOutcome::Edited
                    || key.code == KeyCode::Enter
                {
                    if let Err(e) = self.notes.update_note(id, self.note_editor.text()) {
                        warn!("Could not update note: {}", e);
                    }
                }
            }
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        match self.overlay.take() {
            Some(Overlay::Help) => {
                // any key closes help
            }
            Some(Overlay::Projects(picker)) => self.handle_picker_key(picker, key),
            Some(Overlay::Media(prompt)) => self.handle_media_prompt_key(prompt, key),
            None => {}
        }
    }

    fn handle_picker_key(&mut self, mut picker: ProjectPicker, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let match_count = picker.matches(self.store.list_projects()).len();

        match key.code {
            KeyCode::Esc => return,
            KeyCode::Up => picker.move_selection(-1, match_count),
            KeyCode::Down => picker.move_selection(1, match_count),
            KeyCode::Enter => {
                if let Some(id) = picker.selected_project(self.store.list_projects()) {
                    self.switch_project(id);
                }
                return;
            }
            KeyCode::Char('n') if ctrl => {
                self.create_project();
                return;
            }
            KeyCode::Char('d') if ctrl => {
                if let Some(id) = picker.selected_project(self.store.list_projects()) {
                    self.delete_project(id);
                }
            }
            KeyCode::Delete if picker.query.is_empty() => {
                if let Some(id) = picker.selected_project(self.store.list_projects()) {
                    self.delete_project(id);
                }
            }
            _ => {
                if picker.query.handle_key(key) == EditOutcome::Edited {
                    picker.reset_selection();
                }
            }
        }

        self.overlay = Some(Overlay::Projects(picker));
    }

    fn handle_media_prompt_key(&mut self, mut prompt: MediaPrompt, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let input = prompt.input.text().trim().to_string();
                let parsed = match prompt.kind {
                    MediaPromptKind::YouTube => MediaState::from_youtube_link(&input),
                    MediaPromptKind::LocalFile => MediaState::from_local_file(&input),
                };
                match parsed {
                    Ok(media) => {
                        self.set_media(media);
                        return;
                    }
                    Err(e) => self.set_status(&format!("⚠️ {}", e)),
                }
            }
            _ => {
                prompt.input.handle_key(key);
            }
        }

        self.overlay = Some(Overlay::Media(prompt));
    }

    // ---- rhymes ----

    fn toggle_target_mode(&mut self) {
        let mode = self.assistant.toggle_mode();
        self.set_status(&format!("Rhyme target: {}", mode));
    }

    pub fn target_mode(&self) -> TargetMode {
        self.assistant.mode()
    }

    fn spawn_rhyme_request(&self, request: RhymeRequest) {
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();

        tokio::spawn(async move {
            let rhymes = provider.fetch_rhymes(&request.word).await;
            let _ = events.send(AppEvent::RhymesArrived(request.into_response(rhymes)));
        });
    }

    fn insert_suggestion_at(&mut self, slot: usize) {
        let Some(chosen) = self.assistant.visible(self.active_list).get(slot).cloned() else {
            return;
        };

        let cursor = self.lyrics.cursor();
        let (text, new_cursor) = insert(self.lyrics.text(), cursor, cursor, &chosen);
        self.lyrics.replace(text, new_cursor);
        self.autosave.mark_dirty(Instant::now());
        self.focus = Focus::Lyrics;
    }

    // ---- projects ----

    fn load_draft(&mut self, project: &Project) {
        self.title.set_text(&project.title);
        self.lyrics.set_text(&project.lyrics);
        self.media = project.media.clone();
        self.autosave.flushed();
    }

    /// Save the draft into the open project (blur boundary or debounce).
    pub fn flush_draft(&mut self) {
        if !self.autosave.is_dirty() {
            return;
        }
        match self
            .store
            .save_current_state(self.title.text(), self.lyrics.text(), &self.media)
        {
            Ok(()) => debug!("Draft saved"),
            Err(e) => warn!("Could not save draft: {}", e),
        }
        self.autosave.flushed();
    }

    fn open_project_picker(&mut self) {
        self.flush_draft();
        let picker = ProjectPicker::new(self.store.list_projects(), self.store.current_id());
        self.overlay = Some(Overlay::Projects(picker));
    }

    fn switch_project(&mut self, id: uuid::Uuid) {
        self.flush_draft();
        match self.store.select_project(id).cloned() {
            Ok(project) => {
                info!("Switched to project '{}'", project.display_title());
                self.load_draft(&project);
                self.focus = Focus::Lyrics;
            }
            Err(e) => self.set_status(&format!("⚠️ {}", e)),
        }
    }

    fn create_project(&mut self) {
        self.flush_draft();
        let project = self.store.create_project().clone();
        self.load_draft(&project);
        self.focus = Focus::Title;
        self.set_status("🎵 New project created");
    }

    fn delete_project(&mut self, id: uuid::Uuid) {
        self.flush_draft();
        let was_current = self.store.current_id() == Some(id);
        match self.store.delete_project(id).cloned() {
            Ok(now_open) => {
                if was_current {
                    self.load_draft(&now_open);
                }
                self.set_status("🗑️ Project deleted");
            }
            Err(e) => self.set_status(&format!("⚠️ {}", e)),
        }
    }

    // ---- media ----

    fn open_media_prompt(&mut self, kind: MediaPromptKind) {
        self.overlay = Some(Overlay::Media(MediaPrompt {
            kind,
            input: TextBuffer::single_line(),
        }));
    }

    fn set_media(&mut self, media: MediaState) {
        self.set_status(&format!("🎧 {}", media.label()));
        self.media = media;
        self.autosave.mark_dirty(Instant::now());
    }

    // ---- notes ----

    fn add_note(&mut self) {
        self.notes.add_note();
        self.select_note(0);
        self.focus = Focus::Notes;
    }

    fn select_note(&mut self, index: usize) {
        let count = self.notes.notes().len();
        self.note_index = index.min(count.saturating_sub(1));
        let content = self
            .notes
            .notes()
            .get(self.note_index)
            .map(|n| n.content.clone())
            .unwrap_or_default();
        self.note_editor.set_text(&content);
    }

    fn delete_selected_note(&mut self) {
        let Some(id) = self.notes.notes().get(self.note_index).map(|n| n.id) else {
            return;
        };
        if let Err(e) = self.notes.delete_note(id) {
            warn!("Could not delete note: {}", e);
        }
        self.select_note(self.note_index);
    }

    // ---- read access for rendering ----

    pub fn status_duration(&self) -> std::time::Duration {
        self.config.ui.status_duration()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhyme::RhymeSet;
    use crate::store::projects::{DEFAULT_PROJECT_TITLE, UNTITLED_PROJECT_TITLE};
    use futures::future::{BoxFuture, FutureExt};

    struct FixedRhymes;

    impl RhymeProvider for FixedRhymes {
        fn fetch_rhymes<'a>(&'a self, word: &'a str) -> BoxFuture<'a, RhymeSet> {
            async move {
                RhymeSet {
                    perfect: (1..=5).map(|i| format!("{}{}", word, i)).collect(),
                    phonetic: vec![format!("{}-ish", word)],
                }
            }
            .boxed()
        }
    }

    fn test_app() -> (App, EventHandler) {
        let events = EventHandler::new();
        let mut config = Config::default();
        config.ui.show_help = false;
        let app = App::new(config, Arc::new(FixedRhymes), events.sender());
        (app, events)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_event(AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                press(app, KeyCode::Enter);
            } else {
                press(app, KeyCode::Char(c));
            }
        }
    }

    async fn deliver_next_rhymes(app: &mut App, events: &mut EventHandler) {
        loop {
            match events.next_event().await {
                Some(event @ AppEvent::RhymesArrived(_)) => {
                    app.handle_event(event);
                    return;
                }
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    #[tokio::test]
    async fn test_enter_fetches_rhymes_for_previous_line() {
        let (mut app, mut events) = test_app();
        type_text(&mut app, "meu amor\n");
        assert!(app.assistant.is_loading());

        deliver_next_rhymes(&mut app, &mut events).await;
        let result = app.assistant.result().unwrap();
        assert_eq!(result.target_word, "amor");
        assert_eq!(app.assistant.visible(RhymeList::Perfect), &["amor1", "amor2", "amor3"]);
    }

    #[tokio::test]
    async fn test_choosing_suggestion_inserts_into_lyrics() {
        let (mut app, mut events) = test_app();
        type_text(&mut app, "meu amor\nsinto");
        // the second line is not finished, the request came from the first Enter
        deliver_next_rhymes(&mut app, &mut events).await;

        app.focus = Focus::Suggestions;
        press(&mut app, KeyCode::Char(']'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.lyrics.text(), "meu amor\nsinto amor5");
        assert_eq!(app.focus, Focus::Lyrics);
        assert!(app.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_manual_search_from_search_box() {
        let (mut app, mut events) = test_app();
        app.focus = Focus::Search;
        type_text(&mut app, "Saudade");
        press(&mut app, KeyCode::Enter);

        deliver_next_rhymes(&mut app, &mut events).await;
        assert_eq!(app.assistant.result().unwrap().target_word, "saudade");
        assert_eq!(app.assistant.last_analyzed_word(), Some("saudade"));
    }

    #[test]
    fn test_target_mode_toggle_does_not_query() {
        let (mut app, _events) = test_app();
        ctrl(&mut app, 't');
        assert_eq!(app.target_mode(), TargetMode::Penultimate);
        assert!(!app.assistant.is_loading());
    }

    #[test]
    fn test_draft_is_saved_on_project_switch() {
        let (mut app, _events) = test_app();
        let first = app.store.current_id().unwrap();
        app.focus = Focus::Title;
        type_text(&mut app, "Primeira");

        ctrl(&mut app, 'p');
        ctrl(&mut app, 'n');
        assert_ne!(app.store.current_id(), Some(first));
        assert_eq!(app.title.text(), UNTITLED_PROJECT_TITLE);
        assert!(app.lyrics.is_empty());

        // typing appended to the seeded title
        let saved = app.store.get(first).unwrap();
        assert_eq!(saved.title, format!("{}Primeira", DEFAULT_PROJECT_TITLE));
    }

    #[test]
    fn test_autosave_waits_for_debounce() {
        let (mut app, _events) = test_app();
        type_text(&mut app, "la la");
        assert!(app.has_unsaved_changes());

        app.on_tick(Instant::now());
        assert!(app.has_unsaved_changes());

        app.on_tick(Instant::now() + app.config.editor.autosave_delay());
        assert!(!app.has_unsaved_changes());
        assert_eq!(app.store.current_project().unwrap().lyrics, "la la");
    }

    #[test]
    fn test_bad_youtube_link_keeps_prompt_open() {
        let (mut app, _events) = test_app();
        ctrl(&mut app, 'y');
        type_text(&mut app, "not a link");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.overlay, Some(Overlay::Media(_))));
        assert!(app.media.is_none());

        press(&mut app, KeyCode::Esc);
        ctrl(&mut app, 'y');
        type_text(&mut app, "https://youtu.be/dQw4w9WgXcQ");
        press(&mut app, KeyCode::Enter);
        assert!(app.overlay.is_none());
        assert_eq!(app.media.watch_url().unwrap(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_notes_add_edit_delete() {
        let (mut app, _events) = test_app();
        ctrl(&mut app, 'n');
        assert_eq!(app.focus, Focus::Notes);
        type_text(&mut app, "hook idea");
        assert_eq!(app.notes.notes()[0].content, "hook idea");

        ctrl(&mut app, 'd');
        assert!(app.notes.is_empty());
    }
}
