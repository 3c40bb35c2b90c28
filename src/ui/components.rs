use super::app::{App, Focus, MediaPrompt, MediaPromptKind, Overlay};
use super::editor::TextBuffer;
use super::picker::ProjectPicker;
use crate::composer::RhymeList;
use crate::store::MediaState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const TITLE_LABEL: &str = "Title: ";
const SEARCH_LABEL: &str = "🔍 ";

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + target mode
            Constraint::Length(3), // Reference track
            Constraint::Length(9), // Rhyme panel
            Constraint::Min(6),    // Lyrics + notes
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_header(f, chunks[0], app);
    render_media_bar(f, chunks[1], &app.media);
    render_rhyme_panel(f, chunks[2], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[3]);
    render_lyrics(f, body[0], app);
    render_notes(f, body[1], app);

    render_status_bar(f, chunks[4], app);

    match &app.overlay {
        Some(Overlay::Projects(picker)) => render_project_picker(f, size, app, picker),
        Some(Overlay::Media(prompt)) => render_media_prompt(f, size, prompt),
        Some(Overlay::Help) => render_help_overlay(f, size),
        None => {}
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Put the terminal cursor inside `area` at the buffer's cursor, shifted by `prefix` columns.
fn place_cursor(f: &mut Frame, area: Rect, buffer: &TextBuffer, prefix: u16, scroll: u16) {
    let (line, col) = buffer.cursor_line_col();
    let x = area.x.saturating_add(prefix).saturating_add(col as u16);
    let y = area.y.saturating_add((line as u16).saturating_sub(scroll));
    if x < area.right() && y < area.bottom() {
        f.set_cursor_position((x, y));
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Title && app.overlay.is_none();
    let title = if app.title.is_empty() && !focused {
        Span::styled("Untitled", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            app.title.text().to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    };

    let line = Line::from(vec![
        Span::styled(TITLE_LABEL, Style::default().fg(Color::Gray)),
        title,
        Span::raw("   |   "),
        Span::styled(
            format!("🎯 {}", app.target_mode()),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("🎵 lyricpad")
        .border_style(border_style(focused));
    let inner = block.inner(area);
    f.render_widget(Paragraph::new(line).block(block), area);

    if focused {
        place_cursor(f, inner, &app.title, TITLE_LABEL.len() as u16, 0);
    }
}

fn render_media_bar(f: &mut Frame, area: Rect, media: &MediaState) {
    let mut spans = vec![Span::styled(
        media.label(),
        Style::default().fg(if media.is_none() { Color::DarkGray } else { Color::Green }),
    )];
    if let Some(url) = media.watch_url() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(url, Style::default().fg(Color::Blue)));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("🎧 Reference")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(bar, area);
}

fn render_rhyme_panel(f: &mut Frame, area: Rect, app: &App) {
    let in_panel = matches!(app.focus, Focus::Search | Focus::Suggestions) && app.overlay.is_none();
    let title = match app.assistant.result() {
        Some(result) => format!("Rhymes for '{}'", result.target_word),
        None => "Rhymes".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(in_panel));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // search box
            Constraint::Length(1), // state line
            Constraint::Length(1),
            Constraint::Length(2), // perfect
            Constraint::Length(2), // phonetic
        ])
        .split(inner);

    // Search box
    let search_focused = app.focus == Focus::Search && app.overlay.is_none();
    let search_text = if app.search.is_empty() && !search_focused {
        Span::styled("search a word (Tab to focus, Enter to look up)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.search.text().to_string())
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![Span::raw(SEARCH_LABEL), search_text])),
        rows[0],
    );
    if search_focused {
        place_cursor(f, rows[0], &app.search, 3, 0);
    }

    // State line
    let state = if app.assistant.is_loading() {
        Span::styled("Analyzing...", Style::default().fg(Color::Yellow))
    } else if app.assistant.result().is_none() {
        Span::styled(
            "Press Enter at the end of a line to get rhymes for it",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            "↑↓ list  ←→ pick  [ ] page  Enter insert",
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(state), rows[1]);

    render_rhyme_list(f, rows[3], app, RhymeList::Perfect);
    render_rhyme_list(f, rows[4], app, RhymeList::Phonetic);
}

fn render_rhyme_list(f: &mut Frame, area: Rect, app: &App, which: RhymeList) {
    let selecting = app.focus == Focus::Suggestions && app.active_list == which && app.overlay.is_none();
    let label_style = if selecting {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut spans = Vec::new();
    match app.assistant.result() {
        None => {}
        Some(result) if result.list(which).is_empty() => {
            spans.push(Span::styled("none found", Style::default().fg(Color::DarkGray)));
        }
        Some(_) => {
            let chevron = |enabled: bool, symbol: &'static str| {
                let color = if enabled { Color::Cyan } else { Color::DarkGray };
                Span::styled(symbol, Style::default().fg(color))
            };

            spans.push(chevron(app.assistant.can_page_backward(which), "‹ "));
            for (i, word) in app.assistant.visible(which).iter().enumerate() {
                let style = if selecting && i == app.suggestion_index {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default().fg(Color::White)
                };
                spans.push(Span::styled(format!(" {} ", word), style));
                spans.push(Span::raw(" "));
            }
            spans.push(chevron(app.assistant.can_page_forward(which), "›"));
        }
    }

    let lines = vec![
        Line::from(Span::styled(which.label(), label_style)),
        Line::from(spans),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_lyrics(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Lyrics && app.overlay.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("✍️ Lyrics")
        .border_style(border_style(focused));
    let inner = block.inner(area);

    // keep the cursor line on screen
    let (cursor_line, _) = app.lyrics.cursor_line_col();
    let scroll = (cursor_line as u16).saturating_sub(inner.height.saturating_sub(1));

    let body = if app.lyrics.is_empty() && !focused {
        Paragraph::new(Span::styled(
            "Start writing... press Enter at the end of a line for rhymes",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(app.lyrics.text().to_string()).scroll((scroll, 0))
    };
    f.render_widget(body.block(block), area);

    if focused {
        place_cursor(f, inner, &app.lyrics, 0, scroll);
    }
}

fn render_notes(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Notes && app.overlay.is_none();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(area);

    let items: Vec<ListItem> = app
        .notes
        .notes()
        .iter()
        .map(|note| {
            let first_line = note.content.lines().next().unwrap_or("");
            let preview = if first_line.trim().is_empty() { "(empty note)" } else { first_line };
            ListItem::new(format!("📝 {}", preview))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Notes ({})", app.notes.notes().len()))
                .border_style(border_style(focused)),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !app.notes.is_empty() {
        state.select(Some(app.note_index));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    let editor_block = Block::default()
        .borders(Borders::ALL)
        .title("Edit note")
        .border_style(border_style(focused));
    let editor_inner = editor_block.inner(chunks[1]);

    let editor = if app.notes.is_empty() {
        Paragraph::new(Span::styled("Ctrl+N adds a note", Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(app.note_editor.text().to_string()).wrap(Wrap { trim: false })
    };
    f.render_widget(editor.block(editor_block), chunks[1]);

    if focused && !app.notes.is_empty() {
        place_cursor(f, editor_inner, &app.note_editor, 0, 0);
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status_text = match &app.status_message {
        Some((message, timestamp)) if timestamp.elapsed() < app.status_duration() => message.clone(),
        _ => "Tab: focus | Ctrl+T: target | Ctrl+P: projects | Ctrl+N: note | F1: help | Ctrl+Q: quit"
            .to_string(),
    };

    let mut spans = vec![Span::raw(status_text)];
    if app.has_unsaved_changes() {
        spans.push(Span::styled("  ●", Style::default().fg(Color::Yellow)));
    }

    let status = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn render_project_picker(f: &mut Frame, area: Rect, app: &App, picker: &ProjectPicker) {
    let popup_area = centered_rect(60, 70, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Projects ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));
    f.render_widget(block, popup_area);

    let inner_area = popup_area.inner(Margin { horizontal: 1, vertical: 1 });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(inner_area);

    let query_line = Line::from(vec![
        Span::raw(SEARCH_LABEL),
        Span::styled(picker.query.text().to_string(), Style::default().fg(Color::White)),
    ]);
    f.render_widget(Paragraph::new(query_line), rows[0]);
    place_cursor(f, rows[0], &picker.query, 3, 0);

    let projects = app.store.list_projects();
    let current = app.store.current_id();
    let matches = picker.matches(projects);

    let items: Vec<ListItem> = matches
        .iter()
        .map(|&index| {
            let project = &projects[index];
            let marker = if Some(project.id) == current { "● " } else { "  " };
            ListItem::new(vec![
                Line::from(format!("{}{}", marker, project.display_title())),
                Line::from(Span::styled(
                    format!("    {}", project.lyrics_preview(40)),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !matches.is_empty() {
        state.select(Some(picker.selected_row(matches.len())));
    }
    f.render_stateful_widget(list, rows[1], &mut state);

    let instructions = Paragraph::new("↑↓: Navigate | Enter: Open | Ctrl+N: New | Ctrl+D: Delete | Esc: Close")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(instructions, rows[2]);
}

fn render_media_prompt(f: &mut Frame, area: Rect, prompt: &MediaPrompt) {
    let popup_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(4)),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area)[1];

    let (label, title) = match prompt.kind {
        MediaPromptKind::YouTube => ("▶️ YouTube link: ", "Attach YouTube video - Enter to confirm, Esc to cancel"),
        MediaPromptKind::LocalFile => ("📁 Audio file: ", "Attach local audio - Enter to confirm, Esc to cancel"),
    };

    let input = Paragraph::new(format!("{}{}", label, prompt.input.text()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(80, 70, area);

    let heading = |text: &'static str| {
        Line::from(vec![Span::styled(
            text,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "🎵 lyricpad Help",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        heading("Writing:"),
        Line::from("  Tab / Shift+Tab   Move between title, lyrics, search, rhymes, notes"),
        Line::from("  Enter (lyrics)    New line, then look up rhymes for the line above"),
        Line::from("  Ctrl+T            Rhyme with the last line (AABB) or the one before (ABAB)"),
        Line::from(""),
        heading("Rhymes:"),
        Line::from("  Enter (search)    Look up the typed word"),
        Line::from("  ↑/↓               Switch between perfect and phonetic"),
        Line::from("  ←/→  1-3          Pick a suggestion"),
        Line::from("  [ / ]             Previous / next three"),
        Line::from("  Enter / Space     Insert at the lyrics cursor"),
        Line::from(""),
        heading("Projects & notes:"),
        Line::from("  Ctrl+P            Open the project list"),
        Line::from("  Ctrl+N            New sticky note"),
        Line::from("  Ctrl+D (notes)    Delete the selected note"),
        Line::from("  PgUp/PgDn (notes) Select note"),
        Line::from(""),
        heading("Reference track:"),
        Line::from("  Ctrl+Y            Attach a YouTube link"),
        Line::from("  Ctrl+O            Attach a local audio file"),
        Line::from("  Ctrl+X            Remove it"),
        Line::from(""),
        Line::from("  Ctrl+Q            Quit"),
        Line::from(""),
        Line::from(vec![Span::styled("Press any key to close", Style::default().fg(Color::Yellow))]),
    ];

    f.render_widget(Clear, popup_area);

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().bg(Color::Black).fg(Color::White))
        .wrap(Wrap { trim: false });

    f.render_widget(help_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rhyme::{RhymeProvider, RhymeSet};
    use crate::ui::EventHandler;
    use futures::future::{BoxFuture, FutureExt};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct NoRhymes;

    impl RhymeProvider for NoRhymes {
        fn fetch_rhymes<'a>(&'a self, _word: &'a str) -> BoxFuture<'a, RhymeSet> {
            async { RhymeSet::default() }.boxed()
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_main_screen_renders() {
        let events = EventHandler::new();
        let mut config = Config::default();
        config.ui.show_help = false;
        let app = App::new(config, Arc::new(NoRhymes), events.sender());

        let text = screen_text(&app);
        assert!(text.contains("lyricpad"));
        assert!(text.contains("Perfect"));
        assert!(text.contains("Notes (0)"));
    }

    #[test]
    fn test_help_overlay_shows_on_start() {
        let events = EventHandler::new();
        let app = App::new(Config::default(), Arc::new(NoRhymes), events.sender());
        assert!(screen_text(&app).contains("lyricpad Help"));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 70, outer);
        assert!(popup.width <= 60 && popup.height <= 35);
        assert!(popup.x >= 20 && popup.y >= 7);
    }
}
