//! UI rendering for the TUI.
//!
//! Lays out the credential/query form, the response pane, and the history
//! sidebar, all as a pure projection of the application state.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Focus, InputState};
use super::widgets::render_confirm_dialog;
use crate::session::ExecutionPhase;

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main (form + response) on the left, history sidebar on the right
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // URL + key row
            Constraint::Length(3), // Query row
            Constraint::Min(3),    // Response
            Constraint::Length(1), // Status line
        ])
        .split(columns[0]);

    render_title(frame, main_layout[0]);
    render_credentials(frame, main_layout[1], app);
    render_query(frame, main_layout[2], app);
    render_response(frame, main_layout[3], app);
    render_status(frame, main_layout[4], app);
    render_history(frame, columns[1], app);

    if app.confirm_visible {
        if let Some(link) = &app.pending_link {
            render_confirm_dialog(frame, link);
        }
    }
}

/// Renders the title bar.
fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Supabase Client Playground",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(title, area);
}

/// Renders the URL and key fields side by side.
fn render_credentials(frame: &mut Frame, area: Rect, app: &App) {
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_input(
        frame,
        row[0],
        "API URL",
        &app.url_input,
        "https://xyzcompany.supabase.co",
        app.focus == Focus::Url,
    );
    render_input(
        frame,
        row[1],
        "API Key",
        &app.key_input,
        "Your Supabase API Key",
        app.focus == Focus::Key,
    );
}

/// Renders the query field.
fn render_query(frame: &mut Frame, area: Rect, app: &App) {
    render_input(
        frame,
        area,
        "Query (Enter to run)",
        &app.query_input,
        "supabase.from('table').select()",
        app.focus == Focus::Query,
    );
}

/// Renders one bordered input field, with cursor when focused.
fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    input: &InputState,
    placeholder: &str,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_x) = visible_window(&input.text, input.cursor, inner_width);

    let content = if input.is_empty() && !focused {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(visible)
    };

    let widget = Paragraph::new(content).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(widget, area);

    if focused {
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

/// Returns the slice of `text` that fits in `width` with the cursor
/// visible, and the cursor's x offset within that slice.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let start = (cursor + 1).saturating_sub(width);
    let end = (start + width).min(chars.len());

    let visible: String = chars[start..end].iter().collect();
    (visible, (cursor - start) as u16)
}

/// Renders the response pane: validation error, last outcome, progress, or
/// the idle placeholder.
fn render_response(frame: &mut Frame, area: Rect, app: &App) {
    let (title, border_color, body, body_style) = if let Some(message) = &app.validation_error {
        (
            "Error",
            Color::Red,
            message.clone(),
            Style::default().fg(Color::Red),
        )
    } else {
        match app.session.phase() {
            ExecutionPhase::Running => (
                "Response",
                Color::DarkGray,
                "Executing query...".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            ExecutionPhase::Succeeded => (
                "Response",
                Color::Green,
                app.session
                    .outcome()
                    .map(|outcome| outcome.pretty())
                    .unwrap_or_default(),
                Style::default().fg(Color::Green),
            ),
            ExecutionPhase::Failed => (
                "Error",
                Color::Red,
                app.session
                    .outcome()
                    .map(|outcome| outcome.pretty())
                    .unwrap_or_default(),
                Style::default().fg(Color::Red),
            ),
            ExecutionPhase::Idle => (
                "Response",
                Color::DarkGray,
                "Run a query to see the response here.".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        }
    };

    let widget = Paragraph::new(body)
        .style(body_style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    frame.render_widget(widget, area);
}

/// Renders the history sidebar, newest entry first.
fn render_history(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::History;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .title("Query history")
        .borders(Borders::ALL)
        .border_style(border_style);

    let entries = app.session.history().entries();
    if entries.is_empty() {
        let placeholder = Paragraph::new("No queries executed yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let selected = app.history_selected.min(entries.len() - 1);
    let items: Vec<ListItem> = entries
        .iter()
        .rev()
        .enumerate()
        .map(|(index, entry)| {
            let style = if focused && index == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(entry.clone(), style)))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Renders the status line: transient message or key hints.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.flash_message() {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            "Tab: switch field  Enter: run  c: copy (history)  Esc: quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
