//! Confirmation dialog for deep-link auto-run.
//!
//! A complete shareable link may execute its query automatically, but only
//! after the user approves it in this modal dialog.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::deeplink::ShareLink;

/// Renders the auto-run confirmation dialog for a bootstrapped link.
///
/// Shows the target project and the expression the link wants to execute,
/// and asks for an explicit yes/no.
pub fn render_confirm_dialog(frame: &mut Frame, link: &ShareLink) {
    let area = frame.area();

    let dialog_width = (area.width as f32 * 0.6).min(78.0) as u16;
    let expression = link.expression.as_deref().unwrap_or("");
    let expression_lines = wrap_text(expression, dialog_width.saturating_sub(4) as usize);
    let dialog_height = dialog_height(&expression_lines).min(14);

    let dialog_area = center_rect(dialog_width, dialog_height, area);

    // Clear the area behind the dialog
    frame.render_widget(Clear, dialog_area);

    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "This link wants to run a query against:",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("  {}", link.base_url.as_deref().unwrap_or("<unknown project>")),
        Style::default().fg(Color::White),
    )));
    lines.push(Line::from(""));

    for text_line in expression_lines.iter().take(5) {
        lines.push(Line::from(Span::styled(
            format!("  {text_line}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    if expression_lines.len() > 5 {
        lines.push(Line::from(Span::styled(
            "  ...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::raw("Run it? "),
        Span::styled(
            "[y/Enter]",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Run  "),
        Span::styled(
            "[n/Esc]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Cancel"),
    ]));

    let block = Block::default()
        .title("Run linked query?")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, dialog_area);
}

/// Required dialog height for the given wrapped expression.
fn dialog_height(expression_lines: &[String]) -> u16 {
    let shown = expression_lines.len().min(6);
    // Header (2) + spacing (2) + expression + prompt (1) + borders (2)
    (2 + 2 + shown + 1 + 2) as u16
}

/// Wraps text to fit within the given width, word by word.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let text = text.trim();

    for line in text.lines() {
        if line.len() <= max_width {
            lines.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.len() + 1 + word.len() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(text.to_string());
    }

    lines
}

/// Centers a rectangle of the given size within the parent area.
fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
