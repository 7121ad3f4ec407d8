use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, ConfirmDeleteState, InputPromptState, OverlayState, Screen, TextField};

mod agents;
mod chat;
mod forms;
mod theme;
use theme::*;

const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 16;

fn cell_width(text: &str) -> u16 {
    UnicodeWidthStr::width(text).min(u16::MAX as usize) as u16
}

pub fn render(f: &mut Frame<'_>, app: &App) {
    let size = f.size();
    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        let block = Paragraph::new(format!(
            "The terminal window is too small. Resize it to at least {MIN_WIDTH}x{MIN_HEIGHT}."
        ))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title("Agent Console")
                .borders(Borders::ALL)
                .style(Style::default().fg(FG_PRIMARY).bg(MENU_BG)),
        )
        .style(Style::default().fg(FG_PRIMARY).bg(BG_PRIMARY));
        f.render_widget(block, size);
        return;
    }

    let base = Block::default().style(Style::default().bg(BG_PRIMARY));
    f.render_widget(base, size);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    render_title_bar(f, app, vertical[0]);
    render_body(f, app, vertical[1]);
    render_status_bar(f, app, vertical[2]);

    if let Some(overlay) = app.overlay.as_ref() {
        render_overlay(f, app, overlay);
    }
}

fn render_title_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    f.render_widget(Clear, area);
    let spans = vec![
        Span::styled(
            " Agent Console ",
            Style::default()
                .fg(BAR_TEXT)
                .bg(BAR_HIGHLIGHT_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default().bg(BAR_BG)),
        Span::styled(app.route.path(), Style::default().fg(BAR_TEXT).bg(BAR_BG)),
    ];
    let bar = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Left)
        .style(Style::default().fg(BAR_TEXT).bg(BAR_BG));
    f.render_widget(bar, area);
}

fn render_body(f: &mut Frame<'_>, app: &App, area: Rect) {
    match &app.screen {
        Screen::Loading => render_message(f, area, "Loading", "Checking the session..."),
        Screen::SetAdminPassword(form) | Screen::Login(form) | Screen::UpdatePassword(form) => {
            forms::render_credential_form(f, form, area)
        }
        Screen::AgentList(list) => agents::render_list(f, list, area),
        Screen::AgentEditor(screen) => agents::render_editor(f, screen, area),
        Screen::Chat(screen) => chat::render_chat(f, screen, area),
        Screen::Logout(screen) => forms::render_logout(f, screen, area),
        Screen::NotFound(path) => render_message(
            f,
            area,
            "Not Found",
            &format!("Nothing lives at {path}. Press Enter to go home."),
        ),
    }
}

fn render_message(f: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
    let block = panel_block(title, false);
    let paragraph = Paragraph::new(message)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL));
    f.render_widget(paragraph, centered_rect(60, 30, area));
}

fn render_status_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let segments = [
        format!("[{}]", app.mode.label()),
        app.status_message.clone(),
    ];

    f.render_widget(Clear, area);
    let mut spans: Vec<Span> = Vec::new();
    let mut cursor = area.x;
    let area_end = area.x.saturating_add(area.width);
    for text in segments {
        if cursor >= area_end {
            break;
        }
        let width = cell_width(&text);
        spans.push(Span::styled(text, Style::default().fg(BAR_TEXT).bg(BAR_BG)));
        cursor = cursor.saturating_add(width);
        if cursor < area_end {
            spans.push(Span::styled(" ", Style::default().bg(BAR_BG)));
            cursor = cursor.saturating_add(1);
        }
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(BAR_TEXT).bg(BAR_BG))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn render_overlay(f: &mut Frame<'_>, app: &App, overlay: &OverlayState) {
    match overlay {
        OverlayState::InputPrompt(state) => render_input_prompt_overlay(f, app, state),
        OverlayState::ConfirmDelete(state) => render_confirm_delete_overlay(f, state),
    }
}

fn render_input_prompt_overlay(f: &mut Frame<'_>, app: &App, state: &InputPromptState) {
    let area = centered_rect(60, 30, f.size());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(
            state.title.as_str(),
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MENU_BORDER))
        .style(Style::default().bg(MENU_BG));
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let placeholder =
        Paragraph::new(state.placeholder.as_str()).style(Style::default().fg(FG_DIM).bg(MENU_BG));
    f.render_widget(placeholder, chunks[0]);

    render_text_field(f, &state.value, false, chunks[1], MENU_BG);

    let workspace_hint =
        Paragraph::new(format!("Working directory: {}", app.workspace_root.display()))
            .style(Style::default().fg(FG_DIM).bg(MENU_BG));
    f.render_widget(workspace_hint, chunks[2]);

    if let Some(error) = state.error.as_ref() {
        let error_widget =
            Paragraph::new(error.as_str()).style(Style::default().fg(ERROR_FG).bg(MENU_BG));
        f.render_widget(error_widget, chunks[3]);
    } else {
        let hint = Paragraph::new("Enter to confirm, Esc to cancel")
            .style(Style::default().fg(FG_DIM).bg(MENU_BG));
        f.render_widget(hint, chunks[3]);
    }
}

fn render_confirm_delete_overlay(f: &mut Frame<'_>, state: &ConfirmDeleteState) {
    let area = centered_rect(50, 28, f.size());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(
            "Delete Agent",
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MENU_BORDER))
        .style(Style::default().bg(MENU_BG));
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let message = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("About to delete: ", Style::default().fg(FG_DIM)),
            Span::styled(state.agent.as_str(), Style::default().fg(Color::White)),
        ]),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(FG_DIM),
        )),
    ])
    .style(Style::default().bg(MENU_BG));
    f.render_widget(message, chunks[0]);

    let button = |label: &'static str, selected: bool| {
        let style = if selected {
            Style::default()
                .bg(PANEL_HIGHLIGHT_BG)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(BAR_TEXT)
        };
        Span::styled(label, style)
    };
    let buttons = Paragraph::new(Line::from(vec![
        button(" [Delete] ", state.selected_index == 0),
        Span::styled("  ", Style::default().bg(MENU_BG)),
        button(" [Cancel] ", state.selected_index == 1),
    ]))
    .style(Style::default().bg(MENU_BG))
    .alignment(Alignment::Center);
    f.render_widget(buttons, chunks[1]);

    let hint = Paragraph::new("Enter to confirm, Tab to switch, Esc to cancel")
        .style(Style::default().fg(FG_DIM).bg(MENU_BG))
        .alignment(Alignment::Left);
    f.render_widget(hint, chunks[2]);
}

/// A bordered panel, highlighted when it has focus.
fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default()
            .fg(BORDER_FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_IDLE)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title, Style::default().fg(FG_PRIMARY)))
        .style(Style::default().bg(BG_PANEL))
}

/// Draws a one-line input and places the terminal cursor in it.
fn render_text_field(f: &mut Frame<'_>, field: &TextField, secret: bool, area: Rect, bg: Color) {
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(FG_PRIMARY)),
        Span::styled(field.display(secret), Style::default().fg(Color::White)),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
    let column = field
        .cursor_column(secret)
        .saturating_add(2)
        .min(area.width.saturating_sub(1));
    f.set_cursor(area.x.saturating_add(column), area.y);
}

fn push_wrapped_line(lines: &mut Vec<Line>, text: &str, style: Style, width: usize) {
    for segment in wrap_to_width(text, width) {
        lines.push(Line::from(Span::styled(segment, style)));
    }
}

fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
        if current_width + ch_width > width && !current.is_empty() {
            result.push(current);
            current = String::new();
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    result.push(current);
    result
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1])[1]
}
