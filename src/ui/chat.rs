use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use super::theme::*;
use super::{panel_block, push_wrapped_line, render_text_field};
use crate::app::ChatScreen;

pub(super) fn render_chat(f: &mut Frame<'_>, screen: &ChatScreen, area: Rect) {
    let chat = &screen.chat;
    let status_height = if screen.stream.is_some() || !chat.status_lines().is_empty() {
        5
    } else {
        0
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(status_height),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .split(area);

    render_history(f, screen, sections[0]);
    if status_height > 0 {
        render_status_lines(f, screen, sections[1]);
    }

    let prompts: Vec<Span> = chat
        .prompts()
        .slots()
        .iter()
        .enumerate()
        .filter(|(_, prompt)| !prompt.is_empty())
        .flat_map(|(idx, prompt)| {
            [
                Span::styled(format!("F{} ", idx + 1), Style::default().fg(BORDER_FOCUS)),
                Span::styled(format!("{prompt}  "), Style::default().fg(FG_PRIMARY)),
            ]
        })
        .collect();
    let mut footer = vec![Line::from(prompts)];
    if let Some(error) = chat.error() {
        footer.push(Line::from(Span::styled(error, Style::default().fg(ERROR_FG))));
    }
    f.render_widget(
        Paragraph::new(footer).style(Style::default().bg(BG_PRIMARY)),
        sections[2],
    );

    let title = if chat.is_loading() {
        "Waiting for reply..."
    } else {
        "Message (Enter to send, Esc to leave)"
    };
    let block = panel_block(title, true);
    let inner = block.inner(sections[3]);
    f.render_widget(block, sections[3]);
    render_text_field(f, &screen.input, false, inner, BG_PANEL);
}

fn render_history(f: &mut Frame<'_>, screen: &ChatScreen, area: Rect) {
    let chat = &screen.chat;
    let block = panel_block(chat.agent(), false);
    let wrap_width = block.inner(area).width.max(1) as usize;

    let items: Vec<ListItem> = chat
        .messages()
        .iter()
        .map(|message| {
            let (who, color) = if message.is_user() {
                ("You", Color::Cyan)
            } else {
                (chat.agent(), Color::White)
            };
            let mut lines = vec![Line::from(Span::styled(
                who.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))];
            for line in message.content.lines() {
                push_wrapped_line(&mut lines, line, Style::default().fg(FG_PRIMARY), wrap_width);
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(chat.selected_index()));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(BG_PANEL));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_status_lines(f: &mut Frame<'_>, screen: &ChatScreen, area: Rect) {
    let block = panel_block("Status", false);
    let visible = block.inner(area).height as usize;
    let lines = screen.chat.status_lines();
    let start = lines.len().saturating_sub(visible);
    let text: Vec<Line> = lines
        .iter()
        .skip(start)
        .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(FG_DIM))))
        .collect();
    f.render_widget(Paragraph::new(text).block(block), area);
}
