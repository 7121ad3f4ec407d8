use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::theme::*;
use super::{centered_rect, panel_block, push_wrapped_line, render_text_field};
use crate::agent::list::EMPTY_LIST;
use crate::agent::record::is_processing;
use crate::agent::{AgentList, Facet, Mode, Tab};
use crate::app::{EditorScreen, InfoSlot};

const PROCESSING_BANNER: &str = "Documents being processed. Refresh to check.";

pub(super) fn render_list(f: &mut Frame<'_>, list: &AgentList, area: Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let block = panel_block("Agents", true);
    if list.agents().is_empty() {
        let text = if list.is_loading() {
            "Loading..."
        } else {
            list.error().unwrap_or(EMPTY_LIST)
        };
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(FG_DIM).bg(BG_PANEL));
        f.render_widget(paragraph, sections[0]);
    } else {
        let items: Vec<ListItem> = list
            .agents()
            .iter()
            .map(|agent| {
                let mut spans = vec![Span::styled(
                    agent.name.clone(),
                    Style::default().fg(FG_PRIMARY),
                )];
                if let Some(status) = agent.status.as_deref() {
                    spans.push(Span::styled(format!("  {status}"), Style::default().fg(FG_DIM)));
                }
                if is_processing(agent.embeddings_status.as_deref()) {
                    spans.push(Span::styled("  processing", Style::default().fg(PENDING_FG)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(list.selected_index()));
        let widget = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(ROW_HIGHLIGHT_BG)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(widget, sections[0], &mut state);
    }

    let hint = match list.error() {
        Some(error) if !list.agents().is_empty() => {
            Line::from(Span::styled(error, Style::default().fg(ERROR_FG)))
        }
        _ => Line::from(Span::styled(
            "Enter open, n new, c chat, d delete, r refresh, p password, l logout",
            Style::default().fg(FG_DIM),
        )),
    };
    f.render_widget(Paragraph::new(hint).style(Style::default().bg(BG_PRIMARY)), sections[1]);
}

pub(super) fn render_editor(f: &mut Frame<'_>, screen: &EditorScreen, area: Rect) {
    let editor = &screen.editor;
    let title = match editor.name() {
        Some(name) => format!("Agent: {name}"),
        None => String::from("New Agent"),
    };
    let block = panel_block(&title, true);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_tabs(f, editor.tab(), sections[0]);

    if editor.is_processing() {
        f.render_widget(
            Paragraph::new(PROCESSING_BANNER)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).bg(BANNER_BG)),
            sections[1],
        );
    } else if let Some(notice) = editor.notice() {
        f.render_widget(
            Paragraph::new(notice).style(Style::default().fg(NOTICE_FG).bg(BG_PANEL)),
            sections[1],
        );
    }

    if let Some(error) = editor.load_error() {
        f.render_widget(
            Paragraph::new(error)
                .alignment(Alignment::Center)
                .style(Style::default().fg(ERROR_FG).bg(BG_PANEL)),
            sections[2],
        );
    } else {
        match editor.tab() {
            Tab::Info => render_info(f, screen, sections[2]),
            Tab::Docs => render_docs(f, screen, sections[2]),
            Tab::Demo => render_demo(f, screen, sections[2]),
        }
    }

    f.render_widget(
        Paragraph::new(editor_hint(screen)).style(Style::default().fg(FG_DIM).bg(BG_PANEL)),
        sections[3],
    );

    if editor.is_loading() {
        let text = if editor.snapshot().is_none() && !editor.is_new() {
            "Loading..."
        } else {
            "Saving..."
        };
        let popup = centered_rect(30, 20, area);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(panel_block("", false))
                .style(Style::default().fg(Color::White).bg(MENU_BG)),
            popup,
        );
    }
}

fn render_tabs(f: &mut Frame<'_>, active: Tab, area: Rect) {
    let mut spans = Vec::new();
    for tab in Tab::ALL {
        let style = if tab == active {
            Style::default()
                .bg(PANEL_HIGHLIGHT_BG)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FG_PRIMARY)
        };
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG_PANEL)),
        area,
    );
}

fn render_info(f: &mut Frame<'_>, screen: &EditorScreen, area: Rect) {
    let editor = &screen.editor;
    let editing = editor.mode(Facet::Info) == Mode::Edit;
    let draft = editor.draft();

    let mut constraints: Vec<Constraint> = InfoSlot::ALL
        .iter()
        .flat_map(|_| [Constraint::Length(1), Constraint::Length(1)])
        .collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, slot) in InfoSlot::ALL.iter().enumerate() {
        let focused = editing && idx == screen.info_focus;
        let label_style = if focused {
            Style::default().fg(BORDER_FOCUS).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FG_DIM)
        };
        f.render_widget(
            Paragraph::new(slot.label()).style(label_style.bg(BG_PANEL)),
            rows[idx * 2],
        );
        let value_area = rows[idx * 2 + 1];
        if focused && !editor.is_busy(Facet::Info) {
            render_text_field(f, &screen.input, false, value_area, BG_PANEL);
        } else {
            let value = slot.read(draft);
            let text = if value.is_empty() { "-" } else { value };
            f.render_widget(
                Paragraph::new(format!("  {text}"))
                    .style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL)),
                value_area,
            );
        }
    }

    if let Some(error) = editor.error(Facet::Info) {
        f.render_widget(
            Paragraph::new(error)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(ERROR_FG).bg(BG_PANEL)),
            rows[InfoSlot::ALL.len() * 2],
        );
    }
}

fn render_docs(f: &mut Frame<'_>, screen: &EditorScreen, area: Rect) {
    let editor = &screen.editor;
    let editing = editor.mode(Facet::Files) == Mode::Edit;
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);

    let entries = editor.staging().entries();
    if entries.is_empty() {
        f.render_widget(
            Paragraph::new("No documents.").style(Style::default().fg(FG_DIM).bg(BG_PANEL)),
            sections[0],
        );
    } else {
        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                let mut spans = vec![
                    Span::styled(format!("{:>3}. ", entry.number), Style::default().fg(FG_DIM)),
                    Span::styled(entry.name.clone(), Style::default().fg(FG_PRIMARY)),
                ];
                if entry.pending {
                    spans.push(Span::styled("  (new)", Style::default().fg(PENDING_FG)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let mut state = ListState::default();
        if editing {
            state.select(Some(screen.file_cursor.min(entries.len() - 1)));
        }
        let widget = List::new(items).highlight_style(
            Style::default()
                .bg(ROW_HIGHLIGHT_BG)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(widget, sections[0], &mut state);
    }

    let mut lines = Vec::new();
    let removed = editor.staging().pending_deletes();
    if editing && !removed.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Removing: {}", removed.join(", ")),
            Style::default().fg(PENDING_FG),
        )));
    }
    if let Some(error) = editor.error(Facet::Files) {
        push_wrapped_line(
            &mut lines,
            error,
            Style::default().fg(ERROR_FG),
            sections[1].width as usize,
        );
    }
    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(BG_PANEL)),
        sections[1],
    );
}

fn render_demo(f: &mut Frame<'_>, screen: &EditorScreen, area: Rect) {
    let text = match screen.editor.name() {
        Some(name) => format!("Press Enter to chat with {name}."),
        None => String::from("Save the agent to try it out."),
    };
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL)),
        area,
    );
}

fn editor_hint(screen: &EditorScreen) -> &'static str {
    let editor = &screen.editor;
    match editor.tab().facet() {
        Some(Facet::Info) if editor.mode(Facet::Info) == Mode::Edit => {
            "Up/Down move, Ctrl+S save, Esc cancel"
        }
        Some(Facet::Files) if editor.mode(Facet::Files) == Mode::Edit => {
            "a add, x remove, Ctrl+S save, Esc cancel"
        }
        Some(_) => "e edit, Tab switch tab, r refresh, Esc back",
        None => "Enter open chat, Tab switch tab, Esc back",
    }
}
