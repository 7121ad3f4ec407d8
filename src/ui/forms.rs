use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph, Wrap};

use super::theme::*;
use super::{centered_rect, panel_block, render_text_field};
use crate::app::{CredentialForm, LogoutScreen};

pub(super) fn render_credential_form(f: &mut Frame<'_>, form: &CredentialForm, area: Rect) {
    let rows = form.fields.len() as u16 * 2 + 4;
    let height_pct = (rows * 100 / area.height.max(1)).clamp(30, 90);
    let area = centered_rect(60, height_pct, area);
    f.render_widget(Clear, area);
    let block = panel_block(form.title, true);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = Vec::new();
    for _ in &form.fields {
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focus;
        let label_style = if focused {
            Style::default().fg(BORDER_FOCUS).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(FG_DIM)
        };
        f.render_widget(
            Paragraph::new(field.label).style(label_style.bg(BG_PANEL)),
            chunks[idx * 2],
        );
        let value_area = chunks[idx * 2 + 1];
        if focused && !form.submitting {
            render_text_field(f, &field.value, field.secret, value_area, BG_PANEL);
        } else {
            let text = format!("  {}", field.value.display(field.secret));
            f.render_widget(
                Paragraph::new(text).style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL)),
                value_area,
            );
        }
    }

    let message_area = chunks[form.fields.len() * 2];
    let message = if let Some(error) = form.error.as_deref() {
        Paragraph::new(error).style(Style::default().fg(ERROR_FG).bg(BG_PANEL))
    } else if let Some(notice) = form.notice.as_deref() {
        Paragraph::new(notice).style(Style::default().fg(NOTICE_FG).bg(BG_PANEL))
    } else if form.submitting {
        Paragraph::new("Submitting...").style(Style::default().fg(FG_DIM).bg(BG_PANEL))
    } else {
        Paragraph::new("Enter to submit, Tab to move").style(Style::default().fg(FG_DIM).bg(BG_PANEL))
    };
    f.render_widget(message.wrap(Wrap { trim: true }), message_area);
}

pub(super) fn render_logout(f: &mut Frame<'_>, screen: &LogoutScreen, area: Rect) {
    let area = centered_rect(50, 30, area);
    f.render_widget(Clear, area);
    let text = if screen.in_progress {
        "Logging out..."
    } else {
        "Log out of the console? Enter to confirm, Esc to go back."
    };
    let paragraph = Paragraph::new(text)
        .block(panel_block("Logout", true))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL));
    f.render_widget(paragraph, area);
}
