use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{App, InfoSlot, PendingInputAction, Screen};
use crate::agent::{CancelOutcome, Facet, Mode, Tab};
use crate::session::Route;

impl App {
    /// The main entry point for handling keyboard events.
    ///
    /// Overlays capture all input, then global shortcuts, then the current
    /// screen.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        if self.handle_global_shortcuts(key) {
            return;
        }

        match &self.screen {
            Screen::Loading => {}
            Screen::SetAdminPassword(_) | Screen::Login(_) | Screen::UpdatePassword(_) => {
                self.handle_form_key(key)
            }
            Screen::AgentList(_) => self.handle_list_key(key),
            Screen::AgentEditor(_) => self.handle_editor_key(key),
            Screen::Chat(_) => self.handle_chat_key(key),
            Screen::Logout(_) => match key.code {
                KeyCode::Enter => self.confirm_logout(),
                KeyCode::Esc => self.navigate(Route::Agents),
                _ => {}
            },
            Screen::NotFound(_) => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.navigate(Route::Root);
                }
            }
        }
    }

    /// Returns `true` if a shortcut was handled.
    fn handle_global_shortcuts(&mut self, key: KeyEvent) -> bool {
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
            KeyCode::Char('g') => {
                let current = self.route.path();
                self.prompt_input(PendingInputAction::GoTo, "Go To", Some(current));
            }
            _ => return false,
        }
        true
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let form = match &mut self.screen {
            Screen::SetAdminPassword(form) | Screen::Login(form) | Screen::UpdatePassword(form) => form,
            _ => return,
        };
        match key.code {
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Esc if matches!(self.route, Route::UpdateAdminPassword) => {
                self.navigate(Route::Agents)
            }
            _ => {
                if form.submitting {
                    return;
                }
                if let Some(field) = form.focused_field()
                    && field.secret
                    && field.value.handle_key(key)
                {
                    form.error = None;
                    form.notice = None;
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let Screen::AgentList(list) = &mut self.screen else {
            return;
        };
        let selected = list.selected().map(|agent| agent.name.clone());
        match key.code {
            KeyCode::Up => list.move_selection(-1),
            KeyCode::Down => list.move_selection(1),
            KeyCode::Enter => {
                if let Some(name) = selected {
                    self.navigate(Route::Agent(name));
                }
            }
            KeyCode::Char('c') => {
                if let Some(name) = selected {
                    self.navigate(Route::Chat(name));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(name) = selected
                    && !list.is_loading()
                {
                    self.open_confirm_delete(name);
                }
            }
            KeyCode::Char('n') => self.navigate(Route::NewAgent),
            KeyCode::Char('r') => self.refresh_agents(),
            KeyCode::Char('p') => self.navigate(Route::UpdateAdminPassword),
            KeyCode::Char('l') => self.navigate(Route::Logout),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Screen::AgentEditor(screen) = &self.screen else {
            return;
        };
        let tab = screen.editor.tab();
        match tab.facet() {
            Some(facet) if screen.editor.mode(facet) == Mode::Edit => match facet {
                Facet::Info => self.handle_info_edit_key(key),
                Facet::Files => self.handle_files_edit_key(key),
            },
            _ => self.handle_editor_view_key(key, tab),
        }
    }

    fn handle_editor_view_key(&mut self, key: KeyEvent, tab: Tab) {
        let Screen::AgentEditor(screen) = &mut self.screen else {
            return;
        };
        let target = match key.code {
            KeyCode::Tab | KeyCode::Right => Some(tab.next()),
            KeyCode::BackTab | KeyCode::Left => Some(tab.next().next()),
            _ => None,
        };
        if let Some(target) = target {
            if let Err(err) = screen.editor.select_tab(target) {
                self.report_editor_error(err);
            }
            return;
        }
        match key.code {
            KeyCode::Char('e') => {
                let Some(facet) = tab.facet() else {
                    return;
                };
                match screen.editor.enter_edit(facet) {
                    Ok(()) => {
                        screen.info_focus = 0;
                        screen.file_cursor = 0;
                        screen.sync_input();
                    }
                    Err(err) => self.report_editor_error(err),
                }
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('x') => screen.editor.dismiss_notice(),
            KeyCode::Enter if tab == Tab::Demo => {
                if let Some(name) = screen.editor.name().map(str::to_string) {
                    self.navigate(Route::Chat(name));
                }
            }
            KeyCode::Esc => self.navigate(Route::Agents),
            _ => {}
        }
    }

    fn handle_info_edit_key(&mut self, key: KeyEvent) {
        let Screen::AgentEditor(screen) = &mut self.screen else {
            return;
        };
        if screen.editor.is_busy(Facet::Info) {
            return;
        }
        let slots = InfoSlot::ALL.len();
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.save_info(),
            KeyCode::Esc => match screen.editor.cancel_edit(Facet::Info) {
                Ok(CancelOutcome::ReturnToList) => self.navigate(Route::Agents),
                Ok(CancelOutcome::Restored) => screen.sync_input(),
                Err(err) => self.report_editor_error(err),
            },
            KeyCode::Up | KeyCode::BackTab => {
                screen.info_focus = (screen.info_focus + slots - 1) % slots;
                screen.sync_input();
            }
            KeyCode::Down | KeyCode::Tab | KeyCode::Enter => {
                screen.info_focus = (screen.info_focus + 1) % slots;
                screen.sync_input();
            }
            _ => {
                let before = screen.input.value().to_string();
                if !screen.input.handle_key(key) || screen.input.value() == before {
                    return;
                }
                let slot = screen.focused_slot();
                let field = slot.field(screen.input.value().to_string());
                match screen.editor.mutate(field) {
                    Ok(()) => screen.sync_input(),
                    Err(err) => {
                        screen.input.set(before);
                        self.report_editor_error(err);
                    }
                }
            }
        }
    }

    fn handle_files_edit_key(&mut self, key: KeyEvent) {
        let Screen::AgentEditor(screen) = &mut self.screen else {
            return;
        };
        if screen.editor.is_busy(Facet::Files) {
            return;
        }
        let rows = screen.editor.staging().entries().len();
        match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.save_files(),
            KeyCode::Esc => match screen.editor.cancel_edit(Facet::Files) {
                Ok(_) => screen.file_cursor = 0,
                Err(err) => self.report_editor_error(err),
            },
            KeyCode::Char('a') => self.prompt_input(
                PendingInputAction::StageFiles,
                "Add Documents",
                None,
            ),
            KeyCode::Up => screen.file_cursor = screen.file_cursor.saturating_sub(1),
            KeyCode::Down if rows > 0 => {
                screen.file_cursor = (screen.file_cursor + 1).min(rows - 1);
            }
            KeyCode::Delete | KeyCode::Char('x') => {
                match screen.editor.remove_file_number(screen.file_cursor + 1) {
                    Ok(_) => {
                        let rows = screen.editor.staging().entries().len();
                        screen.file_cursor = screen.file_cursor.min(rows.saturating_sub(1));
                    }
                    Err(err) => self.report_editor_error(err),
                }
            }
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) {
        let Screen::Chat(screen) = &mut self.screen else {
            return;
        };
        match key.code {
            KeyCode::Enter => self.send_chat(),
            KeyCode::Esc => self.navigate(Route::Agents),
            KeyCode::Up => screen.chat.move_selection(-1),
            KeyCode::Down => screen.chat.move_selection(1),
            KeyCode::F(n @ 1..=3) => {
                if let Some(prompt) = screen.chat.suggested_prompt(usize::from(n - 1)) {
                    let prompt = prompt.to_string();
                    screen.input.set(prompt);
                }
            }
            _ => {
                screen.input.handle_key(key);
            }
        }
    }
}
