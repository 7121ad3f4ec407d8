use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, info};

use super::{App, ConfirmDeleteState, InputPromptState, OverlayState, PendingInputAction};
use crate::session::Route;

// Implementation block for overlay-related logic in the App.
impl App {
    /// Opens an input prompt overlay for `action`.
    pub(crate) fn prompt_input(
        &mut self,
        action: PendingInputAction,
        title: &str,
        suggestion: Option<String>,
    ) {
        let placeholder = match action {
            PendingInputAction::GoTo => "Enter a path such as /agents or /chat/<name>",
            PendingInputAction::StageFiles => {
                "Enter file paths separated by ';' (relative to the working directory)"
            }
        };
        debug!("Showing input prompt: {}", title);
        self.overlay = Some(OverlayState::InputPrompt(InputPromptState::new(
            title,
            placeholder,
            action,
            suggestion,
        )));
        self.status_message = format!("{}: waiting for input", title);
    }

    /// Asks before deleting `agent`.
    pub(crate) fn open_confirm_delete(&mut self, agent: String) {
        self.status_message = format!("Delete {}?", agent);
        self.overlay = Some(OverlayState::ConfirmDelete(ConfirmDeleteState::new(agent)));
    }

    pub(crate) fn close_overlay(&mut self) {
        self.overlay = None;
        debug!("Closed overlay");
    }

    /// Routes a key to whichever overlay is open.
    pub(crate) fn handle_overlay_key(&mut self, key: KeyEvent) {
        // Taken out so the handlers can call back into `self`.
        match self.overlay.take() {
            Some(OverlayState::ConfirmDelete(state)) => self.handle_confirm_delete_key(key, state),
            Some(OverlayState::InputPrompt(state)) => self.handle_input_prompt_key(key, state),
            None => {}
        }
    }

    fn handle_confirm_delete_key(&mut self, key: KeyEvent, mut state: ConfirmDeleteState) {
        match key.code {
            KeyCode::Esc => {
                self.close_overlay();
                self.status_message = format!("Kept {}", state.agent);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                state.toggle_selection();
                self.overlay = Some(OverlayState::ConfirmDelete(state));
            }
            KeyCode::Enter => {
                if state.confirm_selected() {
                    info!("Deleting agent {}", state.agent);
                    self.delete_agent(&state.agent);
                } else {
                    self.status_message = format!("Kept {}", state.agent);
                }
            }
            _ => self.overlay = Some(OverlayState::ConfirmDelete(state)),
        }
    }

    fn handle_input_prompt_key(&mut self, key: KeyEvent, mut state: InputPromptState) {
        match key.code {
            KeyCode::Esc => {
                self.close_overlay();
                self.status_message = format!("{}: cancelled", state.title);
            }
            KeyCode::Enter => {
                let input = state.value.value().trim().to_string();
                if input.is_empty() {
                    state.error = Some(String::from("Input cannot be empty"));
                    self.overlay = Some(OverlayState::InputPrompt(state));
                    return;
                }
                match state.action {
                    PendingInputAction::GoTo => self.navigate(Route::parse(&input)),
                    PendingInputAction::StageFiles => self.stage_paths(&input),
                }
            }
            _ => {
                if state.value.handle_key(key) {
                    state.error = None;
                }
                self.overlay = Some(OverlayState::InputPrompt(state));
            }
        }
    }
}
