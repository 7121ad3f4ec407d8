use log::{debug, info, warn};

use super::{App, AppEvent, Screen};
use crate::agent::SaveOutcome;
use crate::chat::StreamEvent;
use crate::session::{Route, View};

impl App {
    /// Called on every tick of the main loop.
    ///
    /// Applies finished background calls, drains the chat status stream and
    /// follows session transitions.
    pub fn on_tick(&mut self) {
        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = std::time::Instant::now();
        }

        while let Ok(envelope) = self.events_rx.try_recv() {
            let global = matches!(envelope.event, AppEvent::SessionResolved | AppEvent::LoggedOut);
            if envelope.generation != self.generation && !global {
                debug!("Discarding result for a screen that was left");
                continue;
            }
            self.apply_event(envelope.event);
        }

        self.poll_status_stream();

        if self.session_rx.has_changed().unwrap_or(false) {
            let mode = self.session_rx.borrow_and_update().mode();
            self.on_session_change(mode);
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionResolved => {
                info!("Startup checks finished: {:?}", self.session.mode());
                self.status_message = String::from("Ctrl+G to go to a path, Ctrl+Q to quit");
                self.navigate(self.route.clone());
            }
            AppEvent::AdminPasswordSet(result) => {
                if let Screen::SetAdminPassword(form) = &mut self.screen {
                    form.submitting = false;
                    match result {
                        Ok(()) => self.status_message = String::from("Admin password saved. Please log in."),
                        Err(err) => form.error = Some(err.user_message()),
                    }
                }
            }
            AppEvent::LoggedIn(result) => {
                if let Screen::Login(form) = &mut self.screen {
                    form.submitting = false;
                    match result {
                        Ok(()) => self.status_message = String::from("Logged in"),
                        Err(err) => {
                            form.clear();
                            form.error = Some(err.user_message());
                        }
                    }
                }
            }
            AppEvent::LoggedOut => self.status_message = String::from("Logged out"),
            AppEvent::PasswordChanged(result) => {
                if let Screen::UpdatePassword(form) = &mut self.screen {
                    form.submitting = false;
                    match result {
                        Ok(()) => {
                            form.clear();
                            form.notice = Some(String::from("Password updated"));
                        }
                        Err(err) if err.is_authorization() => {}
                        Err(err) => form.error = Some(err.user_message()),
                    }
                }
            }
            AppEvent::AgentsLoaded(result) => {
                if let Screen::AgentList(list) = &mut self.screen {
                    list.finish_load(result);
                }
            }
            AppEvent::AgentDeleted { name, result } => {
                if let Screen::AgentList(list) = &mut self.screen {
                    let deleted = result.is_ok();
                    list.finish_delete(&name, result);
                    if deleted {
                        self.status_message = format!("Deleted {name}");
                    }
                }
            }
            AppEvent::AgentLoaded(result) => {
                if let Screen::AgentEditor(screen) = &mut self.screen {
                    screen.editor.finish_load(result);
                    screen.sync_input();
                }
            }
            AppEvent::InfoSaved(result) => {
                let Screen::AgentEditor(screen) = &mut self.screen else {
                    return;
                };
                let outcome = screen.editor.finish_save_info(result);
                screen.sync_input();
                match outcome {
                    SaveOutcome::Created { name } => {
                        // Same editor, now addressed by its name.
                        self.route = Route::Agent(name.clone());
                        self.view = Some(View::AgentEditor(Some(name.clone())));
                        self.status_message = format!("Created {name}");
                    }
                    SaveOutcome::Saved => self.status_message = String::from("Agent saved"),
                    SaveOutcome::Failed => {
                        self.status_message = String::from("Saving failed");
                    }
                    SaveOutcome::SessionRevoked => {}
                }
            }
            AppEvent::FilesSaved(result) => {
                let Screen::AgentEditor(screen) = &mut self.screen else {
                    return;
                };
                match screen.editor.finish_save_files(result) {
                    SaveOutcome::Saved | SaveOutcome::Created { .. } => {
                        screen.file_cursor = 0;
                        self.status_message = String::from("Documents saved");
                    }
                    SaveOutcome::Failed => {
                        self.status_message = String::from("Saving documents failed");
                    }
                    SaveOutcome::SessionRevoked => {}
                }
            }
            AppEvent::FilesRead(results) => {
                let Screen::AgentEditor(screen) = &mut self.screen else {
                    return;
                };
                let mut files = Vec::new();
                let mut failures = Vec::new();
                for result in results {
                    match result {
                        Ok(file) => files.push(file),
                        Err(message) => failures.push(message),
                    }
                }
                match screen.editor.stage_files(files) {
                    Ok(report) => {
                        self.status_message = if let Some(failure) = failures.first() {
                            failure.clone()
                        } else if let Some(warning) = report.warning() {
                            warning.to_string()
                        } else {
                            format!("Staged {} file(s)", report.accepted.len())
                        };
                    }
                    Err(err) => self.report_editor_error(err),
                }
            }
            AppEvent::ProfileLoaded(result) => {
                if let Screen::Chat(screen) = &mut self.screen {
                    screen.chat.finish_profile(result);
                }
            }
            AppEvent::ChatReplied(result) => {
                if let Screen::Chat(screen) = &mut self.screen {
                    screen.chat.finish_send(result);
                }
            }
        }
    }

    fn poll_status_stream(&mut self) {
        let Screen::Chat(screen) = &mut self.screen else {
            return;
        };
        let mut closed = false;
        if let Some(stream) = screen.stream.as_mut() {
            while let Some(event) = stream.poll_event() {
                match event {
                    StreamEvent::Message(line) => screen.chat.push_status(line),
                    StreamEvent::Closed(reason) => {
                        match reason {
                            Some(reason) => warn!("Status stream closed: {reason}"),
                            None => debug!("Status stream ended"),
                        }
                        closed = true;
                    }
                }
            }
        }
        if closed {
            screen.stream = None;
        }
    }
}
