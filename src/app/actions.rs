use std::future::Future;
use std::path::PathBuf;

use log::{debug, info};

use super::{
    App, AppEvent, ChatScreen, CredentialForm, EditorScreen, Envelope, LogoutScreen, Screen,
};
use crate::agent::staging::read_candidate;
use crate::agent::{AgentEditor, AgentList, EditorError, Facet};
use crate::chat::{ChatSession, StatusStream};
use crate::session::routes::settle;
use crate::session::{Route, SessionMode, View};

impl App {
    /// Runs `task` in the background and delivers its event on a later tick,
    /// tagged with the current screen generation.
    pub(crate) fn spawn_event<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let event = task.await;
            let _ = tx.send(Envelope { generation, event });
        });
    }

    /// Goes to `route`, following redirects. The screen is only rebuilt when
    /// the resulting view changes.
    pub fn navigate(&mut self, route: Route) {
        self.enter(route, false);
    }

    /// Rebuilds the current screen, re-running its entry actions.
    pub fn reload(&mut self) {
        self.enter(self.route.clone(), true);
    }

    fn enter(&mut self, route: Route, force: bool) {
        let Some((route, view)) = settle(self.session.mode(), route.clone()) else {
            self.route = route;
            self.view = None;
            self.screen = Screen::Loading;
            return;
        };
        if route != self.route {
            debug!("Route {} -> {}", self.route.path(), route.path());
        }
        self.route = route;
        if !force && self.view.as_ref() == Some(&view) {
            return;
        }
        info!("Entering {}", self.route.path());
        self.generation += 1;
        self.overlay = None;
        self.screen = self.build_screen(&view);
        self.view = Some(view);
    }

    fn build_screen(&mut self, view: &View) -> Screen {
        match view {
            View::SetAdminPassword => Screen::SetAdminPassword(CredentialForm::set_admin_password()),
            View::Login => Screen::Login(CredentialForm::login()),
            View::UpdateAdminPassword => Screen::UpdatePassword(CredentialForm::change_password()),
            View::AgentList => {
                let mut list = AgentList::new(self.session.clone());
                if list.begin_load() {
                    let api = self.api.clone();
                    self.spawn_event(async move { AppEvent::AgentsLoaded(api.list_agents().await) });
                }
                Screen::AgentList(list)
            }
            View::AgentEditor(None) => {
                Screen::AgentEditor(EditorScreen::new(AgentEditor::new_record(self.session.clone())))
            }
            View::AgentEditor(Some(name)) => {
                let mut editor = AgentEditor::existing(self.session.clone());
                if editor.begin_load().is_ok() {
                    let api = self.api.clone();
                    let name = name.clone();
                    self.spawn_event(async move { AppEvent::AgentLoaded(api.get_agent(&name).await) });
                }
                Screen::AgentEditor(EditorScreen::new(editor))
            }
            View::Chat(name) => {
                let mut chat = ChatSession::new(self.session.clone(), name.clone());
                if chat.begin_profile() {
                    let api = self.api.clone();
                    let name = name.clone();
                    self.spawn_event(async move { AppEvent::ProfileLoaded(api.chat_profile(&name).await) });
                }
                let stream = match (&self.http, self.settings.status_stream_for(name)) {
                    (Some(http), Some(path)) => Some(StatusStream::open(http.client(), http.url(&path))),
                    _ => None,
                };
                Screen::Chat(ChatScreen {
                    chat,
                    input: super::TextField::new(),
                    stream,
                })
            }
            View::Logout => Screen::Logout(LogoutScreen::default()),
            View::NotFound(path) => Screen::NotFound(path.clone()),
        }
    }

    /// Reacts to a session transition made anywhere in the app.
    pub(crate) fn on_session_change(&mut self, mode: SessionMode) {
        let previous = std::mem::replace(&mut self.mode, mode);
        if previous == SessionMode::Authenticated && mode == SessionMode::Unauthenticated {
            self.status_message = String::from("Signed out");
        }
        let signed_in_elsewhere = matches!(
            self.route,
            Route::Root | Route::Login | Route::Welcome | Route::SetAdminPassword
        );
        if mode == SessionMode::Authenticated && signed_in_elsewhere {
            self.navigate(Route::Agents);
        } else {
            self.navigate(self.route.clone());
        }
    }

    /// Submits whichever credential form is on screen.
    pub(crate) fn submit_form(&mut self) {
        let gate = self.gate.clone();
        match &mut self.screen {
            Screen::SetAdminPassword(form) if !form.submitting => {
                form.submitting = true;
                form.error = None;
                let (password, confirm) = (form.value(0).to_string(), form.value(1).to_string());
                self.spawn_event(async move {
                    AppEvent::AdminPasswordSet(gate.set_admin_password(&password, &confirm).await)
                });
            }
            Screen::Login(form) if !form.submitting => {
                form.submitting = true;
                form.error = None;
                let password = form.value(1).to_string();
                self.spawn_event(async move { AppEvent::LoggedIn(gate.login(&password).await) });
            }
            Screen::UpdatePassword(form) if !form.submitting => {
                form.submitting = true;
                form.error = None;
                form.notice = None;
                let current = form.value(0).to_string();
                let new = form.value(1).to_string();
                let repeat = form.value(2).to_string();
                self.spawn_event(async move {
                    AppEvent::PasswordChanged(gate.change_password(&current, &new, &repeat).await)
                });
            }
            _ => {}
        }
    }

    pub(crate) fn confirm_logout(&mut self) {
        let Screen::Logout(screen) = &mut self.screen else {
            return;
        };
        if screen.in_progress {
            return;
        }
        screen.in_progress = true;
        let gate = self.gate.clone();
        self.spawn_event(async move {
            gate.logout().await;
            AppEvent::LoggedOut
        });
    }

    pub(crate) fn delete_agent(&mut self, name: &str) {
        let Screen::AgentList(list) = &mut self.screen else {
            return;
        };
        if list.selected().map(|agent| agent.name.as_str()) != Some(name) {
            return;
        }
        let Some(name) = list.begin_delete() else {
            return;
        };
        let api = self.api.clone();
        self.status_message = format!("Deleting {name}...");
        self.spawn_event(async move {
            let result = api.delete_agent(&name).await;
            AppEvent::AgentDeleted { name, result }
        });
    }

    pub(crate) fn refresh_agents(&mut self) {
        let Screen::AgentList(list) = &mut self.screen else {
            return;
        };
        if list.begin_load() {
            let api = self.api.clone();
            self.spawn_event(async move { AppEvent::AgentsLoaded(api.list_agents().await) });
        }
    }

    pub(crate) fn save_info(&mut self) {
        let Screen::AgentEditor(screen) = &mut self.screen else {
            return;
        };
        match screen.editor.begin_save_info() {
            Ok(submission) => {
                let api = self.api.clone();
                self.status_message = String::from("Saving...");
                self.spawn_event(async move { AppEvent::InfoSaved(api.save_agent_info(submission).await) });
            }
            Err(err) => self.report_editor_error(err),
        }
    }

    pub(crate) fn save_files(&mut self) {
        let Screen::AgentEditor(screen) = &mut self.screen else {
            return;
        };
        match screen.editor.begin_save_files() {
            Ok(submission) => {
                let api = self.api.clone();
                self.status_message = String::from("Saving...");
                self.spawn_event(async move { AppEvent::FilesSaved(api.save_agent_files(submission).await) });
            }
            Err(err) => self.report_editor_error(err),
        }
    }

    /// Reads the given local files in the background and stages them.
    pub(crate) fn stage_paths(&mut self, input: &str) {
        let paths: Vec<PathBuf> = input
            .split(';')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(|path| self.resolve_path(path))
            .collect();
        if paths.is_empty() {
            return;
        }
        self.status_message = format!("Reading {} file(s)...", paths.len());
        self.spawn_event(async move {
            let mut results = Vec::with_capacity(paths.len());
            for path in paths {
                results.push(read_candidate(&path).await.map_err(|err| format!("{err:#}")));
            }
            AppEvent::FilesRead(results)
        });
    }

    fn resolve_path(&self, input: &str) -> PathBuf {
        let path = PathBuf::from(input);
        if path.is_absolute() {
            path
        } else {
            self.workspace_root.join(path)
        }
    }

    pub(crate) fn send_chat(&mut self) {
        let Screen::Chat(screen) = &mut self.screen else {
            return;
        };
        let Some(request) = screen.chat.begin_send(screen.input.value()) else {
            return;
        };
        screen.input.clear();
        let name = screen.chat.agent().to_string();
        let api = self.api.clone();
        self.spawn_event(async move { AppEvent::ChatReplied(api.chat(&name, request).await) });
    }

    pub(crate) fn report_editor_error(&mut self, err: EditorError) {
        self.status_message = match err {
            EditorError::Busy => String::from("Please wait for the current request to finish"),
            EditorError::EditInProgress(Facet::Info) => String::from("Save or cancel your changes first"),
            EditorError::EditInProgress(Facet::Files) => {
                String::from("Save or cancel your document changes first")
            }
            other => other.to_string(),
        };
    }
}
