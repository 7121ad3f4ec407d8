use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

use super::TextField;
use crate::agent::{AgentEditor, AgentList, InfoField};
use crate::api::{
    AgentPatch, AgentSummary, ChatProfile, ChatReply, ConsoleApi, FileUpload, HttpApi,
};
use crate::chat::{ChatSession, StatusStream};
use crate::config::ConsoleSettings;
use crate::error::ConsoleResult;
use crate::session::{Route, SessionGate, SessionHandle, SessionMode, SessionState, View};

/// Main application state.
pub struct App {
    /// Set to true to exit the main loop.
    pub should_quit: bool,
    /// The route the user asked for last, after redirects.
    pub route: Route,
    /// `None` while the startup checks are running.
    pub view: Option<View>,
    /// Session mode as of the last tick.
    pub mode: SessionMode,
    pub screen: Screen,
    pub overlay: Option<OverlayState>,
    /// The message currently displayed in the status bar.
    pub status_message: String,
    pub settings: ConsoleSettings,
    /// Local file paths typed into prompts are resolved against this.
    pub workspace_root: PathBuf,

    // --- Backend ---
    pub(crate) api: Arc<dyn ConsoleApi>,
    /// Present when running against a real backend; the status stream
    /// shares its cookie jar.
    pub(crate) http: Option<HttpApi>,
    pub(crate) gate: SessionGate,
    pub(crate) session: SessionHandle,
    pub(crate) session_rx: watch::Receiver<SessionState>,

    // --- Background results ---
    pub(crate) events_tx: UnboundedSender<Envelope>,
    pub(crate) events_rx: UnboundedReceiver<Envelope>,
    /// Bumped whenever the screen is rebuilt; results tagged with an older
    /// value belong to a screen that no longer exists.
    pub(crate) generation: u64,

    pub(crate) last_tick: Instant,
    pub(crate) tick_rate: Duration,
}

/// Per-route screen state. Leaving a route drops it.
pub enum Screen {
    Loading,
    SetAdminPassword(CredentialForm),
    Login(CredentialForm),
    AgentList(AgentList),
    AgentEditor(EditorScreen),
    UpdatePassword(CredentialForm),
    Chat(ChatScreen),
    Logout(LogoutScreen),
    NotFound(String),
}

/// Result of a background call, tagged with the screen generation that
/// issued it.
pub struct Envelope {
    pub generation: u64,
    pub event: AppEvent,
}

pub enum AppEvent {
    SessionResolved,
    AdminPasswordSet(ConsoleResult<()>),
    LoggedIn(ConsoleResult<()>),
    LoggedOut,
    PasswordChanged(ConsoleResult<()>),
    AgentsLoaded(ConsoleResult<Vec<AgentSummary>>),
    AgentDeleted {
        name: String,
        result: ConsoleResult<()>,
    },
    AgentLoaded(ConsoleResult<AgentPatch>),
    InfoSaved(ConsoleResult<AgentPatch>),
    FilesSaved(ConsoleResult<AgentPatch>),
    /// Local files read for staging; failures carry a message per path.
    FilesRead(Vec<Result<FileUpload, String>>),
    ProfileLoaded(ConsoleResult<ChatProfile>),
    ChatReplied(ConsoleResult<ChatReply>),
}

/// A labelled input inside a credential form.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: TextField,
    pub secret: bool,
}

impl FormField {
    pub fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: TextField::new(),
            secret: true,
        }
    }

    pub fn plain(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: TextField::with_value(value),
            secret: false,
        }
    }
}

/// State shared by the set-password, login and change-password screens.
#[derive(Debug, Clone)]
pub struct CredentialForm {
    pub title: &'static str,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub submitting: bool,
}

impl CredentialForm {
    pub fn set_admin_password() -> Self {
        Self::new(
            "Set Admin Password",
            vec![FormField::secret("Password"), FormField::secret("Confirm Password")],
        )
    }

    pub fn login() -> Self {
        Self::new(
            "Login",
            vec![
                FormField::plain("Username", crate::api::ADMIN_USERNAME),
                FormField::secret("Password"),
            ],
        )
        .focused(1)
    }

    pub fn change_password() -> Self {
        Self::new(
            "Update Admin Password",
            vec![
                FormField::secret("Current Password"),
                FormField::secret("New Password"),
                FormField::secret("Repeat New Password"),
            ],
        )
    }

    fn new(title: &'static str, fields: Vec<FormField>) -> Self {
        Self {
            title,
            fields,
            focus: 0,
            error: None,
            notice: None,
            submitting: false,
        }
    }

    fn focused(mut self, index: usize) -> Self {
        self.focus = index.min(self.fields.len().saturating_sub(1));
        self
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.value.value())
            .unwrap_or_default()
    }

    /// Moves focus, skipping the fixed username field.
    pub fn move_focus(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            return;
        }
        let mut next = self.focus as isize;
        for _ in 0..len {
            next = (next + delta).rem_euclid(len);
            if self.fields[next as usize].secret {
                break;
            }
        }
        self.focus = next as usize;
    }

    pub fn focused_field(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    pub fn clear(&mut self) {
        for field in self.fields.iter_mut().filter(|field| field.secret) {
            field.value.clear();
        }
        self.focus = self.fields.iter().position(|field| field.secret).unwrap_or(0);
    }
}

/// The info fields in the order they are drawn and focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoSlot {
    Name,
    Instructions,
    WelcomeMessage,
    Prompt(usize),
}

impl InfoSlot {
    pub const ALL: [InfoSlot; 6] = [
        InfoSlot::Name,
        InfoSlot::Instructions,
        InfoSlot::WelcomeMessage,
        InfoSlot::Prompt(0),
        InfoSlot::Prompt(1),
        InfoSlot::Prompt(2),
    ];

    pub fn label(&self) -> String {
        match self {
            InfoSlot::Name => String::from("Name"),
            InfoSlot::Instructions => String::from("Instructions"),
            InfoSlot::WelcomeMessage => String::from("Welcome Message"),
            InfoSlot::Prompt(index) => format!("Prompt {}", index + 1),
        }
    }

    pub fn read<'a>(&self, record: &'a crate::agent::AgentRecord) -> &'a str {
        match self {
            InfoSlot::Name => &record.name,
            InfoSlot::Instructions => &record.instructions,
            InfoSlot::WelcomeMessage => &record.welcome_message,
            InfoSlot::Prompt(index) => record.suggested_prompts.get(*index).unwrap_or_default(),
        }
    }

    pub fn field(&self, value: String) -> InfoField {
        match self {
            InfoSlot::Name => InfoField::Name(value),
            InfoSlot::Instructions => InfoField::Instructions(value),
            InfoSlot::WelcomeMessage => InfoField::WelcomeMessage(value),
            InfoSlot::Prompt(index) => InfoField::Prompt(*index, value),
        }
    }
}

pub struct EditorScreen {
    pub editor: AgentEditor,
    /// Index into `InfoSlot::ALL` while editing info.
    pub info_focus: usize,
    pub input: TextField,
    /// Highlighted row of the numbered document list.
    pub file_cursor: usize,
}

impl EditorScreen {
    pub fn new(editor: AgentEditor) -> Self {
        let mut screen = Self {
            editor,
            info_focus: 0,
            input: TextField::new(),
            file_cursor: 0,
        };
        screen.sync_input();
        screen
    }

    pub fn focused_slot(&self) -> InfoSlot {
        InfoSlot::ALL[self.info_focus.min(InfoSlot::ALL.len() - 1)]
    }

    /// Reloads the input from the draft, e.g. after focus moved or the draft
    /// normalized what was typed.
    pub fn sync_input(&mut self) {
        let value = self.focused_slot().read(self.editor.draft()).to_string();
        if value != self.input.value() {
            self.input.set(value);
        }
    }
}

pub struct ChatScreen {
    pub chat: ChatSession,
    pub input: TextField,
    pub stream: Option<StatusStream>,
}

#[derive(Debug, Clone, Default)]
pub struct LogoutScreen {
    pub in_progress: bool,
}

/// Temporary panels drawn over the current screen.
#[derive(Debug, Clone)]
pub enum OverlayState {
    InputPrompt(InputPromptState),
    ConfirmDelete(ConfirmDeleteState),
}

/// Actions waiting for text from an input prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInputAction {
    GoTo,
    StageFiles,
}

#[derive(Debug, Clone)]
pub struct InputPromptState {
    pub title: String,
    pub value: TextField,
    pub placeholder: String,
    pub action: PendingInputAction,
    pub error: Option<String>,
}

impl InputPromptState {
    pub fn new(
        title: impl Into<String>,
        placeholder: impl Into<String>,
        action: PendingInputAction,
        initial: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            value: TextField::with_value(initial.unwrap_or_default()),
            placeholder: placeholder.into(),
            action,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmDeleteState {
    pub agent: String,
    /// 0 for Delete, 1 for Cancel.
    pub selected_index: usize,
}

impl ConfirmDeleteState {
    pub fn new(agent: String) -> Self {
        Self {
            agent,
            selected_index: 1,
        }
    }

    pub fn toggle_selection(&mut self) {
        self.selected_index = (self.selected_index + 1) % 2;
    }

    pub fn confirm_selected(&self) -> bool {
        self.selected_index == 0
    }
}
