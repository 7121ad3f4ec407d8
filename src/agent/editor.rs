//! Edit workflow for a single agent.
//!
//! The info fields and the document list are saved independently. Each
//! network step is split into `begin_*` (validate, mark busy, build the
//! request) and `finish_*` (apply the response), so the UI can run the call
//! on a spawned task and feed the result back later. The `load`/`save_*`
//! methods chain both halves for callers that can simply await.

use log::{debug, info, warn};
use thiserror::Error;

use crate::api::{AgentPatch, ConsoleApi, FileUpload, FilesSubmission, InfoSubmission};
use crate::error::ConsoleResult;
use crate::session::SessionHandle;

use super::record::{AgentRecord, is_valid_name, sanitize_name};
use super::staging::{FileStaging, StageReport};

pub const LOAD_FAILED: &str = "Failed to load agent data.";
pub const AGENT_NOT_FOUND: &str = "Agent not found.";
pub const INVALID_NAME: &str =
    "Agent name is required and may only contain lowercase letters, digits and hyphens.";

/// The two parts of a record that are saved separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Info,
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Info,
    Docs,
    Demo,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Info, Tab::Docs, Tab::Demo];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Info => "Info",
            Tab::Docs => "Docs",
            Tab::Demo => "Demo",
        }
    }

    pub fn facet(&self) -> Option<Facet> {
        match self {
            Tab::Info => Some(Facet::Info),
            Tab::Docs => Some(Facet::Files),
            Tab::Demo => None,
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Info => Tab::Docs,
            Tab::Docs => Tab::Demo,
            Tab::Demo => Tab::Info,
        }
    }
}

/// A single edit to the info draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoField {
    Name(String),
    Instructions(String),
    WelcomeMessage(String),
    Prompt(usize, String),
}

/// Calls that are not allowed in the editor's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("{0:?} is not being edited")]
    NotEditing(Facet),
    #[error("{0:?} is already being edited")]
    AlreadyEditing(Facet),
    #[error("finish or cancel editing {0:?} first")]
    EditInProgress(Facet),
    #[error("a request is still in flight")]
    Busy,
    #[error("the agent has not been saved yet")]
    NoSnapshot,
    #[error("the name of an existing agent cannot change")]
    NameLocked,
    #[error("prompt slot {0} does not exist")]
    PromptSlot(usize),
    #[error("invalid agent name")]
    InvalidName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Restored,
    /// A record that was never saved has nothing to return to.
    ReturnToList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// First save of a new record; the backend assigned this name.
    Created { name: String },
    /// The call failed; the facet's error message is set.
    Failed,
    /// The backend rejected the session; the facet state is untouched.
    SessionRevoked,
}

pub struct AgentEditor {
    session: SessionHandle,
    snapshot: Option<AgentRecord>,
    draft: AgentRecord,
    staging: FileStaging,
    info_mode: Mode,
    files_mode: Mode,
    tab: Tab,
    loading_record: bool,
    info_busy: bool,
    files_busy: bool,
    load_error: Option<String>,
    info_error: Option<String>,
    files_error: Option<String>,
    notice: Option<String>,
}

impl AgentEditor {
    /// An empty record, opened directly in edit mode.
    pub fn new_record(session: SessionHandle) -> Self {
        Self {
            session,
            snapshot: None,
            draft: AgentRecord::default(),
            staging: FileStaging::default(),
            info_mode: Mode::Edit,
            files_mode: Mode::View,
            tab: Tab::Info,
            loading_record: false,
            info_busy: false,
            files_busy: false,
            load_error: None,
            info_error: None,
            files_error: None,
            notice: None,
        }
    }

    /// An existing record, waiting for `load`.
    pub fn existing(session: SessionHandle) -> Self {
        Self {
            info_mode: Mode::View,
            ..Self::new_record(session)
        }
    }

    pub fn snapshot(&self) -> Option<&AgentRecord> {
        self.snapshot.as_ref()
    }

    pub fn draft(&self) -> &AgentRecord {
        &self.draft
    }

    pub fn staging(&self) -> &FileStaging {
        &self.staging
    }

    pub fn mode(&self, facet: Facet) -> Mode {
        match facet {
            Facet::Info => self.info_mode,
            Facet::Files => self.files_mode,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn is_new(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|record| record.name.as_str())
    }

    pub fn is_processing(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(AgentRecord::is_processing)
    }

    /// True while any call for this record is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading_record || self.info_busy || self.files_busy
    }

    pub fn is_busy(&self, facet: Facet) -> bool {
        match facet {
            Facet::Info => self.info_busy,
            Facet::Files => self.files_busy,
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn error(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Info => self.info_error.as_deref(),
            Facet::Files => self.files_error.as_deref(),
        }
    }

    /// Last non-fatal warning, such as ignored files.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn select_tab(&mut self, tab: Tab) -> Result<(), EditorError> {
        if self.is_loading() {
            return Err(EditorError::Busy);
        }
        if let Some(facet) = self.tab.facet()
            && self.mode(facet) == Mode::Edit
        {
            return Err(EditorError::EditInProgress(facet));
        }
        self.tab = tab;
        Ok(())
    }

    pub fn begin_load(&mut self) -> Result<(), EditorError> {
        if self.is_loading() {
            return Err(EditorError::Busy);
        }
        self.loading_record = true;
        self.load_error = None;
        Ok(())
    }

    /// Replaces everything with the fetched record. On failure the previous
    /// state stays as it was.
    pub fn finish_load(&mut self, result: ConsoleResult<AgentPatch>) {
        self.loading_record = false;
        match result {
            Ok(patch) => {
                let record = AgentRecord::from_patch(patch);
                debug!("Loaded agent {}", record.name);
                self.staging.reset(&record.files);
                self.draft = record.clone();
                self.snapshot = Some(record);
                self.info_mode = Mode::View;
                self.files_mode = Mode::View;
                self.info_error = None;
                self.files_error = None;
            }
            Err(err) => {
                if self.session.observe(&err) {
                    return;
                }
                warn!("Loading agent failed: {err}");
                let message = if err.is_not_found() { AGENT_NOT_FOUND } else { LOAD_FAILED };
                self.load_error = Some(message.to_string());
            }
        }
    }

    pub async fn load(&mut self, api: &dyn ConsoleApi, name: &str) -> Result<(), EditorError> {
        self.begin_load()?;
        let result = api.get_agent(name).await;
        self.finish_load(result);
        Ok(())
    }

    pub fn enter_edit(&mut self, facet: Facet) -> Result<(), EditorError> {
        if self.is_loading() {
            return Err(EditorError::Busy);
        }
        if self.mode(facet) == Mode::Edit {
            return Err(EditorError::AlreadyEditing(facet));
        }
        let snapshot = self.snapshot.as_ref().ok_or(EditorError::NoSnapshot)?;
        match facet {
            Facet::Info => {
                self.draft = snapshot.clone();
                self.info_error = None;
                self.info_mode = Mode::Edit;
            }
            Facet::Files => {
                self.staging.reset(&snapshot.files);
                self.files_error = None;
                self.files_mode = Mode::Edit;
            }
        }
        Ok(())
    }

    pub fn mutate(&mut self, field: InfoField) -> Result<(), EditorError> {
        if self.info_mode != Mode::Edit {
            return Err(EditorError::NotEditing(Facet::Info));
        }
        if self.info_busy {
            return Err(EditorError::Busy);
        }
        match field {
            InfoField::Name(name) => {
                if self.snapshot.is_some() {
                    return Err(EditorError::NameLocked);
                }
                self.draft.name = sanitize_name(&name);
            }
            InfoField::Instructions(text) => self.draft.instructions = text,
            InfoField::WelcomeMessage(text) => self.draft.welcome_message = text,
            InfoField::Prompt(index, value) => {
                if !self.draft.suggested_prompts.set(index, &value) {
                    return Err(EditorError::PromptSlot(index));
                }
            }
        }
        Ok(())
    }

    pub fn cancel_edit(&mut self, facet: Facet) -> Result<CancelOutcome, EditorError> {
        if self.is_loading() {
            return Err(EditorError::Busy);
        }
        if self.mode(facet) != Mode::Edit {
            return Err(EditorError::NotEditing(facet));
        }
        match facet {
            Facet::Info => match &self.snapshot {
                Some(snapshot) => {
                    self.draft = snapshot.clone();
                    self.info_error = None;
                    self.info_mode = Mode::View;
                    Ok(CancelOutcome::Restored)
                }
                None => Ok(CancelOutcome::ReturnToList),
            },
            Facet::Files => {
                let files = self
                    .snapshot
                    .as_ref()
                    .map(|record| record.files.clone())
                    .unwrap_or_default();
                self.staging.reset(&files);
                self.files_error = None;
                self.files_mode = Mode::View;
                Ok(CancelOutcome::Restored)
            }
        }
    }

    pub fn begin_save_info(&mut self) -> Result<InfoSubmission, EditorError> {
        if self.info_mode != Mode::Edit {
            return Err(EditorError::NotEditing(Facet::Info));
        }
        if self.info_busy || self.loading_record {
            return Err(EditorError::Busy);
        }
        let is_new = self.snapshot.is_none();
        if is_new && !is_valid_name(&self.draft.name) {
            self.info_error = Some(INVALID_NAME.to_string());
            return Err(EditorError::InvalidName);
        }
        let name = match &self.snapshot {
            Some(snapshot) => snapshot.name.clone(),
            None => self.draft.name.clone(),
        };
        self.info_busy = true;
        self.info_error = None;
        Ok(InfoSubmission {
            name,
            instructions: self.draft.instructions.clone(),
            welcome_message: self.draft.welcome_message.clone(),
            suggested_prompts: self.draft.suggested_prompts.submitted(),
            status: self.draft.status.clone(),
            is_new,
        })
    }

    pub fn finish_save_info(&mut self, result: ConsoleResult<AgentPatch>) -> SaveOutcome {
        self.info_busy = false;
        match result {
            Ok(patch) => {
                let was_new = self.snapshot.is_none();
                let mut record = self.snapshot.clone().unwrap_or_default();
                record.name = self.draft.name.clone();
                record.instructions = self.draft.instructions.clone();
                record.welcome_message = self.draft.welcome_message.clone();
                record.suggested_prompts = self.draft.suggested_prompts.clone();
                record.apply(patch);
                if self.files_mode == Mode::View {
                    self.staging.reset(&record.files);
                }
                self.draft = record.clone();
                let name = record.name.clone();
                self.snapshot = Some(record);
                self.info_mode = Mode::View;
                if was_new {
                    info!("Created agent {name}");
                    SaveOutcome::Created { name }
                } else {
                    info!("Saved agent {name}");
                    SaveOutcome::Saved
                }
            }
            Err(err) => {
                if self.session.observe(&err) {
                    return SaveOutcome::SessionRevoked;
                }
                warn!("Saving agent info failed: {err}");
                self.info_error = Some(err.user_message());
                SaveOutcome::Failed
            }
        }
    }

    pub async fn save_info(&mut self, api: &dyn ConsoleApi) -> Result<SaveOutcome, EditorError> {
        let submission = self.begin_save_info()?;
        let result = api.save_agent_info(submission).await;
        Ok(self.finish_save_info(result))
    }

    pub fn stage_files(&mut self, files: Vec<FileUpload>) -> Result<StageReport, EditorError> {
        if self.files_mode != Mode::Edit {
            return Err(EditorError::NotEditing(Facet::Files));
        }
        if self.files_busy {
            return Err(EditorError::Busy);
        }
        let report = self.staging.stage_add(files);
        self.notice = report.warning().map(str::to_string);
        Ok(report)
    }

    pub fn remove_file(&mut self, name: &str) -> Result<bool, EditorError> {
        if self.files_mode != Mode::Edit {
            return Err(EditorError::NotEditing(Facet::Files));
        }
        if self.files_busy {
            return Err(EditorError::Busy);
        }
        Ok(self.staging.stage_remove(name))
    }

    /// Removes a file by its position in the numbered list.
    pub fn remove_file_number(&mut self, number: usize) -> Result<bool, EditorError> {
        if self.files_mode != Mode::Edit {
            return Err(EditorError::NotEditing(Facet::Files));
        }
        if self.files_busy {
            return Err(EditorError::Busy);
        }
        Ok(self.staging.stage_remove_number(number))
    }

    pub fn begin_save_files(&mut self) -> Result<FilesSubmission, EditorError> {
        if self.files_mode != Mode::Edit {
            return Err(EditorError::NotEditing(Facet::Files));
        }
        if self.files_busy || self.loading_record {
            return Err(EditorError::Busy);
        }
        let name = self.name().ok_or(EditorError::NoSnapshot)?.to_string();
        self.files_busy = true;
        self.files_error = None;
        Ok(self.staging.submission(&name))
    }

    pub fn finish_save_files(&mut self, result: ConsoleResult<AgentPatch>) -> SaveOutcome {
        self.files_busy = false;
        match result {
            Ok(patch) => {
                let Some(snapshot) = self.snapshot.as_mut() else {
                    return SaveOutcome::Failed;
                };
                snapshot.apply(patch);
                self.staging.reset(&snapshot.files);
                if self.info_mode == Mode::View {
                    self.draft = snapshot.clone();
                }
                self.files_mode = Mode::View;
                info!("Saved documents for agent {}", snapshot.name);
                SaveOutcome::Saved
            }
            Err(err) => {
                if self.session.observe(&err) {
                    return SaveOutcome::SessionRevoked;
                }
                warn!("Saving documents failed: {err}");
                self.files_error = Some(format!("Failed to save documents. {}", err.user_message()));
                SaveOutcome::Failed
            }
        }
    }

    pub async fn save_files(&mut self, api: &dyn ConsoleApi) -> Result<SaveOutcome, EditorError> {
        let submission = self.begin_save_files()?;
        let result = api.save_agent_files(submission).await;
        Ok(self.finish_save_files(result))
    }
}
