use log::{info, warn};

use crate::api::{AgentSummary, ConsoleApi};
use crate::error::ConsoleResult;
use crate::session::SessionHandle;

pub const EMPTY_LIST: &str = "No agent found.";

/// The agent overview with a selection cursor.
pub struct AgentList {
    session: SessionHandle,
    agents: Vec<AgentSummary>,
    selected: usize,
    loading: bool,
    error: Option<String>,
}

impl AgentList {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            agents: Vec::new(),
            selected: 0,
            loading: false,
            error: None,
        }
    }

    pub fn agents(&self) -> &[AgentSummary] {
        &self.agents
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&AgentSummary> {
        self.agents.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.agents.is_empty() {
            return;
        }
        let last = self.agents.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    /// Returns false when a request is already running.
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    pub fn finish_load(&mut self, result: ConsoleResult<Vec<AgentSummary>>) {
        self.loading = false;
        match result {
            Ok(agents) => {
                self.agents = agents;
                self.clamp_selection();
            }
            Err(err) => {
                if self.session.observe(&err) {
                    return;
                }
                warn!("Listing agents failed: {err}");
                self.error = Some(err.user_message());
            }
        }
    }

    pub async fn load(&mut self, api: &dyn ConsoleApi) {
        if self.begin_load() {
            let result = api.list_agents().await;
            self.finish_load(result);
        }
    }

    /// Marks the list busy for deleting the selected agent and returns its name.
    pub fn begin_delete(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        let name = self.selected()?.name.clone();
        self.loading = true;
        self.error = None;
        Some(name)
    }

    pub fn finish_delete(&mut self, name: &str, result: ConsoleResult<()>) {
        self.loading = false;
        match result {
            Ok(()) => {
                self.agents.retain(|agent| agent.name != name);
                self.clamp_selection();
                info!("Deleted agent {name}");
            }
            Err(err) => {
                if self.session.observe(&err) {
                    return;
                }
                warn!("Deleting agent {name} failed: {err}");
                self.error = Some(err.user_message());
            }
        }
    }

    pub async fn delete_selected(&mut self, api: &dyn ConsoleApi) -> Option<String> {
        let name = self.begin_delete()?;
        let result = api.delete_agent(&name).await;
        let deleted = result.is_ok();
        self.finish_delete(&name, result);
        deleted.then_some(name)
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.agents.len().saturating_sub(1));
    }
}
