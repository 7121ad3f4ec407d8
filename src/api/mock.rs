//! 測試用的腳本化 `ConsoleApi`。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ConsoleError, ConsoleResult};

use super::{
    AgentPatch, AgentSummary, ChatProfile, ChatReply, ChatRequest, ConsoleApi, FilesSubmission,
    InfoSubmission,
};

/// 依序回放的回應佇列。
pub struct Script<T>(Mutex<VecDeque<ConsoleResult<T>>>);

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Script<T> {
    pub fn push(&self, response: ConsoleResult<T>) {
        self.0.lock().unwrap().push_back(response);
    }

    pub fn ok(&self, value: T) {
        self.push(Ok(value));
    }

    pub fn err(&self, err: ConsoleError) {
        self.push(Err(err));
    }

    fn next(&self, call: &str) -> ConsoleResult<T> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ConsoleError::Transport(format!("no scripted response for {call}"))))
    }
}

#[derive(Default)]
pub struct MockApi {
    pub admin_password_set: Script<bool>,
    pub session: Script<bool>,
    pub set_password: Script<()>,
    pub login: Script<()>,
    pub logout: Script<()>,
    pub change_password: Script<()>,
    pub agents: Script<Vec<AgentSummary>>,
    pub agent: Script<AgentPatch>,
    pub save_info: Script<AgentPatch>,
    pub save_files: Script<AgentPatch>,
    pub delete: Script<()>,
    pub profile: Script<ChatProfile>,
    pub reply: Script<ChatReply>,
    calls: Mutex<Vec<String>>,
    info_submissions: Mutex<Vec<InfoSubmission>>,
    files_submissions: Mutex<Vec<FilesSubmission>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依呼叫順序記錄的呼叫名稱，例如 `login:admin`。
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn info_submissions(&self) -> Vec<InfoSubmission> {
        self.info_submissions.lock().unwrap().clone()
    }

    pub fn files_submissions(&self) -> Vec<FilesSubmission> {
        self.files_submissions.lock().unwrap().clone()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ConsoleApi for MockApi {
    async fn is_admin_password_set(&self) -> ConsoleResult<bool> {
        self.record("is_admin_password_set");
        self.admin_password_set.next("is_admin_password_set")
    }

    async fn check_session(&self) -> ConsoleResult<bool> {
        self.record("check_session");
        self.session.next("check_session")
    }

    async fn set_admin_password(&self, _password: &str) -> ConsoleResult<()> {
        self.record("set_admin_password");
        self.set_password.next("set_admin_password")
    }

    async fn login(&self, username: &str, _password: &str) -> ConsoleResult<()> {
        self.record(format!("login:{username}"));
        self.login.next("login")
    }

    async fn logout(&self) -> ConsoleResult<()> {
        self.record("logout");
        self.logout.next("logout")
    }

    async fn change_password(&self, _current: &str, _new: &str) -> ConsoleResult<()> {
        self.record("change_password");
        self.change_password.next("change_password")
    }

    async fn list_agents(&self) -> ConsoleResult<Vec<AgentSummary>> {
        self.record("list_agents");
        self.agents.next("list_agents")
    }

    async fn get_agent(&self, name: &str) -> ConsoleResult<AgentPatch> {
        self.record(format!("get_agent:{name}"));
        self.agent.next("get_agent")
    }

    async fn save_agent_info(&self, submission: InfoSubmission) -> ConsoleResult<AgentPatch> {
        self.record(format!("save_agent_info:{}", submission.name));
        self.info_submissions.lock().unwrap().push(submission);
        self.save_info.next("save_agent_info")
    }

    async fn save_agent_files(&self, submission: FilesSubmission) -> ConsoleResult<AgentPatch> {
        self.record(format!("save_agent_files:{}", submission.agent_name));
        self.files_submissions.lock().unwrap().push(submission);
        self.save_files.next("save_agent_files")
    }

    async fn delete_agent(&self, name: &str) -> ConsoleResult<()> {
        self.record(format!("delete_agent:{name}"));
        self.delete.next("delete_agent")
    }

    async fn chat_profile(&self, name: &str) -> ConsoleResult<ChatProfile> {
        self.record(format!("chat_profile:{name}"));
        self.profile.next("chat_profile")
    }

    async fn chat(&self, name: &str, request: ChatRequest) -> ConsoleResult<ChatReply> {
        self.record(format!("chat:{name}"));
        self.chat_requests.lock().unwrap().push(request);
        self.reply.next("chat")
    }
}
