//! Public chat with a single agent.

pub mod stream;

use std::collections::VecDeque;

use log::warn;

use crate::agent::record::SuggestedPrompts;
use crate::api::{ChatMessage, ChatProfile, ChatReply, ChatRequest, ConsoleApi};
use crate::error::ConsoleResult;
use crate::session::SessionHandle;

pub use stream::{StatusStream, StreamEvent};

pub const DEFAULT_WELCOME: &str = "Hello! How can I help you today?";
pub const PROFILE_FAILED: &str = "Failed to load agent data.";
/// Status lines kept for display; older ones are dropped.
pub const STATUS_LINE_LIMIT: usize = 200;

/// Conversation state for the chat screen.
pub struct ChatSession {
    session: SessionHandle,
    agent: String,
    prompts: SuggestedPrompts,
    messages: Vec<ChatMessage>,
    status_lines: VecDeque<String>,
    selected: usize,
    loading: bool,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(session: SessionHandle, agent: impl Into<String>) -> Self {
        Self {
            session,
            agent: agent.into(),
            prompts: SuggestedPrompts::default(),
            messages: vec![ChatMessage::new("system", DEFAULT_WELCOME)],
            status_lines: VecDeque::new(),
            selected: 0,
            loading: false,
            error: None,
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn prompts(&self) -> &SuggestedPrompts {
        &self.prompts
    }

    pub fn status_lines(&self) -> &VecDeque<String> {
        &self.status_lines
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_profile(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    pub fn finish_profile(&mut self, result: ConsoleResult<ChatProfile>) {
        self.loading = false;
        match result {
            Ok(profile) => {
                if !profile.name.is_empty() {
                    self.agent = profile.name;
                }
                self.prompts =
                    SuggestedPrompts::from_list(&profile.suggested_prompts.unwrap_or_default());
                if let Some(welcome) = profile.welcome_message.filter(|text| !text.is_empty()) {
                    self.messages = vec![ChatMessage::new("system", welcome)];
                    self.selected = 0;
                }
            }
            Err(err) => {
                if self.session.observe(&err) {
                    return;
                }
                warn!("Loading chat profile for {} failed: {err}", self.agent);
                self.error = Some(PROFILE_FAILED.to_string());
            }
        }
    }

    pub async fn load_profile(&mut self, api: &dyn ConsoleApi) {
        if self.begin_profile() {
            let name = self.agent.clone();
            let result = api.chat_profile(&name).await;
            self.finish_profile(result);
        }
    }

    /// Appends the user's message and returns the request to send.
    ///
    /// The request carries the history as it was before this message.
    /// Blank input, or input while a reply is pending, is ignored.
    pub fn begin_send(&mut self, input: &str) -> Option<ChatRequest> {
        if input.trim().is_empty() || self.loading {
            return None;
        }
        let request = ChatRequest {
            input: input.to_string(),
            messages: self.messages.clone(),
        };
        self.push(ChatMessage::new("user", input));
        self.loading = true;
        self.error = None;
        Some(request)
    }

    pub fn finish_send(&mut self, result: ConsoleResult<ChatReply>) {
        self.loading = false;
        match result {
            Ok(reply) => self.push(ChatMessage::new(reply.role, reply.content)),
            Err(err) => {
                if self.session.observe(&err) {
                    return;
                }
                warn!("Chat with {} failed: {err}", self.agent);
                self.error = Some(err.user_message());
            }
        }
    }

    /// Returns false when nothing was sent.
    pub async fn send(&mut self, api: &dyn ConsoleApi, input: &str) -> bool {
        let Some(request) = self.begin_send(input) else {
            return false;
        };
        let name = self.agent.clone();
        let result = api.chat(&name, request).await;
        self.finish_send(result);
        true
    }

    /// The prompt in slot `index`, if it is set.
    pub fn suggested_prompt(&self, index: usize) -> Option<&str> {
        self.prompts.get(index).filter(|prompt| !prompt.is_empty())
    }

    pub fn push_status(&mut self, line: impl Into<String>) {
        if self.status_lines.len() == STATUS_LINE_LIMIT {
            self.status_lines.pop_front();
        }
        self.status_lines.push_back(line.into());
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.messages.is_empty() {
            return;
        }
        let last = self.messages.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.selected = self.messages.len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::error::ConsoleError;

    fn chat() -> ChatSession {
        ChatSession::new(SessionHandle::new(), "support-bot")
    }

    fn reply(content: &str) -> ChatReply {
        ChatReply {
            content: content.to_string(),
            role: String::from("assistant"),
            success: None,
        }
    }

    #[test]
    fn status_lines_keep_only_the_latest() {
        let mut chat = chat();
        for n in 0..STATUS_LINE_LIMIT + 5 {
            chat.push_status(format!("line {n}"));
        }
        assert_eq!(chat.status_lines().len(), STATUS_LINE_LIMIT);
        assert_eq!(chat.status_lines().front().map(String::as_str), Some("line 5"));
        let last = format!("line {}", STATUS_LINE_LIMIT + 4);
        assert_eq!(chat.status_lines().back(), Some(&last));
    }

    #[test]
    fn starts_with_default_welcome() {
        let chat = chat();
        assert_eq!(chat.messages(), &[ChatMessage::new("system", DEFAULT_WELCOME)]);
    }

    #[tokio::test]
    async fn profile_sets_welcome_and_prompts() {
        let api = MockApi::new();
        api.profile.ok(ChatProfile {
            name: String::from("support-bot"),
            welcome_message: Some(String::from("Hi, ask me anything.")),
            suggested_prompts: Some(vec![String::from("Pricing?")]),
            status: None,
        });
        let mut chat = chat();
        chat.load_profile(&api).await;
        assert_eq!(chat.messages()[0].content, "Hi, ask me anything.");
        assert_eq!(chat.prompts().slots().len(), 3);
        assert_eq!(chat.suggested_prompt(0), Some("Pricing?"));
        assert_eq!(chat.suggested_prompt(1), None);
        assert_eq!(chat.suggested_prompt(5), None);
    }

    #[tokio::test]
    async fn profile_failure_keeps_default_welcome() {
        let api = MockApi::new();
        api.profile.err(ConsoleError::Server {
            status: 404,
            message: String::from("Agent not found"),
        });
        let mut chat = chat();
        chat.load_profile(&api).await;
        assert_eq!(chat.error(), Some(PROFILE_FAILED));
        assert_eq!(chat.messages()[0].content, DEFAULT_WELCOME);
    }

    #[tokio::test]
    async fn history_excludes_the_new_message() {
        let api = MockApi::new();
        api.reply.ok(reply("We open at nine."));
        let mut chat = chat();
        assert!(chat.send(&api, "When do you open?").await);

        let sent = &api.chat_requests()[0];
        assert_eq!(sent.input, "When do you open?");
        assert_eq!(sent.messages, vec![ChatMessage::new("system", DEFAULT_WELCOME)]);
        let roles: Vec<&str> = chat.messages().iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(chat.selected_index(), 2);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let api = MockApi::new();
        let mut chat = chat();
        assert!(!chat.send(&api, "   ").await);
        assert!(api.calls().is_empty());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn pending_reply_blocks_another_send() {
        let mut chat = chat();
        assert!(chat.begin_send("first").is_some());
        assert!(chat.is_loading());
        assert!(chat.begin_send("second").is_none());
    }

    #[tokio::test]
    async fn failure_keeps_history() {
        let api = MockApi::new();
        api.reply
            .err(ConsoleError::Transport(String::from("timeout")));
        let mut chat = chat();
        chat.send(&api, "hello").await;
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.error(), Some("Network error: timeout"));
        assert!(!chat.is_loading());
    }
}
