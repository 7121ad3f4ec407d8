//! 後端 REST API 的存取層。
//!
//! `ConsoleApi` trait 抽象化了與管理後端的所有通訊，
//! 狀態機只依賴這個介面，因此可以在測試中替換成腳本化的實作。

// --- 子模組宣告 ---

/// `http` 模組：以 `reqwest` 實作 `ConsoleApi`，負責標頭、cookie 與 multipart 表單。
pub mod http;
/// `models` 模組：請求與回應的資料結構。
pub mod models;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::error::ConsoleResult;

pub use http::HttpApi;
pub use models::{
    AgentPatch, AgentSummary, ChatMessage, ChatProfile, ChatReply, ChatRequest, FileUpload,
    FilesSubmission, InfoSubmission,
};

/// 登入時固定使用的帳號名稱。
pub const ADMIN_USERNAME: &str = "admin";

/// 所有後端呼叫都必須遵守的介面。
///
/// 實作需要是 `Send + Sync`，因為呼叫會在 `tokio::spawn` 出來的任務中執行。
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// `GET /api/auth/is-admin-password-set`
    async fn is_admin_password_set(&self) -> ConsoleResult<bool>;

    /// `GET /api/auth/check-token`。
    ///
    /// 回傳 `Ok(false)` 表示後端拒絕了目前的 cookie；只有傳輸錯誤才回傳 `Err`。
    async fn check_session(&self) -> ConsoleResult<bool>;

    /// `POST /api/auth/set-admin-password`
    async fn set_admin_password(&self, password: &str) -> ConsoleResult<()>;

    /// `POST /api/auth/login`，成功時後端會以 cookie 設定工作階段憑證。
    async fn login(&self, username: &str, password: &str) -> ConsoleResult<()>;

    /// `POST /api/auth/logout`
    async fn logout(&self) -> ConsoleResult<()>;

    /// `POST /api/auth/change-password`
    async fn change_password(&self, current: &str, new: &str) -> ConsoleResult<()>;

    /// `GET /api/agents`
    async fn list_agents(&self) -> ConsoleResult<Vec<AgentSummary>>;

    /// `GET /api/agents/:name`
    async fn get_agent(&self, name: &str) -> ConsoleResult<AgentPatch>;

    /// `POST /api/agents` 或 `PUT /api/agents/:name/info`，依 `is_new` 決定。
    async fn save_agent_info(&self, submission: InfoSubmission) -> ConsoleResult<AgentPatch>;

    /// `PUT /api/agents/:name/files`
    async fn save_agent_files(&self, submission: FilesSubmission) -> ConsoleResult<AgentPatch>;

    /// `DELETE /api/agents/:name`
    async fn delete_agent(&self, name: &str) -> ConsoleResult<()>;

    /// `GET /api/chat/:name`，不需要登入。
    async fn chat_profile(&self, name: &str) -> ConsoleResult<ChatProfile>;

    /// `POST /api/chat/:name`
    async fn chat(&self, name: &str, request: ChatRequest) -> ConsoleResult<ChatReply>;
}
