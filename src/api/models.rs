use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct AdminPasswordStatus {
    pub admin_password_set: bool,
}

#[derive(Serialize)]
pub(super) struct SetPasswordPayload<'a> {
    pub password: &'a str,
}

#[derive(Serialize)]
pub(super) struct LoginPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(super) struct ChangePasswordPayload<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// 代理列表中的單一項目。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentSummary {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub embeddings_status: Option<String>,
}

impl AgentSummary {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
            embeddings_status: None,
        }
    }
}

/// 後端回傳的代理資料片段。
///
/// 建立代理只回傳 `name`，更新資訊或檔案則回傳完整欄位；
/// 所有欄位皆為可選，並在邊界處以型別驗證，再合併進快照。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub suggested_prompts: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub embeddings_status: Option<String>,
}

/// 送出代理基本資訊時的內容，對應一個 multipart 表單。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSubmission {
    pub name: String,
    pub instructions: String,
    pub welcome_message: String,
    /// 已去除空白且不含空字串的提示。
    pub suggested_prompts: Vec<String>,
    pub status: Option<String>,
    /// 為 `true` 時以 `POST /api/agents` 建立新代理。
    pub is_new: bool,
}

/// 一個待上傳的檔案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// 送出檔案變更時的內容：新增的檔案與要刪除的檔名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesSubmission {
    pub agent_name: String,
    pub new_files: Vec<FileUpload>,
    pub deleted_files: Vec<String>,
}

/// 對話中的一則訊息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub input: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub content: String,
    #[serde(default = "default_reply_role")]
    pub role: String,
    /// 後端在內部失敗時仍以 200 回傳，並將 `success` 設為 `false`。
    #[serde(default)]
    pub success: Option<bool>,
}

fn default_reply_role() -> String {
    String::from("assistant")
}

/// 公開對話頁所需的代理資訊。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub suggested_prompts: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

/// 錯誤回應的內容，後端會使用 `msg`、`error` 或 `detail` 其中之一。
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.msg.or(self.error).or(self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_response_decodes_into_name_only_patch() {
        let patch: AgentPatch =
            serde_json::from_str(r#"{"msg":"Agent created successfully","name":"support-bot"}"#)
                .unwrap();
        assert_eq!(patch.name.as_deref(), Some("support-bot"));
        assert!(patch.files.is_none());
        assert!(patch.suggested_prompts.is_none());
    }

    #[test]
    fn null_fields_decode_as_absent() {
        let patch: AgentPatch = serde_json::from_str(
            r#"{"name":"a","instructions":null,"suggested_prompts":null,"files":["x.pdf"],"embeddings_status":"I"}"#,
        )
        .unwrap();
        assert_eq!(patch.instructions, None);
        assert_eq!(patch.files, Some(vec![String::from("x.pdf")]));
        assert_eq!(patch.embeddings_status.as_deref(), Some("I"));
    }

    #[test]
    fn error_body_prefers_msg() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"Access denied","msg":"Agent not found"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Agent not found"));
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"bad"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad"));
    }

    #[test]
    fn chat_reply_defaults_role() {
        let reply: ChatReply = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(reply.role, "assistant");
        assert_eq!(reply.success, None);
    }
}
