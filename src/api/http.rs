use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ConsoleSettings;
use crate::error::{ConsoleError, ConsoleResult};

use super::models::{
    AdminPasswordStatus, ChangePasswordPayload, ErrorBody, LoginPayload, SetPasswordPayload,
};
use super::{
    AgentPatch, AgentSummary, ChatProfile, ChatReply, ChatRequest, ConsoleApi, FilesSubmission,
    InfoSubmission,
};

/// 每個請求都會帶上的用戶端識別標頭。
pub const CLIENT_HEADER: &str = "x-requested-with";

/// `ConsoleApi` 的 HTTP 實作。
///
/// `reqwest::Client` 啟用了 cookie 儲存，登入後後端設定的工作階段 cookie
/// 會自動附加在之後的請求上。
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    /// 根據設定建立 HTTP 客戶端。
    pub fn new(settings: &ConsoleSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(CLIENT_HEADER),
            HeaderValue::from_str(&settings.client_key).context("client_key 含有無效字元")?,
        );
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .default_headers(headers)
            .build()
            .context("建立 HTTP 客戶端失敗")?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// 共用的 `reqwest` 客戶端，狀態串流也透過它連線以共享 cookie。
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// 將 API 路徑組合成完整的 URL。
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> ConsoleResult<Response> {
        let response = request.send().await?;
        expect_success(response).await
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// 將非 2xx 回應轉換成 `ConsoleError`。
async fn expect_success(response: Response) -> ConsoleResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("HTTP {} from backend: {}", status.as_u16(), body);
    Err(error_from_status(status.as_u16(), &body))
}

pub(crate) fn error_from_status(status: u16, body: &str) -> ConsoleError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("Request failed with HTTP {status}")
            } else {
                trimmed.to_string()
            }
        });
    if status == 403 {
        ConsoleError::Authorization(message)
    } else {
        ConsoleError::Server { status, message }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ConsoleResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| ConsoleError::Transport(format!("invalid response body: {err}")))
}

/// 建立代理資訊的 multipart 表單；提示以重複的 `suggested_prompts` 欄位送出。
fn info_form(submission: &InfoSubmission) -> Form {
    let mut form = Form::new()
        .text("name", submission.name.clone())
        .text("instructions", submission.instructions.clone())
        .text("welcome_message", submission.welcome_message.clone());
    for prompt in &submission.suggested_prompts {
        form = form.text("suggested_prompts", prompt.clone());
    }
    if let Some(status) = &submission.status {
        form = form.text("status", status.clone());
    }
    form
}

fn files_form(submission: FilesSubmission) -> ConsoleResult<Form> {
    let mut form = Form::new();
    for file in submission.new_files {
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime)
            .map_err(|err| ConsoleError::validation(format!("invalid file type: {err}")))?;
        form = form.part("newfiles", part);
    }
    for name in submission.deleted_files {
        form = form.text("deletedfiles", name);
    }
    Ok(form)
}

#[async_trait]
impl ConsoleApi for HttpApi {
    async fn is_admin_password_set(&self) -> ConsoleResult<bool> {
        let response = self
            .send(self.client.get(self.url("/api/auth/is-admin-password-set")))
            .await?;
        let status: AdminPasswordStatus = decode(response).await?;
        Ok(status.admin_password_set)
    }

    async fn check_session(&self) -> ConsoleResult<bool> {
        let response = self
            .client
            .get(self.url("/api/auth/check-token"))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else {
            debug!("Session check rejected with HTTP {}", status.as_u16());
            Ok(false)
        }
    }

    async fn set_admin_password(&self, password: &str) -> ConsoleResult<()> {
        let payload = SetPasswordPayload { password };
        self.send(
            self.client
                .post(self.url("/api/auth/set-admin-password"))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> ConsoleResult<()> {
        let payload = LoginPayload { username, password };
        self.send(self.client.post(self.url("/api/auth/login")).json(&payload))
            .await?;
        Ok(())
    }

    async fn logout(&self) -> ConsoleResult<()> {
        self.send(self.client.post(self.url("/api/auth/logout")))
            .await?;
        Ok(())
    }

    async fn change_password(&self, current: &str, new: &str) -> ConsoleResult<()> {
        let payload = ChangePasswordPayload {
            current_password: current,
            new_password: new,
        };
        self.send(
            self.client
                .post(self.url("/api/auth/change-password"))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    async fn list_agents(&self) -> ConsoleResult<Vec<AgentSummary>> {
        let response = self.send(self.client.get(self.url("/api/agents"))).await?;
        decode(response).await
    }

    async fn get_agent(&self, name: &str) -> ConsoleResult<AgentPatch> {
        let response = self
            .send(self.client.get(self.url(&format!("/api/agents/{name}"))))
            .await?;
        decode(response).await
    }

    async fn save_agent_info(&self, submission: InfoSubmission) -> ConsoleResult<AgentPatch> {
        let form = info_form(&submission);
        let request = if submission.is_new {
            self.client.post(self.url("/api/agents"))
        } else {
            self.client
                .put(self.url(&format!("/api/agents/{}/info", submission.name)))
        };
        let response = self.send(request.multipart(form)).await?;
        decode(response).await
    }

    async fn save_agent_files(&self, submission: FilesSubmission) -> ConsoleResult<AgentPatch> {
        let url = self.url(&format!("/api/agents/{}/files", submission.agent_name));
        let form = files_form(submission)?;
        let response = self.send(self.client.put(url).multipart(form)).await?;
        decode(response).await
    }

    async fn delete_agent(&self, name: &str) -> ConsoleResult<()> {
        self.send(self.client.delete(self.url(&format!("/api/agents/{name}"))))
            .await?;
        Ok(())
    }

    async fn chat_profile(&self, name: &str) -> ConsoleResult<ChatProfile> {
        let response = self
            .send(self.client.get(self.url(&format!("/api/chat/{name}"))))
            .await?;
        decode(response).await
    }

    async fn chat(&self, name: &str, request: ChatRequest) -> ConsoleResult<ChatReply> {
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("/api/chat/{name}")))
                    .json(&request),
            )
            .await?;
        let reply: ChatReply = decode(response).await?;
        if reply.success == Some(false) {
            warn!("Chat backend reported a failure for {}: {}", name, reply.content);
        }
        Ok(reply)
    }
}
