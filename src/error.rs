//! 主控台共用的錯誤分類。
//!
//! 所有與後端互動的操作都回傳 `ConsoleError`，讓狀態機能依錯誤種類
//! 決定要顯示區域錯誤訊息，或是觸發全域的工作階段轉換。

use thiserror::Error;

/// 主控台操作可能遇到的錯誤種類。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// 網路或逾時錯誤，或是無法解析的回應內容。
    #[error("transport error: {0}")]
    Transport(String),
    /// 後端以 403 拒絕請求。
    #[error("access denied: {0}")]
    Authorization(String),
    /// 用戶端驗證失敗，永遠不會送到網路上。
    #[error("{0}")]
    Validation(String),
    /// 其他非 2xx 回應，附帶後端提供的訊息。
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }

    /// 是否為需要讓工作階段失效的授權錯誤。
    pub fn is_authorization(&self) -> bool {
        matches!(self, ConsoleError::Authorization(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConsoleError::Server { status: 404, .. })
    }

    /// 顯示在畫面上的簡短訊息。
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Transport(detail) => format!("Network error: {detail}"),
            ConsoleError::Authorization(_) => String::from("Access denied"),
            ConsoleError::Validation(message) => message.clone(),
            ConsoleError::Server { message, .. } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status()
            && status.as_u16() == 403
        {
            return ConsoleError::Authorization(err.to_string());
        }
        ConsoleError::Transport(err.to_string())
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_show_backend_message() {
        let err = ConsoleError::Server {
            status: 400,
            message: String::from("Agent with this name already exists"),
        };
        assert_eq!(err.user_message(), "Agent with this name already exists");
        assert!(!err.is_authorization());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_detected_by_status() {
        let err = ConsoleError::Server {
            status: 404,
            message: String::from("Agent not found"),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = ConsoleError::validation("Passwords do not match.");
        assert_eq!(err.to_string(), "Passwords do not match.");
        assert_eq!(err.user_message(), "Passwords do not match.");
    }
}
