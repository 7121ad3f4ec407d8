use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// 設定檔相對於工作目錄的位置。
pub const CONFIG_FILE: &str = "config/console.toml";
/// 覆寫 `base_url` 的環境變數。
pub const ENV_BASE_URL: &str = "AGENT_CONSOLE_BASE_URL";
/// 覆寫 `client_key` 的環境變數。
pub const ENV_CLIENT_KEY: &str = "AGENT_CONSOLE_CLIENT_KEY";

/// 主控台的頂層設定，通常從 `config/console.toml` 載入。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// 管理後端的位址，例如 `http://localhost:8080`。
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 每個請求在 `X-Requested-With` 標頭中帶上的值。
    #[serde(default)]
    pub client_key: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// 對話頁狀態串流的路徑樣板，`{name}` 會被替換成代理名稱。
    /// 未設定時不開啟串流。
    #[serde(default)]
    pub status_stream_path: Option<String>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_base_url() -> String {
    String::from("http://localhost:8080")
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_file() -> String {
    String::from("logs/agent-console.log")
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_key: String::new(),
            request_timeout_secs: default_timeout(),
            status_stream_path: None,
            logging: LoggingSettings::default(),
        }
    }
}

impl ConsoleSettings {
    /// 從工作目錄讀取設定並套用環境變數覆寫。
    /// 設定檔不存在時使用預設值；最後 `client_key` 仍為空則回傳錯誤。
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let settings = Self::load_file(workspace_root)?
            .with_overrides(|key| env::var(key).ok().filter(|value| !value.trim().is_empty()));
        settings.validate()?;
        Ok(settings)
    }

    fn load_file(workspace_root: &Path) -> Result<Self> {
        let config_path = workspace_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&config_path)
            .with_context(|| format!("讀取主控台設定失敗: {}", config_path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("解析主控台設定失敗: {}", config_path.display()))
    }

    /// 以查詢函式提供的值覆寫對應欄位。
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(client_key) = lookup(ENV_CLIENT_KEY) {
            self.client_key = client_key;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_key.trim().is_empty() {
            bail!(
                "缺少 client_key：請在 {CONFIG_FILE} 設定 client_key，或設定環境變數 {ENV_CLIENT_KEY}"
            );
        }
        if self.base_url.trim().is_empty() {
            bail!("base_url 不可為空");
        }
        Ok(())
    }

    /// 對話頁狀態串流的實際路徑。
    pub fn status_stream_for(&self, agent_name: &str) -> Option<String> {
        self.status_stream_path
            .as_ref()
            .map(|template| template.replace("{name}", agent_name))
    }

    /// 將目前的設定寫回 `config/console.toml`。
    pub fn save_to_file(&self, workspace_root: &Path) -> Result<()> {
        let config_dir = workspace_root.join("config");
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("建立設定目錄失敗: {}", config_dir.display()))?;
        }
        let config_path = workspace_root.join(CONFIG_FILE);
        let serialized = toml::to_string_pretty(self).context("序列化主控台設定失敗")?;
        fs::write(&config_path, serialized)
            .with_context(|| format!("寫入主控台設定失敗: {}", config_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = ConsoleSettings::load_file(dir.path()).unwrap();
        assert_eq!(settings, ConsoleSettings::default());
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "client_key = \"console\"\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let settings = ConsoleSettings::load_file(dir.path()).unwrap();
        assert_eq!(settings.client_key, "console");
        assert_eq!(settings.base_url, "http://localhost:8080");
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.file, "logs/agent-console.log");
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempdir().unwrap();
        let settings = ConsoleSettings {
            client_key: String::from("key"),
            status_stream_path: Some(String::from("/api/chat/{name}/status")),
            ..ConsoleSettings::default()
        };
        settings.save_to_file(dir.path()).unwrap();
        let loaded = ConsoleSettings::load_file(dir.path()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn overrides_replace_file_values() {
        let settings = ConsoleSettings::default().with_overrides(|key| match key {
            ENV_BASE_URL => Some(String::from("http://backend:9000")),
            ENV_CLIENT_KEY => Some(String::from("from-env")),
            _ => None,
        });
        assert_eq!(settings.base_url, "http://backend:9000");
        assert_eq!(settings.client_key, "from-env");
    }

    #[test]
    fn empty_client_key_is_rejected() {
        let settings = ConsoleSettings::default();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("client_key"));
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "base_url = [").unwrap();
        let err = ConsoleSettings::load_file(dir.path()).unwrap_err();
        assert!(err.to_string().contains("console.toml"));
    }

    #[test]
    fn status_stream_path_substitutes_name() {
        let settings = ConsoleSettings {
            status_stream_path: Some(String::from("/api/chat/{name}/status")),
            ..ConsoleSettings::default()
        };
        assert_eq!(
            settings.status_stream_for("support-bot").as_deref(),
            Some("/api/chat/support-bot/status")
        );
        assert_eq!(ConsoleSettings::default().status_stream_for("x"), None);
    }
}
