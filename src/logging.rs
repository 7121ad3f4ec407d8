use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// 若存在則優先使用的 log4rs 設定檔。
pub const LOG4RS_FILE: &str = "config/log4rs.yaml";

const FILE_APPENDER: &str = "file";
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

/// 初始化日誌。終端機畫面由 TUI 佔用，所以輸出一律寫入檔案。
pub fn init(workspace_root: &Path, settings: &crate::config::LoggingSettings) -> Result<()> {
    let yaml = workspace_root.join(LOG4RS_FILE);
    if yaml.exists() {
        log4rs::init_file(&yaml, Default::default())
            .with_context(|| format!("載入日誌設定失敗: {}", yaml.display()))?;
        return Ok(());
    }
    let config = build_config(&workspace_root.join(&settings.file), parse_level(&settings.level))?;
    log4rs::init_config(config).context("初始化日誌失敗")?;
    Ok(())
}

fn build_config(log_file: &Path, level: LevelFilter) -> Result<Config> {
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(log_file)
        .with_context(|| format!("開啟日誌檔失敗: {}", log_file.display()))?;
    Config::builder()
        .appender(Appender::builder().build(FILE_APPENDER, Box::new(appender)))
        .build(Root::builder().appender(FILE_APPENDER).build(level))
        .context("建立日誌設定失敗")
}

/// 無法辨識的等級回退為 `info`。
fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}
