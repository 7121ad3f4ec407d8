//! `app` 模組是主控台的核心。
//!
//! 它負責管理整體狀態、把按鍵分派給目前的畫面，
//! 並在每個 tick 套用背景任務回傳的結果。

/// `actions` 模組：導航、畫面進入動作，以及發出背景請求。
mod actions;
/// `init` 模組：負責 `App` 結構的初始化。
mod init;
/// `input` 模組：單行文字輸入緩衝區。
mod input;
/// `keyboard` 模組：專門處理所有的鍵盤輸入事件。
mod keyboard;
/// `overlays` 模組：輸入提示與刪除確認等彈出視窗。
mod overlays;
/// `state` 模組：定義了 `App` 結構以及各畫面的狀態類型。
mod state;
/// `tick` 模組：套用背景結果與工作階段變化。
mod tick;

pub use input::TextField;
pub use state::{
    App, AppEvent, ChatScreen, ConfirmDeleteState, CredentialForm, EditorScreen, Envelope,
    FormField, InfoSlot, InputPromptState, LogoutScreen, OverlayState, PendingInputAction, Screen,
};
