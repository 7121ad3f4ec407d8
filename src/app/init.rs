use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::debug;
use tokio::sync::mpsc;

use super::{App, AppEvent, Screen};
use crate::api::{ConsoleApi, HttpApi};
use crate::config::ConsoleSettings;
use crate::session::{Route, SessionGate, SessionHandle};

impl App {
    /// Creates the application against the HTTP backend from `settings`.
    pub fn connect(workspace_root: PathBuf, settings: ConsoleSettings) -> Result<Self> {
        let http = HttpApi::new(&settings)?;
        Ok(Self::new(
            workspace_root,
            settings,
            Arc::new(http.clone()),
            Some(http),
        ))
    }

    /// Creates the application state around any `ConsoleApi`.
    pub fn new(
        workspace_root: PathBuf,
        settings: ConsoleSettings,
        api: Arc<dyn ConsoleApi>,
        http: Option<HttpApi>,
    ) -> Self {
        let canonical_root = workspace_root.canonicalize().unwrap_or(workspace_root);
        debug!("Initializing App against {}", settings.base_url);
        let session = SessionHandle::new();
        let session_rx = session.subscribe();
        let gate = SessionGate::new(api.clone(), session.clone());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            should_quit: false,
            route: Route::Root,
            view: None,
            mode: session.mode(),
            screen: Screen::Loading,
            overlay: None,
            status_message: String::from("Connecting... Ctrl+G to go to a path, Ctrl+Q to quit"),
            settings,
            workspace_root: canonical_root,
            api,
            http,
            gate,
            session,
            session_rx,
            events_tx,
            events_rx,
            generation: 0,
            last_tick: Instant::now(),
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Remembers where to go and runs the startup checks in the background.
    pub fn start(&mut self, initial: Route) {
        self.route = initial;
        let gate = self.gate.clone();
        self.spawn_event(async move {
            gate.resolve().await;
            AppEvent::SessionResolved
        });
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }
}
