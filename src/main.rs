pub mod agent;
pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod session;
pub mod tui;
pub mod ui;

use anyhow::{Context, Result};
use app::App;
use config::{CONFIG_FILE, ConsoleSettings};
use crossterm::event::{Event as CrosstermEvent, EventStream};
use event::Event;
use futures_util::StreamExt;
use log::{error, info};
use session::Route;
use tui::{init, restore};
use ui::render;

#[tokio::main]
async fn main() -> Result<()> {
    let workspace_root = std::env::current_dir().context("無法取得目前工作目錄")?;
    if !workspace_root.join(CONFIG_FILE).exists() {
        ConsoleSettings::default().save_to_file(&workspace_root)?;
    }
    let settings = ConsoleSettings::load(&workspace_root)?;
    logging::init(&workspace_root, &settings.logging)?;
    info!("Starting agent console against {}", settings.base_url);

    let initial = std::env::args()
        .nth(1)
        .map(|path| Route::parse(&path))
        .unwrap_or(Route::Root);
    let mut app = App::connect(workspace_root, settings)?;
    app.start(initial);

    let mut tui = init()?;
    let result = run(&mut tui, &mut app).await;
    restore()?;
    if let Err(err) = &result {
        error!("Console stopped: {err:#}");
    }
    result
}

async fn run(tui: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut stream = EventStream::new();
    let mut interval = tokio::time::interval(app.tick_rate());

    while !app.should_quit {
        tui.draw(|frame| render(frame, app))?;

        let event = tokio::select! {
            _ = interval.tick() => Event::Tick,
            maybe_event = stream.next() => {
                match maybe_event {
                    Some(Ok(CrosstermEvent::Key(key))) => Event::Key(key),
                    Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err).context("讀取終端機事件失敗"),
                    None => break,
                }
            }
        };

        match event {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.handle_key(key),
            Event::Resize => {}
        }
    }
    Ok(())
}
