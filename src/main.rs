use std::{sync::mpsc, time::Duration};

use anyhow::{Context, Result};

use crate::{app::state::App, events::types::AppEvent};

mod app;
mod config;
mod events;
mod input;
mod logging;
mod player;
mod ui;

fn main() -> Result<()> {
    let config = config::load_or_create_config().context("Failed to load config")?;
    let _log_guard = logging::init(&config.log_level)?;

    ui::theme::init_theme(config.theme);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let (engine, _engine_handle) = player::engine::start(config.initial_volume, event_tx.clone());

    let mut terminal = ratatui::init();
    let _input_handle = input::thread::spawn(event_tx);

    let mut app = App::new(engine, &config);

    let result = loop {
        app.tick();

        if let Err(e) = terminal.draw(|f| ui::render::render(f, &mut app)) {
            break Err(anyhow::Error::new(e).context("Failed to draw frame"));
        }

        // Every engine notification is handled here, on the UI thread.
        match event_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => match event {
                AppEvent::Input(key_event) => app.handle_input(key_event),
                AppEvent::Mouse(mouse_event) => app.handle_mouse(mouse_event),
                AppEvent::Resize(_width, _height) => {}
                AppEvent::StatusChanged(status) => app.on_status_changed(status),
                AppEvent::CurrentTimeChanged(elapsed) => app.on_current_time_changed(elapsed),
                AppEvent::EndOfMedia => app.on_end_of_media(),
                AppEvent::LoadFailed(e) => app.on_load_failed(e),
                AppEvent::EngineError(e) => app.on_engine_error(e),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break Err(anyhow::anyhow!("Event channel disconnected"));
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();
    tracing::info!("shutting down");
    result
}
