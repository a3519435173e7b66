use crate::events::types::AppEvent;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind,
};
use crossterm::execute;
use std::io::stdout;
use std::{sync::mpsc, thread::JoinHandle};

/// Forwards terminal input onto the UI event channel until the receiver goes away.
pub fn spawn(event_tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = execute!(stdout(), EnableMouseCapture) {
            tracing::warn!("mouse capture unavailable: {e}");
        }

        loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                    Some(AppEvent::Input(key_event))
                }
                // Hover motion is never acted on and would flood the channel.
                Ok(Event::Mouse(mouse_event)) if mouse_event.kind != MouseEventKind::Moved => {
                    Some(AppEvent::Mouse(mouse_event))
                }
                Ok(Event::Resize(width, height)) => Some(AppEvent::Resize(width, height)),
                Ok(_) => None,
                Err(e) => {
                    tracing::error!("terminal input failed: {e}");
                    break;
                }
            };

            if let Some(app_event) = forwarded {
                if event_tx.send(app_event).is_err() {
                    break;
                }
            }
        }

        let _ = execute!(stdout(), DisableMouseCapture);
    })
}
