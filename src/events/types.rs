use crate::player::commands::PlaybackStatus;
use crossterm::event::{KeyEvent, MouseEvent};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum AppEvent {
    // From input thread
    Input(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // From engine thread
    StatusChanged(PlaybackStatus),
    CurrentTimeChanged(Duration),
    EndOfMedia,
    LoadFailed(String),
    EngineError(String),
}
