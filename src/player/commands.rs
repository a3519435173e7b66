use std::time::Duration;

use crate::player::engine::MediaSource;

#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Load(MediaSource),
    Play,
    Pause,
    Stop,
    Seek(Duration),
    SetVolume(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Unknown,
    Ready,
    Playing,
    Paused,
    Stopped,
    Halted,
}

impl PlaybackStatus {
    pub fn as_u8(self) -> u8 {
        match self {
            PlaybackStatus::Unknown => 0,
            PlaybackStatus::Ready => 1,
            PlaybackStatus::Playing => 2,
            PlaybackStatus::Paused => 3,
            PlaybackStatus::Stopped => 4,
            PlaybackStatus::Halted => 5,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackStatus::Ready,
            2 => PlaybackStatus::Playing,
            3 => PlaybackStatus::Paused,
            4 => PlaybackStatus::Stopped,
            5 => PlaybackStatus::Halted,
            _ => PlaybackStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackStatus::Unknown => "Loading",
            PlaybackStatus::Ready => "Ready",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Halted => "Halted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_encoding_is_unknown() {
        assert_eq!(PlaybackStatus::from_u8(200), PlaybackStatus::Unknown);
    }
}
