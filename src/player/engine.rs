use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::events::types::AppEvent;
use crate::player::commands::{PlaybackStatus, PlayerCommand};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid media uri `{uri}`: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported uri scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("`{0}` is not a valid local file uri")]
    NotAFilePath(String),
    #[error("media engine is no longer running")]
    Disconnected,
}

/// Where a media resource lives, resolved from the string typed into the open prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    Remote(Url),
}

impl MediaSource {
    pub fn parse(uri: &str) -> Result<Self, EngineError> {
        let uri = uri.trim();

        match Url::parse(uri) {
            Ok(url) => match url.scheme() {
                "file" => url
                    .to_file_path()
                    .map(MediaSource::File)
                    .map_err(|_| EngineError::NotAFilePath(uri.to_string())),
                "http" | "https" => Ok(MediaSource::Remote(url)),
                // Windows drive letters parse as a one-letter scheme
                scheme if scheme.len() == 1 => Ok(MediaSource::File(PathBuf::from(uri))),
                scheme => Err(EngineError::UnsupportedScheme(scheme.to_string())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(MediaSource::File(PathBuf::from(uri)))
            }
            Err(source) => Err(EngineError::InvalidUri {
                uri: uri.to_string(),
                source,
            }),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            MediaSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            MediaSource::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
        }
    }

    pub fn extension(&self) -> Option<String> {
        let path = match self {
            MediaSource::File(path) => path.clone(),
            MediaSource::Remote(url) => PathBuf::from(url.path()),
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }
}

/// Control surface of the component that decodes and renders media.
///
/// Commands are fire-and-forget. Status and time changes are reported back
/// asynchronously as [`AppEvent`]s; the query methods return the engine's
/// latest view of its own state.
pub trait MediaEngine {
    fn load(&mut self, uri: &str) -> Result<MediaSource, EngineError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);

    fn status(&self) -> PlaybackStatus;
    fn current_time(&self) -> Duration;
    fn volume(&self) -> f32;
    fn total_duration(&self) -> Option<Duration>;
}

const UNKNOWN_DURATION: u64 = u64::MAX;

/// State written by the engine thread and read from the UI thread.
#[derive(Debug)]
pub struct EngineState {
    status: AtomicU8,
    position_ms: AtomicU64,
    duration_ms: AtomicU64,
    volume: AtomicU32,
}

impl EngineState {
    pub fn new(volume: f32) -> Self {
        Self {
            status: AtomicU8::new(PlaybackStatus::Unknown.as_u8()),
            position_ms: AtomicU64::new(0),
            duration_ms: AtomicU64::new(UNKNOWN_DURATION),
            volume: AtomicU32::new(volume.clamp(0.0, 1.0).to_bits()),
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms.load(Ordering::Relaxed))
    }

    pub fn set_position(&self, position: Duration) {
        self.position_ms
            .store(position.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn duration(&self) -> Option<Duration> {
        match self.duration_ms.load(Ordering::Relaxed) {
            UNKNOWN_DURATION => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        let ms = duration.map_or(UNKNOWN_DURATION, |d| d.as_millis() as u64);
        self.duration_ms.store(ms, Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

/// UI-side handle to the decoder thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<PlayerCommand>,
    state: Arc<EngineState>,
    initial_volume: f32,
}

impl EngineHandle {
    pub fn new(
        cmd_tx: mpsc::Sender<PlayerCommand>,
        state: Arc<EngineState>,
        initial_volume: f32,
    ) -> Self {
        Self {
            cmd_tx,
            state,
            initial_volume,
        }
    }

    fn send(&self, cmd: PlayerCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(cmd).map_err(|_| EngineError::Disconnected)
    }

    fn fire(&self, cmd: PlayerCommand) {
        if let Err(e) = self.send(cmd) {
            tracing::warn!("dropping engine command: {e}");
        }
    }
}

impl MediaEngine for EngineHandle {
    fn load(&mut self, uri: &str) -> Result<MediaSource, EngineError> {
        let source = MediaSource::parse(uri)?;
        self.state.set_status(PlaybackStatus::Unknown);
        self.state.set_duration(None);
        self.state.set_position(Duration::ZERO);
        // Every newly opened resource starts at the configured volume.
        self.state.set_volume(self.initial_volume);
        self.send(PlayerCommand::Load(source.clone()))?;
        Ok(source)
    }

    fn play(&mut self) {
        self.fire(PlayerCommand::Play);
    }

    fn pause(&mut self) {
        self.fire(PlayerCommand::Pause);
    }

    fn stop(&mut self) {
        self.fire(PlayerCommand::Stop);
    }

    fn seek(&mut self, position: Duration) {
        self.fire(PlayerCommand::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.set_volume(volume);
        self.fire(PlayerCommand::SetVolume(volume));
    }

    fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    fn current_time(&self) -> Duration {
        self.state.position()
    }

    fn volume(&self) -> f32 {
        self.state.volume()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.state.duration()
    }
}

/// Spawns the decoder thread and returns the handle the UI talks to.
pub fn start(
    initial_volume: f32,
    event_tx: mpsc::Sender<AppEvent>,
) -> (EngineHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
    let state = Arc::new(EngineState::new(initial_volume));
    let handle = crate::player::thread::spawn(cmd_rx, state.clone(), event_tx);
    (EngineHandle::new(cmd_tx, state, initial_volume), handle)
}

#[cfg(test)]
pub mod mock {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum EngineCall {
        Load(String),
        Play,
        Pause,
        Stop,
        Seek(Duration),
        SetVolume(f32),
    }

    /// Records every command and lets tests script what the engine reports.
    #[derive(Debug, Default)]
    pub struct RecordingEngine {
        pub calls: Vec<EngineCall>,
        pub status: PlaybackStatus,
        pub current_time: Duration,
        pub volume: f32,
        pub total_duration: Option<Duration>,
    }

    impl RecordingEngine {
        pub fn new() -> Self {
            Self {
                volume: 0.2,
                ..Self::default()
            }
        }

        pub fn take_calls(&mut self) -> Vec<EngineCall> {
            std::mem::take(&mut self.calls)
        }
    }

    impl MediaEngine for RecordingEngine {
        fn load(&mut self, uri: &str) -> Result<MediaSource, EngineError> {
            let source = MediaSource::parse(uri)?;
            self.calls.push(EngineCall::Load(uri.to_string()));
            self.status = PlaybackStatus::Unknown;
            self.total_duration = None;
            Ok(source)
        }

        fn play(&mut self) {
            self.calls.push(EngineCall::Play);
            self.status = PlaybackStatus::Playing;
        }

        fn pause(&mut self) {
            self.calls.push(EngineCall::Pause);
            self.status = PlaybackStatus::Paused;
        }

        fn stop(&mut self) {
            self.calls.push(EngineCall::Stop);
            self.status = PlaybackStatus::Stopped;
        }

        fn seek(&mut self, position: Duration) {
            self.calls.push(EngineCall::Seek(position));
        }

        fn set_volume(&mut self, volume: f32) {
            self.calls.push(EngineCall::SetVolume(volume));
            self.volume = volume;
        }

        fn status(&self) -> PlaybackStatus {
            self.status
        }

        fn current_time(&self) -> Duration {
            self.current_time
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn total_duration(&self) -> Option<Duration> {
            self.total_duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_paths_are_local_files() {
        assert_eq!(
            MediaSource::parse("/home/user/Music/song.mp3").unwrap(),
            MediaSource::File(PathBuf::from("/home/user/Music/song.mp3"))
        );
    }

    #[test]
    fn file_uris_resolve_to_paths() {
        let source = MediaSource::parse("file:///tmp/clip%20one.m4a").unwrap();
        assert_eq!(source, MediaSource::File(PathBuf::from("/tmp/clip one.m4a")));
        assert_eq!(source.display_name(), "clip one.m4a");
        assert_eq!(source.extension().as_deref(), Some("m4a"));
    }

    #[test]
    fn http_uris_are_remote() {
        let source = MediaSource::parse("  https://example.com/media/Track.MP3 ").unwrap();
        assert!(matches!(source, MediaSource::Remote(_)));
        assert_eq!(source.display_name(), "Track.MP3");
        assert_eq!(source.extension().as_deref(), Some("mp3"));
    }

    #[test]
    fn other_schemes_are_rejected() {
        let err = MediaSource::parse("rtsp://camera.local/stream").unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedScheme(ref s) if s == "rtsp"));
    }

    #[test]
    fn engine_state_tracks_unknown_duration() {
        let state = EngineState::new(1.5);
        assert_eq!(state.duration(), None);
        assert_eq!(state.volume(), 1.0);

        state.set_duration(Some(Duration::from_secs(90)));
        assert_eq!(state.duration(), Some(Duration::from_secs(90)));

        state.set_duration(None);
        assert_eq!(state.duration(), None);
    }

    #[test]
    fn handle_reports_disconnected_engine_on_load() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        drop(cmd_rx);
        let mut handle = EngineHandle::new(cmd_tx, Arc::new(EngineState::new(0.2)), 0.2);

        let err = handle.load("/tmp/some-song.mp3").unwrap_err();
        assert!(matches!(err, EngineError::Disconnected));
    }

    #[test]
    fn handle_load_resets_observable_state() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let state = Arc::new(EngineState::new(0.2));
        state.set_status(PlaybackStatus::Playing);
        state.set_duration(Some(Duration::from_secs(10)));
        let mut handle = EngineHandle::new(cmd_tx, state, 0.2);

        handle.load("/tmp/another-song.wav").unwrap();

        assert_eq!(handle.status(), PlaybackStatus::Unknown);
        assert_eq!(handle.total_duration(), None);
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(PlayerCommand::Load(MediaSource::File(_)))
        ));
    }

    #[test]
    fn volume_is_visible_before_the_engine_thread_applies_it() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let mut handle = EngineHandle::new(cmd_tx, Arc::new(EngineState::new(0.2)), 0.2);

        handle.set_volume(0.65);

        assert_eq!(handle.volume(), 0.65);
        assert!(matches!(cmd_rx.try_recv(), Ok(PlayerCommand::SetVolume(v)) if v == 0.65));
    }

    #[test]
    fn opening_media_restores_the_configured_volume() {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let mut handle = EngineHandle::new(cmd_tx, Arc::new(EngineState::new(0.3)), 0.3);

        handle.set_volume(0.9);
        handle.load("/tmp/next-episode.mp3").unwrap();

        assert_eq!(handle.volume(), 0.3);
    }
}
