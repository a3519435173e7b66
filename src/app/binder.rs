use std::time::Duration;

use crate::player::commands::PlaybackStatus;
use crate::player::engine::{EngineError, MediaEngine, MediaSource};
use crate::ui::slider::{SLIDER_MAX, Slider};
use crate::ui::time::format_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

/// Position the engine should jump to for a seek-slider value.
pub fn seek_target(total: Duration, slider_value: f64) -> Duration {
    total.mul_f64((slider_value / SLIDER_MAX).clamp(0.0, 1.0))
}

/// Keeps the transport widgets consistent with the engine and turns user
/// gestures into engine commands. Lives on the UI thread; engine
/// notifications reach it only after being marshalled through the event loop.
pub struct PlaybackBinder<E: MediaEngine> {
    engine: E,
    total: Option<Duration>,
    total_latched: bool,
    time_slider: Slider,
    volume_slider: Slider,
    time_label: String,
    play_icon: PlayIcon,
}

impl<E: MediaEngine> PlaybackBinder<E> {
    pub fn new(engine: E) -> Self {
        let volume = (engine.volume() as f64 * SLIDER_MAX).round();
        Self {
            engine,
            total: None,
            total_latched: false,
            time_slider: Slider::new(0.0),
            volume_slider: Slider::new(volume),
            time_label: "00:00/00:00".to_string(),
            play_icon: PlayIcon::Play,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn status(&self) -> PlaybackStatus {
        self.engine.status()
    }

    pub fn total(&self) -> Option<Duration> {
        self.total
    }

    pub fn time_slider(&self) -> &Slider {
        &self.time_slider
    }

    pub fn volume_slider(&self) -> &Slider {
        &self.volume_slider
    }

    pub fn time_label(&self) -> &str {
        &self.time_label
    }

    pub fn play_icon(&self) -> PlayIcon {
        self.play_icon
    }

    /// Hands a new resource to the engine and forgets everything known about
    /// the previous one.
    pub fn load(&mut self, uri: &str) -> Result<MediaSource, EngineError> {
        let source = self.engine.load(uri)?;

        self.total = None;
        self.total_latched = false;
        self.time_slider = Slider::new(0.0);
        self.time_label = "00:00/00:00".to_string();
        self.play_icon = PlayIcon::Play;

        Ok(source)
    }

    pub fn toggle_playback(&mut self) {
        match self.engine.status() {
            PlaybackStatus::Unknown | PlaybackStatus::Halted => {}
            PlaybackStatus::Paused | PlaybackStatus::Ready | PlaybackStatus::Stopped => {
                self.engine.play();
            }
            PlaybackStatus::Playing => self.engine.pause(),
        }
    }

    pub fn on_status_changed(&mut self, status: PlaybackStatus) {
        tracing::debug!(?status, "playback status changed");
        match status {
            PlaybackStatus::Playing => self.play_icon = PlayIcon::Pause,
            PlaybackStatus::Paused => self.play_icon = PlayIcon::Play,
            PlaybackStatus::Ready => self.on_ready(),
            _ => {}
        }
    }

    fn on_ready(&mut self) {
        if !self.total_latched {
            self.total = self.engine.total_duration();
            self.total_latched = true;
        }
        self.sync(self.engine.current_time());
    }

    pub fn on_end_of_media(&mut self) {
        self.engine.stop();
        self.play_icon = PlayIcon::Play;
    }

    pub fn on_current_time_changed(&mut self, elapsed: Duration) {
        self.sync(elapsed);
    }

    fn sync(&mut self, elapsed: Duration) {
        self.time_label = format_time(elapsed, self.total);

        match self.total {
            None => self.time_slider.set_disabled(true),
            Some(total) => {
                self.time_slider.set_disabled(false);
                if !total.is_zero() {
                    let position = elapsed.as_secs_f64() / total.as_secs_f64() * SLIDER_MAX;
                    self.time_slider.sync(position);
                }
            }
        }

        self.volume_slider
            .sync((self.engine.volume() as f64 * SLIDER_MAX).round());
    }

    pub fn begin_seek_drag(&mut self) -> bool {
        self.time_slider.begin_drag()
    }

    /// Seeks on every update of an active drag, not only on release.
    pub fn seek_dragged(&mut self, value: f64) {
        let Some(value) = self.time_slider.drag_to(value) else {
            return;
        };
        if let Some(total) = self.total {
            self.engine.seek(seek_target(total, value));
        }
    }

    pub fn end_seek_drag(&mut self) {
        self.time_slider.end_drag();
    }

    pub fn begin_volume_drag(&mut self) -> bool {
        self.volume_slider.begin_drag()
    }

    pub fn volume_dragged(&mut self, value: f64) {
        if let Some(value) = self.volume_slider.drag_to(value) {
            self.engine.set_volume((value / SLIDER_MAX) as f32);
        }
    }

    pub fn end_volume_drag(&mut self) {
        self.volume_slider.end_drag();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::engine::mock::{EngineCall, RecordingEngine};

    fn binder_with(status: PlaybackStatus) -> PlaybackBinder<RecordingEngine> {
        let mut engine = RecordingEngine::new();
        engine.status = status;
        PlaybackBinder::new(engine)
    }

    fn ready_binder(total: Option<Duration>) -> PlaybackBinder<RecordingEngine> {
        let mut binder = binder_with(PlaybackStatus::Ready);
        binder.engine_mut().total_duration = total;
        binder.on_status_changed(PlaybackStatus::Ready);
        binder.engine_mut().take_calls();
        binder
    }

    #[test]
    fn toggle_is_a_no_op_while_unknown_or_halted() {
        for status in [PlaybackStatus::Unknown, PlaybackStatus::Halted] {
            let mut binder = binder_with(status);
            binder.toggle_playback();
            assert!(binder.engine().calls.is_empty());
        }
    }

    #[test]
    fn toggle_plays_from_idle_states() {
        for status in [
            PlaybackStatus::Paused,
            PlaybackStatus::Ready,
            PlaybackStatus::Stopped,
        ] {
            let mut binder = binder_with(status);
            binder.toggle_playback();
            assert_eq!(binder.engine().calls, vec![EngineCall::Play]);
        }
    }

    #[test]
    fn toggle_pauses_while_playing() {
        let mut binder = binder_with(PlaybackStatus::Playing);
        binder.toggle_playback();
        assert_eq!(binder.engine().calls, vec![EngineCall::Pause]);
    }

    #[test]
    fn toggling_twice_from_paused_returns_to_paused() {
        let mut binder = binder_with(PlaybackStatus::Paused);
        binder.on_status_changed(PlaybackStatus::Paused);

        binder.toggle_playback();
        let status = binder.status();
        binder.on_status_changed(status);
        assert_eq!(status, PlaybackStatus::Playing);
        assert_eq!(binder.play_icon(), PlayIcon::Pause);

        binder.toggle_playback();
        let status = binder.status();
        binder.on_status_changed(status);
        assert_eq!(status, PlaybackStatus::Paused);
        assert_eq!(binder.play_icon(), PlayIcon::Play);

        assert_eq!(
            binder.engine().calls,
            vec![EngineCall::Play, EngineCall::Pause]
        );
    }

    #[test]
    fn ready_latches_total_once_per_load() {
        let mut binder = binder_with(PlaybackStatus::Ready);
        binder.engine_mut().total_duration = Some(Duration::from_secs(130));
        binder.engine_mut().current_time = Duration::from_secs(65);

        binder.on_status_changed(PlaybackStatus::Ready);
        assert_eq!(binder.total(), Some(Duration::from_secs(130)));
        assert_eq!(binder.time_label(), "01:05/02:10");
        assert_eq!(binder.time_slider().value(), 50.0);

        binder.engine_mut().total_duration = Some(Duration::from_secs(999));
        binder.on_status_changed(PlaybackStatus::Ready);
        assert_eq!(binder.total(), Some(Duration::from_secs(130)));

        binder.load("/tmp/next-track.mp3").unwrap();
        assert_eq!(binder.total(), None);
        binder.engine_mut().total_duration = Some(Duration::from_secs(999));
        binder.on_status_changed(PlaybackStatus::Ready);
        assert_eq!(binder.total(), Some(Duration::from_secs(999)));
    }

    #[test]
    fn drag_suppresses_engine_updates_until_released() {
        let mut binder = ready_binder(Some(Duration::from_secs(120)));

        assert!(binder.begin_seek_drag());
        binder.seek_dragged(80.0);
        for secs in [1, 2, 3, 30, 60] {
            binder.on_current_time_changed(Duration::from_secs(secs));
            assert_eq!(binder.time_slider().value(), 80.0);
        }
        assert_eq!(binder.time_label(), "01:00/02:00");

        binder.end_seek_drag();
        binder.on_current_time_changed(Duration::from_secs(30));
        assert_eq!(binder.time_slider().value(), 25.0);
    }

    #[test]
    fn seeking_is_continuous_during_a_drag() {
        let mut binder = ready_binder(Some(Duration::from_secs(200)));

        binder.begin_seek_drag();
        binder.seek_dragged(10.0);
        binder.seek_dragged(25.0);
        binder.seek_dragged(50.0);
        binder.end_seek_drag();

        assert_eq!(
            binder.engine().calls,
            vec![
                EngineCall::Seek(Duration::from_secs(20)),
                EngineCall::Seek(Duration::from_secs(50)),
                EngineCall::Seek(Duration::from_secs(100)),
            ]
        );
    }

    #[test]
    fn slider_moves_without_a_drag_do_not_seek() {
        let mut binder = ready_binder(Some(Duration::from_secs(200)));
        binder.seek_dragged(50.0);
        assert!(binder.engine().calls.is_empty());
    }

    #[test]
    fn seek_target_scales_total_and_is_monotonic() {
        let total = Duration::from_secs(3700);
        assert_eq!(seek_target(total, 0.0), Duration::ZERO);
        assert_eq!(seek_target(total, 100.0), total);
        assert_eq!(seek_target(total, 50.0), Duration::from_secs(1850));

        let mut previous = Duration::ZERO;
        for step in 0..=400 {
            let target = seek_target(total, step as f64 / 4.0);
            assert!(target >= previous);
            previous = target;
        }
    }

    #[test]
    fn unknown_total_disables_the_time_slider() {
        let mut binder = ready_binder(None);
        binder.on_current_time_changed(Duration::from_secs(5));

        assert!(binder.time_slider().is_disabled());
        assert!(!binder.begin_seek_drag());
        assert_eq!(binder.time_label(), "00:05");
    }

    #[test]
    fn zero_total_leaves_slider_position_alone() {
        let mut binder = ready_binder(Some(Duration::ZERO));
        binder.on_current_time_changed(Duration::from_secs(7));

        assert!(!binder.time_slider().is_disabled());
        assert_eq!(binder.time_slider().value(), 0.0);
        assert_eq!(binder.time_label(), "00:07");
    }

    #[test]
    fn volume_drag_sets_volume_on_every_update() {
        let mut binder = ready_binder(Some(Duration::from_secs(60)));

        assert!(binder.begin_volume_drag());
        binder.volume_dragged(50.0);
        binder.volume_dragged(75.0);
        binder.end_volume_drag();

        assert_eq!(
            binder.engine().calls,
            vec![EngineCall::SetVolume(0.5), EngineCall::SetVolume(0.75)]
        );
    }

    #[test]
    fn volume_slider_follows_engine_unless_dragged() {
        let mut binder = ready_binder(Some(Duration::from_secs(60)));
        assert_eq!(binder.volume_slider().value(), 20.0);

        binder.engine_mut().volume = 0.456;
        binder.on_current_time_changed(Duration::from_secs(1));
        assert_eq!(binder.volume_slider().value(), 46.0);

        binder.begin_volume_drag();
        binder.volume_dragged(10.0);
        binder.engine_mut().volume = 0.9;
        binder.on_current_time_changed(Duration::from_secs(2));
        assert_eq!(binder.volume_slider().value(), 10.0);
    }

    #[test]
    fn end_of_media_stops_and_resets_icon() {
        let mut binder = ready_binder(Some(Duration::from_secs(60)));
        binder.on_status_changed(PlaybackStatus::Playing);
        assert_eq!(binder.play_icon(), PlayIcon::Pause);

        binder.on_end_of_media();

        assert_eq!(binder.engine().calls, vec![EngineCall::Stop]);
        assert_eq!(binder.play_icon(), PlayIcon::Play);
    }
}
