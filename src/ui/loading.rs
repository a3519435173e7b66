use std::time::{Duration, Instant};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Spinner shown on the playback surface while the engine probes new media.
pub struct LoadingAnimation {
    current_frame: usize,
    last_update: Instant,
}

impl LoadingAnimation {
    pub fn new() -> Self {
        Self {
            current_frame: 0,
            last_update: Instant::now(),
        }
    }

    pub fn tick(&mut self) {
        self.advance(self.last_update.elapsed());
    }

    fn advance(&mut self, elapsed: Duration) {
        if elapsed >= FRAME_DURATION {
            self.current_frame = (self.current_frame + 1) % FRAMES.len();
            self.last_update = Instant::now();
        }
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.current_frame]
    }
}

impl Default for LoadingAnimation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_advance_only_after_frame_duration() {
        let mut spinner = LoadingAnimation::new();
        spinner.advance(Duration::from_millis(10));
        assert_eq!(spinner.current_frame(), "⠋");

        spinner.advance(FRAME_DURATION);
        assert_eq!(spinner.current_frame(), "⠙");
    }

    #[test]
    fn frames_wrap_around() {
        let mut spinner = LoadingAnimation::new();
        for _ in 0..FRAMES.len() {
            spinner.advance(FRAME_DURATION);
        }
        assert_eq!(spinner.current_frame(), FRAMES[0]);
    }
}
