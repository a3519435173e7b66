use ratatui::layout::Rect;

pub const SLIDER_MAX: f64 = 100.0;

/// A 0–100 slider. While `dragging` is set the user owns the value and
/// engine-driven updates through [`Slider::sync`] are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    value: f64,
    dragging: bool,
    disabled: bool,
}

impl Slider {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, SLIDER_MAX),
            dragging: false,
            disabled: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn fraction(&self) -> f64 {
        self.value / SLIDER_MAX
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.dragging = false;
        }
    }

    /// Starts a user drag. Returns false when the slider is disabled.
    pub fn begin_drag(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        self.dragging = true;
        true
    }

    /// Applies a user drag update and returns the new value, or `None` when no
    /// drag is in progress.
    pub fn drag_to(&mut self, value: f64) -> Option<f64> {
        if !self.dragging {
            return None;
        }
        self.value = value.clamp(0.0, SLIDER_MAX);
        Some(self.value)
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Engine-driven update. Dropped while the user is dragging.
    pub fn sync(&mut self, value: f64) -> bool {
        if self.dragging {
            return false;
        }
        self.value = value.clamp(0.0, SLIDER_MAX);
        true
    }
}

/// Maps a terminal column inside `track` to a slider value.
pub fn value_at_column(track: Rect, column: u16) -> f64 {
    if track.width <= 1 {
        return 0.0;
    }
    let offset = column.saturating_sub(track.x).min(track.width - 1);
    offset as f64 / (track.width - 1) as f64 * SLIDER_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_is_ignored_while_dragging() {
        let mut slider = Slider::new(10.0);
        assert!(slider.begin_drag());
        assert_eq!(slider.drag_to(40.0), Some(40.0));

        assert!(!slider.sync(75.0));
        assert_eq!(slider.value(), 40.0);

        slider.end_drag();
        assert!(slider.sync(75.0));
        assert_eq!(slider.value(), 75.0);
    }

    #[test]
    fn drag_updates_require_an_active_drag() {
        let mut slider = Slider::new(0.0);
        assert_eq!(slider.drag_to(50.0), None);
        assert_eq!(slider.value(), 0.0);
    }

    #[test]
    fn disabled_slider_refuses_drags() {
        let mut slider = Slider::new(0.0);
        slider.set_disabled(true);
        assert!(!slider.begin_drag());
        assert!(!slider.is_dragging());
    }

    #[test]
    fn values_are_clamped() {
        let mut slider = Slider::new(150.0);
        assert_eq!(slider.value(), 100.0);
        slider.begin_drag();
        assert_eq!(slider.drag_to(-3.0), Some(0.0));
    }

    #[test]
    fn columns_map_across_the_track() {
        let track = Rect::new(10, 0, 11, 1);
        assert_eq!(value_at_column(track, 10), 0.0);
        assert_eq!(value_at_column(track, 15), 50.0);
        assert_eq!(value_at_column(track, 20), 100.0);
        assert_eq!(value_at_column(track, 99), 100.0);
        assert_eq!(value_at_column(track, 2), 0.0);
    }
}
