use std::time::Duration;

const SECS_PER_HOUR: u64 = 60 * 60;

/// Whole-second clock reading. Fractional seconds are floored, never rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clock {
    hours: u64,
    minutes: u64,
    seconds: u64,
}

impl Clock {
    fn from_duration(duration: Duration) -> Self {
        let total = duration.as_secs();
        Self {
            hours: total / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / 60,
            seconds: total % 60,
        }
    }

    fn has_hours(&self) -> bool {
        self.hours > 0
    }

    fn long(&self) -> String {
        format!("{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }

    /// `MM:SS`. An hour component, if any, is folded into the minutes.
    fn short(&self) -> String {
        format!("{:02}:{:02}", self.hours * 60 + self.minutes, self.seconds)
    }
}

/// Renders the time label shown next to the seek slider.
///
/// Without a known, positive `total` only the elapsed time is shown. With one,
/// the label reads `elapsed/total` and the total decides the layout of both
/// sides: `H:MM:SS` when it runs an hour or longer, `MM:SS` otherwise.
pub fn format_time(elapsed: Duration, total: Option<Duration>) -> String {
    let elapsed = Clock::from_duration(elapsed);

    match total.filter(|total| !total.is_zero()) {
        Some(total) => {
            let total = Clock::from_duration(total);
            if total.has_hours() {
                format!("{}/{}", elapsed.long(), total.long())
            } else {
                format!("{}/{}", elapsed.short(), total.short())
            }
        }
        None if elapsed.has_hours() => elapsed.long(),
        None => elapsed.short(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn zero_total_shows_elapsed_only() {
        assert_eq!(format_time(secs(0), Some(secs(0))), "00:00");
        assert_eq!(format_time(secs(5), Some(secs(0))), "00:05");
        assert_eq!(format_time(secs(5), None), "00:05");
    }

    #[test]
    fn unknown_total_uses_hours_once_elapsed_passes_an_hour() {
        assert_eq!(format_time(secs(3599), None), "59:59");
        assert_eq!(format_time(secs(3600), None), "1:00:00");
        assert_eq!(format_time(secs(36_061), None), "10:01:01");
    }

    #[test]
    fn short_media_uses_minutes_on_both_sides() {
        assert_eq!(format_time(secs(65), Some(secs(130))), "01:05/02:10");
        assert_eq!(format_time(secs(0), Some(secs(59))), "00:00/00:59");
    }

    #[test]
    fn long_media_uses_hours_on_both_sides() {
        assert_eq!(format_time(secs(3661), Some(secs(7200))), "1:01:01/2:00:00");
        assert_eq!(format_time(secs(30), Some(secs(3700))), "0:00:30/1:01:40");
    }

    #[test]
    fn fractional_seconds_are_floored() {
        let elapsed = Duration::from_millis(59_999);
        let total = Duration::from_millis(120_900);
        assert_eq!(format_time(elapsed, Some(total)), "00:59/02:00");
    }

    #[test]
    fn sub_second_total_still_counts_as_known() {
        assert_eq!(
            format_time(Duration::ZERO, Some(Duration::from_millis(400))),
            "00:00/00:00"
        );
    }

    #[test]
    fn elapsed_past_short_total_folds_hours_into_minutes() {
        assert_eq!(format_time(secs(3725), Some(secs(600))), "62:05/10:00");
    }
}
