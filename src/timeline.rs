use chrono::NaiveDateTime;

use super::schedule::TrainSchedule;

/// Substituted whenever the window yields a nonsensical position, e.g. a
/// train whose actual times precede its own scheduled start after an
/// upstream data glitch.
pub const FALLBACK_ANIMATION_START: f64 = 93.0;

/// The [start, end] instants bounding one train's corridor run, reconciling
/// scheduled against actual times at the endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimelineWindow {
    pub fn from_schedule(schedule: &TrainSchedule) -> TimelineWindow {
        let first = schedule.first_stop();
        let last = schedule.last_stop();
        TimelineWindow {
            start: first.scheduled_arrival.min(first.actual_arrival),
            end: last.scheduled_departure.max(last.actual_departure),
        }
    }

    /// Percentage position of an arrival instant within the window, inverted
    /// so that 100 means the very start of the window and 0 the very end.
    /// A non-positive window or an out-of-range result substitutes the
    /// fallback instead of failing the run.
    pub fn animation_start(&self, actual_arrival: NaiveDateTime) -> f64 {
        let total_duration = (self.end - self.start).num_seconds() as f64 / 60.0;
        if total_duration <= 0.0 {
            return FALLBACK_ANIMATION_START;
        }
        let relative_position = (actual_arrival - self.start).num_seconds() as f64 / 60.0;
        let percentage = 100.0 - (relative_position / total_duration * 100.0);
        if !(0.0..=100.0).contains(&percentage) {
            return FALLBACK_ANIMATION_START;
        }
        percentage
    }
}
