//! Free slot search over a sorted list of busy intervals

use chrono::TimeDelta;

use super::Interval;

/// Find every gap of at least `duration` inside `window`.
///
/// `busy` must be sorted by start but may overlap. Slots are half-open
/// and end exactly where the next busy interval begins. The cursor only
/// moves forward so overlapping or nested busy intervals merge on their
/// own.
pub fn find_free_slots(window: Interval, duration: TimeDelta, busy: &[Interval]) -> Vec<Interval> {
    let mut slots = Vec::new();
    let mut cursor = window.start;

    for interval in busy {
        let busy_start = interval.start.min(window.end);
        if busy_start - cursor >= duration {
            slots.push(Interval::new(cursor, busy_start));
        }
        if interval.end > cursor {
            cursor = interval.end;
        }
    }

    if window.end - cursor >= duration {
        slots.push(Interval::new(cursor, window.end));
    }

    slots
}
