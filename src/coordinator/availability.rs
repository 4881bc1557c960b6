use crate::model::*;

// ── Free-window algorithm ─────────────────────────────────────────

/// Free sub-intervals of `window` once `busy` is taken out.
///
/// `busy` may be unsorted, overlapping, and may stick out of the window;
/// it is clamped, sorted, and merged first.
pub fn free_windows(window: &TimeSlot, busy: &[TimeSlot]) -> Vec<TimeSlot> {
    let mut clamped: Vec<TimeSlot> = busy
        .iter()
        .filter(|b| b.overlaps(window))
        .map(|b| {
            TimeSlot::from_bounds(b.start().max(window.start()), b.end().min(window.end()))
        })
        .collect();
    clamped.sort_by_key(|s| s.start());
    let merged = merge_overlapping(&clamped);
    subtract_intervals(&[*window], &merged)
}

/// Merge sorted overlapping/adjacent slots into disjoint slots.
pub fn merge_overlapping(sorted: &[TimeSlot]) -> Vec<TimeSlot> {
    let mut merged: Vec<TimeSlot> = Vec::new();
    for &slot in sorted {
        if let Some(last) = merged.last_mut()
            && slot.start() <= last.end()
        {
            *last = TimeSlot::from_bounds(last.start(), last.end().max(slot.end()));
            continue;
        }
        merged.push(slot);
    }
    merged
}

/// `base` minus `to_remove`. Both inputs sorted by start; `to_remove` disjoint.
pub fn subtract_intervals(base: &[TimeSlot], to_remove: &[TimeSlot]) -> Vec<TimeSlot> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start();
        let current_end = b.end();

        while ri < to_remove.len() && to_remove[ri].end() <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start() < current_end {
            let r = &to_remove[j];
            if r.start() > current_start {
                result.push(TimeSlot::from_bounds(current_start, r.start()));
            }
            current_start = current_start.max(r.end());
            j += 1;
        }

        if current_start < current_end {
            result.push(TimeSlot::from_bounds(current_start, current_end));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: Ms = 3_600_000;

    fn s(start: Ms, end: Ms) -> TimeSlot {
        TimeSlot::from_bounds(start, end)
    }

    #[test]
    fn subtract_no_overlap() {
        let result = subtract_intervals(&[s(0, 100)], &[s(200, 300)]);
        assert_eq!(result, vec![s(0, 100)]);
    }

    #[test]
    fn subtract_full_overlap() {
        let result = subtract_intervals(&[s(100, 200)], &[s(0, 300)]);
        assert!(result.is_empty());
    }

    #[test]
    fn subtract_partial_left() {
        let result = subtract_intervals(&[s(100, 300)], &[s(50, 150)]);
        assert_eq!(result, vec![s(150, 300)]);
    }

    #[test]
    fn subtract_partial_right() {
        let result = subtract_intervals(&[s(100, 300)], &[s(250, 400)]);
        assert_eq!(result, vec![s(100, 250)]);
    }

    #[test]
    fn subtract_middle_punch() {
        let result = subtract_intervals(&[s(100, 400)], &[s(200, 300)]);
        assert_eq!(result, vec![s(100, 200), s(300, 400)]);
    }

    #[test]
    fn merge_overlapping_basic() {
        let merged = merge_overlapping(&[s(0, 100), s(50, 150), s(200, 300)]);
        assert_eq!(merged, vec![s(0, 150), s(200, 300)]);
    }

    #[test]
    fn merge_overlapping_adjacent() {
        let merged = merge_overlapping(&[s(0, 100), s(100, 200)]);
        assert_eq!(merged, vec![s(0, 200)]);
    }

    #[test]
    fn free_windows_whole_window_when_idle() {
        let window = s(9 * H, 17 * H);
        assert_eq!(free_windows(&window, &[]), vec![window]);
    }

    #[test]
    fn free_windows_around_bookings() {
        let window = s(9 * H, 17 * H);
        let busy = [s(12 * H, 13 * H), s(9 * H, 10 * H)];
        assert_eq!(
            free_windows(&window, &busy),
            vec![s(10 * H, 12 * H), s(13 * H, 17 * H)]
        );
    }

    #[test]
    fn free_windows_clamps_to_window() {
        let window = s(9 * H, 17 * H);
        let busy = [s(7 * H, 10 * H), s(16 * H, 20 * H), s(20 * H, 21 * H)];
        assert_eq!(free_windows(&window, &busy), vec![s(10 * H, 16 * H)]);
    }

    #[test]
    fn free_windows_fully_booked() {
        let window = s(9 * H, 11 * H);
        let busy = [s(9 * H, 10 * H), s(10 * H, 11 * H)];
        assert!(free_windows(&window, &busy).is_empty());
    }
}
