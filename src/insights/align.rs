use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::insights::buckets::{bucket_average, by_date, Measured};
use crate::insights::config::AlignmentWindow;
use crate::insights::types::AlignedSeries;
use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Join two series on calendar date. Each side is first reduced to its daily
/// mean; days present on only one side are dropped and counted.
pub fn align_by_date<A, B>(left: &[A], right: &[B]) -> AlignedSeries
where
    A: Measured,
    B: Measured,
{
    let left_daily = bucket_average(left, by_date);
    let right_daily = bucket_average(right, by_date);

    let mut aligned = AlignedSeries::default();
    for (day, left_value) in &left_daily {
        match right_daily.get(day) {
            Some(right_value) => {
                aligned.left.push(*left_value);
                aligned.right.push(*right_value);
            }
            None => aligned.dropped_left += 1,
        }
    }
    aligned.dropped_right = right_daily
        .keys()
        .filter(|day| !left_daily.contains_key(*day))
        .count();

    if aligned.dropped() > 0 {
        log_debug!(
            "date alignment dropped {} left / {} right days, kept {}",
            aligned.dropped_left,
            aligned.dropped_right,
            aligned.len()
        );
    }

    aligned
}

/// Pair each event with the mean of the responses that fall inside `window`
/// after it. Events with no response are dropped and counted; so are
/// responses no event claimed.
pub fn align_by_window<A, B>(
    events: &[A],
    responses: &[B],
    window: AlignmentWindow,
) -> AlignedSeries
where
    A: Measured,
    B: Measured,
{
    let matches = match_window(events, responses, window);

    let mut aligned = AlignedSeries {
        dropped_left: events.len() - matches.pairs.len(),
        dropped_right: matches.unclaimed_responses,
        ..AlignedSeries::default()
    };
    for (event, response_mean) in matches.pairs {
        aligned.left.push(event.value());
        aligned.right.push(response_mean);
    }

    if aligned.dropped() > 0 {
        log_debug!(
            "window alignment dropped {} events / {} responses, kept {}",
            aligned.dropped_left,
            aligned.dropped_right,
            aligned.len()
        );
    }

    aligned
}

/// Events paired with their in-window response mean, keeping a reference to
/// the event so callers can bucket by its label.
pub struct WindowMatches<'a, A> {
    pub pairs: Vec<(&'a A, f64)>,
    pub unclaimed_responses: usize,
}

pub fn match_window<'a, A, B>(
    events: &'a [A],
    responses: &[B],
    window: AlignmentWindow,
) -> WindowMatches<'a, A>
where
    A: Measured,
    B: Measured,
{
    let mut sorted: Vec<(DateTime<Utc>, f64)> = responses
        .iter()
        .map(|response| (response.timestamp(), response.value()))
        .collect();
    sorted.sort_by_key(|(timestamp, _)| *timestamp);

    let mut claimed = vec![false; sorted.len()];
    let mut pairs = Vec::new();

    for event in events {
        let bounds = (
            event.timestamp().checked_add_signed(window.min_offset),
            event.timestamp().checked_add_signed(window.max_offset),
        );
        let (Some(start), Some(end)) = bounds else {
            log_debug!("window around {} is out of range, skipping event", event.timestamp());
            continue;
        };
        let first = sorted.partition_point(|(timestamp, _)| *timestamp < start);
        let last = sorted.partition_point(|(timestamp, _)| *timestamp <= end);

        if first >= last {
            continue;
        }

        let in_window = &sorted[first..last];
        let mean = in_window.iter().map(|(_, value)| value).sum::<f64>() / in_window.len() as f64;
        for flag in &mut claimed[first..last] {
            *flag = true;
        }
        pairs.push((event, mean));
    }

    WindowMatches {
        pairs,
        unclaimed_responses: claimed.iter().filter(|flag| !**flag).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::config::MAX_WINDOW_MINUTES;
    use crate::insights::types::TimestampedObservation;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32, minute: u32, value: f64) -> TimestampedObservation {
        TimestampedObservation::new(
            Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap(),
            value,
        )
    }

    #[test]
    fn date_alignment_joins_on_shared_days() {
        let sleep = vec![at(1, 7, 0, 6.0), at(2, 7, 0, 8.0), at(3, 7, 0, 7.0)];
        let energy = vec![
            at(1, 9, 0, 4.0),
            at(1, 18, 0, 6.0),
            at(2, 12, 0, 8.0),
            at(4, 12, 0, 9.0),
        ];

        let aligned = align_by_date(&sleep, &energy);

        assert_eq!(aligned.left, vec![6.0, 8.0]);
        assert_eq!(aligned.right, vec![5.0, 8.0]);
        assert_eq!(aligned.dropped_left, 1);
        assert_eq!(aligned.dropped_right, 1);
    }

    #[test]
    fn window_alignment_uses_responses_inside_window() {
        let meals = vec![at(1, 12, 0, 600.0), at(1, 19, 0, 900.0)];
        let energy = vec![
            at(1, 12, 30, 9.0), // too soon
            at(1, 13, 0, 5.0),
            at(1, 13, 30, 7.0),
            at(1, 14, 0, 6.0),
        ];

        let aligned = align_by_window(&meals, &energy, AlignmentWindow::minutes(60, 120));

        assert_eq!(aligned.left, vec![600.0]);
        assert_eq!(aligned.right, vec![6.0]);
        assert_eq!(aligned.dropped_left, 1);
        assert_eq!(aligned.dropped_right, 1);
    }

    #[test]
    fn window_edges_are_inclusive() {
        let events = vec![at(1, 8, 0, 1.0)];
        let responses = vec![
            TimestampedObservation::new(events[0].timestamp + Duration::minutes(60), 3.0),
            TimestampedObservation::new(events[0].timestamp + Duration::minutes(120), 5.0),
        ];

        let aligned = align_by_window(&events, &responses, AlignmentWindow::minutes(60, 120));
        assert_eq!(aligned.right, vec![4.0]);
        assert_eq!(aligned.dropped(), 0);
    }

    #[test]
    fn empty_inputs_align_to_nothing() {
        let none: Vec<TimestampedObservation> = Vec::new();
        let aligned = align_by_window(&none, &none, AlignmentWindow::minutes(0, 60));
        assert!(aligned.is_empty());
        assert_eq!(align_by_date(&none, &none), AlignedSeries::default());
    }

    #[test]
    fn oversized_window_minutes_are_clamped() {
        let window = AlignmentWindow::minutes(0, 9_000_000_000_000_000_000);
        assert_eq!(window.max_offset, Duration::minutes(MAX_WINDOW_MINUTES));

        let events = vec![at(1, 8, 0, 1.0)];
        let responses = vec![at(3, 8, 0, 6.0)];
        let aligned = align_by_window(&events, &responses, window);
        assert_eq!(aligned.right, vec![6.0]);
    }

    #[test]
    fn events_whose_window_overflows_are_skipped() {
        let events = vec![
            TimestampedObservation::new(DateTime::<Utc>::MAX_UTC, 1.0),
            at(1, 8, 0, 2.0),
        ];
        let responses = vec![at(1, 9, 0, 7.0)];

        let aligned = align_by_window(&events, &responses, AlignmentWindow::minutes(0, 120));
        assert_eq!(aligned.left, vec![2.0]);
        assert_eq!(aligned.right, vec![7.0]);
        assert_eq!(aligned.dropped_left, 1);
    }
}
