//! Property tests for windowing, clustering, lanes and the viewport.

use std::time::{Duration, Instant};

use journey_core::DateRange;
use journey_core::timestamps::offset_by_secs;
use journey_test_helpers::at;
use journey_test_helpers::strategies::sorted_events;
use journey_timeline::{
    LaneAllocator, Scale, Viewport, ViewportController, allocate_lanes, cluster_events,
    project_x, window_range,
};
use proptest::prelude::*;

fn scale_strategy() -> impl Strategy<Value = Scale> {
    (0..Scale::ALL.len()).prop_map(Scale::from_index)
}

proptest! {
    #[test]
    fn window_contains_exactly_the_buffered_events(
        events in sorted_events(80, 86_400),
        start in 0i64..86_400,
        len in 0i64..43_200,
        ratio in 0.0f64..0.5,
    ) {
        let viewport = Viewport { scale: Scale::Full, position: 0.0, start: at(start), end: at(start + len) };
        let range = window_range(&events, &viewport, ratio);
        let buffer = viewport.duration_secs() * ratio;
        let lo = offset_by_secs(viewport.start, -buffer);
        let hi = offset_by_secs(viewport.end, buffer);
        for (i, e) in events.iter().enumerate() {
            let inside = e.timestamp >= lo && e.timestamp <= hi;
            prop_assert_eq!(range.contains(&i), inside, "event {} at {}", i, e.timestamp);
        }
    }

    #[test]
    fn clusters_partition_the_window(
        events in sorted_events(80, 3_600),
        min_distance in 0.0f64..60.0,
    ) {
        let viewport = Viewport { scale: Scale::OneHour, position: 0.0, start: at(0), end: at(3_600) };
        let range = window_range(&events, &viewport, 0.05);
        let clusters = cluster_events(&events, range.clone(), &viewport, 800.0, min_distance);
        let flattened: Vec<usize> = clusters.iter().flat_map(|c| c.members.iter().copied()).collect();
        prop_assert_eq!(flattened, range.collect::<Vec<_>>());
        for cluster in &clusters {
            prop_assert_eq!(cluster.density, cluster.members.len());
            prop_assert_eq!(cluster.representative, *cluster.members.last().unwrap());
            for pair in cluster.members.windows(2) {
                let a = project_x(events[pair[0]].timestamp, &viewport, 800.0);
                let b = project_x(events[pair[1]].timestamp, &viewport, 800.0);
                prop_assert!((b - a).abs() < min_distance);
            }
        }
        for pair in clusters.windows(2) {
            let last = *pair[0].members.last().unwrap();
            let first = pair[1].members[0];
            let a = project_x(events[last].timestamp, &viewport, 800.0);
            let b = project_x(events[first].timestamp, &viewport, 800.0);
            prop_assert!((b - a).abs() >= min_distance);
        }
    }

    #[test]
    fn lanes_are_stable_for_an_unchanged_window(events in sorted_events(60, 7_200)) {
        prop_assert_eq!(allocate_lanes(&events), allocate_lanes(&events));
        let mut alloc = LaneAllocator::new();
        alloc.update(&events);
        let first = alloc.lanes().to_vec();
        prop_assert!(!alloc.update(&events));
        prop_assert_eq!(alloc.lanes(), first.as_slice());
        if let Some(base) = first.first() {
            prop_assert!(first.iter().all(|l| l.event_count <= base.event_count));
        }
    }

    #[test]
    fn scale_round_trip_restores_viewport(
        journey_secs in 60i64..(90 * 86_400),
        position in 0.0f64..=1.0,
        coarse in scale_strategy(),
        fine in scale_strategy(),
    ) {
        // Zooming in and back out; any pair involving Full keeps position.
        let (s1, s2) = if fine <= coarse { (coarse, fine) } else { (fine, coarse) };
        let s2 = if s1 == Scale::Full { fine } else { s2 };
        let mut vc = ViewportController::new(DateRange::new(at(0), at(journey_secs)), s1);
        vc.set_position(position);
        let before = vc.viewport();
        vc.set_scale(s2);
        vc.set_scale(s1);
        let after = vc.viewport();
        prop_assert_eq!(after.scale, before.scale);
        prop_assert!((after.start - before.start).num_milliseconds().abs() <= 5);
        prop_assert!((after.end - before.end).num_milliseconds().abs() <= 5);
    }

    #[test]
    fn viewport_stays_inside_journey(
        journey_secs in 0i64..(60 * 86_400),
        scale in scale_strategy(),
        ops in prop::collection::vec(-2.0f64..2.0, 0..20),
    ) {
        let journey = DateRange::new(at(0), at(journey_secs));
        let mut vc = ViewportController::new(journey, scale);
        for delta in ops {
            vc.pan(delta);
            let vp = vc.viewport();
            prop_assert!(vp.start <= vp.end);
            prop_assert!(vp.start >= journey.start);
            prop_assert!(vp.end <= journey.end);
            prop_assert!((0.0..=1.0).contains(&vp.position));
        }
    }

    #[test]
    fn playback_is_monotonic_and_wall_clock_driven(
        journey_secs in 100i64..1_000_000,
        speed in 1.0f64..1_000.0,
        steps in prop::collection::vec(1u64..5_000, 1..30),
    ) {
        let mut vc = ViewportController::new(DateRange::new(at(0), at(journey_secs)), Scale::Full);
        let t0 = Instant::now();
        vc.play(speed);
        vc.advance(t0);
        let mut elapsed_ms = 0u64;
        let mut last = vc.position();
        for step in steps {
            elapsed_ms += step;
            vc.advance(t0 + Duration::from_millis(elapsed_ms));
            prop_assert!(vc.position() >= last);
            last = vc.position();
        }
        #[allow(clippy::cast_precision_loss)]
        let expected = ((elapsed_ms as f64 / 1000.0) * speed / journey_secs as f64).min(1.0);
        prop_assert!((last - expected).abs() < 1e-6);
        prop_assert_eq!(vc.is_playing(), expected < 1.0);
    }
}
