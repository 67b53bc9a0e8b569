use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use lazyplan_core::{
    parent_id_from_segment_key, LayoutService, LayoutSettings, NoCategoryColors, PeriodUnit,
    Task, VisibleRange, WeekSegmenter,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use uuid::Uuid;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn at(d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, minute, 0).unwrap()
}

fn random_tasks(seed: u64, count: u128) -> Vec<Task> {
    let mut rng = StdRng::seed_from_u64(seed);
    let origin = at(5, 0, 0);
    (0..count)
        .map(|n| {
            let start = origin + Duration::minutes(30 * rng.gen_range(0..1_600i64));
            let end = start + Duration::minutes(30 * rng.gen_range(0..700i64));
            Task::scheduled(Uuid::from_u128(n + 1), "span", start, end)
        })
        .collect()
}

fn units() -> Vec<PeriodUnit> {
    vec![
        PeriodUnit::Day,
        PeriodUnit::Week {
            starts_on: Weekday::Sun,
        },
        PeriodUnit::Week {
            starts_on: Weekday::Mon,
        },
    ]
}

#[test]
fn segments_reconstruct_clipped_interval_exactly() {
    let service = LayoutService::new(NoCategoryColors, LayoutSettings::default()).unwrap();
    let range = VisibleRange::new(day(8), 17);
    let window = range.window();

    for seed in 1..12 {
        let normalized = service.normalize(&random_tasks(seed, 40));
        for unit in units() {
            let segmenter = WeekSegmenter::new(unit, range);
            let mut by_task: BTreeMap<Uuid, Vec<_>> = BTreeMap::new();
            for segment in segmenter.segment(&normalized.scheduled) {
                by_task.entry(segment.task.id()).or_default().push(segment);
            }

            for item in &normalized.scheduled {
                let Some(segments) = by_task.get(&item.id()) else {
                    assert!(!item.interval.overlaps(&window), "seed {seed}: task dropped");
                    continue;
                };
                let clipped = item.interval.clip_to(&window);
                assert_eq!(segments[0].interval.start(), clipped.start());
                assert_eq!(segments[segments.len() - 1].interval.end(), clipped.end());
                for pair in segments.windows(2) {
                    assert_eq!(pair[0].interval.end(), pair[1].interval.start());
                    assert_eq!(pair[0].period_index + 1, pair[1].period_index);
                    assert!(!pair[1].interval.is_instant(), "empty trailing segment");
                }
                let last_flags: Vec<_> = segments.iter().map(|s| s.is_last).collect();
                assert_eq!(last_flags.iter().filter(|flag| **flag).count(), 1);
                assert!(segments[segments.len() - 1].is_last);
                for segment in segments {
                    assert_eq!(
                        segmenter.period_index_of(segment.interval.start()),
                        segment.period_index
                    );
                    assert_eq!(parent_id_from_segment_key(&segment.key), Some(item.id()));
                }
            }
        }
    }
}

#[test]
fn monday_night_to_wednesday_in_sunday_week() {
    let service = LayoutService::new(NoCategoryColors, LayoutSettings::default()).unwrap();
    let task = Task::scheduled(Uuid::from_u128(1), "overnight", at(12, 22, 0), at(14, 2, 0));
    let normalized = service.normalize(&[task]);
    let range = VisibleRange::week_containing(day(14), Weekday::Sun);

    let by_week = WeekSegmenter::new(service.week_unit(), range).segment(&normalized.scheduled);
    assert_eq!(by_week.len(), 1);
    assert_eq!(by_week[0].interval.duration(), Duration::hours(28));
    assert_eq!(by_week[0].key, format!("{}_week_0", Uuid::from_u128(1)));

    let by_day = WeekSegmenter::new(PeriodUnit::Day, range).segment(&normalized.scheduled);
    let total: Duration = by_day
        .iter()
        .map(|segment| segment.interval.duration())
        .fold(Duration::zero(), |acc, next| acc + next);
    assert_eq!(by_day.len(), 3);
    assert_eq!(total, Duration::hours(28));
}
