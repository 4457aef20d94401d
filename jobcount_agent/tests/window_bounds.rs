//! Bucket windows are anchored to the injected "now" exactly.
use jobcount_agent::window::{EIGHT_HOURS_MS, FIFTEEN_MINUTES_MS, TWO_HOURS_MS};
use jobcount_agent::{Bucket, TimeWindow};

#[test]
fn window_table_matches_for_several_nows() {
    for now in [0_i64, 1_700_000_000_000, 1_760_000_123_456, 42] {
        assert_eq!(Bucket::Instant.window(now), None);
        assert_eq!(
            Bucket::Recent.window(now),
            Some(TimeWindow::new(Some(now - 900_000), None))
        );
        assert_eq!(
            Bucket::Short.window(now),
            Some(TimeWindow::new(Some(now - 7_200_000), Some(now - 900_000)))
        );
        assert_eq!(
            Bucket::Long.window(now),
            Some(TimeWindow::new(Some(now - 28_800_000), Some(now - 7_200_000)))
        );
        assert_eq!(
            Bucket::VeryLong.window(now),
            Some(TimeWindow::new(None, Some(now - 28_800_000)))
        );
    }
}

#[test]
fn constants_are_milliseconds() {
    assert_eq!(FIFTEEN_MINUTES_MS, 15 * 60 * 1000);
    assert_eq!(TWO_HOURS_MS, 2 * 60 * 60 * 1000);
    assert_eq!(EIGHT_HOURS_MS, 8 * 60 * 60 * 1000);
}

#[test]
fn bounded_buckets_tile_the_timeline() {
    let now = 1_760_000_000_000;
    let recent = Bucket::Recent.window(now).unwrap();
    let short = Bucket::Short.window(now).unwrap();
    let long = Bucket::Long.window(now).unwrap();
    let very_long = Bucket::VeryLong.window(now).unwrap();

    assert_eq!(short.upper_ms, recent.lower_ms);
    assert_eq!(long.upper_ms, short.lower_ms);
    assert_eq!(very_long.upper_ms, long.lower_ms);
    for w in [recent, short, long, very_long] {
        assert!(w.is_ordered(), "{w:?} out of order");
    }

    // Every start time lands in exactly one bucket.
    for age in [0, 1, FIFTEEN_MINUTES_MS, TWO_HOURS_MS - 1, TWO_HOURS_MS, EIGHT_HOURS_MS, EIGHT_HOURS_MS * 3] {
        let ts = now - age;
        let hits = [recent, short, long, very_long]
            .iter()
            .filter(|w| w.contains(ts))
            .count();
        assert_eq!(hits, 1, "age {age} matched {hits} buckets");
    }
}

#[test]
fn contains_is_half_open() {
    let w = TimeWindow::new(Some(100), Some(200));
    assert!(w.contains(100));
    assert!(w.contains(199));
    assert!(!w.contains(200));
    assert!(!w.contains(99));

    assert!(TimeWindow::new(None, Some(10)).contains(i64::MIN));
    assert!(TimeWindow::new(Some(10), None).contains(i64::MAX));
    assert!(TimeWindow::unbounded().contains(0));
    assert!(!TimeWindow::new(Some(5), Some(1)).is_ordered());
}

#[test]
fn publish_order_and_gauge_names() {
    let names: Vec<&str> = Bucket::ALL.iter().map(|b| b.gauge_name()).collect();
    assert_eq!(
        names,
        [
            "jobs.running",
            "jobs.running.0m-15m",
            "jobs.running.15m-2h",
            "jobs.running.2h-8h",
            "jobs.running.8h-plus",
        ]
    );
    assert_eq!(Bucket::Long.to_string(), "2h-8h");
}

#[test]
fn extreme_nows_saturate_instead_of_overflowing() {
    for now in [i64::MIN, i64::MIN + 5, i64::MIN + FIFTEEN_MINUTES_MS] {
        for bucket in Bucket::ALL {
            let window = bucket.window(now);
            assert!(window.is_none_or(|w| w.is_ordered()), "{bucket} at {now}: {window:?}");
        }
        assert_eq!(
            Bucket::VeryLong.window(now),
            Some(TimeWindow::new(None, Some(i64::MIN)))
        );
    }
    assert_eq!(
        Bucket::Recent.window(i64::MIN + 5),
        Some(TimeWindow::new(Some(i64::MIN), None))
    );
    assert_eq!(
        Bucket::Short.window(i64::MAX),
        Some(TimeWindow::new(
            Some(i64::MAX - TWO_HOURS_MS),
            Some(i64::MAX - FIFTEEN_MINUTES_MS)
        ))
    );
}
