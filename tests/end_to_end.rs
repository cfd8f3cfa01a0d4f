use std::time::{Duration, Instant};

use tracemon_core::{
    CancelToken, ChartConfig, ChartModel, PollerShared, Resolution, ScriptedSource, spawn_poller,
};

const FRAME: f64 = 1.0 / 60.0;

fn wait_for(mut done: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn constant_counter_settles_on_its_value() {
    let cancel = CancelToken::new();
    let shared = PollerShared::new(cancel.clone());
    spawn_poller(
        ScriptedSource::constant(50, 5),
        Duration::from_millis(200),
        shared.clone(),
    )
    .unwrap();

    assert!(wait_for(
        || shared.latest.latest().is_some(),
        Duration::from_secs(2)
    ));

    let mut chart = ChartModel::new(Resolution::new(100, 400), &ChartConfig::default()).unwrap();
    for _ in 0..120 {
        chart.advance(shared.latest.latest(), FRAME);
    }

    assert_eq!(chart.displayed().round() as i64, 50);
    let ring: Vec<i64> = chart.ring().iter().collect();
    assert_eq!(ring.len(), 100);
    assert!(ring[90..].iter().all(|&v| v == 50), "{:?}", &ring[90..]);

    cancel.cancel();
}

#[test]
fn exhausted_source_keeps_last_value_on_screen() {
    let cancel = CancelToken::new();
    let shared = PollerShared::new(cancel.clone());
    spawn_poller(
        ScriptedSource::new("script", [Some(30), None, None]),
        Duration::from_millis(100),
        shared.clone(),
    )
    .unwrap();

    assert!(wait_for(
        || shared.stats.failures.load(std::sync::atomic::Ordering::Relaxed) >= 3,
        Duration::from_secs(3)
    ));
    assert_eq!(shared.latest.latest(), Some(30));

    let mut chart = ChartModel::new(Resolution::new(20, 100), &ChartConfig::default()).unwrap();
    for _ in 0..240 {
        chart.advance(shared.latest.latest(), FRAME);
    }
    assert_eq!(chart.ring().newest(), Some(30));

    cancel.cancel();
}

#[test]
fn resize_mid_stream_keeps_scrolling() {
    let mut chart = ChartModel::new(Resolution::new(10, 100), &ChartConfig::default()).unwrap();
    for _ in 0..60 {
        chart.advance(Some(40), FRAME);
    }
    chart.resize(Resolution::new(4, 100)).unwrap();
    assert_eq!(chart.ring().width(), 4);

    for _ in 0..3 {
        chart.advance(Some(40), FRAME);
        assert_eq!(chart.ring().width(), 4);
    }
    assert_eq!(chart.segments().len(), 3 * 2);

    chart.resize(Resolution::new(12, 100)).unwrap();
    chart.advance(Some(40), FRAME);
    assert_eq!(chart.ring().width(), 12);
}
