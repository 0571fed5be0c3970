//! Global rate window behavior across many resources.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use pairlink::{Engine, EngineConfig, StartError};

mod common;
use common::{connecting, Event, RecordingObserver, ScriptedClient};

#[tokio::test(start_paused = true)]
async fn test_registration_beyond_window_limit_rejected() {
    let client = Arc::new(ScriptedClient::new(vec![connecting()]));
    let engine = Engine::new(EngineConfig::default(), client.clone());
    let observer = RecordingObserver::new();

    // Default window: 10 per 1000 ms. Registration reserves the first tick.
    let mut started = 0;
    let mut rejected = 0;
    for i in 0..15 {
        match engine.start_polling(format!("r{}", i), format!("wa-{}", i), observer.clone()) {
            Ok(()) => started += 1,
            Err(StartError::RateLimited) => rejected += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(started, 10);
    assert_eq!(rejected, 5);
    assert_eq!(engine.stats().active_pollers, 10);

    // No window anywhere holds more than 10 outbound calls
    let t0 = Instant::now();
    tokio::time::sleep(Duration::from_millis(12_000)).await;
    let times: Vec<u64> = client
        .call_times()
        .iter()
        .map(|at| at.duration_since(t0).as_millis() as u64)
        .collect();
    for (i, start) in times.iter().enumerate() {
        let in_window = times[i..].iter().filter(|t| **t - start < 1_000).count();
        assert!(
            in_window <= 10,
            "window starting at {}ms holds {} calls",
            start,
            in_window
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_window_defers_ticks_instead_of_dropping() {
    let mut config = EngineConfig::default();
    config.polling.initial_interval_ms = 1_000;
    config.rate_limit.limit = 2;
    config.rate_limit.window_ms = 10_000;
    config.rate_limit.defer_retry_ms = 250;

    let client = Arc::new(ScriptedClient::new(vec![connecting()]));
    let engine = Engine::new(config, client.clone());
    let observer = RecordingObserver::new();
    let t0 = Instant::now();

    // Registration takes permit 1 of the 10s window; the first tick at
    // 1000ms takes permit 2; the second tick must defer in 250ms steps
    // until the window rolls over.
    engine.start_polling("r1", "wa-main", observer.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(11_000)).await;

    let times: Vec<u64> = client
        .call_times()
        .iter()
        .map(|at| at.duration_since(t0).as_millis() as u64)
        .collect();
    assert_eq!(times, vec![1_000, 10_250]);

    // Deferral is not a failure: the observer never hears about it
    let errors = observer
        .events_for("r1")
        .iter()
        .filter(|e| matches!(e, Event::Error { .. }))
        .count();
    assert_eq!(errors, 0);
    assert!(engine.is_active("r1"));
}
