//! 瓶颈链路上的端到端拥塞控制测试
//! End-to-end congestion control over a simulated bottleneck link

pub mod common;

use common::harness::{Bottleneck, SEGMENT_SIZE, init_tracing, test_config};
use kestrel_shtcp::config::CongestionAlgorithm;
use kestrel_shtcp::congestion::CongestionState;
use kestrel_shtcp::window::CongestionWindow;
use std::time::Duration;
use tokio::time::Instant;

fn check_invariants(window: &CongestionWindow) {
    let stats = window.statistics();
    assert!(stats.alpha >= 1.0, "alpha dropped below 1: {stats}");
    assert!((0.0..=1.0).contains(&stats.beta), "beta out of range: {stats}");
    assert!(window.congestion_window() > 0);
}

#[tokio::test(start_paused = true)]
async fn test_shtcp_settles_around_capacity() {
    init_tracing();
    let mut window = CongestionWindow::new(&test_config(), Instant::now()).unwrap();
    let mut link = Bottleneck::new(100_000, Duration::from_millis(50));

    // Alpha is only meaningful after the first update.
    link.round(&mut window, |_| {}).await;
    for _ in 0..400 {
        link.round(&mut window, check_invariants).await;
    }

    tracing::info!(
        events = link.congestion_events.len(),
        final_cwnd = window.congestion_window(),
        "Bottleneck run finished: {}",
        window.statistics()
    );

    assert!(link.congestion_events.len() >= 2);
    for decision in &link.congestion_events {
        assert_eq!(decision.congestion_state, CongestionState::Recovery);
        assert!(decision.new_slow_start_threshold >= 2 * SEGMENT_SIZE);
        assert!(decision.new_slow_start_threshold <= 2 * link.capacity);
    }
    assert_eq!(window.congestion_state(), CongestionState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_new_reno_baseline_on_same_link() {
    init_tracing();
    let mut config = test_config();
    config.congestion_control.algorithm = CongestionAlgorithm::NewReno;
    let mut window = CongestionWindow::new(&config, Instant::now()).unwrap();
    let mut link = Bottleneck::new(100_000, Duration::from_millis(50));

    for _ in 0..400 {
        link.round(&mut window, |_| {}).await;
    }

    assert!(!link.congestion_events.is_empty());
    for decision in &link.congestion_events {
        assert!(decision.new_slow_start_threshold >= 2 * SEGMENT_SIZE);
        assert!(decision.new_slow_start_threshold <= 100_000);
    }
}

/// 长时间无拥塞后，拥塞避免阶段增长更快
#[tokio::test(start_paused = true)]
async fn test_long_congestion_free_interval_speeds_up_growth() {
    init_tracing();

    async fn increment_after(quiet: Duration) -> u32 {
        let rtt = Duration::from_millis(50);
        let mut window = CongestionWindow::new(&test_config(), Instant::now()).unwrap();
        window.set_bytes_in_flight(40_000);
        window.on_congestion(Instant::now());
        window.on_recovery_complete();
        window.set_bytes_in_flight(0);

        tokio::time::advance(quiet).await;
        // The first sample of an epoch only establishes the RTT range.
        window.on_ack(Instant::now(), 1, Some(rtt));
        let before = window.congestion_window();
        window.on_ack(Instant::now(), 1, Some(rtt));
        window.congestion_window() - before
    }

    let short = increment_after(Duration::from_millis(500)).await;
    let long = increment_after(Duration::from_secs(3)).await;

    tracing::info!(short, long, "Window increments after quiet periods");
    assert!(long > short);
}

#[tokio::test(start_paused = true)]
async fn test_forked_connection_evolves_independently() {
    init_tracing();
    let mut parent = CongestionWindow::new(&test_config(), Instant::now()).unwrap();
    let mut link = Bottleneck::new(60_000, Duration::from_millis(40));
    for _ in 0..20 {
        link.round(&mut parent, |_| {}).await;
    }

    let mut child = parent.fork();
    let parent_state = parent.socket_state().clone();
    let parent_stats = parent.statistics();

    let mut child_link = Bottleneck::new(30_000, Duration::from_millis(10));
    for _ in 0..50 {
        child_link.round(&mut child, |_| {}).await;
    }

    assert_eq!(parent.socket_state(), &parent_state);
    assert_eq!(parent.statistics(), parent_stats);
    assert!(!child_link.congestion_events.is_empty());
}
