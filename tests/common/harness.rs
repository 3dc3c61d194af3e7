//! tests/common/harness.rs
use kestrel_shtcp::config::{Config, TransportConfig};
use kestrel_shtcp::window::{CongestionWindow, WindowDecision};
use std::sync::Once;
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::fmt::format::FmtSpan;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "kestrel_shtcp=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::FULL)
            .with_test_writer()
            .init();
    });
}

pub const SEGMENT_SIZE: u32 = 1000;

/// A config with 1000-byte segments and a ten-segment initial window.
pub fn test_config() -> Config {
    Config {
        transport: TransportConfig {
            segment_size: SEGMENT_SIZE,
            initial_cwnd_segments: 10,
            initial_ssthresh: u32::MAX,
        },
        ..Default::default()
    }
}

/// A single bottleneck link driven on tokio's paused clock.
///
/// Every round trip the whole window is sent. If it exceeds `capacity` bytes the
/// link signals congestion once; otherwise every segment is acknowledged.
pub struct Bottleneck {
    pub capacity: u32,
    pub rtt: Duration,
    pub congestion_events: Vec<WindowDecision>,
}

impl Bottleneck {
    pub fn new(capacity: u32, rtt: Duration) -> Self {
        Self {
            capacity,
            rtt,
            congestion_events: Vec::new(),
        }
    }

    /// Runs one round trip and calls `inspect` after every event.
    pub async fn round(&mut self, window: &mut CongestionWindow, mut inspect: impl FnMut(&CongestionWindow)) {
        tokio::time::advance(self.rtt).await;
        let now = Instant::now();
        let cwnd = window.congestion_window();
        window.set_bytes_in_flight(cwnd);

        if cwnd > self.capacity {
            let decision = window.on_congestion(now);
            inspect(window);
            window.on_recovery_complete();
            self.congestion_events.push(decision);
        } else {
            for _ in 0..(cwnd / SEGMENT_SIZE).max(1) {
                window.on_ack(now, 1, Some(self.rtt));
                inspect(window);
            }
        }
        window.set_bytes_in_flight(0);
    }
}
