//! A baseline additive-increase, halving-on-congestion controller.
//!
//! 基线的加性增、拥塞时减半的拥塞控制器。

use super::traits::{CongestionController, CongestionState, ControllerStats};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Registered name of the algorithm.
pub const ALGORITHM_NAME: &str = "TcpNewReno";

/// NewReno keeps no adaptation state: the window grows by roughly one segment
/// per round trip and the threshold is half the flight size.
#[derive(Debug, Clone, Default)]
pub struct NewReno;

impl NewReno {
    pub fn new() -> Self {
        Self
    }
}

impl CongestionController for NewReno {
    fn grow_window(&self, congestion_window: u32, segment_size: u32, segments_acked: u32) -> u32 {
        if segments_acked == 0 {
            return congestion_window;
        }

        let adder = if congestion_window == 0 {
            1.0
        } else {
            let segment = f64::from(segment_size);
            (segment * segment / f64::from(congestion_window)).max(1.0)
        };

        let new_window = congestion_window.saturating_add(adder as u32);
        trace!(cwnd = new_window, "Congestion avoidance: window grown");
        new_window
    }

    fn on_congestion_event(
        &mut self,
        _now: Instant,
        congestion_window: u32,
        segment_size: u32,
        bytes_in_flight: u32,
    ) -> u32 {
        let ssthresh = segment_size.saturating_mul(2).max(bytes_in_flight / 2);
        debug!(
            cwnd = congestion_window,
            bytes_in_flight = bytes_in_flight,
            ssthresh = ssthresh,
            "Congestion event: new slow start threshold"
        );
        ssthresh
    }

    fn on_ack_sample(
        &mut self,
        _now: Instant,
        _state: CongestionState,
        _segments_acked: u32,
        _segment_size: u32,
        _rtt: Duration,
    ) {
    }

    fn fork(&self) -> Box<dyn CongestionController> {
        Box::new(self.clone())
    }

    fn reset(&mut self, _now: Instant) {}

    /// Alpha and beta are NewReno's fixed equivalents, not measured state.
    fn statistics(&self) -> ControllerStats {
        ControllerStats {
            algorithm: ALGORITHM_NAME,
            alpha: 1.0,
            beta: 0.5,
            delta: Duration::ZERO,
            min_rtt: None,
            max_rtt: None,
            throughput: 0.0,
            last_throughput: 0.0,
            data_sent: 0,
        }
    }

    fn algorithm_name(&self) -> &'static str {
        ALGORITHM_NAME
    }
}
