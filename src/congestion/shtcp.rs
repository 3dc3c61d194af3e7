//! S-HTCP 拥塞控制器
//! S-HTCP congestion controller
//!
//! S-HTCP keeps H-TCP's AIMD structure but shapes both factors with
//! near-exponential decay functions:
//!
//! - `alpha`, the additive-increase aggressiveness, stays at its conservative
//!   value while the congestion-free interval `delta` is at most `delta_l`. Past
//!   that it grows with `delta` and is damped by the epoch's minimum RTT.
//! - `beta`, the backoff ratio, falls back to the configured default unless
//!   throughput only improved marginally over the previous epoch. In that case
//!   it is scaled by the RTT range and decays with `delta`.
//!
//! An epoch is the interval between two congestion events. RTT extremes and
//! delivered bytes are accumulated per epoch and reset at every event.
//!
//! 职责：
//! - 每个ACK更新吞吐量、RTT范围与alpha
//! - 每次拥塞事件更新beta与alpha并计算慢启动阈值
//! - 在拥塞避免阶段计算窗口增量

use super::traits::{CongestionController, CongestionState, ControllerStats};
use crate::config::CongestionControlConfig;
use crate::error::Result;
use std::f64::consts::E;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};


/// Registered name of the algorithm.
pub const ALGORITHM_NAME: &str = "TcpShtcp";

/// Elapsed times shorter than this carry no throughput information.
const MIN_SAMPLE_INTERVAL: Duration = Duration::from_micros(1);

/// No window increment can exceed the window's own range.
const MAX_ALPHA: f64 = u32::MAX as f64;

/// S-HTCP拥塞控制器
/// S-HTCP congestion controller
#[derive(Debug, Clone)]
pub struct Shtcp {
    /// 加性增因子，始终不小于1
    /// Additive-increase factor, never below 1 once updated
    alpha: f64,

    /// 乘性减因子
    /// Multiplicative-decrease factor
    beta: f64,

    /// 距上次拥塞事件的时间
    /// Time since the last congestion event, as of the latest update
    delta: Duration,

    /// 最近一次拥塞事件的时间
    /// Time of the most recent congestion event
    last_congestion: Instant,

    /// 当前周期的最小RTT
    /// Smallest RTT of the current epoch
    min_rtt: Option<Duration>,

    /// 当前周期的最大RTT
    /// Largest RTT of the current epoch
    max_rtt: Option<Duration>,

    /// 当前周期的吞吐量（字节/秒）
    /// Throughput of the current epoch, bytes per second
    throughput: f64,

    /// 上一周期的吞吐量（字节/秒）
    /// Throughput of the previous epoch, bytes per second
    last_throughput: f64,

    /// 当前周期在Open状态下被确认的字节数
    /// Bytes acknowledged in the open state during the current epoch
    data_sent: u64,

    config: CongestionControlConfig,
}

impl Shtcp {
    /// 创建新的S-HTCP控制器，以 `now` 作为连接起点
    /// Create a new S-HTCP controller whose clock starts at `now`
    pub fn new(config: CongestionControlConfig, now: Instant) -> Result<Self> {
        config.validate()?;
        Ok(Self::initial(config, now))
    }

    fn initial(config: CongestionControlConfig, now: Instant) -> Self {
        Self {
            alpha: 0.0,
            beta: 0.0,
            delta: Duration::ZERO,
            last_congestion: now,
            min_rtt: None,
            max_rtt: None,
            throughput: 0.0,
            last_throughput: 0.0,
            data_sent: 0,
            config,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn last_congestion_time(&self) -> Instant {
        self.last_congestion
    }

    pub fn min_rtt(&self) -> Option<Duration> {
        self.min_rtt
    }

    pub fn max_rtt(&self) -> Option<Duration> {
        self.max_rtt
    }

    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    pub fn last_throughput(&self) -> f64 {
        self.last_throughput
    }

    pub fn data_sent(&self) -> u64 {
        self.data_sent
    }

    pub fn config(&self) -> &CongestionControlConfig {
        &self.config
    }

    /// Time since the last congestion event. A clock that runs backwards
    /// yields zero.
    fn elapsed_since_congestion(&self, now: Instant) -> Duration {
        match now.checked_duration_since(self.last_congestion) {
            Some(elapsed) => elapsed,
            None => {
                warn!(
                    behind_us = self.last_congestion.duration_since(now).as_micros(),
                    "Clock went backwards past the last congestion event, treating elapsed time as zero"
                );
                Duration::ZERO
            }
        }
    }

    /// 更新alpha
    /// Update alpha from the current `delta`, `beta` and minimum RTT
    fn update_alpha(&mut self) {
        let delta_l = self.config.delta_l;
        let raw = if self.delta <= delta_l {
            1.0
        } else if let Some(min_rtt) = self.min_rtt {
            let d = (self.delta - delta_l).as_secs_f64();
            let exponent = (14.0 * self.delta.as_secs_f64() - 5.0 * min_rtt.as_secs_f64()) / 350.0;
            E.powf(exponent) * (1.0 + 10.0 * d + 0.25 * d * d)
        } else {
            // No RTT sample yet this epoch; the clamp below settles on 1.
            0.0
        };

        let alpha = 2.0 * (1.0 - self.beta) * raw;
        self.alpha = if alpha.is_nan() {
            1.0
        } else {
            alpha.clamp(1.0, MAX_ALPHA)
        };

        trace!(
            alpha = self.alpha,
            delta_ms = self.delta.as_millis(),
            "Alpha updated"
        );
    }

    /// 更新beta
    /// Update beta from the throughput change between the last two epochs
    fn update_beta(&mut self) {
        self.beta = self.config.default_backoff;

        if self.throughput > self.last_throughput && self.last_throughput > 0.0 {
            let improvement = (self.throughput - self.last_throughput) / self.last_throughput;
            if improvement <= self.config.throughput_ratio {
                let decay = E.powf(-self.delta.as_secs_f64() / 25.0);
                self.beta = (decay * self.rtt_ratio()).clamp(0.0, 1.0);
            }
        }

        debug!(
            beta = self.beta,
            throughput = self.throughput,
            last_throughput = self.last_throughput,
            "Beta updated"
        );
    }

    /// `min_rtt / max_rtt`, or 1 while the epoch has no usable samples.
    fn rtt_ratio(&self) -> f64 {
        match (self.min_rtt, self.max_rtt) {
            (Some(min), Some(max)) if !max.is_zero() => min.as_secs_f64() / max.as_secs_f64(),
            _ => 1.0,
        }
    }

    fn record_rtt(&mut self, rtt: Duration) {
        if self.min_rtt.is_none_or(|min| rtt < min) {
            self.min_rtt = Some(rtt);
            trace!(min_rtt_us = rtt.as_micros(), "Updated min RTT");
        }
        if self.max_rtt.is_none_or(|max| rtt > max) {
            self.max_rtt = Some(rtt);
            trace!(max_rtt_us = rtt.as_micros(), "Updated max RTT");
        }
    }

    /// Closes the current epoch and opens the next one.
    fn start_epoch(&mut self) {
        self.min_rtt = None;
        self.max_rtt = None;
        self.last_throughput = self.throughput;
        self.throughput = 0.0;
        self.data_sent = 0;
    }
}

impl CongestionController for Shtcp {
    fn grow_window(&self, congestion_window: u32, segment_size: u32, segments_acked: u32) -> u32 {
        if segments_acked == 0 {
            return congestion_window;
        }

        let adder = if congestion_window == 0 {
            1.0
        } else {
            let cwnd = f64::from(congestion_window);
            let segment = f64::from(segment_size);
            ((segment * segment + cwnd * self.alpha) / cwnd + self.alpha).max(1.0)
        };

        let new_window = congestion_window.saturating_add(adder as u32);
        trace!(
            cwnd = new_window,
            adder = adder,
            alpha = self.alpha,
            "Congestion avoidance: window grown"
        );
        new_window
    }

    fn on_congestion_event(
        &mut self,
        now: Instant,
        congestion_window: u32,
        segment_size: u32,
        bytes_in_flight: u32,
    ) -> u32 {
        self.delta = self.elapsed_since_congestion(now);
        self.last_congestion = self.last_congestion.max(now);

        // Beta reads the closing epoch's throughput; alpha reads the new beta.
        self.update_beta();
        self.update_alpha();

        let segment_window = segment_size.saturating_mul(2);
        let backed_off = (f64::from(bytes_in_flight) * self.beta).floor() as u32;
        let ssthresh = segment_window.max(backed_off);

        debug!(
            cwnd = congestion_window,
            bytes_in_flight = bytes_in_flight,
            ssthresh = ssthresh,
            alpha = self.alpha,
            beta = self.beta,
            delta_ms = self.delta.as_millis(),
            "Congestion event: new slow start threshold"
        );

        self.start_epoch();
        ssthresh
    }

    /// With no time elapsed since the last congestion event the throughput is
    /// carried forward; alpha is still refreshed, taking the short-interval branch.
    fn on_ack_sample(
        &mut self,
        now: Instant,
        state: CongestionState,
        segments_acked: u32,
        segment_size: u32,
        rtt: Duration,
    ) {
        if state == CongestionState::Open {
            let acked = u64::from(segments_acked) * u64::from(segment_size);
            self.data_sent = self.data_sent.saturating_add(acked);
        }

        let elapsed = self.elapsed_since_congestion(now);
        if elapsed >= MIN_SAMPLE_INTERVAL {
            self.throughput = self.data_sent as f64 / elapsed.as_secs_f64();
        } else {
            trace!("No time elapsed since congestion event, keeping previous throughput");
        }

        self.delta = elapsed;
        self.update_alpha();
        self.record_rtt(rtt);
    }

    fn fork(&self) -> Box<dyn CongestionController> {
        Box::new(self.clone())
    }

    fn reset(&mut self, now: Instant) {
        *self = Self::initial(self.config.clone(), now);
        debug!("S-HTCP controller reset to initial state");
    }

    fn statistics(&self) -> ControllerStats {
        ControllerStats {
            algorithm: ALGORITHM_NAME,
            alpha: self.alpha,
            beta: self.beta,
            delta: self.delta,
            min_rtt: self.min_rtt,
            max_rtt: self.max_rtt,
            throughput: self.throughput,
            last_throughput: self.last_throughput,
            data_sent: self.data_sent,
        }
    }

    fn algorithm_name(&self) -> &'static str {
        ALGORITHM_NAME
    }
}
