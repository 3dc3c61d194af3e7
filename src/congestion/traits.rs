//! 拥塞控制器抽象接口
//! Congestion Controller Abstract Interfaces
//!
//! 职责：
//! - 定义通用的拥塞控制器trait
//! - 定义控制器所读取的连接拥塞状态
//! - 提供统一的统计信息快照

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// 连接的拥塞状态
/// Congestion state of the owning connection
///
/// Only [`CongestionState::Open`] changes controller behaviour: bytes acked in
/// any other state do not count towards the epoch's throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CongestionState {
    /// 正常状态（慢启动或拥塞避免）
    /// Normal operation, slow start or congestion avoidance
    #[default]
    Open,
    /// 收到重复ACK或SACK，尚未进入恢复
    /// Duplicate ACKs or SACKs seen, not yet recovering
    Disorder,
    /// 因ECN等信号而降低窗口
    /// Window reduction after an ECN-style signal
    Cwr,
    /// 快速恢复阶段
    /// Fast recovery
    Recovery,
    /// 超时后的丢包恢复
    /// Loss recovery after a retransmission timeout
    Loss,
}

/// 拥塞控制器核心trait
/// Core congestion controller trait
///
/// A controller never owns the window. The transport passes the current
/// window, segment size and flight size in, and stores what comes back.
pub trait CongestionController: fmt::Debug + Send + Sync {
    /// 拥塞避免阶段的窗口增长
    /// Window growth during congestion avoidance
    ///
    /// Returns the new window in bytes. The result is never smaller than
    /// `congestion_window`, and strictly larger whenever `segments_acked > 0`.
    fn grow_window(&self, congestion_window: u32, segment_size: u32, segments_acked: u32) -> u32;

    /// 处理拥塞事件并返回新的慢启动阈值
    /// Handle a congestion event and return the new slow start threshold
    ///
    /// Must be called before the transport changes its own window or
    /// threshold for this event.
    fn on_congestion_event(
        &mut self,
        now: Instant,
        congestion_window: u32,
        segment_size: u32,
        bytes_in_flight: u32,
    ) -> u32;

    /// 处理一个带RTT样本的ACK
    /// Handle an ACK carrying an RTT sample
    fn on_ack_sample(
        &mut self,
        now: Instant,
        state: CongestionState,
        segments_acked: u32,
        segment_size: u32,
        rtt: Duration,
    );

    /// 为派生连接复制控制器
    /// Duplicate the controller for a forked connection
    fn fork(&self) -> Box<dyn CongestionController>;

    /// 重置控制器状态
    /// Reset controller state
    fn reset(&mut self, now: Instant);

    /// 获取统计信息
    /// Get statistics
    fn statistics(&self) -> ControllerStats;

    /// 获取算法名称
    /// Get algorithm name
    fn algorithm_name(&self) -> &'static str;
}

/// 拥塞控制统计信息
/// Congestion control statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerStats {
    pub algorithm: &'static str,
    pub alpha: f64,
    pub beta: f64,
    pub delta: Duration,
    pub min_rtt: Option<Duration>,
    pub max_rtt: Option<Duration>,
    /// Bytes per second over the current epoch.
    pub throughput: f64,
    /// Bytes per second over the previous epoch.
    pub last_throughput: f64,
    pub data_sent: u64,
}

impl fmt::Display for ControllerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |rtt: Option<Duration>| match rtt {
            Some(d) => format!("{:.1}ms", d.as_secs_f64() * 1000.0),
            None => "-".to_string(),
        };
        write!(
            f,
            "{}[alpha:{:.3}, beta:{:.3}, delta:{:.3}s, min_rtt:{}, max_rtt:{}, tput:{:.0}B/s, last_tput:{:.0}B/s, sent:{}]",
            self.algorithm,
            self.alpha,
            self.beta,
            self.delta.as_secs_f64(),
            ms(self.min_rtt),
            ms(self.max_rtt),
            self.throughput,
            self.last_throughput,
            self.data_sent
        )
    }
}
