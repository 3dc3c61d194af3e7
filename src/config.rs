//! 定义了拥塞控制和传输层的可配置参数。
//! Defines configurable parameters for congestion control and the transport.

use crate::error::{Error, Result};
use std::time::Duration;

/// A structure containing all configurable parameters for a connection.
///
/// 包含所有连接可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Congestion control-related parameters.
    /// 拥塞控制相关参数。
    pub congestion_control: CongestionControlConfig,

    /// Parameters describing the sender that owns the controller.
    /// 描述拥有控制器的发送端的参数。
    pub transport: TransportConfig,
}

/// The congestion control algorithm a connection runs.
///
/// 连接所使用的拥塞控制算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CongestionAlgorithm {
    /// RTT- and delta-aware AIMD.
    /// 感知 RTT 与拥塞间隔的 AIMD。
    #[default]
    Shtcp,
    /// Plain additive increase, halving on congestion.
    /// 普通的加性增、拥塞时减半。
    NewReno,
}

/// Congestion control-related parameters.
///
/// These are fixed for the lifetime of a connection.
///
/// 拥塞控制相关参数，在连接生命周期内保持不变。
#[derive(Debug, Clone)]
pub struct CongestionControlConfig {
    /// Which controller to build for new connections.
    /// 为新连接构建的控制器类型。
    pub algorithm: CongestionAlgorithm,
    /// The default multiplicative-decrease factor. Must lie in `[0, 1]`.
    /// 默认的乘性减因子，必须位于 `[0, 1]`。
    pub default_backoff: f64,
    /// Relative throughput improvement below which the backoff is refined
    /// using the RTT range of the closing epoch.
    ///
    /// 相对吞吐量提升的阈值，低于该值时使用上一周期的 RTT 范围细化退避因子。
    pub throughput_ratio: f64,
    /// Congestion-free intervals up to this length keep the additive increase
    /// at its conservative value.
    ///
    /// 不超过该长度的无拥塞间隔保持保守的加性增长。
    pub delta_l: Duration,
}

/// Parameters of the sender that drives the controller.
///
/// 驱动控制器的发送端参数。
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// The segment size in bytes.
    /// 段大小（字节）。
    pub segment_size: u32,
    /// The initial congestion window in segments.
    /// 初始拥塞窗口（以段为单位）。
    pub initial_cwnd_segments: u32,
    /// The initial slow start threshold in bytes.
    /// 初始慢启动阈值（字节）。
    pub initial_ssthresh: u32,
}

impl Config {
    /// Checks every section of the configuration.
    /// 校验配置的每个部分。
    pub fn validate(&self) -> Result<()> {
        self.congestion_control.validate()?;
        self.transport.validate()
    }
}

impl CongestionControlConfig {
    /// Rejects parameters the controller cannot work with.
    /// 拒绝控制器无法使用的参数。
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_backoff) {
            return Err(Error::InvalidBackoff(self.default_backoff));
        }
        if !self.throughput_ratio.is_finite() || self.throughput_ratio < 0.0 {
            return Err(Error::InvalidThroughputRatio(self.throughput_ratio));
        }
        Ok(())
    }
}

impl TransportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.segment_size == 0 {
            return Err(Error::InvalidSegmentSize);
        }
        if self.initial_cwnd_segments == 0 {
            return Err(Error::InvalidInitialWindow);
        }
        Ok(())
    }

    /// The initial congestion window in bytes.
    /// 初始拥塞窗口（字节）。
    pub fn initial_cwnd(&self) -> u32 {
        self.segment_size.saturating_mul(self.initial_cwnd_segments)
    }
}

impl Default for CongestionControlConfig {
    fn default() -> Self {
        Self {
            algorithm: CongestionAlgorithm::Shtcp,
            default_backoff: 0.5,
            throughput_ratio: 0.2,
            delta_l: Duration::from_secs(1),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            segment_size: 1448,
            initial_cwnd_segments: 10,
            initial_ssthresh: u32::MAX,
        }
    }
}
