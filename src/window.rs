//! 拥塞窗口驱动器 - 按传输层方式驱动拥塞控制器
//! Congestion Window Driver - Drives a congestion controller the way a transport does
//!
//! 职责：
//! - 持有发送端的窗口、阈值与拥塞状态
//! - 在慢启动与拥塞避免之间分派窗口增长
//! - 在修改窗口之前通知控制器拥塞事件
//! - 为派生连接复制窗口与控制器

use crate::config::{Config, TransportConfig};
use crate::congestion::{CongestionController, CongestionState, ControllerStats, build_controller};
use crate::error::Result;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};


/// 发送端的拥塞相关状态
/// Congestion-related state of the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketState {
    /// 拥塞窗口（字节）
    /// Congestion window in bytes
    pub congestion_window: u32,

    /// 慢启动阈值（字节）
    /// Slow start threshold in bytes
    pub slow_start_threshold: u32,

    /// 段大小（字节）
    /// Segment size in bytes
    pub segment_size: u32,

    /// 在途字节数
    /// Bytes sent but not yet acknowledged
    pub bytes_in_flight: u32,

    /// 拥塞状态
    /// Congestion state
    pub congestion_state: CongestionState,
}

impl SocketState {
    /// 根据传输配置创建初始状态
    /// Create the initial state from the transport configuration
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            congestion_window: config.initial_cwnd(),
            slow_start_threshold: config.initial_ssthresh,
            segment_size: config.segment_size,
            bytes_in_flight: 0,
            congestion_state: CongestionState::Open,
        }
    }

    pub fn in_slow_start(&self) -> bool {
        self.congestion_window < self.slow_start_threshold
    }
}

/// 窗口决策结果
/// Window decision result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDecision {
    /// 新的拥塞窗口大小
    /// New congestion window size
    pub new_congestion_window: u32,

    /// 新的慢启动阈值
    /// New slow start threshold
    pub new_slow_start_threshold: u32,

    /// 新的拥塞状态
    /// New congestion state
    pub congestion_state: CongestionState,

    /// 是否发生了显著变化
    /// Whether significant change occurred
    pub significant_change: bool,
}

/// 拥塞窗口驱动器
/// Congestion window driver
#[derive(Debug)]
pub struct CongestionWindow {
    state: SocketState,
    controller: Box<dyn CongestionController>,
}

impl CongestionWindow {
    /// 使用配置中选定的算法创建驱动器
    /// Create a driver running the algorithm selected in `config`
    pub fn new(config: &Config, now: Instant) -> Result<Self> {
        config.validate()?;
        let controller = build_controller(&config.congestion_control, now)?;
        Ok(Self {
            state: SocketState::new(&config.transport),
            controller,
        })
    }

    /// 使用给定的控制器创建驱动器
    /// Create a driver around an existing controller
    pub fn with_controller(
        transport: &TransportConfig,
        controller: Box<dyn CongestionController>,
    ) -> Result<Self> {
        transport.validate()?;
        Ok(Self {
            state: SocketState::new(transport),
            controller,
        })
    }

    pub fn congestion_window(&self) -> u32 {
        self.state.congestion_window
    }

    pub fn slow_start_threshold(&self) -> u32 {
        self.state.slow_start_threshold
    }

    pub fn congestion_state(&self) -> CongestionState {
        self.state.congestion_state
    }

    pub fn socket_state(&self) -> &SocketState {
        &self.state
    }

    pub fn controller(&self) -> &dyn CongestionController {
        self.controller.as_ref()
    }

    pub fn statistics(&self) -> ControllerStats {
        self.controller.statistics()
    }

    /// 更新在途字节数
    /// Update bytes in flight
    pub fn set_bytes_in_flight(&mut self, bytes: u32) {
        self.state.bytes_in_flight = bytes;
    }

    /// 更新拥塞状态
    /// Update the congestion state
    pub fn set_congestion_state(&mut self, state: CongestionState) {
        if self.state.congestion_state != state {
            trace!(from = ?self.state.congestion_state, to = ?state, "Congestion state changed");
        }
        self.state.congestion_state = state;
    }

    /// 处理ACK
    /// Handle an ACK
    ///
    /// `rtt` is `None` when the ACK carries no valid sample, e.g. it covers a
    /// retransmitted segment. The window only grows in the open and loss states.
    pub fn on_ack(
        &mut self,
        now: Instant,
        segments_acked: u32,
        rtt: Option<Duration>,
    ) -> WindowDecision {
        let old = self.state.clone();

        if let Some(rtt) = rtt {
            self.controller.on_ack_sample(
                now,
                self.state.congestion_state,
                segments_acked,
                self.state.segment_size,
                rtt,
            );
        }

        if matches!(
            self.state.congestion_state,
            CongestionState::Open | CongestionState::Loss
        ) {
            self.increase_window(segments_acked);
        }

        self.decision(&old)
    }

    /// 处理拥塞信号（如三次重复ACK）
    /// Handle a congestion signal such as a triple duplicate ACK
    pub fn on_congestion(&mut self, now: Instant) -> WindowDecision {
        let old = self.state.clone();

        // The controller has to see the closing epoch before the window is cut.
        let ssthresh = self.controller.on_congestion_event(
            now,
            self.state.congestion_window,
            self.state.segment_size,
            self.state.bytes_in_flight,
        );
        self.state.slow_start_threshold = ssthresh;
        self.state.congestion_window = ssthresh;
        self.state.congestion_state = CongestionState::Recovery;

        debug!(
            new_cwnd = self.state.congestion_window,
            new_ssthresh = ssthresh,
            "Entered recovery after congestion signal"
        );

        self.decision(&old)
    }

    /// 处理重传超时
    /// Handle a retransmission timeout
    pub fn on_retransmission_timeout(&mut self, now: Instant) -> WindowDecision {
        let old = self.state.clone();

        let ssthresh = self.controller.on_congestion_event(
            now,
            self.state.congestion_window,
            self.state.segment_size,
            self.state.bytes_in_flight,
        );
        self.state.slow_start_threshold = ssthresh;
        self.state.congestion_window = self.state.segment_size;
        self.state.congestion_state = CongestionState::Loss;

        warn!(
            new_cwnd = self.state.congestion_window,
            new_ssthresh = ssthresh,
            "Retransmission timeout, window collapsed to one segment"
        );

        self.decision(&old)
    }

    /// 恢复完成，回到Open状态
    /// Recovery finished, back to the open state
    pub fn on_recovery_complete(&mut self) -> WindowDecision {
        let old = self.state.clone();

        if self.state.congestion_state == CongestionState::Recovery {
            self.state.congestion_window = self.state.slow_start_threshold;
        }
        self.state.congestion_state = CongestionState::Open;

        self.decision(&old)
    }

    /// 为派生连接复制窗口与控制器
    /// Duplicate the window and the controller for a forked connection
    pub fn fork(&self) -> Self {
        Self {
            state: self.state.clone(),
            controller: self.controller.fork(),
        }
    }

    /// Slow start below the threshold, then the controller's congestion
    /// avoidance for whatever the slow start did not consume.
    fn increase_window(&mut self, segments_acked: u32) {
        let mut remaining = segments_acked;

        if self.state.in_slow_start() && remaining > 0 {
            self.state.congestion_window = self
                .state
                .congestion_window
                .saturating_add(self.state.segment_size);
            remaining -= 1;
            trace!(
                cwnd = self.state.congestion_window,
                ssthresh = self.state.slow_start_threshold,
                "Slow start: congestion window increased"
            );
        }

        if !self.state.in_slow_start() {
            self.state.congestion_window = self.controller.grow_window(
                self.state.congestion_window,
                self.state.segment_size,
                remaining,
            );
        }
    }

    fn decision(&self, old: &SocketState) -> WindowDecision {
        let significant_change = old.congestion_window != self.state.congestion_window
            || old.slow_start_threshold != self.state.slow_start_threshold
            || old.congestion_state != self.state.congestion_state;

        WindowDecision {
            new_congestion_window: self.state.congestion_window,
            new_slow_start_threshold: self.state.slow_start_threshold,
            congestion_state: self.state.congestion_state,
            significant_change,
        }
    }
}
