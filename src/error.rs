//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.
//!
//! Congestion control itself never fails at run time; numeric corner cases are
//! corrected in place. The only errors are rejected configurations.

use thiserror::Error;

/// The primary error type for the congestion control library.
/// 拥塞控制库的主要错误类型。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The default backoff factor must lie in `[0, 1]`.
    /// 默认退避因子必须位于 `[0, 1]` 区间。
    #[error("default backoff {0} is outside [0, 1]")]
    InvalidBackoff(f64),

    /// The throughput ratio threshold must be a finite, non-negative number.
    /// 吞吐量比例阈值必须是有限的非负数。
    #[error("throughput ratio {0} must be finite and non-negative")]
    InvalidThroughputRatio(f64),

    /// The segment size must be non-zero.
    /// 段大小必须非零。
    #[error("segment size must be greater than zero")]
    InvalidSegmentSize,

    /// The initial congestion window must hold at least one segment.
    /// 初始拥塞窗口必须至少容纳一个段。
    #[error("initial congestion window must be at least one segment")]
    InvalidInitialWindow,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
