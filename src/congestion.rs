//! Defines the pluggable congestion control interface and its implementations.
//! 定义了可插拔的拥塞控制接口及其实现。

use crate::config::{CongestionAlgorithm, CongestionControlConfig};
use crate::error::Result;
use tokio::time::Instant;

pub mod new_reno;
pub mod shtcp;
pub mod traits;


pub use new_reno::NewReno;
pub use shtcp::Shtcp;
pub use traits::{CongestionController, CongestionState, ControllerStats};

/// Builds the controller selected by `config`, anchored at `now`.
///
/// 根据配置构建拥塞控制器，以 `now` 作为时间起点。
pub fn build_controller(
    config: &CongestionControlConfig,
    now: Instant,
) -> Result<Box<dyn CongestionController>> {
    let controller: Box<dyn CongestionController> = match config.algorithm {
        CongestionAlgorithm::Shtcp => Box::new(Shtcp::new(config.clone(), now)?),
        CongestionAlgorithm::NewReno => Box::new(NewReno::new()),
    };
    Ok(controller)
}
