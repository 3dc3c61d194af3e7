#![deny(clippy::expect_used, clippy::unwrap_used)]

//! S-HTCP congestion control for TCP-like transports.
//! 面向类TCP传输协议的 S-HTCP 拥塞控制。
//!
//! The crate exposes a pluggable [`congestion::CongestionController`] interface,
//! the delay- and RTT-aware [`congestion::shtcp::Shtcp`] controller, a baseline
//! [`congestion::new_reno::NewReno`] controller, and a [`window::CongestionWindow`]
//! driver that applies either of them to a sender's window the way a transport would.
//!
//! 本库提供可插拔的拥塞控制接口、S-HTCP 控制器、基线 NewReno 控制器，
//! 以及一个按传输层方式驱动窗口的 `CongestionWindow`。

pub mod config;
pub mod error;

pub mod congestion;
pub mod window;
