//! 国际象棋引擎服务端
//!
//! 包含:
//! - 服务端配置
//! - 请求校验与搜索调度
//! - HTTP 接口
//! - TCP 接口

pub mod config;
pub mod http;
pub mod service;
pub mod tcp;

pub use config::{ServerConfig, CONFIG_ENV};
pub use http::router;
pub use service::{EngineService, ServiceError};
