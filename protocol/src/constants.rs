//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 未指定时的默认搜索深度
pub const DEFAULT_DEPTH: u8 = 2;

/// 允许请求的最大搜索深度
pub const MAX_DEPTH: u8 = 4;

/// 消息帧最大大小
pub const MAX_FRAME_SIZE: usize = 65536;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 单次搜索的默认时间上限（毫秒）
pub const SEARCH_TIMEOUT_MS: u64 = 10_000;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 七十五步规则对应的半回合数
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
