//! 服务端配置
//!
//! JSON 文件，路径取自 `CHESS_ENGINE_CONFIG`，否则为系统配置目录下的
//! `chess-engine/server.json`。文件缺失或无效时使用默认配置。

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_ai::AiConfig;
use protocol::SEARCH_TIMEOUT_MS;
use serde::{Deserialize, Serialize};

/// 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "CHESS_ENGINE_CONFIG";

/// 服务端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP 监听地址
    pub http_addr: String,
    /// TCP 监听地址，为空时不启动 TCP 接口
    pub tcp_addr: Option<String>,
    /// 单次搜索的时间上限（毫秒）
    pub search_timeout_ms: u64,
    pub ai: AiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:3000".to_string(),
            tcp_addr: Some("127.0.0.1:9527".to_string()),
            search_timeout_ms: SEARCH_TIMEOUT_MS,
            ai: AiConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// 默认配置文件路径
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("chess-engine").join("server.json"))
    }

    /// 从默认路径加载
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("无法获取配置目录，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从指定文件加载
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("配置文件 {:?} 不存在，使用默认配置", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    tracing::info!("已加载配置: {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("配置文件格式无效: {}，使用默认配置", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("无法读取配置文件: {}，使用默认配置", e);
                Self::default()
            }
        }
    }
}
