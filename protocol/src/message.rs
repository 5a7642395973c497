//! 消息类型定义
//!
//! HTTP 接口使用 JSON，TCP 接口把同样的请求/响应包进
//! `ClientMessage`/`ServerMessage` 后以 bincode 帧传输。

use serde::{Deserialize, Serialize};

/// 错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// 缺少 FEN
    MissingFen,
    /// FEN 无法解析
    InvalidFen,
    /// 搜索深度非法（负数）
    InvalidDepth,
    /// 请求体格式错误
    InvalidRequest,
    /// 搜索超时
    Timeout,
    /// 服务端内部错误
    Internal,
}

impl ErrorCode {
    /// 是否属于客户端错误
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorCode::MissingFen
                | ErrorCode::InvalidFen
                | ErrorCode::InvalidDepth
                | ErrorCode::InvalidRequest
        )
    }
}

/// 求最佳走法
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub fen: Option<String>,
    /// 搜索深度，缺省时使用服务端默认值
    pub depth: Option<i64>,
}

/// 最佳走法；对局已结束时为 `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResponse {
    #[serde(rename = "move")]
    pub mv: Option<String>,
}

/// 静态评估请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub fen: Option<String>,
}

/// 静态评估结果（白方视角）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    /// 厘兵
    pub score: i32,
    /// 以兵为单位的优势
    pub advantage: f64,
}

impl EvaluateResponse {
    pub fn from_score(score: i32) -> Self {
        Self {
            score,
            advantage: f64::from(score) / 100.0,
        }
    }
}

/// 错误响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

/// 客户端发送给服务端的消息（TCP）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    /// 求最佳走法
    BestMove(EngineRequest),
    /// 静态评估
    Evaluate(EvaluateRequest),
    /// 心跳请求
    Ping,
}

/// 服务端发送给客户端的消息（TCP）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    BestMove(EngineResponse),
    Evaluation(EvaluateResponse),
    Error(ErrorResponse),
    /// 心跳响应
    Pong,
}
