//! AI 错误类型

use protocol::ChessError;
use thiserror::Error;

/// 选步失败的原因
///
/// 对局已结束不是错误，由 `Ok(None)` 表示。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// 局面编码无法解析
    #[error("Invalid position: {0}")]
    InvalidPosition(ChessError),

    /// 搜索过程中局面状态被破坏（例如走子/撤销不对称）
    #[error("Internal search failure: {reason}")]
    InternalSearchFailure { reason: String },
}

impl AiError {
    pub(crate) fn internal(reason: impl Into<String>) -> Self {
        AiError::InternalSearchFailure {
            reason: reason.into(),
        }
    }

    /// 撤销失败意味着局面已不可信
    pub(crate) fn undo_failed(err: ChessError) -> Self {
        Self::internal(format!("undo failed: {}", err))
    }
}
