//! 引擎服务
//!
//! HTTP 与 TCP 两个接口共用同一套请求处理：参数校验、深度限制、
//! 在阻塞线程池上运行搜索并施加时间上限。

use std::sync::Arc;

use chess_ai::{evaluate_fen, AiEngine, AiError};
use protocol::{
    EngineRequest, EngineResponse, ErrorCode, ErrorResponse, EvaluateRequest, EvaluateResponse,
};
use thiserror::Error;
use tokio::task;
use tokio::time::timeout;

use crate::config::ServerConfig;

/// 服务错误，由各接口转换为各自的响应
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("FEN is required")]
    MissingFen,

    #[error("Invalid depth: {0} (must be a non-negative integer)")]
    InvalidDepth(i64),

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidFen(String),

    #[error("Search did not finish within {0} ms")]
    Timeout(u64),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::MissingFen => ErrorCode::MissingFen,
            ServiceError::InvalidDepth(_) => ErrorCode::InvalidDepth,
            ServiceError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ServiceError::InvalidFen(_) => ErrorCode::InvalidFen,
            ServiceError::Timeout(_) => ErrorCode::Timeout,
            ServiceError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        }
    }
}

impl From<AiError> for ServiceError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::InvalidPosition(e) => ServiceError::InvalidFen(e.to_string()),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// 引擎服务（可廉价克隆，各接口共享）
#[derive(Clone)]
pub struct EngineService {
    config: Arc<ServerConfig>,
}

impl EngineService {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// 求最佳走法；对局已结束时 `mv` 为 `None`
    pub async fn best_move(&self, request: EngineRequest) -> Result<EngineResponse, ServiceError> {
        let fen = required_fen(request.fen)?;
        let requested = match request.depth {
            Some(depth) if depth < 0 => return Err(ServiceError::InvalidDepth(depth)),
            Some(depth) => Some(u32::try_from(depth).unwrap_or(u32::MAX)),
            None => None,
        };
        let depth = self.config.ai.clamp_depth(requested);
        tracing::debug!(fen = %fen, depth, "best move request");

        // 每个请求在自己的线程上独占一个局面实例
        let selected = self
            .run_blocking(move || AiEngine::new().select_move(&fen, depth, &mut rand::thread_rng()))
            .await?;

        Ok(EngineResponse {
            mv: selected.map(|selected| selected.notation),
        })
    }

    /// 静态评估
    pub async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, ServiceError> {
        let fen = required_fen(request.fen)?;
        tracing::debug!(fen = %fen, "evaluate request");

        let score = self.run_blocking(move || evaluate_fen(&fen)).await?;
        Ok(EvaluateResponse::from_score(score))
    }

    /// 在阻塞线程池上运行，超时后放弃等待
    ///
    /// 搜索本身无法取消，超时的任务会在后台跑完后被丢弃。
    async fn run_blocking<T, F>(&self, job: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Result<T, AiError> + Send + 'static,
        T: Send + 'static,
    {
        let limit_ms = self.config.search_timeout_ms;
        let result = match timeout(self.config.search_timeout(), task::spawn_blocking(job)).await {
            Err(_) => Err(ServiceError::Timeout(limit_ms)),
            Ok(Err(join_err)) => Err(ServiceError::Internal(format!(
                "search task failed: {}",
                join_err
            ))),
            Ok(Ok(result)) => result.map_err(ServiceError::from),
        };

        match &result {
            Err(ServiceError::Internal(message)) => tracing::error!("引擎内部错误: {}", message),
            Err(ServiceError::Timeout(_)) => tracing::warn!(limit_ms, "搜索超时"),
            _ => {}
        }
        result
    }
}

fn required_fen(fen: Option<String>) -> Result<String, ServiceError> {
    match fen {
        Some(fen) if !fen.trim().is_empty() => Ok(fen),
        _ => Err(ServiceError::MissingFen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_ai::AiConfig;
    use protocol::INITIAL_FEN;

    fn service() -> EngineService {
        EngineService::new(ServerConfig::default())
    }

    fn request(fen: &str, depth: Option<i64>) -> EngineRequest {
        EngineRequest {
            fen: Some(fen.to_string()),
            depth,
        }
    }

    #[tokio::test]
    async fn test_best_move_default_depth() {
        let response = service().best_move(request(INITIAL_FEN, None)).await.unwrap();
        let mv = response.mv.unwrap();
        assert_eq!(mv.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_fen() {
        let result = service().best_move(EngineRequest::default()).await;
        assert_eq!(result, Err(ServiceError::MissingFen));

        let result = service().best_move(request("  ", Some(1))).await;
        assert_eq!(result, Err(ServiceError::MissingFen));
    }

    #[tokio::test]
    async fn test_negative_depth() {
        let result = service().best_move(request(INITIAL_FEN, Some(-1))).await;
        assert_eq!(result, Err(ServiceError::InvalidDepth(-1)));
        assert_eq!(ServiceError::InvalidDepth(-1).code(), ErrorCode::InvalidDepth);
    }

    #[tokio::test]
    async fn test_invalid_fen() {
        let err = service().best_move(request("garbage", Some(1))).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidFen);
        assert!(err.code().is_client_error());
    }

    #[tokio::test]
    async fn test_game_over_returns_no_move() {
        let response = service()
            .best_move(request("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", Some(2)))
            .await
            .unwrap();
        assert_eq!(response.mv, None);
    }

    #[tokio::test]
    async fn test_depth_is_clamped() {
        let service = EngineService::new(ServerConfig {
            ai: AiConfig {
                default_depth: 1,
                max_depth: 1,
            },
            ..ServerConfig::default()
        });
        // 深度被限制为 1，照样能找到一步杀
        let response = service
            .best_move(request("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", Some(1_000_000)))
            .await
            .unwrap();
        assert_eq!(response.mv.as_deref(), Some("a1a8"));
    }

    #[tokio::test]
    async fn test_search_timeout() {
        let service = EngineService::new(ServerConfig {
            search_timeout_ms: 0,
            ..ServerConfig::default()
        });
        let result = service
            .best_move(request(
                "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
                Some(3),
            ))
            .await;
        assert_eq!(result, Err(ServiceError::Timeout(0)));
    }

    #[tokio::test]
    async fn test_evaluate() {
        let response = service()
            .evaluate(EvaluateRequest {
                fen: Some(INITIAL_FEN.to_string()),
            })
            .await
            .unwrap();
        assert_eq!(response.score, 200);
        assert_eq!(response.advantage, 2.0);
    }

    #[test]
    fn test_internal_error_mapping() {
        let err = ServiceError::from(AiError::InternalSearchFailure {
            reason: "undo failed".to_string(),
        });
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(err.to_response().error.contains("undo failed"));
    }
}
