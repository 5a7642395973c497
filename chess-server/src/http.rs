//! HTTP 接口
//!
//! `POST /api/chess-engine`、`POST /api/evaluate`、`GET /health`，
//! 允许任意来源跨域访问。

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use protocol::{EngineRequest, EngineResponse, ErrorCode, EvaluateRequest, EvaluateResponse};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};

use crate::service::{EngineService, ServiceError};

/// 构建路由
pub fn router(service: EngineService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/chess-engine", post(best_move))
        .route("/api/evaluate", post(evaluate))
        .route("/health", get(health))
        .layer(cors)
        .with_state(service)
}

async fn best_move(
    State(service): State<EngineService>,
    body: Bytes,
) -> Result<Json<EngineResponse>, ServiceError> {
    let request: EngineRequest = parse_body(&body)?;
    Ok(Json(service.best_move(request).await?))
}

async fn evaluate(
    State(service): State<EngineService>,
    body: Bytes,
) -> Result<Json<EvaluateResponse>, ServiceError> {
    let request: EvaluateRequest = parse_body(&body)?;
    Ok(Json(service.evaluate(request).await?))
}

async fn health() -> &'static str {
    "ok"
}

/// 自行解析请求体，格式错误时返回统一的错误响应
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|e| ServiceError::InvalidRequest(e.to_string()))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self.code() {
            code if code.is_client_error() => StatusCode::BAD_REQUEST,
            ErrorCode::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.to_response())).into_response()
    }
}
