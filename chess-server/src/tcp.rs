//! TCP 接口
//!
//! 每个连接一个任务，按顺序处理 `ClientMessage` 并逐条回复。

use std::time::Duration;

use protocol::{ClientMessage, Connection, Listener, ProtocolError, ServerMessage};

use crate::service::EngineService;

/// 接受连接失败后的重试间隔
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// 接受连接直到进程退出
pub async fn serve<L: Listener>(mut listener: L, service: EngineService) {
    loop {
        let conn = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("接受连接失败: {}，{:?} 后重试", e, ACCEPT_RETRY_DELAY);
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        let peer = conn.peer_addr().unwrap_or_else(|| "unknown".to_string());
        tracing::info!("新连接: {}", peer);

        let service = service.clone();
        tokio::spawn(async move {
            match handle_connection(conn, service).await {
                Ok(()) => tracing::info!("连接关闭: {}", peer),
                Err(e) => tracing::warn!("连接 {} 异常断开: {}", peer, e),
            }
        });
    }
}

/// 处理单个连接，对端正常关闭时返回 `Ok(())`
pub async fn handle_connection<C: Connection>(
    mut conn: C,
    service: EngineService,
) -> protocol::Result<()> {
    loop {
        let msg: ClientMessage = match conn.recv().await {
            Ok(msg) => msg,
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };

        let reply = dispatch(&service, msg).await;
        conn.send(&reply).await?;
    }
}

/// 把一条客户端消息转换为回复
pub async fn dispatch(service: &EngineService, msg: ClientMessage) -> ServerMessage {
    match msg {
        ClientMessage::BestMove(request) => match service.best_move(request).await {
            Ok(response) => ServerMessage::BestMove(response),
            Err(e) => ServerMessage::Error(e.to_response()),
        },
        ClientMessage::Evaluate(request) => match service.evaluate(request).await {
            Ok(response) => ServerMessage::Evaluation(response),
            Err(e) => ServerMessage::Error(e.to_response()),
        },
        ClientMessage::Ping => ServerMessage::Pong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use protocol::{
        Connector, EngineRequest, ErrorCode, EvaluateRequest, TcpConnector, TcpListener,
        INITIAL_FEN,
    };

    async fn start_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, EngineService::new(ServerConfig::default())));
        addr
    }

    #[tokio::test]
    async fn test_ping() {
        let service = EngineService::new(ServerConfig::default());
        assert!(matches!(
            dispatch(&service, ClientMessage::Ping).await,
            ServerMessage::Pong
        ));
    }

    #[tokio::test]
    async fn test_requests_over_tcp() {
        let addr = start_server().await;
        let mut conn = TcpConnector.connect(&addr).await.unwrap();

        conn.send(&ClientMessage::BestMove(EngineRequest {
            fen: Some(INITIAL_FEN.to_string()),
            depth: Some(1),
        }))
        .await
        .unwrap();
        match conn.recv::<ServerMessage>().await.unwrap() {
            ServerMessage::BestMove(response) => assert!(response.mv.is_some()),
            other => panic!("Unexpected message: {:?}", other),
        }

        conn.send(&ClientMessage::Evaluate(EvaluateRequest {
            fen: Some(INITIAL_FEN.to_string()),
        }))
        .await
        .unwrap();
        match conn.recv::<ServerMessage>().await.unwrap() {
            ServerMessage::Evaluation(response) => assert_eq!(response.score, 200),
            other => panic!("Unexpected message: {:?}", other),
        }

        // 同一连接上继续处理
        conn.send(&ClientMessage::Ping).await.unwrap();
        assert!(matches!(
            conn.recv::<ServerMessage>().await.unwrap(),
            ServerMessage::Pong
        ));
    }

    #[tokio::test]
    async fn test_error_reply() {
        let addr = start_server().await;
        let mut conn = TcpConnector.connect(&addr).await.unwrap();

        conn.send(&ClientMessage::BestMove(EngineRequest {
            fen: Some("not a fen".to_string()),
            depth: None,
        }))
        .await
        .unwrap();
        match conn.recv::<ServerMessage>().await.unwrap() {
            ServerMessage::Error(error) => assert_eq!(error.code, ErrorCode::InvalidFen),
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_disconnect_keeps_server_running() {
        let addr = start_server().await;
        let conn = TcpConnector.connect(&addr).await.unwrap();
        drop(conn);

        let mut conn = TcpConnector.connect(&addr).await.unwrap();
        conn.send(&ClientMessage::Ping).await.unwrap();
        assert!(matches!(
            conn.recv::<ServerMessage>().await.unwrap(),
            ServerMessage::Pong
        ));
    }

    /// 每次 accept 都失败（例如文件描述符耗尽）
    struct FailingListener {
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Listener for FailingListener {
        type Conn = protocol::TcpConnection;

        async fn bind(_addr: &str) -> protocol::Result<Self> {
            Ok(Self {
                attempts: Arc::new(AtomicUsize::new(0)),
            })
        }

        async fn accept(&mut self) -> protocol::Result<Self::Conn> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "too many open files",
            )))
        }

        fn local_addr(&self) -> Option<String> {
            None
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_failure_waits_before_retry() {
        let listener = FailingListener::bind("unused").await.unwrap();
        let attempts = listener.attempts.clone();
        let server = tokio::spawn(serve(listener, EngineService::new(ServerConfig::default())));

        // 0、100、200、300 毫秒各尝试一次
        tokio::time::sleep(ACCEPT_RETRY_DELAY * 3 + ACCEPT_RETRY_DELAY / 2).await;
        server.abort();

        let attempts = attempts.load(Ordering::SeqCst);
        assert!((3..=5).contains(&attempts), "{} attempts", attempts);
    }
}
