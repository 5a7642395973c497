use anyhow::Result;
use chess_server::{http, tcp, EngineService, ServerConfig};
use protocol::{Listener, TcpListener};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("chess_server=info".parse()?))
        .init();

    info!("国际象棋引擎服务端启动中...");

    let config = ServerConfig::load();
    let service = EngineService::new(config.clone());

    if let Some(addr) = &config.tcp_addr {
        let listener = TcpListener::bind(addr).await?;
        info!("TCP 接口监听于 {}", addr);
        tokio::spawn(tcp::serve(listener, service.clone()));
    }

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("HTTP 接口监听于 {}", config.http_addr);
    axum::serve(listener, http::router(service)).await?;

    Ok(())
}
