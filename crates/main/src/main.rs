//! 主应用程序入口
//!
//! 加载配置、初始化日志、装配队列与会话服务，启动 Axum Web API 服务。

use anyhow::Context;
use config::{AppConfig, LogConfig, LogFormat};
use infrastructure::Infrastructure;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("加载配置失败")?;

    // 初始化日志
    init_tracing(&config.log);
    tracing::info!(tier = ?config.tier, backend = ?config.storage.backend, "配置已加载");

    let infra = Infrastructure::connect(&config.storage)
        .await
        .context("初始化队列存储失败")?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        &config,
        infra.message_queue,
        infra.event_queue,
        shutdown.clone(),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定 {addr} 失败"))?;

    tracing::info!("笔记服务启动在 http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let default_level = if log.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// 等待 Ctrl+C，然后取消所有会话的根生命周期
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "无法监听关闭信号");
    }
    tracing::info!("收到关闭信号，结束所有会话");
    shutdown.cancel();
}
