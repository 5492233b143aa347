use junpanel::AppState;
use junpanel_config::PanelConfig;
use junpanel_container::RuntimeClient;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn handle(
    config: &PanelConfig,
    runtime: Arc<RuntimeClient>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    // 起動時点で Docker がなくても API は起動する（利用時に再接続を試みる）
    if !runtime.is_available().await {
        warn!("Docker に接続できません。コンテナ関連の API は 503 を返します");
    }

    let state = AppState::new(runtime, &config.health);
    let app = junpanel::router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("junpanel を起動しました: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("junpanel を停止しました");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "シグナルハンドラを登録できません");
        std::future::pending::<()>().await;
    }
    info!("終了シグナルを受信しました");
}
