//! 主应用程序入口
//!
//! 加载配置，选择存储，启动超时清理任务与 Axum Web API 服务。

use std::sync::Arc;

use application::{
    ChatServiceDependencies, ChatServices, LedgerSettings, PresenceSettings, SystemClock,
};
use config::AppConfig;
use domain::{MessageRepository, ParticipantRepository};
use infrastructure::{
    create_pg_pool, MemoryMessageRepository, MemoryParticipantRepository, PgMessageRepository,
    PgParticipantRepository, MIGRATOR,
};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::info;
use tracing_subscriber::EnvFilter;
use web_api::{cors_layer, router, AppState};

type Stores = (Arc<dyn ParticipantRepository>, Arc<dyn MessageRepository>);

async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    let Some(url) = config.database.url.as_deref() else {
        info!("未配置数据库，使用内存存储");
        return Ok((
            Arc::new(MemoryParticipantRepository::new()),
            Arc::new(MemoryMessageRepository::new()),
        ));
    };

    let pool = create_pg_pool(url, config.database.max_connections).await?;
    MIGRATOR.run(&pool).await?;
    info!("已连接 PostgreSQL 并完成迁移");

    Ok((
        Arc::new(PgParticipantRepository::new(pool.clone())),
        Arc::new(PgMessageRepository::new(pool)),
    ))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig_term) => {
                sig_term.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "无法监听终止信号");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("接收到 Ctrl+C 信号，开始优雅停机...");
        }
        _ = terminate => {
            info!("接收到终止信号，开始优雅停机...");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(config = %config.sanitize(), "配置已加载");

    let (participant_repository, message_repository) = build_stores(&config).await?;

    let services = ChatServices::new(ChatServiceDependencies {
        participant_repository,
        message_repository,
        clock: Arc::new(SystemClock),
        presence: PresenceSettings::from(&config.presence),
        ledger: LedgerSettings::from(&config.messages),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = services.sweeper().spawn(shutdown_rx);

    let app = router(AppState::new(&services)).layer(cors_layer(&config.server));
    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("聊天室服务器启动在 http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    sweeper.await?;
    info!("聊天室服务器已停止");

    Ok(())
}
