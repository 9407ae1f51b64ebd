use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use marketplace::{
    infrastructure::{database::MongoProductStore, logger::Logger},
    lifecycle::shutdown_signal,
    server, AppState, Config, Lifecycle, ProductStore, StoreHandle,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("加载配置失败")?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("启动挂牌服务...");

    // 连接或 ping 失败直接退出，不提供降级模式；失败原因已在 connect 内记录
    let store = MongoProductStore::connect(&config.database)
        .await
        .context("连接数据库失败")?;
    let store: Arc<dyn ProductStore> = Arc::new(store);

    let handle = StoreHandle::new();
    handle.install(Arc::clone(&store));
    let router = server::build_router(AppState::new(handle));

    let listener = TcpListener::bind(config.http.socket_address())
        .await
        .with_context(|| format!("无法绑定到 {}", config.http.socket_address()))?;

    let lifecycle = Arc::new(Lifecycle::new());
    let watcher = {
        let lifecycle = Arc::clone(&lifecycle);
        tokio::spawn(async move {
            shutdown_signal().await;
            lifecycle.begin_closing();
        })
    };

    let served = server::serve(listener, router, &lifecycle, config.http.shutdown_timeout()).await;
    watcher.abort();

    // 服务异常退出时也要释放连接
    lifecycle.begin_closing();
    store.close().await;
    lifecycle.terminate();

    served.context("HTTP 服务异常退出")?;
    info!("挂牌服务已安全关闭");
    Ok(())
}
