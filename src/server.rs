//! HTTP 服务：路由、中间件与优雅关闭

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::app::products::{handler, AppState};
use crate::core::middleware::request_logging_middleware;
use crate::lifecycle::Lifecycle;

/// 创建路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/products",
            get(handler::list_products).post(handler::create_product),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(middleware::from_fn(request_logging_middleware)),
        )
        .with_state(state)
}

/// 运行 HTTP 服务直到生命周期进入 Closing
///
/// 进入 Closing 后停止接受新连接，并最多等待 `drain_timeout` 让在途请求完成。
pub async fn serve(
    listener: TcpListener,
    router: Router,
    lifecycle: &Lifecycle,
    drain_timeout: Duration,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    let server = axum::serve(listener, router).with_graceful_shutdown(lifecycle.closing());
    let mut task = tokio::spawn(async move { server.await });

    info!("🚀 服务运行在 http://{}", addr);
    info!("   POST /api/products - 新增挂牌");
    info!("   GET  /api/products - 按时间倒序列出全部挂牌");

    tokio::select! {
        joined = &mut task => {
            // 服务在收到关闭信号前自行退出
            return flatten(joined);
        }
        _ = lifecycle.closing() => {}
    }

    info!("停止接受新请求，等待在途请求完成（最长 {:?}）", drain_timeout);
    match tokio::time::timeout(drain_timeout, &mut task).await {
        Ok(joined) => flatten(joined),
        Err(_) => {
            warn!("在途请求未能在 {:?} 内完成，强制结束", drain_timeout);
            task.abort();
            Ok(())
        }
    }
}

fn flatten(joined: Result<std::io::Result<()>, tokio::task::JoinError>) -> std::io::Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => {
            error!("HTTP 服务任务异常退出: {}", e);
            Err(std::io::Error::new(std::io::ErrorKind::Other, e))
        }
    }
}
