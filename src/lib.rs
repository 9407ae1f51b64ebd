//! # 农贸市场挂牌服务
//!
//! 接收新的商品挂牌，并按发布时间倒序返回全部挂牌。
//! - `infrastructure`：MongoDB 连接、日志
//! - `app::products`：挂牌模型、存储接口、服务与处理器
//! - `core`：统一错误、响应体、中间件
//! - `server` / `lifecycle`：HTTP 服务与优雅关闭

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod lifecycle;
pub mod server;

pub use app::products::{AppState, ProductStore, StoreHandle};
pub use config::Config;
pub use lifecycle::{Lifecycle, LifecycleState};
