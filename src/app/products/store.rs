//! 挂牌存储抽象与就绪检查

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;

use super::model::NewProduct;
use crate::core::error::AppError;

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Driver(#[from] mongodb::error::Error),
    #[error("{0}")]
    Encode(#[from] mongodb::bson::ser::Error),
    #[error("unexpected inserted id: {0}")]
    UnexpectedId(String),
    #[error("{0}")]
    Rejected(String),
}

/// 挂牌集合的访问接口
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 写入一条新记录，返回存储分配的标识
    async fn insert(&self, product: &NewProduct) -> Result<String, StoreError>;

    /// 取出全部记录，按 `createdAt` 从新到旧排列
    ///
    /// 集合没有模式约束，记录以 JSON 原样返回。
    async fn find_newest_first(&self) -> Result<Vec<Value>, StoreError>;

    /// 释放底层连接
    async fn close(&self);
}

/// 共享的存储句柄
///
/// 启动时创建为空，连接成功后 `install` 一次；之前到达的请求得到
/// `AppError::StoreUnavailable`。
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<OnceLock<Arc<dyn ProductStore>>>,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(store: Arc<dyn ProductStore>) -> Self {
        let handle = Self::new();
        handle.install(store);
        handle
    }

    /// 安装存储；重复安装时保留第一次的存储并返回 false
    pub fn install(&self, store: Arc<dyn ProductStore>) -> bool {
        self.inner.set(store).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn ProductStore>, AppError> {
        self.inner.get().cloned().ok_or(AppError::StoreUnavailable)
    }
}
