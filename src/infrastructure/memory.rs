//! 进程内挂牌存储，测试中替代 MongoDB
//!
//! 仅在测试或启用 `test-util` 特性时编译。

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

use crate::app::products::{
    model::{NewProduct, Product},
    store::{ProductStore, StoreError},
};

#[derive(Default)]
pub struct MemoryProductStore {
    // 按写入顺序保存
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.lock().is_empty()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: &NewProduct) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.products
            .lock()
            .push(product.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn find_newest_first(&self) -> Result<Vec<Value>, StoreError> {
        let mut products: Vec<Product> = self.products.lock().iter().rev().cloned().collect();
        // 稳定排序：同一时间戳时后写入的排在前面
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        products
            .iter()
            .map(|p| serde_json::to_value(p).map_err(|e| StoreError::Rejected(e.to_string())))
            .collect()
    }

    async fn close(&self) {}
}
