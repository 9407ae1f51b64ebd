//! 挂牌业务服务

use serde_json::Value;
use tracing::info;

use super::{
    model::{CreateProductRequest, NewProduct, Product},
    store::StoreHandle,
};
use crate::core::error::AppError;

#[derive(Clone)]
pub struct ProductService {
    store: StoreHandle,
}

impl ProductService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// 盖上服务器时间后写入一条挂牌，返回带标识的完整记录
    pub async fn create_product(&self, request: CreateProductRequest) -> Result<Product, AppError> {
        let store = self.store.get()?;
        let new_product = NewProduct::from_request(request);

        let id = store.insert(&new_product).await.map_err(AppError::Write)?;
        info!("新增挂牌 {}", id);

        Ok(new_product.with_id(id))
    }

    /// 返回全部挂牌，排序交给存储完成
    pub async fn list_products(&self) -> Result<Vec<Value>, AppError> {
        let store = self.store.get()?;
        store.find_newest_first().await.map_err(AppError::Read)
    }
}
