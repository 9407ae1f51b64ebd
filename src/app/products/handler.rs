//! 挂牌处理器

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::Value;

use super::{
    model::{CreateProductRequest, ProductCreated},
    service::ProductService,
    store::StoreHandle,
};
use crate::core::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            product_service: ProductService::new(store),
        }
    }
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductCreated>), AppError> {
    let product = state.product_service.create_product(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            message: "Product added successfully",
            inserted_id: product.id.clone(),
            product,
        }),
    ))
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}
