//! 商品挂牌：模型、存储接口、服务、处理器

pub mod handler;
pub mod model;
pub mod service;
pub mod store;

pub use handler::AppState;
pub use model::{CreateProductRequest, NewProduct, Product};
pub use service::ProductService;
pub use store::{ProductStore, StoreError, StoreHandle};
