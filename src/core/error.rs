//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::response::ErrorBody;
use crate::app::products::store::StoreError;

/// 面向 HTTP 调用方的错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 存储句柄尚未就绪
    #[error("Database not initialized")]
    StoreUnavailable,
    /// 写入失败，按客户端错误返回
    #[error("Error adding product")]
    Write(#[source] StoreError),
    /// 读取失败
    #[error("Error fetching products")]
    Read(#[source] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Write(_) => StatusCode::BAD_REQUEST,
            AppError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::StoreUnavailable => {
                error!("请求到达时数据库尚未就绪");
                ErrorBody::new(self.to_string())
            }
            AppError::Write(source) | AppError::Read(source) => {
                error!("{}: {}", self, source);
                ErrorBody::with_error(self.to_string(), source.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}
