//! 基础设施层：数据库连接、日志

pub mod database;
pub mod logger;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
