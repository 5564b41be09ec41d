//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型，实现 IntoResponse
//! - [`AppResult`] - handler 返回类型别名
//! - 日志、业务时区工具

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResult, ok};
