//! Ongchad Bills 共享核心
//!
//! 与平台无关的业务层，前端（WASM）与原生测试共用：
//! - `models` / `role`: API 数据模型与角色枚举
//! - `http` / `storage`: 传输与持久化的抽象接缝（由前端注入浏览器实现）
//! - `client`: 各资源的 REST 客户端
//! - `session`: 认证会话（登录、注销、令牌校验、启动水合）
//! - `guard`: 路由守卫的纯决策逻辑
//! - `listing`: 列表页的搜索/过滤/排序投影与局部变更
//! - `stats` / `forms` / `preferences`: 汇总统计、表单错误映射、偏好设置

pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod forms;
pub mod guard;
pub mod http;
pub mod listing;
pub mod models;
pub mod preferences;
pub mod role;
mod serde_helper;
pub mod session;
pub mod stats;
pub mod storage;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use date::BillingMonth;
pub use error::{ApiError, ApiErrorKind, ApiResult, TransportError};
pub use models::*;
pub use role::Role;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 持久化的用户对象（JSON）
pub const STORAGE_USER_KEY: &str = "user";
/// 持久化的 Bearer 令牌（原始字符串）
pub const STORAGE_TOKEN_KEY: &str = "token";
/// 暗色模式偏好（"true" / "false"）
pub const STORAGE_DARK_MODE_KEY: &str = "darkMode";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
