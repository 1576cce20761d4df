//! Pofara 平台 API 客户端
//!
//! 核心是 [`session::SessionManager`]：持有会话状态（令牌对 + 用户
//! 快照），负责登录、注册、登出、令牌刷新合并与 401 单次重试；
//! [`api`] 下的资源客户端通过它透传 CRUD 请求。

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use session::{AuthState, SessionManager};
