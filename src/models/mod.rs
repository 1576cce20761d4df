//! API 数据模型

pub mod auth;
pub mod inspector;
pub mod message;
pub mod project;
pub mod user;
