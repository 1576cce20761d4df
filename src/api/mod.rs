//! 资源 API 客户端
//! 纯透传的 CRUD 调用，凭证附加与 401 重试由会话管理器处理

mod inspectors;
mod messaging;
mod projects;

pub use inspectors::InspectorsApi;
pub use messaging::MessagingApi;
pub use projects::ProjectsApi;
