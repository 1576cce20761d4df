//! 会话管理器
//! 持有认证状态，代理全部带凭证的 API 请求：登录、注册、登出、
//! 令牌刷新合并、401 单次重试、进程启动时的会话恢复。

mod state;

pub use state::AuthState;

use crate::config::ClientConfig;
use crate::error::{extract_error_message, ApiError, Result, ValidationErrors};
use crate::models::auth::{AuthResponse, Credentials, RefreshResponse, RegisterRequest, TokenPair};
use crate::models::user::SessionUser;
use crate::storage::{FileTokenStore, TokenStore};
use reqwest::{Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use state::{AuthPhase, SessionState};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use validator::Validate;

/// 会话管理器
///
/// 同一进程内通过 `Arc<SessionManager>` 共享；并发的资源请求共用
/// 同一份令牌状态和刷新通道。
pub struct SessionManager {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
    /// 刷新合并闸门：并发 401 只触发一次网络刷新
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    /// 创建会话管理器，令牌持久化到配置的文件路径
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let store = Arc::new(FileTokenStore::new(&config.storage.token_file));
        Self::with_store(config, store)
    }

    /// 使用自定义令牌存储创建（测试注入内存存储）
    pub fn with_store(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            store,
            state: RwLock::new(SessionState::new()),
            refresh_gate: Mutex::new(()),
        })
    }

    /// 当前授权状态快照
    pub async fn state(&self) -> AuthState {
        self.state.read().await.snapshot()
    }

    /// 当前认证用户快照
    pub async fn current_user(&self) -> Option<SessionUser> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ---- 登录 / 注册 ----

    /// 使用邮箱和密码登录
    ///
    /// 成功时原子地写入令牌对并持有用户快照；失败时不产生任何
    /// 部分写入，状态保持原样。
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionUser> {
        let prev_phase = {
            let mut state = self.state.write().await;
            let prev = state.phase;
            state.phase = AuthPhase::Authenticating;
            prev
        };

        let body = json!({
            "email": &credentials.email,
            "password": credentials.password.expose_secret(),
        });

        let result = self.obtain_session(&self.endpoint("/auth/token/"), &body, true).await;

        if result.is_err() {
            let mut state = self.state.write().await;
            // 登录期间未发生其他状态变化时回退
            if state.phase == AuthPhase::Authenticating {
                state.phase = prev_phase;
            }
        }

        result
    }

    /// 注册新账号，成功后直接进入已认证状态
    ///
    /// 先做本地校验（密码长度、确认密码一致），不通过时不发出
    /// 网络请求。
    pub async fn register(&self, request: &RegisterRequest) -> Result<SessionUser> {
        request.validate()?;

        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::server(0, format!("failed to encode request: {}", e)))?;

        self.obtain_session(&self.endpoint("/auth/user/register/"), &body, false)
            .await
    }

    /// 调用签发令牌的端点并建立会话（登录与注册共用）
    async fn obtain_session(
        &self,
        url: &str,
        body: &Value,
        is_login: bool,
    ) -> Result<SessionUser> {
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();

        if status.is_success() {
            let auth: AuthResponse = response.json().await?;
            let tokens = TokenPair {
                access: auth.access,
                refresh: auth.refresh,
            };

            let mut state = self.state.write().await;
            self.store.save(&tokens).await?;
            state.establish(tokens, auth.user.clone());
            // 新会话开始，作废仍在途的旧会话响应
            state.epoch += 1;

            info!(email = %auth.user.email, "Session established");
            return Ok(auth.user);
        }

        let body_text = response.text().await.unwrap_or_default();
        Err(Self::map_auth_failure(status, &body_text, is_login))
    }

    /// 将签发端点的失败响应映射为结构化错误
    fn map_auth_failure(status: StatusCode, body: &str, is_login: bool) -> ApiError {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::InvalidCredentials;
        }

        if status == StatusCode::BAD_REQUEST {
            let errors = serde_json::from_str::<Value>(body)
                .map(|json| ValidationErrors::from_json(&json))
                .unwrap_or_default();

            // 登录端点用 non_field_errors 报告凭证错误
            if is_login {
                let credential_failure = errors
                    .field("non_field_errors")
                    .map(|msgs| msgs.iter().any(|m| m.to_lowercase().contains("credentials")))
                    .unwrap_or(false);
                if credential_failure {
                    return ApiError::InvalidCredentials;
                }
            }

            if !errors.is_empty() {
                return ApiError::Validation(errors);
            }
        }

        ApiError::server(status.as_u16(), extract_error_message(status.as_u16(), body))
    }

    // ---- 登出 ----

    /// 登出
    ///
    /// 本地状态同步清除（返回前即为匿名），之后尽力通知服务端；
    /// 通知失败只记录日志。重复调用是安全的空操作。
    pub async fn logout(&self) {
        let tokens = {
            let mut state = self.state.write().await;
            let tokens = state.tokens.take();
            state.invalidate();
            tokens
        };

        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear token storage on logout");
        }

        let Some(tokens) = tokens else {
            debug!("Logout with no active session");
            return;
        };

        info!("Session cleared");

        // 尽力通知，不阻塞登出
        let http = self.http.clone();
        let url = self.endpoint("/auth/logout/");
        tokio::spawn(async move {
            let result = http
                .post(&url)
                .bearer_auth(&tokens.access)
                .json(&json!({ "refresh": &tokens.refresh }))
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    debug!("Logout notification delivered");
                }
                Ok(resp) => {
                    warn!(status = %resp.status(), "Logout notification rejected");
                }
                Err(e) => {
                    warn!(error = %e, "Logout notification failed");
                }
            }
        });
    }

    // ---- 刷新 ----

    /// 用存储的刷新令牌换取新的访问令牌
    ///
    /// 刷新令牌缺失或被服务端拒绝是终止性失败：清除会话并返回
    /// `SessionExpired`，不重试。
    pub async fn refresh(&self) -> Result<()> {
        self.refresh_coalesced(None).await.map(|_| ())
    }

    /// 合并并发刷新，返回可用的访问令牌
    ///
    /// `stale_access` 是触发刷新的请求当时携带的访问令牌。拿到闸门
    /// 后若存储的令牌已经不同，说明兄弟请求刚刷新过，直接复用，
    /// 保证一组并发 401 只产生一次网络刷新。
    async fn refresh_coalesced(&self, stale_access: Option<&str>) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;

        let (refresh_token, epoch, prev_phase) = {
            let mut state = self.state.write().await;

            if let (Some(stale), Some(tokens)) = (stale_access, state.tokens.as_ref()) {
                if tokens.access != stale {
                    debug!("Reusing access token refreshed by a concurrent request");
                    return Ok(tokens.access.clone());
                }
            }

            let Some(tokens) = state.tokens.as_ref() else {
                return Err(ApiError::SessionExpired);
            };
            let refresh = tokens.refresh.clone();

            let prev = state.phase;
            state.phase = AuthPhase::Refreshing;
            (refresh, state.epoch, prev)
        };

        debug!("Refreshing access token");

        let response = self
            .http
            .post(self.endpoint("/auth/token/refresh/"))
            .json(&json!({ "refresh": &refresh_token }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                // 传输层失败不作废会话，调用方可重试
                let mut state = self.state.write().await;
                if state.epoch == epoch {
                    state.phase = prev_phase;
                }
                return Err(ApiError::Network(e));
            }
        };

        if response.status().is_success() {
            let refreshed: RefreshResponse = response.json().await?;
            let tokens = TokenPair {
                access: refreshed.access.clone(),
                // 未启用轮换时沿用旧的刷新令牌
                refresh: refreshed.refresh.unwrap_or(refresh_token),
            };

            let mut state = self.state.write().await;
            if state.epoch != epoch {
                // 刷新期间发生了登出，丢弃结果
                debug!("Discarding refresh result, session was invalidated");
                return Err(ApiError::SessionExpired);
            }
            self.store.save(&tokens).await?;
            state.tokens = Some(tokens);
            state.phase = prev_phase;

            debug!("Access token refreshed");
            return Ok(refreshed.access);
        }

        // 过期、吊销、格式错误都是终止性失败
        let status = response.status();
        warn!(status = %status, "Refresh token rejected, clearing session");

        {
            let mut state = self.state.write().await;
            if state.epoch == epoch {
                state.invalidate();
            }
        }
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear token storage after refresh failure");
        }

        Err(ApiError::SessionExpired)
    }

    // ---- 启动恢复 ----

    /// 进程启动时从持久化令牌恢复会话
    ///
    /// 恢复进行中状态为 `Authenticating`，协作方不应将其当作已登出。
    /// profile 调用失败与刷新失败同样处理：清除状态回到匿名。
    pub async fn bootstrap(&self) -> Result<Option<SessionUser>> {
        let Some(tokens) = self.store.load().await? else {
            debug!("No stored tokens, starting anonymous");
            return Ok(None);
        };

        let epoch = {
            let mut state = self.state.write().await;
            state.tokens = Some(tokens);
            state.phase = AuthPhase::Authenticating;
            state.epoch
        };

        match self.get::<SessionUser>("/auth/user/profile/").await {
            Ok(user) => {
                let mut state = self.state.write().await;
                if state.epoch != epoch {
                    // 恢复期间已登出，不重新注入
                    debug!("Discarding bootstrap result, session was invalidated");
                    return Ok(None);
                }
                state.user = Some(user.clone());
                state.phase = AuthPhase::Authenticated;
                info!(email = %user.email, "Session restored from storage");
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed, clearing session");
                {
                    let mut state = self.state.write().await;
                    if state.epoch == epoch {
                        state.invalidate();
                    }
                }
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Failed to clear token storage after restore failure");
                }
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// 拉取当前用户信息并更新内存快照
    pub async fn profile(&self) -> Result<SessionUser> {
        let epoch = self.state.read().await.epoch;
        let user = self.get::<SessionUser>("/auth/user/profile/").await?;

        let mut state = self.state.write().await;
        if state.epoch == epoch {
            state.user = Some(user.clone());
        }
        Ok(user)
    }

    // ---- 请求管道 ----

    /// 发出资源请求：附加当前访问令牌，401 时做一次合并刷新 + 重发
    ///
    /// 每个原始请求最多重试一次（`retried` 标记），重发后的结果原样
    /// 交给调用方；调用方观察不到中间的 401。
    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
        let url = self.endpoint(path);
        let mut retried = false;

        loop {
            // 发送时刻取最近存储的访问令牌
            let access = {
                let state = self.state.read().await;
                state.tokens.as_ref().map(|t| t.access.clone())
            };

            let mut request = self.http.request(method.clone(), &url);
            if let Some(token) = &access {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = request.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                if let Some(stale) = access {
                    retried = true;
                    debug!(path, "Request unauthorized, attempting token refresh");
                    self.refresh_coalesced(Some(&stale)).await?;
                    continue;
                }
            }

            return Ok(response);
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::server(
            status.as_u16(),
            extract_error_message(status.as_u16(), &body),
        ))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, None).await?;
        Self::handle_response(response).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::server(0, format!("failed to encode request: {}", e)))?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Self::handle_response(response).await
    }

    pub(crate) async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::server(0, format!("failed to encode request: {}", e)))?;
        let response = self.execute(Method::PATCH, path, Some(body)).await?;
        Self::handle_response(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let response = self.execute(Method::DELETE, path, None).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::server(
            status.as_u16(),
            extract_error_message(status.as_u16(), &body),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_auth_failure_unauthorized() {
        let error = SessionManager::map_auth_failure(StatusCode::UNAUTHORIZED, "", true);
        assert!(matches!(error, ApiError::InvalidCredentials));
    }

    #[test]
    fn test_map_auth_failure_non_field_credentials() {
        let body = r#"{"non_field_errors": ["Invalid credentials."]}"#;
        let error = SessionManager::map_auth_failure(StatusCode::BAD_REQUEST, body, true);
        assert!(matches!(error, ApiError::InvalidCredentials));
    }

    #[test]
    fn test_map_auth_failure_field_errors() {
        let body = r#"{"email": ["A user with this email already exists."]}"#;
        let error = SessionManager::map_auth_failure(StatusCode::BAD_REQUEST, body, false);
        match error {
            ApiError::Validation(errors) => {
                assert_eq!(
                    errors.field("email"),
                    Some(&["A user with this email already exists.".to_string()][..])
                );
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_map_auth_failure_register_keeps_non_field_as_validation() {
        // 注册端点的 non_field_errors 不是凭证错误
        let body = r#"{"non_field_errors": ["Passwords don't match."]}"#;
        let error = SessionManager::map_auth_failure(StatusCode::BAD_REQUEST, body, false);
        assert!(matches!(error, ApiError::Validation(_)));
    }

    #[test]
    fn test_map_auth_failure_server_error() {
        let error = SessionManager::map_auth_failure(StatusCode::INTERNAL_SERVER_ERROR, "", true);
        match error {
            ApiError::Server { status, .. } => assert_eq!(status, 500),
            other => panic!("expected Server, got {:?}", other),
        }
    }
}
