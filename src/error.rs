//! 统一错误模型
//! 定义客户端错误分类和服务端错误响应的解析

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ApiError {
    /// 凭证错误（邮箱或密码不正确），不自动重试
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 输入校验失败，携带字段级错误消息
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// 传输层失败，调用方可以手动重试
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 刷新令牌已失效，会话被清除，需要重新登录
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// 其他服务端错误（403/404/5xx 等）
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 令牌存储读写失败
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server { status, message: message.into() }
    }

    pub fn validation_message(field: &str, message: &str) -> Self {
        let mut errors = ValidationErrors::default();
        errors.push(field, message);
        ApiError::Validation(errors)
    }

    /// 是否是终止会话的错误
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

/// 字段级校验错误集合
///
/// 键为字段名（DRF 的 `non_field_errors` 原样保留），值为该字段的
/// 全部错误消息。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(|v| v.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// 取第一条可展示的错误消息（字段错误优先于整体错误）
    pub fn first_message(&self) -> Option<&str> {
        let field_msg = self
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "non_field_errors")
            .flat_map(|(_, v)| v.iter())
            .next();

        field_msg
            .or_else(|| self.fields.get("non_field_errors").and_then(|v| v.first()))
            .map(|s| s.as_str())
    }

    /// 从 DRF 风格的错误响应体解析字段错误
    ///
    /// 接受 `{"field": ["msg", ...]}` 和 `{"field": "msg"}` 两种形式，
    /// `detail` 键不算字段错误。
    pub fn from_json(body: &Value) -> Self {
        let mut errors = ValidationErrors::default();
        let Some(object) = body.as_object() else {
            return errors;
        };

        for (field, value) in object {
            if field == "detail" {
                continue;
            }
            match value {
                Value::String(msg) => errors.push(field, msg),
                Value::Array(messages) => {
                    for msg in messages.iter().filter_map(Value::as_str) {
                        errors.push(field, msg);
                    }
                }
                _ => {}
            }
        }

        errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.first_message() {
            Some(msg) => write!(f, "{}", msg),
            None => write!(f, "invalid input"),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::default();
        for (field, field_errors) in source.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for {}", field));
                errors.push(&field, &message);
            }
        }
        errors
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(source: validator::ValidationErrors) -> Self {
        ApiError::Validation(source.into())
    }
}

/// 从错误响应体提取可展示的错误消息
///
/// 优先级：字段错误 > non_field_errors > detail > 原始文本。
pub(crate) fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let errors = ValidationErrors::from_json(&json);
        if let Some(msg) = errors.first_message() {
            return msg.to_string();
        }
        if let Some(detail) = json.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
    }

    if body.trim().is_empty() {
        format!("request failed with status {}", status)
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_preferred_over_detail() {
        let body = json!({
            "detail": "Bad request.",
            "email": ["A user with this email already exists."],
        });
        let errors = ValidationErrors::from_json(&body);
        assert_eq!(
            errors.first_message(),
            Some("A user with this email already exists.")
        );
    }

    #[test]
    fn test_non_field_errors_are_fallback() {
        let body = json!({
            "non_field_errors": ["Invalid credentials."],
            "email": ["Enter a valid email address."],
        });
        let errors = ValidationErrors::from_json(&body);
        // 字段错误优先
        assert_eq!(errors.first_message(), Some("Enter a valid email address."));

        let body = json!({"non_field_errors": ["Invalid credentials."]});
        let errors = ValidationErrors::from_json(&body);
        assert_eq!(errors.first_message(), Some("Invalid credentials."));
    }

    #[test]
    fn test_extract_message_falls_back_to_detail() {
        let msg = extract_error_message(403, r#"{"detail": "Access denied."}"#);
        assert_eq!(msg, "Access denied.");
    }

    #[test]
    fn test_extract_message_non_json_body() {
        let msg = extract_error_message(502, "Bad Gateway");
        assert_eq!(msg, "Bad Gateway");

        let msg = extract_error_message(500, "");
        assert_eq!(msg, "request failed with status 500");
    }

    #[test]
    fn test_string_field_error_form() {
        let body = json!({"password": "This field is required."});
        let errors = ValidationErrors::from_json(&body);
        assert_eq!(
            errors.field("password"),
            Some(&["This field is required.".to_string()][..])
        );
    }

    #[test]
    fn test_session_expired_is_distinct_from_invalid_credentials() {
        assert!(ApiError::SessionExpired.is_session_expired());
        assert!(!ApiError::InvalidCredentials.is_session_expired());
        assert_ne!(
            ApiError::SessionExpired.to_string(),
            ApiError::InvalidCredentials.to_string()
        );
    }
}
