use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

// =========================================================
// 传输层错误
// =========================================================

/// 请求根本没有拿到 HTTP 响应（网络断开、CORS、fetch 被拒绝等）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// =========================================================
// 错误分类
// =========================================================

/// 错误语义分类，由状态码推导
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 没有响应
    Transport,
    /// 401: 凭据错误或令牌失效
    Unauthorized,
    /// 403: 已认证但无权限
    Forbidden,
    /// 404
    NotFound,
    /// 400/422: 请求校验失败（可能带字段级错误）
    Validation,
    /// 5xx
    Server,
    /// 响应体无法解析为预期结构
    Decode,
    /// 其余 4xx
    Other,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 资源客户端返回的错误
///
/// 对应后端的 `{status, data: {message?, errors?}}` 结构：
/// - status: HTTP 状态码（传输失败时为 `None`）
/// - message: 面向用户的消息
/// - field_errors: 字段级校验错误
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
    pub field_errors: BTreeMap<String, Vec<String>>,
    decode_failure: bool,
}

/// 后端错误响应体
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, FieldMessages>,
}

/// 字段错误既可能是字符串数组也可能是单个字符串
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    Many(Vec<String>),
    One(String),
}

impl FieldMessages {
    fn into_vec(self) -> Vec<String> {
        match self {
            FieldMessages::Many(v) => v,
            FieldMessages::One(s) => vec![s],
        }
    }
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field_errors: BTreeMap::new(),
            decode_failure: false,
        }
    }

    // --- Convenience constructors ---

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn decode(status: u16, message: impl Into<String>) -> Self {
        let mut e = Self::new(Some(status), message);
        e.decode_failure = true;
        e
    }

    /// 由非 2xx 响应构造，尽量从响应体中提取 message 与字段错误
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        Self {
            status: Some(status),
            message,
            field_errors: parsed
                .errors
                .into_iter()
                .map(|(field, msgs)| (field, msgs.into_vec()))
                .collect(),
            decode_failure: false,
        }
    }

    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    // --- Accessors ---

    pub fn kind(&self) -> ApiErrorKind {
        if self.decode_failure {
            return ApiErrorKind::Decode;
        }
        match self.status {
            None => ApiErrorKind::Transport,
            Some(401) => ApiErrorKind::Unauthorized,
            Some(403) => ApiErrorKind::Forbidden,
            Some(404) => ApiErrorKind::NotFound,
            Some(400) | Some(422) => ApiErrorKind::Validation,
            Some(s) if s >= 500 => ApiErrorKind::Server,
            Some(_) => ApiErrorKind::Other,
        }
    }

    /// 网络失败与 5xx 可以由用户手动重试
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ApiErrorKind::Transport | ApiErrorKind::Server)
    }

    pub fn has_field_errors(&self) -> bool {
        !self.field_errors.is_empty()
    }

    /// 某字段的第一条错误消息
    pub fn first_field_error(&self, field: &str) -> Option<&str> {
        self.field_errors
            .get(field)
            .and_then(|msgs| msgs.first())
            .map(String::as_str)
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::transport(e.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_is_parsed_into_field_errors() {
        let body = r#"{"message":"The given data was invalid.","errors":{"username":["The username has already been taken."],"email":"Invalid email"}}"#;
        let err = ApiError::from_response(422, body);

        assert_eq!(err.kind(), ApiErrorKind::Validation);
        assert_eq!(err.message, "The given data was invalid.");
        assert_eq!(
            err.first_field_error("username"),
            Some("The username has already been taken.")
        );
        assert_eq!(err.first_field_error("email"), Some("Invalid email"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn unparseable_body_gets_generic_message() {
        let err = ApiError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err.kind(), ApiErrorKind::Server);
        assert_eq!(err.message, "Request failed with status 502");
        assert!(err.is_retryable());
        assert!(!err.has_field_errors());
    }

    #[test]
    fn transport_errors_are_retryable() {
        let err: ApiError = TransportError::new("Failed to fetch").into();
        assert_eq!(err.kind(), ApiErrorKind::Transport);
        assert_eq!(err.status, None);
        assert!(err.is_retryable());
    }

    #[test]
    fn decode_failures_are_classified_separately() {
        let err = ApiError::decode(200, "missing field `id`");
        assert_eq!(err.kind(), ApiErrorKind::Decode);
        assert_eq!(err.status, Some(200));
    }
}
