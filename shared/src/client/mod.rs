//! 资源客户端
//!
//! `ApiClient` 只负责「拼 URL → 带上令牌 → 发送 → 解析或返回 `ApiError`」，
//! 不做重试也不吞错误；如何向用户展示由调用方决定。
//! 各资源的端点分布在子模块中，均以 `impl<C: HttpClient> ApiClient<C>` 扩展。

mod accounts;
mod auth;
mod bills;
mod dashboard;
mod readings;
mod units;

#[cfg(test)]
mod tests;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::HEADER_AUTHORIZATION;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::models::DataEnvelope;

pub struct ApiClient<C> {
    http: C,
    config: ClientConfig,
    token: Option<String>,
}

impl<C: Clone> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            token: self.token.clone(),
        }
    }
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(http: C, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // 构建请求：统一带上 Accept 与 Bearer 认证头
    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let req = HttpRequest::new(&self.config.url(path), method)
            .with_header("Accept", "application/json");
        match &self.token {
            Some(token) => req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token)),
            None => req,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
    ) -> ApiResult<HttpRequest> {
        let body = serde_json::to_value(payload)
            .map_err(|e| ApiError::new(None, format!("failed to encode request body: {}", e)))?;
        Ok(self.request(method, path).with_json(body))
    }

    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let method = req.method;
        let url = req.url.clone();
        tracing::debug!(%method, %url, "api request");

        let resp = self.http.send(req).await.map_err(|e| {
            tracing::warn!(%method, %url, error = %e, "api request failed without response");
            e
        })?;

        tracing::debug!(%method, %url, status = resp.status, "api response");
        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: HttpRequest) -> ApiResult<T> {
        self.send(req).await?.json()
    }

    /// 列表接口：兼容裸数组与 `{data: [...]}`
    async fn fetch_list<T: DeserializeOwned>(&self, req: HttpRequest) -> ApiResult<Vec<T>> {
        let envelope: DataEnvelope<Vec<T>> = self.fetch(req).await?;
        Ok(envelope.into_inner())
    }

    /// 单条记录接口：兼容裸对象与 `{data: {...}}`
    async fn fetch_one<T: DeserializeOwned>(&self, req: HttpRequest) -> ApiResult<T> {
        let envelope: DataEnvelope<T> = self.fetch(req).await?;
        Ok(envelope.into_inner())
    }

    async fn execute(&self, req: HttpRequest) -> ApiResult<()> {
        self.send(req).await?.empty()
    }
}

/// 路径段转义（用户名可能包含空格等字符）
pub(crate) fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
