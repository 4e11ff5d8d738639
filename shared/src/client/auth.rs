use serde_json::json;

use super::ApiClient;
use crate::error::ApiResult;
use crate::http::{HttpClient, HttpMethod};
use crate::models::{LoginRequest, LoginResponse, User, UserEnvelope};

impl<C: HttpClient> ApiClient<C> {
    /// `POST /login`
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        let req = self.request(HttpMethod::Post, "/login").with_json(json!({
            "username": credentials.username,
            "password": credentials.password,
        }));
        self.fetch(req).await
    }

    /// `POST /logout`（需要 Bearer）
    pub async fn logout(&self) -> ApiResult<()> {
        self.execute(self.request(HttpMethod::Post, "/logout")).await
    }

    /// `GET /user`：当前令牌对应的用户
    pub async fn current_user(&self) -> ApiResult<User> {
        let envelope: UserEnvelope = self.fetch(self.request(HttpMethod::Get, "/user")).await?;
        Ok(envelope.into_user())
    }
}
