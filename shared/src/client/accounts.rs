use super::{ApiClient, encode_segment};
use crate::error::ApiResult;
use crate::http::{HttpClient, HttpMethod};
use crate::models::{Account, AccountPayload, RecordId, UsernameAvailability};

impl<C: HttpClient> ApiClient<C> {
    pub async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        self.fetch_list(self.request(HttpMethod::Get, "/accounts"))
            .await
    }

    pub async fn get_account(&self, id: RecordId) -> ApiResult<Account> {
        self.fetch_one(self.request(HttpMethod::Get, &format!("/accounts/{}", id)))
            .await
    }

    pub async fn create_account(&self, payload: &AccountPayload) -> ApiResult<Account> {
        let req = self.json_request(HttpMethod::Post, "/accounts", payload)?;
        self.fetch_one(req).await
    }

    pub async fn update_account(&self, id: RecordId, payload: &AccountPayload) -> ApiResult<Account> {
        let req = self.json_request(HttpMethod::Put, &format!("/accounts/{}", id), payload)?;
        self.fetch_one(req).await
    }

    pub async fn delete_account(&self, id: RecordId) -> ApiResult<()> {
        self.execute(self.request(HttpMethod::Delete, &format!("/accounts/{}", id)))
            .await
    }

    /// `GET /accounts/check-username/:username`
    pub async fn check_username(&self, username: &str) -> ApiResult<bool> {
        let path = format!("/accounts/check-username/{}", encode_segment(username.trim()));
        let availability: UsernameAvailability =
            self.fetch(self.request(HttpMethod::Get, &path)).await?;
        Ok(availability.available)
    }
}
