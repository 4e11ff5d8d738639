use super::ApiClient;
use crate::error::ApiResult;
use crate::http::{HttpClient, HttpMethod};
use crate::models::{RecordId, Unit, UnitPayload};

impl<C: HttpClient> ApiClient<C> {
    pub async fn list_units(&self) -> ApiResult<Vec<Unit>> {
        self.fetch_list(self.request(HttpMethod::Get, "/units")).await
    }

    pub async fn get_unit(&self, id: RecordId) -> ApiResult<Unit> {
        self.fetch_one(self.request(HttpMethod::Get, &format!("/units/{}", id)))
            .await
    }

    pub async fn create_unit(&self, payload: &UnitPayload) -> ApiResult<Unit> {
        let req = self.json_request(HttpMethod::Post, "/units", payload)?;
        self.fetch_one(req).await
    }

    pub async fn update_unit(&self, id: RecordId, payload: &UnitPayload) -> ApiResult<Unit> {
        let req = self.json_request(HttpMethod::Put, &format!("/units/{}", id), payload)?;
        self.fetch_one(req).await
    }

    pub async fn delete_unit(&self, id: RecordId) -> ApiResult<()> {
        self.execute(self.request(HttpMethod::Delete, &format!("/units/{}", id)))
            .await
    }
}
