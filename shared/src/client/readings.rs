use super::ApiClient;
use crate::error::ApiResult;
use crate::http::{HttpClient, HttpMethod};
use crate::models::{Reading, RecordId};

impl<C: HttpClient> ApiClient<C> {
    /// `GET /reading-history/:id/:year`
    pub async fn reading_history(&self, unit_id: RecordId, year: i32) -> ApiResult<Vec<Reading>> {
        let path = format!("/reading-history/{}/{}", unit_id, year);
        self.fetch_list(self.request(HttpMethod::Get, &path)).await
    }
}
