use super::ApiClient;
use crate::error::ApiResult;
use crate::http::{HttpClient, HttpMethod};
use crate::models::DashboardSummary;

impl<C: HttpClient> ApiClient<C> {
    /// `GET /dashboard`：聚合计数
    pub async fn dashboard(&self) -> ApiResult<DashboardSummary> {
        self.fetch_one(self.request(HttpMethod::Get, "/dashboard"))
            .await
    }
}
