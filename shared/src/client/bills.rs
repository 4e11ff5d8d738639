use super::ApiClient;
use crate::date::BillingMonth;
use crate::error::ApiResult;
use crate::http::{HttpClient, HttpMethod};
use crate::models::{BillReceipt, BillReceiptUpload, RecordId, StatusUpdate, TenantBill};

const STATUS_UPDATE_PATH: &str = "/tenant-bills/update-status";

impl<C: HttpClient> ApiClient<C> {
    /// `POST /bills-receipts`，收据文件与结构化字段一起以 multipart 提交
    pub async fn upload_bill_receipt(&self, upload: &BillReceiptUpload) -> ApiResult<BillReceipt> {
        let req = self
            .request(HttpMethod::Post, "/bills-receipts")
            .with_multipart(upload.to_multipart());
        self.fetch_one(req).await
    }

    pub async fn list_bill_receipts(&self) -> ApiResult<Vec<BillReceipt>> {
        self.fetch_list(self.request(HttpMethod::Get, "/bills-receipts"))
            .await
    }

    pub async fn get_bill_receipt(&self, id: RecordId) -> ApiResult<BillReceipt> {
        self.fetch_one(self.request(HttpMethod::Get, &format!("/bills-receipts/{}", id)))
            .await
    }

    /// `GET /tenant-bills/month/:month`
    pub async fn tenant_bills_for_month(&self, month: BillingMonth) -> ApiResult<Vec<TenantBill>> {
        let path = format!("/tenant-bills/month/{}", month);
        self.fetch_list(self.request(HttpMethod::Get, &path)).await
    }

    /// `GET /tenant-bills/apartment/:id`
    pub async fn tenant_bills_for_apartment(&self, unit_id: RecordId) -> ApiResult<Vec<TenantBill>> {
        let path = format!("/tenant-bills/apartment/{}", unit_id);
        self.fetch_list(self.request(HttpMethod::Get, &path)).await
    }

    /// 账单状态变更（multipart）
    ///
    /// 后端只返回成功与否，不保证返回更新后的记录，所以这里只报告成功。
    pub async fn update_bill_status(&self, update: &StatusUpdate) -> ApiResult<()> {
        let req = self
            .request(HttpMethod::Post, STATUS_UPDATE_PATH)
            .with_multipart(update.to_multipart());
        self.execute(req).await
    }
}
