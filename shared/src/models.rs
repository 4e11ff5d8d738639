use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::BillingMonth;
use crate::http::{FileUpload, MultipartField};
use crate::role::Role;
use crate::serde_helper::{
    lenient_f64, lenient_opt_f64, lenient_opt_string, lenient_string, lenient_u64,
};

// =========================================================
// 通用 (Common)
// =========================================================

/// 记录主键，不可变，用于列表局部更新时的对齐
pub type RecordId = u64;

/// 带稳定 id 的记录
pub trait Identified {
    fn id(&self) -> RecordId;
}

/// 列表接口可能直接返回数组，也可能包在 `{data: [...]}` 里
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DataEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> DataEnvelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            DataEnvelope::Wrapped { data } => data,
            DataEnvelope::Bare(inner) => inner,
        }
    }
}

// =========================================================
// 认证 (Auth)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    /// 显示名：优先姓名，其次用户名，最后邮箱
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            username
        } else {
            &self.email
        }
    }
}

/// 登录请求，统一使用用户名作为登录标识
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// `GET /user` 可能直接返回用户，也可能包在 `{user: ...}` 里
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl UserEnvelope {
    pub(crate) fn into_user(self) -> User {
        match self {
            UserEnvelope::Wrapped { user } => user,
            UserEnvelope::Bare(user) => user,
        }
    }
}

// =========================================================
// 单元 (Units)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit_number: String,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub submeter_number: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub move_in_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Unit {
    /// 有租户姓名即视为已入住
    pub fn is_occupied(&self) -> bool {
        self.tenant_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitPayload {
    pub unit_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submeter_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<String>,
}

impl From<&Unit> for UnitPayload {
    fn from(unit: &Unit) -> Self {
        Self {
            unit_number: unit.unit_number.clone(),
            tenant_name: unit.tenant_name.clone(),
            submeter_number: unit.submeter_number.clone(),
            contact_number: unit.contact_number.clone(),
            move_in_date: unit.move_in_date.clone(),
        }
    }
}

// =========================================================
// 账户 (Accounts)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountPayload {
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// 更新时留空表示不修改密码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct UsernameAvailability {
    #[serde(alias = "is_available")]
    pub available: bool,
}

// =========================================================
// 账单 (Bills)
// =========================================================

/// 租户账单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Sent,
    Paid,
    Skipped,
    #[serde(other)]
    Unknown,
}

impl BillStatus {
    pub const SELECTABLE: [BillStatus; 4] = [
        BillStatus::Pending,
        BillStatus::Sent,
        BillStatus::Paid,
        BillStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Sent => "sent",
            BillStatus::Paid => "paid",
            BillStatus::Skipped => "skipped",
            BillStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "Pending",
            BillStatus::Sent => "Sent",
            BillStatus::Paid => "Paid",
            BillStatus::Skipped => "Skipped",
            BillStatus::Unknown => "Unknown",
        }
    }

    pub fn parse(raw: &str) -> Option<BillStatus> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(BillStatus::Pending),
            "sent" => Some(BillStatus::Sent),
            "paid" => Some(BillStatus::Paid),
            "skipped" => Some(BillStatus::Skipped),
            _ => None,
        }
    }

    /// 已付清或已跳过的账单不计入未付金额
    pub fn is_outstanding(&self) -> bool {
        matches!(self, BillStatus::Pending | BillStatus::Sent)
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 主电表的月度账单（上传的收据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillReceipt {
    pub id: RecordId,
    #[serde(default)]
    pub month: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_kwh: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub rate_per_kwh: Option<f64>,
    #[serde(default, alias = "receipt_path")]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl BillReceipt {
    pub fn billing_month(&self) -> Option<BillingMonth> {
        self.month.parse().ok()
    }

    /// 未下发单价时按 总金额 / 总度数 推算
    pub fn effective_rate(&self) -> Option<f64> {
        self.rate_per_kwh.or_else(|| {
            if self.total_kwh > 0.0 {
                Some(self.total_amount / self.total_kwh)
            } else {
                None
            }
        })
    }
}

/// 单个租户的月度账单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantBill {
    pub id: RecordId,
    #[serde(default)]
    pub unit_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit_number: String,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub month: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub previous_reading: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_reading: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kwh_used: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    pub status: BillStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default, alias = "receipt_path")]
    pub receipt_url: Option<String>,
}

/// 主电表账单上传（multipart）
#[derive(Debug, Clone, PartialEq)]
pub struct BillReceiptUpload {
    pub month: BillingMonth,
    pub total_amount: f64,
    pub total_kwh: f64,
    pub receipt: Option<FileUpload>,
}

impl BillReceiptUpload {
    pub fn to_multipart(&self) -> Vec<MultipartField> {
        let mut fields = vec![
            MultipartField::text("month", self.month.to_string()),
            MultipartField::text("total_amount", format_decimal(self.total_amount)),
            MultipartField::text("total_kwh", format_decimal(self.total_kwh)),
        ];
        if let Some(file) = &self.receipt {
            fields.push(MultipartField::file("receipt", file.clone()));
        }
        fields
    }
}

/// 账单状态变更（multipart，可附带付款凭证）
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub id: RecordId,
    pub status: BillStatus,
    pub month: Option<BillingMonth>,
    pub method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub receipt: Option<FileUpload>,
}

impl StatusUpdate {
    pub fn new(id: RecordId, status: BillStatus) -> Self {
        Self {
            id,
            status,
            month: None,
            method: None,
            payment_date: None,
            receipt: None,
        }
    }

    pub fn to_multipart(&self) -> Vec<MultipartField> {
        let mut fields = vec![
            MultipartField::text("id", self.id.to_string()),
            MultipartField::text("status", self.status.as_str()),
        ];
        if let Some(month) = &self.month {
            fields.push(MultipartField::text("month", month.to_string()));
        }
        if let Some(method) = self.method.as_deref().filter(|m| !m.trim().is_empty()) {
            fields.push(MultipartField::text("method", method));
        }
        if let Some(date) = &self.payment_date {
            fields.push(MultipartField::text(
                "payment_date",
                date.format("%Y-%m-%d").to_string(),
            ));
        }
        if let Some(file) = &self.receipt {
            fields.push(MultipartField::file("receipt", file.clone()));
        }
        fields
    }

    /// 在本地账单上应用本次变更（服务端成功后使用）
    pub fn apply_to(&self, bill: &TenantBill) -> TenantBill {
        let mut updated = bill.clone();
        updated.status = self.status;
        if self.status == BillStatus::Paid {
            updated.payment_method = self.method.clone();
            updated.payment_date = self.payment_date.map(|d| d.format("%Y-%m-%d").to_string());
        }
        updated
    }
}

fn format_decimal(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

// =========================================================
// 读数 (Readings)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub month: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub previous_reading: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_reading: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kwh_used: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub status: Option<BillStatus>,
}

// =========================================================
// 仪表盘 (Dashboard)
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub pending: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sent: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub skipped: u64,
    #[serde(default, rename = "activetenants", deserialize_with = "lenient_u64")]
    pub active_tenants: u64,
    #[serde(default, rename = "totaltenants", deserialize_with = "lenient_u64")]
    pub total_tenants: u64,
    #[serde(default, rename = "lastCalculated")]
    pub last_calculated: Option<String>,
    #[serde(default)]
    pub submeters: Vec<Submeter>,
    #[serde(default, rename = "unpaidTotalAmount", deserialize_with = "lenient_f64")]
    pub unpaid_total_amount: f64,
}

impl DashboardSummary {
    /// 入住率（0.0 ~ 1.0），无单元时为 0
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_tenants == 0 {
            0.0
        } else {
            self.active_tenants as f64 / self.total_tenants as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submeter {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit_number: String,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub current_reading: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub kwh_used: Option<f64>,
    #[serde(default)]
    pub status: Option<BillStatus>,
}

// =========================================================
// Identified 实现
// =========================================================

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                fn id(&self) -> RecordId {
                    self.id
                }
            }
        )*
    };
}

impl_identified!(User, Unit, Account, BillReceipt, TenantBill, Reading, Submeter);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MultipartValue;

    #[test]
    fn dashboard_uses_wire_names() {
        let json = r#"{
            "pending": 3, "sent": "5", "skipped": 0,
            "activetenants": 8, "totaltenants": 10,
            "lastCalculated": "2024-05-01",
            "submeters": [{"id": 1, "unit_number": 101, "current_reading": "1200.5"}],
            "unpaidTotalAmount": "4520.75"
        }"#;
        let summary: DashboardSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.sent, 5);
        assert_eq!(summary.active_tenants, 8);
        assert_eq!(summary.last_calculated.as_deref(), Some("2024-05-01"));
        assert_eq!(summary.submeters[0].unit_number, "101");
        assert_eq!(summary.submeters[0].current_reading, Some(1200.5));
        assert_eq!(summary.unpaid_total_amount, 4520.75);
        assert!((summary.occupancy_rate() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_bill_status_does_not_break_decoding() {
        let bill: TenantBill = serde_json::from_str(
            r#"{"id": 9, "unit_number": "3B", "month": "2024-05", "amount": "850", "status": "overdue"}"#,
        )
        .unwrap();
        assert_eq!(bill.status, BillStatus::Unknown);
        assert_eq!(bill.amount, 850.0);
    }

    #[test]
    fn unit_occupancy_ignores_blank_names() {
        let mut unit: Unit =
            serde_json::from_str(r#"{"id": 1, "unit_number": "101", "tenant_name": "  "}"#).unwrap();
        assert!(!unit.is_occupied());
        unit.tenant_name = Some("Alice".into());
        assert!(unit.is_occupied());
    }

    #[test]
    fn status_update_builds_multipart_fields() {
        let update = StatusUpdate {
            id: 4,
            status: BillStatus::Paid,
            month: "2024-05".parse().ok(),
            method: Some("gcash".into()),
            payment_date: NaiveDate::from_ymd_opt(2024, 6, 2),
            receipt: Some(FileUpload {
                file_name: "proof.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: vec![1, 2, 3],
            }),
        };
        let fields = update.to_multipart();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "status", "month", "method", "payment_date", "receipt"]);
        assert_eq!(fields[4].value, MultipartValue::Text("2024-06-02".into()));
        assert!(matches!(fields[5].value, MultipartValue::File(_)));
    }

    #[test]
    fn status_update_applies_payment_details_only_when_paid() {
        let bill: TenantBill =
            serde_json::from_str(r#"{"id": 4, "status": "sent", "payment_method": null}"#).unwrap();

        let mut update = StatusUpdate::new(4, BillStatus::Paid);
        update.method = Some("cash".into());
        update.payment_date = NaiveDate::from_ymd_opt(2024, 6, 2);
        let paid = update.apply_to(&bill);
        assert_eq!(paid.status, BillStatus::Paid);
        assert_eq!(paid.payment_method.as_deref(), Some("cash"));
        assert_eq!(paid.payment_date.as_deref(), Some("2024-06-02"));

        let skipped = StatusUpdate::new(4, BillStatus::Skipped).apply_to(&bill);
        assert_eq!(skipped.payment_method, None);
    }

    #[test]
    fn receipt_upload_formats_amounts() {
        let upload = BillReceiptUpload {
            month: BillingMonth::new(2024, 5).unwrap(),
            total_amount: 15230.5,
            total_kwh: 1200.0,
            receipt: None,
        };
        let fields = upload.to_multipart();
        assert_eq!(fields[1].value, MultipartValue::Text("15230.5".into()));
        assert_eq!(fields[2].value, MultipartValue::Text("1200".into()));
    }

    #[test]
    fn list_envelope_accepts_both_shapes() {
        let bare: DataEnvelope<Vec<Reading>> = serde_json::from_str(r#"[{"month":"2024-01"}]"#).unwrap();
        let wrapped: DataEnvelope<Vec<Reading>> =
            serde_json::from_str(r#"{"data":[{"month":"2024-01"}]}"#).unwrap();
        assert_eq!(bare.into_inner(), wrapped.into_inner());
    }
}
