//! 表单校验与错误映射
//!
//! - 客户端校验：提交前拦截明显错误，返回与服务端相同形状的 `FormErrors`
//! - 服务端错误：字段级错误映射到对应输入框，其余归入一条提交区消息
//!
//! 失败时从不清空用户输入，调用方只替换错误状态。

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::date::BillingMonth;
use crate::error::{ApiError, ApiErrorKind};
use crate::http::FileUpload;
use crate::models::{AccountPayload, BillReceiptUpload, BillStatus, RecordId, StatusUpdate, UnitPayload};

pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
pub const SERVER_ERROR: &str = "The server encountered an error. Please try again.";
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from the server.";
const REQUIRED: &str = "This field is required.";

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_USERNAME_LEN: usize = 3;

pub const UNIT_FIELDS: &[&str] = &[
    "unit_number",
    "tenant_name",
    "submeter_number",
    "contact_number",
    "move_in_date",
];
pub const ACCOUNT_FIELDS: &[&str] = &[
    "name",
    "username",
    "email",
    "role",
    "password",
    "password_confirmation",
];
pub const RECEIPT_FIELDS: &[&str] = &["month", "total_amount", "total_kwh", "receipt"];
pub const STATUS_FIELDS: &[&str] = &["status", "method", "payment_date", "receipt"];

// =========================================================
// 错误状态
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors {
    fields: BTreeMap<String, String>,
    general: Option<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 将资源客户端的错误映射到表单
    ///
    /// `known_fields` 之外的字段错误不丢弃，合并为提交区的通用消息。
    pub fn from_api_error(err: &ApiError, known_fields: &[&str]) -> Self {
        let mut errors = Self::new();
        match err.kind() {
            ApiErrorKind::Transport => {
                errors.general = Some(NETWORK_ERROR.to_string());
                return errors;
            }
            ApiErrorKind::Server => {
                errors.general = Some(SERVER_ERROR.to_string());
                return errors;
            }
            ApiErrorKind::Decode => {
                errors.general = Some(UNEXPECTED_RESPONSE.to_string());
                return errors;
            }
            _ => {}
        }

        let mut unmapped = false;
        for (field, messages) in &err.field_errors {
            let Some(first) = messages.first() else {
                continue;
            };
            if known_fields.contains(&field.as_str()) {
                errors.fields.insert(field.clone(), first.clone());
            } else {
                unmapped = true;
            }
        }

        if unmapped || errors.fields.is_empty() {
            errors.general = Some(err.message.clone());
        }
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn set_field(&mut self, name: &str, message: impl Into<String>) {
        self.fields.insert(name.to_string(), message.into());
    }

    pub fn set_general(&mut self, message: impl Into<String>) {
        self.general = Some(message.into());
    }

    /// 用户修改某个输入框后清除该字段的错误
    pub fn clear_field(&mut self, name: &str) {
        self.fields.remove(name);
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.general = None;
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// 列表页内联错误使用的单行消息
pub fn inline_message(err: &ApiError) -> String {
    match err.kind() {
        ApiErrorKind::Transport => NETWORK_ERROR.to_string(),
        ApiErrorKind::Server => SERVER_ERROR.to_string(),
        ApiErrorKind::Decode => UNEXPECTED_RESPONSE.to_string(),
        _ => err.message.clone(),
    }
}

// =========================================================
// 单元
// =========================================================

pub fn validate_unit(payload: &UnitPayload) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    if payload.unit_number.trim().is_empty() {
        errors.set_field("unit_number", REQUIRED);
    }
    if let Some(contact) = non_blank(payload.contact_number.as_deref()) {
        let valid = contact
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
        if !valid {
            errors.set_field("contact_number", "Contact number may only contain digits.");
        }
    }
    if let Some(date) = non_blank(payload.move_in_date.as_deref()) {
        if parse_date(date).is_none() {
            errors.set_field("move_in_date", "Use the format YYYY-MM-DD.");
        }
    }
    errors.into_result(())
}

// =========================================================
// 账户
// =========================================================

/// 用户名格式：字母、数字、`_`、`.`、`-`，至少 3 个字符
pub fn username_format_error(username: &str) -> Option<&'static str> {
    let username = username.trim();
    if username.is_empty() {
        return Some(REQUIRED);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Some("Username must be at least 3 characters.");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Some("Username may only contain letters, numbers, dots, dashes and underscores.");
    }
    None
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// 新建时密码必填；编辑时留空表示不修改
pub fn validate_account(payload: &AccountPayload, creating: bool) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    if payload.name.trim().is_empty() {
        errors.set_field("name", REQUIRED);
    }
    if let Some(msg) = username_format_error(&payload.username) {
        errors.set_field("username", msg);
    }
    let email = payload.email.trim();
    if email.is_empty() {
        errors.set_field("email", REQUIRED);
    } else if !is_valid_email(email) {
        errors.set_field("email", "Enter a valid email address.");
    }

    match non_blank(payload.password.as_deref()) {
        None if creating => errors.set_field("password", REQUIRED),
        None => {}
        Some(password) => {
            if password.chars().count() < MIN_PASSWORD_LEN {
                errors.set_field("password", "Password must be at least 8 characters.");
            }
            if payload.password_confirmation.as_deref() != Some(password) {
                errors.set_field("password_confirmation", "Passwords do not match.");
            }
        }
    }
    errors.into_result(())
}

/// 用户名实时检查的状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UsernameCheck {
    #[default]
    Idle,
    Checking,
    Available,
    Taken,
    Invalid(&'static str),
    /// 检查请求失败，不阻止提交，交由服务端校验
    Unknown,
}

impl UsernameCheck {
    pub fn blocks_submit(&self) -> bool {
        matches!(self, UsernameCheck::Taken | UsernameCheck::Invalid(_))
    }
}

// =========================================================
// 主电表账单上传
// =========================================================

pub fn validate_receipt_upload(
    month: &str,
    total_amount: &str,
    total_kwh: &str,
    receipt: Option<FileUpload>,
) -> Result<BillReceiptUpload, FormErrors> {
    let mut errors = FormErrors::new();

    let month = match month.trim().parse::<BillingMonth>() {
        Ok(m) => Some(m),
        Err(_) => {
            errors.set_field("month", "Select a billing month.");
            None
        }
    };
    let total_amount = positive_number(total_amount);
    if total_amount.is_none() {
        errors.set_field("total_amount", "Enter an amount greater than zero.");
    }
    let total_kwh = positive_number(total_kwh);
    if total_kwh.is_none() {
        errors.set_field("total_kwh", "Enter the total kWh greater than zero.");
    }
    if receipt.is_none() {
        errors.set_field("receipt", "Attach the electricity bill receipt.");
    }

    match (month, total_amount, total_kwh) {
        (Some(month), Some(total_amount), Some(total_kwh)) if errors.is_empty() => {
            Ok(BillReceiptUpload {
                month,
                total_amount,
                total_kwh,
                receipt,
            })
        }
        _ => Err(errors),
    }
}

// =========================================================
// 账单状态变更
// =========================================================

/// 标记为已付时必须提供付款方式与日期
pub fn validate_status_update(
    id: RecordId,
    status: BillStatus,
    month: Option<BillingMonth>,
    method: &str,
    payment_date: &str,
    receipt: Option<FileUpload>,
) -> Result<StatusUpdate, FormErrors> {
    let mut errors = FormErrors::new();

    if status == BillStatus::Unknown {
        errors.set_field("status", "Select a status.");
    }

    let mut update = StatusUpdate::new(id, status);
    update.month = month;

    if status == BillStatus::Paid {
        match non_blank(Some(method)) {
            Some(m) => update.method = Some(m.to_string()),
            None => errors.set_field("method", "Select a payment method."),
        }
        match non_blank(Some(payment_date)).map(parse_date) {
            Some(Some(date)) => update.payment_date = Some(date),
            Some(None) => errors.set_field("payment_date", "Use the format YYYY-MM-DD."),
            None => errors.set_field("payment_date", "Enter the payment date."),
        }
        update.receipt = receipt;
    }

    errors.into_result(update)
}

// =========================================================
// 辅助函数
// =========================================================

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn positive_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn account(password: Option<&str>, confirmation: Option<&str>) -> AccountPayload {
        AccountPayload {
            name: "Ana Cruz".into(),
            username: "ana.cruz".into(),
            email: "ana@ongchad.ph".into(),
            role: Role::Admin,
            password: password.map(str::to_string),
            password_confirmation: confirmation.map(str::to_string),
        }
    }

    fn upload() -> Option<FileUpload> {
        Some(FileUpload {
            file_name: "bill.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![1],
        })
    }

    #[test]
    fn known_field_errors_map_onto_fields() {
        let err = ApiError::from_response(
            422,
            r#"{"message":"The given data was invalid.","errors":{"username":["Taken"],"email":["Bad"]}}"#,
        );
        let errors = FormErrors::from_api_error(&err, ACCOUNT_FIELDS);
        assert_eq!(errors.field("username"), Some("Taken"));
        assert_eq!(errors.field("email"), Some("Bad"));
        assert_eq!(errors.general(), None);
    }

    #[test]
    fn unmapped_field_errors_fall_back_to_general_message() {
        let err = ApiError::from_response(
            422,
            r#"{"message":"The given data was invalid.","errors":{"apartment_id":["Required"],"name":["Too long"]}}"#,
        );
        let errors = FormErrors::from_api_error(&err, ACCOUNT_FIELDS);
        assert_eq!(errors.field("name"), Some("Too long"));
        assert_eq!(errors.field("apartment_id"), None);
        assert_eq!(errors.general(), Some("The given data was invalid."));
    }

    #[test]
    fn transport_and_server_errors_become_retryable_banners() {
        let errors = FormErrors::from_api_error(&ApiError::transport("offline"), UNIT_FIELDS);
        assert_eq!(errors.general(), Some(NETWORK_ERROR));

        let errors = FormErrors::from_api_error(&ApiError::from_response(500, ""), UNIT_FIELDS);
        assert_eq!(errors.general(), Some(SERVER_ERROR));

        assert_eq!(inline_message(&ApiError::transport("x")), NETWORK_ERROR);
        assert_eq!(
            inline_message(&ApiError::from_response(403, r#"{"message":"Forbidden"}"#)),
            "Forbidden"
        );
    }

    #[test]
    fn unit_requires_number_and_valid_date() {
        let payload = UnitPayload {
            unit_number: "  ".into(),
            move_in_date: Some("05/01/2024".into()),
            contact_number: Some("0917 555 1234".into()),
            ..Default::default()
        };
        let errors = validate_unit(&payload).unwrap_err();
        assert_eq!(errors.field("unit_number"), Some(REQUIRED));
        assert!(errors.field("move_in_date").is_some());
        assert_eq!(errors.field("contact_number"), None);

        let ok = UnitPayload {
            unit_number: "101".into(),
            move_in_date: Some("2024-05-01".into()),
            ..Default::default()
        };
        assert!(validate_unit(&ok).is_ok());
    }

    #[test]
    fn account_password_rules() {
        assert!(validate_account(&account(Some("password1"), Some("password1")), true).is_ok());
        assert!(validate_account(&account(None, None), false).is_ok());

        let errors = validate_account(&account(None, None), true).unwrap_err();
        assert_eq!(errors.field("password"), Some(REQUIRED));

        let errors = validate_account(&account(Some("short"), Some("other")), false).unwrap_err();
        assert!(errors.field("password").is_some());
        assert!(errors.field("password_confirmation").is_some());
    }

    #[test]
    fn account_username_and_email_format() {
        let mut payload = account(None, None);
        payload.username = "a b".into();
        payload.email = "not-an-email".into();
        let errors = validate_account(&payload, false).unwrap_err();
        assert!(errors.field("username").is_some());
        assert_eq!(errors.field("email"), Some("Enter a valid email address."));

        assert_eq!(username_format_error("jo"), Some("Username must be at least 3 characters."));
        assert_eq!(username_format_error("juan_dc"), None);
        assert!(UsernameCheck::Taken.blocks_submit());
        assert!(!UsernameCheck::Unknown.blocks_submit());
    }

    #[test]
    fn receipt_upload_parses_inputs() {
        let upload_ok = validate_receipt_upload("2024-05", "15,230.50", "1200", upload()).unwrap();
        assert_eq!(upload_ok.total_amount, 15230.5);
        assert_eq!(upload_ok.month, BillingMonth::new(2024, 5).unwrap());

        let errors = validate_receipt_upload("", "0", "abc", None).unwrap_err();
        for field in RECEIPT_FIELDS {
            assert!(errors.field(field).is_some(), "{field}");
        }
    }

    #[test]
    fn paid_status_requires_method_and_date() {
        let errors =
            validate_status_update(1, BillStatus::Paid, None, " ", "", None).unwrap_err();
        assert!(errors.field("method").is_some());
        assert_eq!(errors.field("payment_date"), Some("Enter the payment date."));

        let update =
            validate_status_update(1, BillStatus::Paid, None, "gcash", "2024-06-02", upload())
                .unwrap();
        assert_eq!(update.method.as_deref(), Some("gcash"));
        assert_eq!(update.payment_date, NaiveDate::from_ymd_opt(2024, 6, 2));
        assert!(update.receipt.is_some());

        // 非已付状态忽略付款字段
        let update = validate_status_update(1, BillStatus::Sent, None, "gcash", "bad", upload())
            .unwrap();
        assert_eq!(update.method, None);
        assert!(update.receipt.is_none());
    }
}
