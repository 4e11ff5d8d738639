use super::*;
use crate::error::ApiErrorKind;
use crate::http::{FileUpload, MockHttpClient, MultipartValue, RequestBody};
use crate::models::{
    AccountPayload, BillReceiptUpload, BillStatus, LoginRequest, StatusUpdate, UnitPayload,
};
use crate::role::Role;
use crate::date::BillingMonth;
use serde_json::json;

// =========================================================
// 辅助函数
// =========================================================

const BASE: &str = "https://bills.test/api";

fn client() -> ApiClient<MockHttpClient> {
    ApiClient::new(MockHttpClient::new(), ClientConfig::new(BASE))
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

// =========================================================
// 认证
// =========================================================

#[tokio::test]
async fn test_login_posts_username_and_password() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Post,
        &url("/login"),
        200,
        json!({"user": {"id": 1, "name": "Ana", "email": "ana@x.ph", "role": "admin"}, "token": "tok-1"}),
    );

    let resp = api
        .login(&LoginRequest {
            username: "ana".into(),
            password: "secret123".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.token, "tok-1");
    assert_eq!(resp.user.role, Role::Admin);

    let req = api.http().last_request().unwrap();
    assert_eq!(req.header("Authorization"), None);
    match req.body {
        Some(RequestBody::Json(body)) => {
            let v: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(v["username"], "ana");
            assert_eq!(v["password"], "secret123");
        }
        other => panic!("unexpected body: {:?}", other),
    }
}

#[tokio::test]
async fn test_bearer_token_is_attached_when_present() {
    let api = client().with_token("abc");
    api.http().mock_response(
        HttpMethod::Get,
        &url("/user"),
        200,
        json!({"user": {"id": 7, "name": "Bo", "role": "viewer"}}),
    );

    let user = api.current_user().await.unwrap();
    assert_eq!(user.id, 7);

    let req = api.http().last_request().unwrap();
    assert_eq!(req.header("authorization"), Some("Bearer abc"));
    assert_eq!(req.header("Accept"), Some("application/json"));
}

#[tokio::test]
async fn test_current_user_accepts_bare_user() {
    let api = client().with_token("abc");
    api.http().mock_response(
        HttpMethod::Get,
        &url("/user"),
        200,
        json!({"id": 3, "name": "Cy", "email": "cy@x.ph", "role": "Super Admin"}),
    );

    let user = api.current_user().await.unwrap();
    assert_eq!(user.role, Role::SuperAdmin);
}

#[tokio::test]
async fn test_unauthorized_is_reported_not_swallowed() {
    let api = client().with_token("expired");
    api.http().mock_response(
        HttpMethod::Get,
        &url("/user"),
        401,
        json!({"message": "Unauthenticated."}),
    );

    let err = api.current_user().await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Unauthorized);
    assert_eq!(err.message, "Unauthenticated.");
}

// =========================================================
// 资源 CRUD
// =========================================================

#[tokio::test]
async fn test_list_units_accepts_wrapped_payload() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Get,
        &url("/units"),
        200,
        json!({"data": [
            {"id": 1, "unit_number": "101", "tenant_name": "Alice"},
            {"id": 2, "unit_number": 9, "tenant_name": null}
        ]}),
    );

    let units = api.list_units().await.unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[1].unit_number, "9");
}

#[tokio::test]
async fn test_update_unit_sends_put_with_json() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Put,
        &url("/units/5"),
        200,
        json!({"id": 5, "unit_number": "5A", "tenant_name": "Dee"}),
    );

    let payload = UnitPayload {
        unit_number: "5A".into(),
        tenant_name: Some("Dee".into()),
        ..Default::default()
    };
    let unit = api.update_unit(5, &payload).await.unwrap();
    assert_eq!(unit.tenant_name.as_deref(), Some("Dee"));

    let req = api.http().last_request().unwrap();
    assert_eq!(req.method, HttpMethod::Put);
    match req.body {
        Some(RequestBody::Json(body)) => {
            let v: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(v["unit_number"], "5A");
            assert!(v.get("contact_number").is_none());
        }
        other => panic!("unexpected body: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_account_surfaces_field_errors() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Post,
        &url("/accounts"),
        422,
        json!({"message": "Validation failed", "errors": {"username": ["Taken"]}}),
    );

    let payload = AccountPayload {
        name: "Eve".into(),
        username: "eve".into(),
        email: "eve@x.ph".into(),
        role: Role::Viewer,
        password: Some("password1".into()),
        password_confirmation: Some("password1".into()),
    };
    let err = api.create_account(&payload).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Validation);
    assert_eq!(err.first_field_error("username"), Some("Taken"));
}

#[tokio::test]
async fn test_delete_network_failure_becomes_transport_error() {
    let api = client();
    api.http()
        .mock_network_failure(HttpMethod::Delete, &url("/accounts/4"));

    let err = api.delete_account(4).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Transport);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_check_username_escapes_segment() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Get,
        &url("/accounts/check-username/juan%20dc"),
        200,
        json!({"available": false}),
    );

    assert!(!api.check_username(" juan dc ").await.unwrap());
}

// =========================================================
// 账单 / 读数 / 仪表盘
// =========================================================

#[tokio::test]
async fn test_upload_receipt_uses_multipart() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Post,
        &url("/bills-receipts"),
        201,
        json!({"id": 11, "month": "2024-05", "total_amount": "15230.50", "total_kwh": 1200}),
    );

    let upload = BillReceiptUpload {
        month: BillingMonth::new(2024, 5).unwrap(),
        total_amount: 15230.5,
        total_kwh: 1200.0,
        receipt: Some(FileUpload {
            file_name: "meralco.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: b"%PDF".to_vec(),
        }),
    };
    let receipt = api.upload_bill_receipt(&upload).await.unwrap();
    assert_eq!(receipt.total_amount, 15230.5);

    let req = api.http().last_request().unwrap();
    match &req.body {
        Some(RequestBody::Multipart(fields)) => {
            let file = fields.iter().find(|f| f.name == "receipt").unwrap();
            assert!(matches!(&file.value, MultipartValue::File(f) if f.file_name == "meralco.pdf"));
        }
        other => panic!("unexpected body: {:?}", other),
    }
    // multipart 的 Content-Type 由浏览器设置（含 boundary）
    assert_eq!(req.header("Content-Type"), None);
}

#[tokio::test]
async fn test_tenant_bills_for_month_uses_month_path() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Get,
        &url("/tenant-bills/month/2024-05"),
        200,
        json!([{"id": 1, "unit_number": "101", "month": "2024-05", "amount": 900, "status": "pending"}]),
    );

    let bills = api
        .tenant_bills_for_month(BillingMonth::new(2024, 5).unwrap())
        .await
        .unwrap();
    assert_eq!(bills[0].status, BillStatus::Pending);
}

#[tokio::test]
async fn test_update_status_posts_multipart() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Post,
        &url("/tenant-bills/update-status"),
        200,
        json!({"success": true}),
    );

    let update = StatusUpdate::new(3, BillStatus::Sent);
    api.update_bill_status(&update).await.unwrap();

    let req = api.http().last_request().unwrap();
    assert!(matches!(req.body, Some(RequestBody::Multipart(ref f)) if f.len() == 2));
}

#[tokio::test]
async fn test_reading_history_and_dashboard() {
    let api = client();
    api.http().mock_response(
        HttpMethod::Get,
        &url("/reading-history/2/2024"),
        200,
        json!([{"month": "2024-01", "kwh_used": "120.5", "amount": 1500}]),
    );
    api.http().mock_response(
        HttpMethod::Get,
        &url("/dashboard"),
        200,
        json!({"pending": 2, "sent": 1, "skipped": 0, "activetenants": 3, "totaltenants": 4, "submeters": [], "unpaidTotalAmount": 0}),
    );

    let readings = api.reading_history(2, 2024).await.unwrap();
    assert_eq!(readings[0].kwh_used, 120.5);

    let summary = api.dashboard().await.unwrap();
    assert_eq!(summary.pending, 2);
    assert_eq!(api.http().request_count(), 2);
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let api = client();
    api.http()
        .mock_raw(HttpMethod::Get, &url("/units/1"), 200, "not json");

    let err = api.get_unit(1).await.unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Decode);
}
