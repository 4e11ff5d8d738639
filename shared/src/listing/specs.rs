//! 各列表页的字段定义

use super::{ListSpec, SortValue};
use crate::models::{Account, BillReceipt, BillStatus, Reading, TenantBill, Unit};
use crate::role::Role;

pub const FILTER_OCCUPIED: &str = "occupied";
pub const FILTER_VACANT: &str = "vacant";

// =========================================================
// 单元
// =========================================================

pub struct UnitList;

impl ListSpec<Unit> for UnitList {
    fn search_fields<'r>(&self, unit: &'r Unit) -> Vec<Option<&'r str>> {
        vec![
            Some(unit.unit_number.as_str()),
            unit.tenant_name.as_deref(),
            unit.submeter_number.as_deref(),
            unit.contact_number.as_deref(),
        ]
    }

    fn matches_filter(&self, unit: &Unit, filter: &str) -> bool {
        match filter {
            FILTER_OCCUPIED => unit.is_occupied(),
            FILTER_VACANT => !unit.is_occupied(),
            _ => true,
        }
    }

    fn sort_value(&self, unit: &Unit, key: &str) -> SortValue {
        match key {
            "unit_number" => SortValue::parse_int(Some(unit.unit_number.as_str())),
            "submeter_number" => SortValue::parse_int(unit.submeter_number.as_deref()),
            "tenant_name" => SortValue::text(unit.tenant_name.as_deref()),
            "move_in_date" => SortValue::text(unit.move_in_date.as_deref()),
            _ => SortValue::Number(unit.id as f64),
        }
    }
}

// =========================================================
// 账户
// =========================================================

pub struct AccountList;

impl ListSpec<Account> for AccountList {
    fn search_fields<'r>(&self, account: &'r Account) -> Vec<Option<&'r str>> {
        vec![
            Some(account.name.as_str()),
            Some(account.username.as_str()),
            Some(account.email.as_str()),
        ]
    }

    /// 按角色过滤，过滤值同样经过角色规范化
    fn matches_filter(&self, account: &Account, filter: &str) -> bool {
        Role::normalize(filter) == Some(account.role)
    }

    fn sort_value(&self, account: &Account, key: &str) -> SortValue {
        match key {
            "name" => SortValue::text(Some(account.name.as_str())),
            "username" => SortValue::text(Some(account.username.as_str())),
            "email" => SortValue::text(Some(account.email.as_str())),
            "role" => SortValue::text(Some(account.role.as_str())),
            "created_at" => SortValue::text(account.created_at.as_deref()),
            _ => SortValue::Number(account.id as f64),
        }
    }
}

// =========================================================
// 主电表账单
// =========================================================

pub struct BillReceiptList;

impl ListSpec<BillReceipt> for BillReceiptList {
    fn search_fields<'r>(&self, receipt: &'r BillReceipt) -> Vec<Option<&'r str>> {
        vec![Some(receipt.month.as_str()), receipt.created_at.as_deref()]
    }

    /// 过滤值为年份
    fn matches_filter(&self, receipt: &BillReceipt, filter: &str) -> bool {
        receipt.month.starts_with(filter)
    }

    fn sort_value(&self, receipt: &BillReceipt, key: &str) -> SortValue {
        match key {
            "month" => SortValue::text(Some(receipt.month.as_str())),
            "total_amount" => SortValue::Number(receipt.total_amount),
            "total_kwh" => SortValue::Number(receipt.total_kwh),
            "rate" => SortValue::Number(receipt.effective_rate().unwrap_or_default()),
            _ => SortValue::Number(receipt.id as f64),
        }
    }
}

// =========================================================
// 租户月度账单
// =========================================================

pub struct TenantBillList;

impl ListSpec<TenantBill> for TenantBillList {
    fn search_fields<'r>(&self, bill: &'r TenantBill) -> Vec<Option<&'r str>> {
        vec![Some(bill.unit_number.as_str()), bill.tenant_name.as_deref()]
    }

    fn matches_filter(&self, bill: &TenantBill, filter: &str) -> bool {
        BillStatus::parse(filter) == Some(bill.status)
    }

    fn sort_value(&self, bill: &TenantBill, key: &str) -> SortValue {
        tenant_bill_sort_value(bill, key)
    }
}

fn tenant_bill_sort_value(bill: &TenantBill, key: &str) -> SortValue {
    match key {
        "unit_number" => SortValue::parse_int(Some(bill.unit_number.as_str())),
        "tenant_name" => SortValue::text(bill.tenant_name.as_deref()),
        "month" => SortValue::text(Some(bill.month.as_str())),
        "kwh_used" => SortValue::Number(bill.kwh_used),
        "amount" => SortValue::Number(bill.amount),
        "status" => SortValue::text(Some(bill.status.as_str())),
        "payment_date" => SortValue::text(bill.payment_date.as_deref()),
        "payment_method" => SortValue::text(bill.payment_method.as_deref()),
        _ => SortValue::Number(bill.id as f64),
    }
}

// =========================================================
// 付款记录
// =========================================================

/// 付款页展示已付账单，按付款方式过滤
pub struct PaymentList;

impl PaymentList {
    /// 从租户账单中挑出已付款的记录
    pub fn paid_only(bills: &[TenantBill]) -> Vec<TenantBill> {
        bills
            .iter()
            .filter(|b| b.status == BillStatus::Paid)
            .cloned()
            .collect()
    }
}

impl ListSpec<TenantBill> for PaymentList {
    fn search_fields<'r>(&self, bill: &'r TenantBill) -> Vec<Option<&'r str>> {
        vec![
            Some(bill.unit_number.as_str()),
            bill.tenant_name.as_deref(),
            bill.payment_method.as_deref(),
            Some(bill.month.as_str()),
        ]
    }

    fn matches_filter(&self, bill: &TenantBill, filter: &str) -> bool {
        bill.payment_method
            .as_deref()
            .is_some_and(|m| m.trim().eq_ignore_ascii_case(filter.trim()))
    }

    fn sort_value(&self, bill: &TenantBill, key: &str) -> SortValue {
        tenant_bill_sort_value(bill, key)
    }
}

// =========================================================
// 读数历史
// =========================================================

pub struct ReadingList;

impl ListSpec<Reading> for ReadingList {
    fn search_fields<'r>(&self, reading: &'r Reading) -> Vec<Option<&'r str>> {
        vec![Some(reading.month.as_str())]
    }

    fn matches_filter(&self, reading: &Reading, filter: &str) -> bool {
        reading.status.is_some() && reading.status == BillStatus::parse(filter)
    }

    fn sort_value(&self, reading: &Reading, key: &str) -> SortValue {
        match key {
            "month" => SortValue::text(Some(reading.month.as_str())),
            "previous_reading" => SortValue::Number(reading.previous_reading),
            "current_reading" => SortValue::Number(reading.current_reading),
            "kwh_used" => SortValue::Number(reading.kwh_used),
            "amount" => SortValue::Number(reading.amount),
            _ => SortValue::Number(reading.id as f64),
        }
    }
}
