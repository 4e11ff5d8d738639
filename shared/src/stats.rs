//! 列表页页脚/摘要卡片的汇总统计
//!
//! 均基于当前投影计算，与列表显示的内容保持一致。

use std::collections::BTreeMap;

use crate::models::{Account, BillReceipt, BillStatus, Reading, TenantBill, Unit};
use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitSummary {
    pub total: usize,
    pub occupied: usize,
    pub vacant: usize,
}

impl UnitSummary {
    pub fn from_units(units: &[Unit]) -> Self {
        let occupied = units.iter().filter(|u| u.is_occupied()).count();
        Self {
            total: units.len(),
            occupied,
            vacant: units.len() - occupied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillSummary {
    pub count: usize,
    pub total_amount: f64,
    pub paid_amount: f64,
    /// 待发送与已发送的金额之和
    pub unpaid_amount: f64,
    pub total_kwh: f64,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl BillSummary {
    pub fn from_bills(bills: &[TenantBill]) -> Self {
        let mut summary = Self {
            count: bills.len(),
            ..Self::default()
        };
        for bill in bills {
            summary.total_amount += bill.amount;
            summary.total_kwh += bill.kwh_used;
            match bill.status {
                BillStatus::Paid => summary.paid_amount += bill.amount,
                status if status.is_outstanding() => summary.unpaid_amount += bill.amount,
                _ => {}
            }
            *summary.by_status.entry(bill.status.as_str()).or_default() += 1;
        }
        summary
    }

    pub fn count_of(&self, status: BillStatus) -> usize {
        self.by_status.get(status.as_str()).copied().unwrap_or_default()
    }

    /// 已收金额占比（0.0 ~ 1.0）
    pub fn collection_rate(&self) -> f64 {
        if self.total_amount > 0.0 {
            self.paid_amount / self.total_amount
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceiptSummary {
    pub count: usize,
    pub total_amount: f64,
    pub total_kwh: f64,
}

impl ReceiptSummary {
    pub fn from_receipts(receipts: &[BillReceipt]) -> Self {
        receipts.iter().fold(
            Self {
                count: receipts.len(),
                ..Self::default()
            },
            |mut acc, r| {
                acc.total_amount += r.total_amount;
                acc.total_kwh += r.total_kwh;
                acc
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountSummary {
    pub total: usize,
    pub by_role: BTreeMap<&'static str, usize>,
}

impl AccountSummary {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let mut by_role = BTreeMap::new();
        for account in accounts {
            *by_role.entry(account.role.as_str()).or_default() += 1;
        }
        Self {
            total: accounts.len(),
            by_role,
        }
    }

    pub fn count_of(&self, role: Role) -> usize {
        self.by_role.get(role.as_str()).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadingSummary {
    pub months: usize,
    pub total_kwh: f64,
    pub total_amount: f64,
}

impl ReadingSummary {
    pub fn from_readings(readings: &[Reading]) -> Self {
        Self {
            months: readings.len(),
            total_kwh: readings.iter().map(|r| r.kwh_used).sum(),
            total_amount: readings.iter().map(|r| r.amount).sum(),
        }
    }

    pub fn average_kwh(&self) -> f64 {
        if self.months == 0 {
            0.0
        } else {
            self.total_kwh / self.months as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bills() -> Vec<TenantBill> {
        serde_json::from_value(json!([
            {"id": 1, "status": "paid", "amount": 1000, "kwh_used": 80},
            {"id": 2, "status": "pending", "amount": "500.50", "kwh_used": 40},
            {"id": 3, "status": "sent", "amount": 250, "kwh_used": 20},
            {"id": 4, "status": "skipped", "amount": 0, "kwh_used": 0}
        ]))
        .unwrap()
    }

    #[test]
    fn bill_summary_splits_paid_and_outstanding() {
        let summary = BillSummary::from_bills(&bills());
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total_amount, 1750.5);
        assert_eq!(summary.paid_amount, 1000.0);
        assert_eq!(summary.unpaid_amount, 750.5);
        assert_eq!(summary.total_kwh, 140.0);
        assert_eq!(summary.count_of(BillStatus::Skipped), 1);
        assert_eq!(summary.count_of(BillStatus::Unknown), 0);
    }

    #[test]
    fn empty_collections_produce_zeroes() {
        assert_eq!(BillSummary::from_bills(&[]).collection_rate(), 0.0);
        assert_eq!(ReadingSummary::from_readings(&[]).average_kwh(), 0.0);
        assert_eq!(UnitSummary::from_units(&[]), UnitSummary::default());
    }

    #[test]
    fn unit_and_account_summaries() {
        let units: Vec<Unit> = serde_json::from_value(json!([
            {"id": 1, "unit_number": "101", "tenant_name": "Alice"},
            {"id": 2, "unit_number": "102", "tenant_name": ""},
            {"id": 3, "unit_number": "103"}
        ]))
        .unwrap();
        let summary = UnitSummary::from_units(&units);
        assert_eq!((summary.total, summary.occupied, summary.vacant), (3, 1, 2));

        let accounts: Vec<Account> = serde_json::from_value(json!([
            {"id": 1, "role": "admin"},
            {"id": 2, "role": "viewer"},
            {"id": 3, "role": "Admin"}
        ]))
        .unwrap();
        let summary = AccountSummary::from_accounts(&accounts);
        assert_eq!(summary.count_of(Role::Admin), 2);
        assert_eq!(summary.count_of(Role::Accountant), 0);
    }

    #[test]
    fn reading_and_receipt_totals() {
        let readings: Vec<Reading> = serde_json::from_value(json!([
            {"month": "2024-01", "kwh_used": 100, "amount": 1200},
            {"month": "2024-02", "kwh_used": "50", "amount": 600}
        ]))
        .unwrap();
        let summary = ReadingSummary::from_readings(&readings);
        assert_eq!(summary.total_kwh, 150.0);
        assert_eq!(summary.average_kwh(), 75.0);

        let receipts: Vec<BillReceipt> = serde_json::from_value(json!([
            {"id": 1, "month": "2024-01", "total_amount": 1000, "total_kwh": 100},
            {"id": 2, "month": "2024-02", "total_amount": 500, "total_kwh": 50}
        ]))
        .unwrap();
        let summary = ReceiptSummary::from_receipts(&receipts);
        assert_eq!(summary.total_amount, 1500.0);
        assert_eq!(summary.count, 2);
    }
}
