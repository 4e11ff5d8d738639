use super::specs::{AccountList, FILTER_OCCUPIED, FILTER_VACANT, PaymentList, TenantBillList, UnitList};
use super::*;
use crate::models::{Account, BillStatus, Identified, TenantBill, Unit};
use crate::role::Role;

// =========================================================
// 辅助函数
// =========================================================

fn unit(id: u64, number: &str, tenant: Option<&str>) -> Unit {
    Unit {
        id,
        unit_number: number.to_string(),
        tenant_name: tenant.map(str::to_string),
        submeter_number: None,
        contact_number: None,
        move_in_date: None,
        created_at: None,
    }
}

fn scenario_units() -> Vec<Unit> {
    vec![unit(1, "101", Some("Alice")), unit(2, "9", Some(""))]
}

fn bill(id: u64, number: &str, amount: f64, status: BillStatus, method: Option<&str>) -> TenantBill {
    TenantBill {
        id,
        unit_id: Some(id),
        unit_number: number.to_string(),
        tenant_name: Some(format!("Tenant {}", id)),
        month: "2024-05".into(),
        previous_reading: 0.0,
        current_reading: 0.0,
        kwh_used: 0.0,
        amount,
        status,
        payment_method: method.map(str::to_string),
        payment_date: None,
        receipt_url: None,
    }
}

fn ids<R: Identified>(records: &[R]) -> Vec<u64> {
    records.iter().map(|r| r.id()).collect()
}

fn query(search: &str, filter: &str, sort_by: &str, order: SortOrder) -> ListQuery {
    ListQuery {
        search_term: search.into(),
        filter_value: filter.into(),
        sort_by: sort_by.into(),
        sort_order: order,
    }
}

// =========================================================
// 场景
// =========================================================

#[test]
fn test_unit_number_sorts_numerically() {
    let records = scenario_units();
    let q = query("", FILTER_ALL, "unit_number", SortOrder::Asc);
    assert_eq!(ids(&project(&records, &q, &UnitList)), [2, 1]);

    let q = q.with_order(SortOrder::Desc);
    assert_eq!(ids(&project(&records, &q, &UnitList)), [1, 2]);
}

#[test]
fn test_search_matches_tenant_name_case_insensitively() {
    let q = query("ALI", FILTER_ALL, "", SortOrder::Asc);
    assert_eq!(ids(&project(&scenario_units(), &q, &UnitList)), [1]);
}

#[test]
fn test_occupied_filter_excludes_blank_tenant() {
    let records = scenario_units();
    let q = query("", FILTER_OCCUPIED, "", SortOrder::Asc);
    assert_eq!(ids(&project(&records, &q, &UnitList)), [1]);

    let q = query("", FILTER_VACANT, "", SortOrder::Asc);
    assert_eq!(ids(&project(&records, &q, &UnitList)), [2]);
}

#[test]
fn test_failed_delete_leaves_record_and_sets_inline_error() {
    let mut page: ListPage<Unit> = ListPage::new();
    page.begin_load();
    page.finish_load(Ok(scenario_units()));

    assert!(page.begin_mutation(2));
    assert!(!page.begin_mutation(2), "duplicate submission must be refused");
    page.finish_mutation(2, Err("Network error. Please try again.".into()));

    assert_eq!(ids(&page.records), [1, 2]);
    assert_eq!(page.row_error(2), Some("Network error. Please try again."));
    assert_eq!(page.load, LoadState::Loaded);
    assert!(!page.is_mutating(2));

    // 其他行不受影响
    assert!(page.begin_mutation(1));
    page.finish_mutation(1, Ok(ListMutation::Remove(1)));
    assert_eq!(ids(&page.records), [2]);
}

// =========================================================
// 性质
// =========================================================

#[test]
fn test_search_is_substring_over_declared_fields() {
    let mut records = scenario_units();
    records.push(Unit {
        contact_number: Some("0917-555".into()),
        ..unit(3, "3B", None)
    });

    for term in ["", "a", "LIC", "10", "9", "555", "3b", "zzz", " ali ", " ali", "   "] {
        let q = query(term, FILTER_ALL, "", SortOrder::Asc);
        let got = ids(&project(&records, &q, &UnitList));
        let needle = term.to_lowercase();
        let expected: Vec<u64> = records
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || UnitList
                        .search_fields(u)
                        .into_iter()
                        .any(|f| f.unwrap_or_default().to_lowercase().contains(&needle))
            })
            .map(|u| u.id)
            .collect();
        assert_eq!(got, expected, "term {:?}", term);
    }
}

#[test]
fn test_filter_is_exact_or_pass_through() {
    let bills = vec![
        bill(1, "1", 100.0, BillStatus::Pending, None),
        bill(2, "2", 200.0, BillStatus::Paid, Some("GCash")),
        bill(3, "3", 300.0, BillStatus::Sent, None),
        bill(4, "4", 400.0, BillStatus::Paid, Some("cash")),
    ];

    let all = query("", FILTER_ALL, "", SortOrder::Asc);
    assert_eq!(project(&bills, &all, &TenantBillList).len(), bills.len());

    for status in BillStatus::SELECTABLE {
        let q = query("", status.as_str(), "", SortOrder::Asc);
        let got = ids(&project(&bills, &q, &TenantBillList));
        let expected: Vec<u64> = bills.iter().filter(|b| b.status == status).map(|b| b.id).collect();
        assert_eq!(got, expected, "{status}");
    }

    let paid = PaymentList::paid_only(&bills);
    let q = query("", "gcash", "", SortOrder::Asc);
    assert_eq!(ids(&project(&paid, &q, &PaymentList)), [2]);
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let bills = vec![
        bill(1, "1", 500.0, BillStatus::Pending, None),
        bill(2, "2", 100.0, BillStatus::Pending, None),
        bill(3, "3", 500.0, BillStatus::Pending, None),
        bill(4, "4", 100.0, BillStatus::Pending, None),
    ];

    let asc = project(&bills, &query("", FILTER_ALL, "amount", SortOrder::Asc), &TenantBillList);
    assert_eq!(ids(&asc), [2, 4, 1, 3]);

    let desc = project(&bills, &query("", FILTER_ALL, "amount", SortOrder::Desc), &TenantBillList);
    assert_eq!(ids(&desc), [1, 3, 2, 4]);
}

#[test]
fn test_reversing_order_reverses_unequal_comparisons() {
    let bills = vec![
        bill(1, "12", 0.0, BillStatus::Pending, None),
        bill(2, "3", 0.0, BillStatus::Pending, None),
        bill(3, "7A", 0.0, BillStatus::Pending, None),
    ];
    let asc = ids(&project(&bills, &query("", FILTER_ALL, "unit_number", SortOrder::Asc), &TenantBillList));
    let mut desc = ids(&project(&bills, &query("", FILTER_ALL, "unit_number", SortOrder::Desc), &TenantBillList));
    desc.reverse();
    assert_eq!(asc, [2, 3, 1]);
    assert_eq!(asc, desc);
}

#[test]
fn test_projection_is_idempotent_and_leaves_input_untouched() {
    let records = scenario_units();
    let snapshot = records.clone();
    let q = query("1", FILTER_ALL, "unit_number", SortOrder::Desc);

    let first = project(&records, &q, &UnitList);
    let second = project(&records, &q, &UnitList);
    assert_eq!(first, second);
    assert_eq!(records, snapshot);
}

#[test]
fn test_missing_fields_never_panic() {
    let records = vec![unit(1, "", None), unit(2, "x", None)];
    let q = query("abc", FILTER_ALL, "tenant_name", SortOrder::Asc);
    assert!(project(&records, &q, &UnitList).is_empty());
    assert!(project::<Unit, UnitList>(&[], &ListQuery::new("unit_number"), &UnitList).is_empty());
}

#[test]
fn test_account_role_filter_uses_normalized_role() {
    let accounts = vec![
        Account {
            id: 1,
            name: "Ana".into(),
            username: "ana".into(),
            email: "ana@x.ph".into(),
            role: Role::SuperAdmin,
            created_at: None,
        },
        Account {
            id: 2,
            name: "Bo".into(),
            username: "bo".into(),
            email: "bo@x.ph".into(),
            role: Role::Accountant,
            created_at: None,
        },
    ];
    let q = query("", "Super Admin", "name", SortOrder::Asc);
    assert_eq!(ids(&project(&accounts, &q, &AccountList)), [1]);
}

// =========================================================
// 查询状态 / 排序值
// =========================================================

#[test]
fn test_toggle_sort() {
    let mut q = ListQuery::new("unit_number");
    q.toggle_sort("unit_number");
    assert_eq!(q.sort_order, SortOrder::Desc);
    q.toggle_sort("unit_number");
    assert_eq!(q.sort_order, SortOrder::Asc);

    q.toggle_sort("unit_number");
    q.toggle_sort("tenant_name");
    assert_eq!(q.sort_by, "tenant_name");
    assert_eq!(q.sort_order, SortOrder::Asc);
}

#[test]
fn test_parse_int_follows_leading_digits() {
    let cases = [
        ("101", 101.0),
        ("  42abc", 42.0),
        ("-7", -7.0),
        ("+3", 3.0),
        ("A12", 0.0),
        ("", 0.0),
        ("12.9", 12.0),
    ];
    for (raw, expected) in cases {
        assert_eq!(SortValue::parse_int(Some(raw)), SortValue::Number(expected), "{raw:?}");
    }
    assert_eq!(SortValue::parse_int(None), SortValue::Number(0.0));

    // 超出 i64 的长数字串仍按数值排序
    let long = SortValue::parse_int(Some("99999999999999999999"));
    assert!(matches!(long, SortValue::Number(n) if n > 9.9e19));
    assert_eq!(long.compare(&SortValue::parse_int(Some("101"))), std::cmp::Ordering::Greater);
    assert!(matches!(SortValue::parse_int(Some("-99999999999999999999x")), SortValue::Number(n) if n < -9.9e19));
}

#[test]
fn test_empty_state_distinguishes_no_data_from_no_matches() {
    assert_eq!(empty_state(0, 0), Some(EmptyState::NoData));
    assert_eq!(empty_state(5, 0), Some(EmptyState::NoMatches));
    assert_eq!(empty_state(5, 2), None);

    assert!(query("x", FILTER_ALL, "", SortOrder::Asc).is_narrowed());
    assert!(!ListQuery::new("id").is_narrowed());
}

// =========================================================
// 局部变更 / 加载状态
// =========================================================

#[test]
fn test_apply_mutations() {
    let records = scenario_units();

    let inserted = apply(&records, ListMutation::Insert(unit(3, "12", Some("Cy"))));
    assert_eq!(ids(&inserted), [3, 1, 2]);

    let replaced = apply(&inserted, ListMutation::Replace(unit(1, "101", Some("Alicia"))));
    assert_eq!(replaced[1].tenant_name.as_deref(), Some("Alicia"));
    assert_eq!(replaced.len(), 3);

    let reinserted = apply(&replaced, ListMutation::Insert(unit(2, "9", Some("Dee"))));
    assert_eq!(ids(&reinserted), [3, 1, 2]);
    assert_eq!(reinserted[2].tenant_name.as_deref(), Some("Dee"));

    let removed = apply(&reinserted, ListMutation::Remove(1));
    assert_eq!(ids(&removed), [3, 2]);

    let untouched = apply(&removed, ListMutation::Remove(99));
    assert_eq!(untouched, removed);
}

#[test]
fn test_load_state_machine() {
    let mut page: ListPage<Unit> = ListPage::new();
    assert_eq!(page.load, LoadState::Idle);
    assert!(!page.retry(), "retry only applies to a failed load");

    assert!(page.begin_load());
    assert!(!page.begin_load());
    page.finish_load(Err("Server error".into()));
    assert_eq!(page.load.error(), Some("Server error"));
    assert!(page.records.is_empty());

    assert!(page.retry());
    assert!(page.load.is_loading());
    page.finish_load(Ok(scenario_units()));
    assert_eq!(page.load, LoadState::Loaded);
    assert_eq!(page.empty_state(0), Some(EmptyState::NoMatches));
}

#[test]
fn test_cancelled_mutation_releases_row_without_error() {
    let mut page: ListPage<Unit> = ListPage::new();
    page.begin_load();
    page.finish_load(Ok(scenario_units()));

    page.set_row_error(1, "Select a status.");
    assert!(page.begin_mutation(1));
    assert_eq!(page.row_error(1), None, "a new attempt clears the previous error");

    page.cancel_mutation(1);
    assert!(!page.is_mutating(1));
    assert_eq!(page.row_error(1), None);
    assert_eq!(ids(&page.records), [1, 2]);
}

#[test]
fn test_search_term_whitespace_is_significant() {
    let units = scenario_units();

    let padded = query(" ali", FILTER_ALL, "", SortOrder::Asc);
    assert!(project(&units, &padded, &UnitList).is_empty());
    assert!(padded.is_narrowed());

    let blank = query("   ", FILTER_ALL, "", SortOrder::Asc);
    assert!(project(&units, &blank, &UnitList).is_empty());
    assert!(blank.is_narrowed());
    assert_eq!(empty_state(units.len(), 0), Some(EmptyState::NoMatches));

    assert!(!ListQuery::new("unit_number").is_narrowed());
}
