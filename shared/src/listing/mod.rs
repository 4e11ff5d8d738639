//! 列表视图模型
//!
//! 所有列表页（单元、账户、账单、付款、读数）共用的「搜索 → 过滤 → 排序」投影。
//! 每个页面只提供一个 `ListSpec`：可搜索字段、过滤谓词、排序取值。
//!
//! - `ListQuery`: 用户交互修改的查询状态，不跨导航持久化
//! - `project`: 纯函数，从 (records, query) 推导出投影
//! - `mutation`: 创建/更新/删除成功后的局部变更（reducer）
//! - `page`: 加载状态机与逐行的变更标记

mod mutation;
mod page;
pub mod specs;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;

pub use mutation::{ListMutation, apply};
pub use page::{ListPage, LoadState};

/// 「不过滤」的保留值
pub const FILTER_ALL: &str = "all";

// =========================================================
// 查询状态
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search_term: String,
    pub filter_value: String,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl ListQuery {
    pub fn new(sort_by: &str) -> Self {
        Self {
            search_term: String::new(),
            filter_value: FILTER_ALL.to_string(),
            sort_by: sort_by.to_string(),
            sort_order: SortOrder::Asc,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// 点击排序控件：同一列翻转方向，换列则重置为升序
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort_by == key {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_by = key.to_string();
            self.sort_order = SortOrder::Asc;
        }
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_value != FILTER_ALL
    }

    /// 搜索或过滤是否生效（用于区分两种空状态）
    pub fn is_narrowed(&self) -> bool {
        !self.search_term.is_empty() || self.is_filtering()
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new("")
    }
}

// =========================================================
// 排序取值
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    pub fn text(value: Option<&str>) -> Self {
        SortValue::Text(value.unwrap_or_default().to_string())
    }

    /// 与 `parseInt` 一致：取前导整数，解析失败为 0
    pub fn parse_int(raw: Option<&str>) -> Self {
        SortValue::Number(parse_leading_int(raw.unwrap_or_default()))
    }

    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            // 混合类型：数字排在文本之前
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// 逐位累加到 `f64`，超出整数范围的长数字串也不会退化为 0
fn parse_leading_int(raw: &str) -> f64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0.0_f64, |acc, b| acc * 10.0 + f64::from(b - b'0'));
    if negative { -value } else { value }
}

// =========================================================
// 投影
// =========================================================

/// 列表页的字段访问器
pub trait ListSpec<R> {
    /// 参与子串匹配的字段，缺失字段按空串处理
    fn search_fields<'r>(&self, record: &'r R) -> Vec<Option<&'r str>>;

    /// `filter` 不是 `FILTER_ALL` 时才会被调用
    fn matches_filter(&self, _record: &R, _filter: &str) -> bool {
        true
    }

    fn sort_value(&self, record: &R, key: &str) -> SortValue;
}

/// 从原始集合推导投影，原集合不被修改
///
/// 1. 搜索：任一字段（小写）包含搜索词（小写）
/// 2. 过滤：非 `all` 时按谓词
/// 3. 排序：稳定排序；降序翻转比较结果而不是翻转结果数组，保证相等元素保持原顺序
pub fn project<R: Clone, S: ListSpec<R> + ?Sized>(records: &[R], query: &ListQuery, spec: &S) -> Vec<R> {
    // 搜索词按原样匹配，不去除空白
    let needle = query.search_term.to_lowercase();

    let mut projection: Vec<R> = records
        .iter()
        .filter(|r| needle.is_empty() || matches_search(spec.search_fields(r), &needle))
        .filter(|r| !query.is_filtering() || spec.matches_filter(r, &query.filter_value))
        .cloned()
        .collect();

    if !query.sort_by.is_empty() {
        projection.sort_by(|a, b| {
            let ordering = spec
                .sort_value(a, &query.sort_by)
                .compare(&spec.sort_value(b, &query.sort_by));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    projection
}

fn matches_search(fields: Vec<Option<&str>>, needle: &str) -> bool {
    fields
        .into_iter()
        .any(|field| field.unwrap_or_default().to_lowercase().contains(needle))
}

// =========================================================
// 空状态
// =========================================================

/// 空列表的两种情况：真的没有数据（显示主操作按钮），或搜索/过滤无结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoData,
    NoMatches,
}

pub fn empty_state(total: usize, visible: usize) -> Option<EmptyState> {
    match (total, visible) {
        (0, _) => Some(EmptyState::NoData),
        (_, 0) => Some(EmptyState::NoMatches),
        _ => None,
    }
}
