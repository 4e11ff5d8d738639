//! 时间类型模块
//!
//! - `BillingMonth`: 账单月份（`YYYY-MM`），用于路由参数、上传表单与排序
//! - `current_year()`: 读数历史页面的默认年份

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 账单月份
///
/// 线上格式固定为 `YYYY-MM`；也接受 `YYYY-MM-DD`（取其年月），
/// 因为部分接口返回完整日期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMonth(pub String);

impl fmt::Display for InvalidMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid billing month: {:?} (expected YYYY-MM)", self.0)
    }
}

impl std::error::Error for InvalidMonth {}

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// 当前月份（UTC）
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// 人类可读形式，如 `May 2024`
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl FromStr for BillingMonth {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let candidate = if trimmed.len() == 7 {
            format!("{}-01", trimmed)
        } else {
            trimmed.get(..10).unwrap_or(trimmed).to_string()
        };
        let date = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
            .map_err(|_| InvalidMonth(s.to_string()))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for BillingMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillingMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 今天的日期（UTC），`YYYY-MM-DD`
pub fn today_iso() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// 当前年份（UTC）
pub fn current_year() -> i32 {
    Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_and_full_dates() {
        let m: BillingMonth = "2024-05".parse().unwrap();
        assert_eq!((m.year(), m.month()), (2024, 5));

        let d: BillingMonth = "2024-05-17T08:00:00Z".parse().unwrap();
        assert_eq!(d, m);
        assert_eq!(m.to_string(), "2024-05");
    }

    #[test]
    fn rejects_invalid_months() {
        assert!("2024-13".parse::<BillingMonth>().is_err());
        assert!("May 2024".parse::<BillingMonth>().is_err());
        assert!("".parse::<BillingMonth>().is_err());
        assert!(BillingMonth::new(2024, 0).is_none());
    }

    #[test]
    fn previous_and_next_wrap_years() {
        let jan = BillingMonth::new(2024, 1).unwrap();
        assert_eq!(jan.previous().to_string(), "2023-12");
        assert_eq!(jan.previous().next(), jan);
        assert_eq!(jan.label(), "January 2024");
    }

    #[test]
    fn serde_uses_wire_format() {
        let m = BillingMonth::new(2023, 11).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), r#""2023-11""#);
        let back: BillingMonth = serde_json::from_str(r#""2023-11""#).unwrap();
        assert_eq!(back, m);
    }
}
