//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、路径解析以及每个路由的角色允许列表。

use std::fmt::Display;

use ongchad_shared::{BillingMonth, RecordId, Role};

/// 管理与查看账单数据的角色
const STAFF: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Viewer];
/// 账户管理
const MANAGERS: &[Role] = &[Role::SuperAdmin, Role::Admin];

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    Login,
    /// 仪表盘（默认页，任意已认证角色）
    #[default]
    Dashboard,
    Units,
    UnitReadings {
        unit_id: RecordId,
    },
    Accounts,
    /// 主电表账单
    Bills,
    /// 某月的租户账单
    MonthlyBills {
        month: BillingMonth,
    },
    Payments,
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Self::Dashboard,
            ["login"] => Self::Login,
            ["units"] => Self::Units,
            ["units", id, "readings"] => match id.parse() {
                Ok(unit_id) => Self::UnitReadings { unit_id },
                Err(_) => Self::NotFound,
            },
            ["accounts"] => Self::Accounts,
            ["bills"] => Self::Bills,
            ["bills", "month", month] => match month.parse() {
                Ok(month) => Self::MonthlyBills { month },
                Err(_) => Self::NotFound,
            },
            ["payments"] => Self::Payments,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/".to_string(),
            Self::Units => "/units".to_string(),
            Self::UnitReadings { unit_id } => format!("/units/{}/readings", unit_id),
            Self::Accounts => "/accounts".to_string(),
            Self::Bills => "/bills".to_string(),
            Self::MonthlyBills { month } => format!("/bills/month/{}", month),
            Self::Payments => "/payments".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 角色允许列表，空表示任意已认证角色
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::Dashboard | Self::Login | Self::NotFound => &[],
            Self::Accounts => MANAGERS,
            Self::Units
            | Self::UnitReadings { .. }
            | Self::Bills
            | Self::MonthlyBills { .. }
            | Self::Payments => STAFF,
        }
    }

    /// 已认证用户是否应该离开此路由（登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 侧边栏导航项是否对该角色可见
    pub fn visible_to(&self, role: Role) -> bool {
        let allowed = self.allowed_roles();
        allowed.is_empty() || allowed.contains(&role)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 授权失败或登录成功后的默认页
    pub fn root() -> Self {
        Self::Dashboard
    }

    /// 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Units => "Units",
            Self::UnitReadings { .. } => "Reading History",
            Self::Accounts => "Accounts",
            Self::Bills => "Electricity Bills",
            Self::MonthlyBills { .. } => "Monthly Bills",
            Self::Payments => "Payments",
            Self::NotFound => "Not Found",
        }
    }

    /// 侧边栏导航项
    pub fn navigation() -> [AppRoute; 5] {
        [
            Self::Dashboard,
            Self::Units,
            Self::Bills,
            Self::Payments,
            Self::Accounts,
        ]
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip() {
        let routes = [
            AppRoute::Login,
            AppRoute::Dashboard,
            AppRoute::Units,
            AppRoute::UnitReadings { unit_id: 12 },
            AppRoute::Accounts,
            AppRoute::Bills,
            AppRoute::MonthlyBills {
                month: BillingMonth::new(2024, 5).unwrap(),
            },
            AppRoute::Payments,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route, "{route}");
        }
    }

    #[test]
    fn malformed_paths_are_not_found() {
        assert_eq!(AppRoute::from_path("/units/abc/readings"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/bills/month/2024-13"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/units/"), AppRoute::Units);
        assert_eq!(AppRoute::from_path("/?x=1"), AppRoute::Dashboard);
    }

    #[test]
    fn accountant_only_reaches_dashboard() {
        for route in AppRoute::navigation() {
            assert_eq!(route.visible_to(Role::Accountant), route == AppRoute::Dashboard, "{route}");
        }
        assert!(!AppRoute::Accounts.visible_to(Role::Viewer));
        assert!(AppRoute::Accounts.visible_to(Role::Admin));
    }
}
