//! 角色枚举
//!
//! 后端返回的角色字符串大小写与分隔符并不统一（`Super Admin`、`super-admin`、
//! `SUPER_ADMIN` 都出现过），所有比较都只经过 `Role::normalize` 这一个入口。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    SuperAdmin,
    Admin,
    Viewer,
    /// 账户表单中可选，但没有任何路由授予该角色权限
    Accountant,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Viewer, Role::Accountant];

    /// 规范化角色字符串：去空白、转小写、`-`/空格 转 `_`
    pub fn normalize(raw: &str) -> Option<Role> {
        let canonical: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match canonical.as_str() {
            "super_admin" | "superadmin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "viewer" => Some(Role::Viewer),
            "accountant" => Some(Role::Accountant),
            _ => None,
        }
    }

    /// 线上格式
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Viewer => "viewer",
            Role::Accountant => "accountant",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
            Role::Viewer => "Viewer",
            Role::Accountant => "Accountant",
        }
    }

    /// 是否可以执行增删改操作
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::normalize(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_ignores_case_and_separators() {
        for raw in ["super_admin", "Super Admin", "SUPER-ADMIN", " superadmin "] {
            assert_eq!(Role::normalize(raw), Some(Role::SuperAdmin), "{raw}");
        }
        assert_eq!(Role::normalize("Viewer"), Some(Role::Viewer));
        assert_eq!(Role::normalize("ACCOUNTANT"), Some(Role::Accountant));
        assert_eq!(Role::normalize("owner"), None);
    }

    #[test]
    fn serde_round_trips_canonical_form() {
        let role: Role = serde_json::from_str(r#""Admin""#).unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), r#""admin""#);
        assert!(serde_json::from_str::<Role>(r#""tenant""#).is_err());
    }

    #[test]
    fn unknown_role_reports_raw_value() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("owner".into()));
        assert_eq!(err.to_string(), r#"unknown role: "owner""#);
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn only_admins_manage() {
        assert!(Role::SuperAdmin.can_manage());
        assert!(Role::Admin.can_manage());
        assert!(!Role::Viewer.can_manage());
        assert!(!Role::Accountant.can_manage());
    }
}
