//! 客户端配置
//!
//! 唯一的配置项是 API 基础地址，在构建时通过 `ONGCHAD_API_URL` 注入。

/// 未配置时使用同源的 `/api`
pub const DEFAULT_API_BASE_URL: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
}

impl ClientConfig {
    pub fn new(api_base_url: impl AsRef<str>) -> Self {
        let trimmed = api_base_url.as_ref().trim().trim_end_matches('/');
        let api_base_url = if trimmed.is_empty() {
            DEFAULT_API_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };
        Self { api_base_url }
    }

    /// 从构建期环境变量读取，读不到就用默认值
    pub fn from_build_env() -> Self {
        Self::new(option_env!("ONGCHAD_API_URL").unwrap_or(DEFAULT_API_BASE_URL))
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// 拼接完整 URL，保证基础地址与路径之间只有一个 `/`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_and_whitespace_are_trimmed() {
        let config = ClientConfig::new("  https://bills.example.com/api//  ");
        assert_eq!(config.api_base_url(), "https://bills.example.com/api");
        assert_eq!(
            config.url("/units/3"),
            "https://bills.example.com/api/units/3"
        );
        assert_eq!(config.url("units"), "https://bills.example.com/api/units");
    }

    #[test]
    fn blank_value_falls_back_to_default() {
        assert_eq!(ClientConfig::new("   ").api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(ClientConfig::default().url("/login"), "/api/login");
    }
}
