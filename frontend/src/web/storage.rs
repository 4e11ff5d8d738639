//! LocalStorage 实现
//!
//! 会话与偏好均以原始字符串存储（用户对象自行序列化为 JSON），
//! 因此使用 `gloo-storage` 的 raw `web_sys::Storage`，避免再包一层 JSON。

use gloo_storage::{LocalStorage, Storage};
use ongchad_shared::storage::KeyValueStore;

/// 浏览器 LocalStorage
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        LocalStorage::raw().set_item(key, value).is_ok()
    }

    fn remove(&self, key: &str) -> bool {
        LocalStorage::raw().remove_item(key).is_ok()
    }
}
