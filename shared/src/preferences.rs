//! 界面偏好（暗色模式）

use crate::STORAGE_DARK_MODE_KEY;
use crate::storage::KeyValueStore;

/// 只有 `"true"` 表示开启，缺失或其他任何值均视为关闭
pub fn load_dark_mode<S: KeyValueStore + ?Sized>(storage: &S) -> bool {
    storage
        .get(STORAGE_DARK_MODE_KEY)
        .is_some_and(|v| v.trim() == "true")
}

pub fn save_dark_mode<S: KeyValueStore + ?Sized>(storage: &S, enabled: bool) -> bool {
    let value = if enabled { "true" } else { "false" };
    let saved = storage.set(STORAGE_DARK_MODE_KEY, value);
    if !saved {
        tracing::warn!("failed to persist dark mode preference");
    }
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn dark_mode_round_trips_as_string() {
        let store = MemoryStore::new();
        assert!(!load_dark_mode(&store));

        save_dark_mode(&store, true);
        assert_eq!(store.get(STORAGE_DARK_MODE_KEY).as_deref(), Some("true"));
        assert!(load_dark_mode(&store));

        save_dark_mode(&store, false);
        assert!(!load_dark_mode(&store));
    }

    #[test]
    fn unexpected_values_read_as_light() {
        for raw in ["1", "TRUE", "yes", "", "{}"] {
            let store = MemoryStore::with_entries([(STORAGE_DARK_MODE_KEY, raw)]);
            assert!(!load_dark_mode(&store), "{raw:?}");
        }
    }
}
