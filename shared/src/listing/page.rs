use std::collections::{HashMap, HashSet};

use super::mutation::{ListMutation, apply};
use super::{EmptyState, ListQuery, ListSpec, empty_state, project};
use crate::models::{Identified, RecordId};

/// 列表页加载状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// 尚未请求
    #[default]
    Idle,
    Loading,
    Loaded,
    /// 只能通过 `retry` 重新进入 `Loading`
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// 单个列表页拥有的数据副本与交互状态
///
/// 变更失败只写入该行的内联错误，不影响 `load`，其他行保持可操作。
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<R> {
    pub records: Vec<R>,
    pub load: LoadState,
    pub mutating: HashSet<RecordId>,
    pub row_errors: HashMap<RecordId, String>,
}

impl<R> Default for ListPage<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            load: LoadState::Idle,
            mutating: HashSet::new(),
            row_errors: HashMap::new(),
        }
    }
}

impl<R: Identified + Clone> ListPage<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始加载；已在加载中返回 `false`
    pub fn begin_load(&mut self) -> bool {
        if self.load.is_loading() {
            return false;
        }
        self.load = LoadState::Loading;
        true
    }

    pub fn finish_load(&mut self, result: Result<Vec<R>, String>) {
        match result {
            Ok(records) => {
                self.records = records;
                self.mutating.clear();
                self.row_errors.clear();
                self.load = LoadState::Loaded;
            }
            Err(message) => {
                self.load = LoadState::Failed(message);
            }
        }
    }

    /// 显式重试，仅在 `Failed` 时生效
    pub fn retry(&mut self) -> bool {
        if !matches!(self.load, LoadState::Failed(_)) {
            return false;
        }
        self.load = LoadState::Loading;
        true
    }

    pub fn is_mutating(&self, id: RecordId) -> bool {
        self.mutating.contains(&id)
    }

    /// 标记某行正在提交；重复提交返回 `false`
    pub fn begin_mutation(&mut self, id: RecordId) -> bool {
        if !self.mutating.insert(id) {
            return false;
        }
        self.row_errors.remove(&id);
        true
    }

    pub fn finish_mutation(&mut self, id: RecordId, result: Result<ListMutation<R>, String>) {
        self.mutating.remove(&id);
        match result {
            Ok(mutation) => {
                self.records = apply(&self.records, mutation);
            }
            Err(message) => {
                self.row_errors.insert(id, message);
            }
        }
    }

    /// 放弃在途标记且不记录行内错误（错误已在表单中展示）
    pub fn cancel_mutation(&mut self, id: RecordId) {
        self.mutating.remove(&id);
    }

    pub fn set_row_error(&mut self, id: RecordId, message: impl Into<String>) {
        self.row_errors.insert(id, message.into());
    }

    /// 表单提交成功后的局部更新（不经过逐行标记）
    pub fn apply(&mut self, mutation: ListMutation<R>) {
        self.row_errors.remove(&mutation.target());
        self.records = apply(&self.records, mutation);
    }

    pub fn row_error(&self, id: RecordId) -> Option<&str> {
        self.row_errors.get(&id).map(String::as_str)
    }

    pub fn clear_row_error(&mut self, id: RecordId) {
        self.row_errors.remove(&id);
    }

    pub fn project<S: ListSpec<R> + ?Sized>(&self, query: &ListQuery, spec: &S) -> Vec<R> {
        project(&self.records, query, spec)
    }

    pub fn empty_state(&self, visible: usize) -> Option<EmptyState> {
        empty_state(self.records.len(), visible)
    }
}
