use crate::models::{Identified, RecordId};

/// 变更成功后对本地集合的局部更新，避免整表重新拉取
#[derive(Debug, Clone, PartialEq)]
pub enum ListMutation<R> {
    /// 新建的记录放在最前；id 已存在时按替换处理
    Insert(R),
    /// 按 id 替换；不存在则忽略
    Replace(R),
    Remove(RecordId),
}

impl<R: Identified> ListMutation<R> {
    pub fn target(&self) -> RecordId {
        match self {
            ListMutation::Insert(r) | ListMutation::Replace(r) => r.id(),
            ListMutation::Remove(id) => *id,
        }
    }
}

/// reducer：`apply(records, mutation) -> records'`
pub fn apply<R: Identified + Clone>(records: &[R], mutation: ListMutation<R>) -> Vec<R> {
    match mutation {
        ListMutation::Insert(record) => {
            if records.iter().any(|r| r.id() == record.id()) {
                return apply(records, ListMutation::Replace(record));
            }
            let mut next = Vec::with_capacity(records.len() + 1);
            next.push(record);
            next.extend(records.iter().cloned());
            next
        }
        ListMutation::Replace(record) => records
            .iter()
            .map(|r| {
                if r.id() == record.id() {
                    record.clone()
                } else {
                    r.clone()
                }
            })
            .collect(),
        ListMutation::Remove(id) => records.iter().filter(|r| r.id() != id).cloned().collect(),
    }
}
