//! 编辑历史（线性事务日志）
//!
//! - 条目是纯数据，`Transaction` 负责解释执行
//! - cursor 指向下一个 redo 位置
//! - Undo 之后提交新操作会截断 redo 分支，不保留历史分叉

/// 可逆操作：`apply` 与 `revert` 互为逆操作
pub trait Transaction {
    type Target;
    type Output;

    fn apply(&self, target: &mut Self::Target) -> Self::Output;
    fn revert(&self, target: &mut Self::Target) -> Self::Output;

    /// 已撤销的条目被新提交截断时调用，释放它独占的资源
    fn discard(self, _target: &mut Self::Target)
    where
        Self: Sized,
    {
    }
}

#[derive(Debug, Clone)]
pub struct TransactionLog<T> {
    items: Vec<T>,
    cursor: usize,
}

impl<T> TransactionLog<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.items.len()
    }

    /// 已生效的条目（`items[..cursor]`）
    pub fn entries(&self) -> &[T] {
        &self.items[..self.cursor]
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = 0;
    }
}

impl<T: Transaction> TransactionLog<T> {
    /// 执行并记录；丢弃 cursor 之后的 redo 条目
    pub fn commit(&mut self, item: T, target: &mut T::Target) -> T::Output {
        let output = item.apply(target);
        for stale in self.items.drain(self.cursor..) {
            stale.discard(target);
        }
        self.items.push(item);
        self.cursor += 1;
        output
    }

    pub fn undo(&mut self, target: &mut T::Target) -> Option<T::Output> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.items[self.cursor].revert(target))
    }

    pub fn redo(&mut self, target: &mut T::Target) -> Option<T::Output> {
        let item = self.items.get(self.cursor)?;
        let output = item.apply(target);
        self.cursor += 1;
        Some(output)
    }
}

impl<T> Default for TransactionLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/edit_history.rs"]
mod tests;
