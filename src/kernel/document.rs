//! 文档控制器
//!
//! 持有大纲树、事务日志与快照存储。所有结构修改都经由这里：
//! 先执行操作，再同步写快照，最后返回新的焦点节点。
//! 写快照失败返回 `DocumentError`，调用方应当终止进程，这里不做恢复。

use crate::kernel::services::ports::snapshot::{SnapshotError, SnapshotStore};
use crate::models::{NodeId, OutlineOp, OutlineTree, TransactionLog};

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug)]
pub enum DocumentError {
    Snapshot(SnapshotError),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Snapshot(e) => write!(f, "Persist document failed: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Snapshot(e) => Some(e),
        }
    }
}

impl From<SnapshotError> for DocumentError {
    fn from(e: SnapshotError) -> Self {
        DocumentError::Snapshot(e)
    }
}

/// 正在编辑的文本：草稿不写入树，结束时才提交 SetText
#[derive(Debug, Clone)]
struct EditSession {
    node: NodeId,
    original: String,
    draft: String,
}

pub struct Document<S> {
    tree: OutlineTree,
    history: TransactionLog<OutlineOp>,
    store: S,
    editing: Option<EditSession>,
}

impl<S: SnapshotStore> Document<S> {
    /// 读取快照；不存在时创建空文档并立即保存
    pub fn open(store: S) -> Result<Self> {
        let tree = match store.load()? {
            Some(node) => {
                tracing::info!(store = %store.describe(), "document loaded");
                OutlineTree::from_node(&node)
            }
            None => {
                let tree = OutlineTree::new();
                store.save(&tree.to_node())?;
                tracing::info!(store = %store.describe(), "document created");
                tree
            }
        };

        Ok(Self {
            tree,
            history: TransactionLog::new(),
            store,
            editing: None,
        })
    }

    pub fn tree(&self) -> &OutlineTree {
        &self.tree
    }

    pub fn history(&self) -> &TransactionLog<OutlineOp> {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.tree.focus()
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.tree.to_node()).map_err(|e| {
            tracing::error!(store = %self.store.describe(), error = %e, "save snapshot failed");
            DocumentError::from(e)
        })
    }

    // ==================== 事务 ====================

    pub fn commit(&mut self, op: OutlineOp) -> Result<NodeId> {
        let name = op.name();
        let focus = self.history.commit(op, &mut self.tree);
        self.save()?;
        tracing::debug!(op = name, cursor = self.history.cursor(), "commit");
        Ok(focus)
    }

    pub fn undo(&mut self) -> Result<Option<NodeId>> {
        self.finish_edit()?;
        let Some(focus) = self.history.undo(&mut self.tree) else {
            return Ok(None);
        };
        self.save()?;
        tracing::debug!(cursor = self.history.cursor(), "undo");
        Ok(Some(focus))
    }

    pub fn redo(&mut self) -> Result<Option<NodeId>> {
        self.finish_edit()?;
        let Some(focus) = self.history.redo(&mut self.tree) else {
            return Ok(None);
        };
        self.save()?;
        tracing::debug!(cursor = self.history.cursor(), "redo");
        Ok(Some(focus))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit_some(&mut self, op: Option<OutlineOp>) -> Result<Option<NodeId>> {
        match op {
            Some(op) => self.commit(op).map(Some),
            None => Ok(None),
        }
    }

    // ==================== 编辑操作 ====================

    /// 插入一个空节点，返回新节点
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        origin: Option<NodeId>,
    ) -> Result<Option<NodeId>> {
        let op = OutlineOp::insert_child(&mut self.tree, parent, index, "", origin);
        self.commit_some(op)
    }

    /// 在 `node` 前/后插入兄弟；根节点没有兄弟，改为追加最后一个子节点
    pub fn new_sibling(&mut self, node: NodeId, after: bool) -> Result<Option<NodeId>> {
        match self.tree.parent(node) {
            Some(parent) => {
                let Some(index) = self.tree.index_of(parent, node) else {
                    return Ok(None);
                };
                let index = if after { index + 1 } else { index };
                self.insert_child(parent, index, Some(node))
            }
            None => self.new_child(node),
        }
    }

    pub fn new_child(&mut self, node: NodeId) -> Result<Option<NodeId>> {
        let index = self.tree.child_count(node);
        self.insert_child(node, index, None)
    }

    /// 删除节点；删除根节点只在 reparent 且恰有一个子节点时可用（MergeRootUp）
    pub fn delete(
        &mut self,
        node: NodeId,
        reparent: bool,
        focus_forward: bool,
    ) -> Result<Option<NodeId>> {
        match self.tree.parent(node) {
            Some(parent) => {
                let op =
                    OutlineOp::delete_child(&self.tree, parent, node, reparent, focus_forward);
                self.commit_some(op)
            }
            None if node == self.tree.root() && reparent => self.merge_root_up(),
            None => Ok(None),
        }
    }

    pub fn can_delete(&self, node: NodeId, reparent: bool) -> bool {
        match self.tree.parent(node) {
            Some(_) => self.tree.is_attached(node),
            None => node == self.tree.root() && reparent && self.can_merge_root_up(),
        }
    }

    pub fn move_child(&mut self, node: NodeId, forward: bool) -> Result<Option<NodeId>> {
        let Some(parent) = self.tree.parent(node) else {
            return Ok(None);
        };
        let op = OutlineOp::move_child(&self.tree, parent, node, forward);
        self.commit_some(op)
    }

    pub fn can_move(&self, node: NodeId, forward: bool) -> bool {
        self.tree
            .parent(node)
            .and_then(|parent| OutlineOp::move_child(&self.tree, parent, node, forward))
            .is_some()
    }

    pub fn promote_to_new_parent(&mut self, node: NodeId) -> Result<Option<NodeId>> {
        let op = OutlineOp::promote_to_new_parent(&mut self.tree, node);
        self.commit_some(op)
    }

    pub fn merge_root_up(&mut self) -> Result<Option<NodeId>> {
        let op = OutlineOp::merge_root_up(&self.tree);
        self.commit_some(op)
    }

    pub fn can_merge_root_up(&self) -> bool {
        self.tree.child_count(self.tree.root()) == 1
    }

    /// 直接替换文本；与当前文本相同则不记录
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<Option<NodeId>> {
        let Some(old) = self.tree.text(node).map(str::to_owned) else {
            return Ok(None);
        };
        let op = OutlineOp::set_text(&self.tree, node, old, text.into());
        self.commit_some(op)
    }

    // ==================== 文本编辑会话 ====================

    /// 开始编辑：记录起始文本。已有会话时先提交旧会话。
    pub fn begin_edit(&mut self, node: NodeId) -> Result<bool> {
        self.finish_edit()?;
        let Some(text) = self.tree.text(node) else {
            return Ok(false);
        };
        self.editing = Some(EditSession {
            node,
            original: text.to_owned(),
            draft: text.to_owned(),
        });
        self.tree.request_focus(node);
        Ok(true)
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = self.editing.as_mut() {
            session.draft = text.into();
        }
    }

    pub fn editing_node(&self) -> Option<NodeId> {
        self.editing.as_ref().map(|s| s.node)
    }

    pub fn draft(&self) -> Option<&str> {
        self.editing.as_ref().map(|s| s.draft.as_str())
    }

    /// 结束编辑：草稿与起始文本不同才提交
    pub fn finish_edit(&mut self) -> Result<Option<NodeId>> {
        let Some(session) = self.editing.take() else {
            return Ok(None);
        };
        let op = OutlineOp::set_text(&self.tree, session.node, session.original, session.draft);
        if op.is_none() {
            self.tree.request_focus(session.node);
        }
        self.commit_some(op)
    }

    /// 放弃草稿
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.editing.take() {
            self.tree.request_focus(session.node);
        }
    }

    // ==================== 导航（不记录、不持久化） ====================

    pub fn focus_next(&mut self, node: NodeId, forward: bool) -> Option<NodeId> {
        let target = self.tree.navigate(node, forward)?;
        self.tree.request_focus(target);
        Some(target)
    }

    pub fn focus_parent(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.tree.parent(node)?;
        self.tree.request_focus(parent);
        Some(parent)
    }

    /// 聚焦中间的子节点；折叠时不可用
    pub fn focus_child(&mut self, node: NodeId) -> Option<NodeId> {
        if self.tree.is_collapsed(node) {
            return None;
        }
        let children = self.tree.children(node);
        let child = *children.get(children.len().checked_sub(1)? / 2)?;
        self.tree.request_focus(child);
        Some(child)
    }

    pub fn toggle_collapsed(&mut self, node: NodeId) -> bool {
        self.tree.toggle_collapsed(node)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/document.rs"]
mod tests;
