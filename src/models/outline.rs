//! 大纲树数据模型
//!
//! - `Node`: 持久化快照的形状（文本 + 有序子节点），不存 parent
//! - `OutlineTree`: 可导航视图，slotmap arena + 弱 parent 反向索引 + UI 标记

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::ops::Range;

new_key_type! { pub struct NodeId; }

/// 快照节点：独占其子节点
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(text: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    /// 仅用于查找，不表示所有权
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Entry {
    fn new(text: String) -> Self {
        Self {
            text,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// 可导航的大纲树
///
/// 被编辑操作摘下的节点仍留在 arena 中（parent 为 `None`），
/// undo/redo 通过句柄把它们重新挂回树上。
pub struct OutlineTree {
    arena: SlotMap<NodeId, Entry>,
    root: NodeId,
    collapsed: FxHashSet<NodeId>,
    focus: Option<NodeId>,
}

impl OutlineTree {
    pub fn new() -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Entry::new(String::new()));
        Self {
            arena,
            root,
            collapsed: FxHashSet::default(),
            focus: Some(root),
        }
    }

    /// 从快照重建视图（UI 标记全部重置）
    pub fn from_node(node: &Node) -> Self {
        let mut tree = Self::new();
        let root = tree.root;
        if let Some(entry) = tree.arena.get_mut(root) {
            entry.text = node.text.clone();
        }

        let mut stack: Vec<(NodeId, &Node)> = vec![(root, node)];
        while let Some((id, snapshot)) = stack.pop() {
            let ids: Vec<NodeId> = snapshot
                .children
                .iter()
                .map(|child| tree.arena.insert(Entry::new(child.text.clone())))
                .collect();
            tree.insert_children(id, 0, &ids);
            stack.extend(ids.into_iter().zip(snapshot.children.iter()));
        }

        tree
    }

    /// 导出根节点快照
    pub fn to_node(&self) -> Node {
        self.subtree(self.root).unwrap_or_default()
    }

    /// 后序遍历构建快照，深度不受调用栈限制
    pub fn subtree(&self, id: NodeId) -> Option<Node> {
        self.arena.get(id)?;

        let mut built: Vec<Node> = Vec::new();
        let mut stack: Vec<(NodeId, bool)> = vec![(id, false)];
        while let Some((current, visited)) = stack.pop() {
            let Some(entry) = self.arena.get(current) else {
                continue;
            };
            if visited {
                let present = entry
                    .children
                    .iter()
                    .filter(|&&child| self.arena.contains_key(child))
                    .count();
                let start = built.len() - present;
                let children = built.split_off(start);
                built.push(Node::with_children(entry.text.clone(), children));
            } else {
                stack.push((current, true));
                stack.extend(entry.children.iter().rev().map(|&child| (child, false)));
            }
        }
        built.pop()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    /// 是否挂在根节点之下（根本身也算）
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.arena.get(current).and_then(|e| e.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// 挂在树上的节点数量
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children(id));
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|e| e.text.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, mut descendant: NodeId) -> bool {
        while let Some(parent) = self.parent(descendant) {
            if parent == ancestor {
                return true;
            }
            descendant = parent;
        }
        false
    }

    /// 分配一个游离节点，由 InsertChild 挂到树上
    pub fn alloc(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.insert(Entry::new(text.into()))
    }

    /// 释放一棵游离子树；挂在树上或仍有父节点的不动
    pub(crate) fn release(&mut self, id: NodeId) {
        if id == self.root || self.parent(id).is_some() || !self.contains(id) {
            return;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.arena.remove(current) {
                stack.extend(entry.children);
            }
            self.collapsed.remove(&current);
            if self.focus == Some(current) {
                self.focus = Some(self.root);
            }
        }
    }

    // ==================== 结构原语 ====================

    pub(crate) fn set_text(&mut self, id: NodeId, text: String) -> Option<String> {
        self.arena
            .get_mut(id)
            .map(|e| std::mem::replace(&mut e.text, text))
    }

    /// 在 `index` 处插入子节点（`index` 允许等于长度）
    pub(crate) fn insert_children(&mut self, parent: NodeId, index: usize, ids: &[NodeId]) {
        let Some(entry) = self.arena.get_mut(parent) else {
            return;
        };
        debug_assert!(index <= entry.children.len());
        entry
            .children
            .splice(index..index, ids.iter().copied());

        for &id in ids {
            if let Some(child) = self.arena.get_mut(id) {
                child.parent = Some(parent);
            }
        }
    }

    /// 摘下一段子节点，返回时它们已成为游离节点
    pub(crate) fn remove_children(&mut self, parent: NodeId, range: Range<usize>) -> Vec<NodeId> {
        let Some(entry) = self.arena.get_mut(parent) else {
            return Vec::new();
        };
        debug_assert!(range.end <= entry.children.len());
        let removed: Vec<NodeId> = entry.children.drain(range).collect();

        for &id in &removed {
            if let Some(child) = self.arena.get_mut(id) {
                child.parent = None;
            }
        }
        removed
    }

    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let len = self.child_count(id);
        self.remove_children(id, 0..len)
    }

    pub(crate) fn swap_children(&mut self, parent: NodeId, i: usize, j: usize) {
        if let Some(entry) = self.arena.get_mut(parent) {
            entry.children.swap(i, j);
        }
    }

    // ==================== UI 标记 ====================

    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn request_focus(&mut self, id: NodeId) {
        if self.arena.contains_key(id) {
            self.focus = Some(id);
        }
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.contains(&id)
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) {
        if collapsed {
            self.collapsed.insert(id);
        } else {
            self.collapsed.remove(&id);
        }
    }

    /// 只有带子节点的节点才能折叠
    pub fn toggle_collapsed(&mut self, id: NodeId) -> bool {
        let collapsed = !self.is_collapsed(id) && self.child_count(id) > 0;
        self.set_collapsed(id, collapsed);
        collapsed
    }

    // ==================== 导航 ====================

    /// 按显示顺序找相邻节点
    ///
    /// 有同级兄弟时直接返回；否则递归找父节点的相邻节点，
    /// 再下降到它的最后一个（向上）或第一个（向下）子节点。
    pub fn next_node(&self, id: NodeId, forward: bool) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;

        let target = if forward {
            index.checked_add(1).filter(|&i| i < siblings.len())
        } else {
            index.checked_sub(1)
        };
        if let Some(i) = target {
            return Some(siblings[i]);
        }

        let cousin = self.next_node(parent, forward)?;
        let cousins = self.children(cousin);
        let descend = if forward {
            cousins.first()
        } else {
            cousins.last()
        };
        Some(descend.copied().unwrap_or(cousin))
    }

    /// 路径上最浅的折叠节点；没有折叠祖先时返回自身
    pub fn shallowest_collapsed(&self, id: NodeId) -> NodeId {
        let mut result = id;
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is_collapsed(node) {
                result = node;
            }
            current = self.parent(node);
        }
        result
    }

    /// 焦点移动：不会落进被折叠隐藏的子树
    pub fn navigate(&self, id: NodeId, forward: bool) -> Option<NodeId> {
        self.next_node(id, forward)
            .map(|next| self.shallowest_collapsed(next))
    }
}

impl Default for OutlineTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub id: NodeId,
    pub depth: u16,
    pub text: String,
    pub child_count: usize,
    pub is_collapsed: bool,
    pub is_focused: bool,
}

impl OutlineTree {
    /// 深度优先展开为行，折叠节点的子树不展开
    pub fn outline_rows(&self) -> Vec<OutlineRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(entry) = self.arena.get(id) else {
                continue;
            };
            let is_collapsed = self.is_collapsed(id);
            result.push(OutlineRow {
                id,
                depth,
                text: entry.text.clone(),
                child_count: entry.children.len(),
                is_collapsed,
                is_focused: self.focus == Some(id),
            });

            if !is_collapsed {
                for &child in entry.children.iter().rev() {
                    stack.push((child, depth.saturating_add(1)));
                }
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/outline.rs"]
mod tests;
