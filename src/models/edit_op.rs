//! 大纲编辑操作
//!
//! 每个变体携带正反两个方向需要的全部数据（句柄、下标、旧文本），
//! 不捕获任何闭包。构造函数同时是可用性检查：前置条件不满足时返回 `None`。

use super::edit_history::Transaction;
use super::outline::{NodeId, OutlineTree};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutlineOp {
    InsertChild {
        parent: NodeId,
        index: usize,
        node: NodeId,
        /// undo 后焦点回到这里；`None` 时回到 parent
        origin: Option<NodeId>,
        parent_was_collapsed: bool,
    },
    DeleteChild {
        parent: NodeId,
        child: NodeId,
        index: usize,
        reparent: bool,
        focus_forward: bool,
        /// reparent 时被拼接到 parent 中的孙节点个数
        spliced: usize,
    },
    MoveChild {
        parent: NodeId,
        child: NodeId,
        /// 交换 `upper` 与 `upper + 1`
        upper: usize,
    },
    PromoteToNewParent {
        node: NodeId,
        intermediate: NodeId,
        text: String,
    },
    MergeRootUp {
        root: NodeId,
        only_child: NodeId,
        root_text: String,
        child_text: String,
    },
    SetText {
        node: NodeId,
        old: String,
        new: String,
    },
}

impl OutlineOp {
    /// 新节点在这里分配，每个 InsertChild 独占自己的节点
    pub fn insert_child(
        tree: &mut OutlineTree,
        parent: NodeId,
        index: usize,
        text: impl Into<String>,
        origin: Option<NodeId>,
    ) -> Option<Self> {
        if !tree.is_attached(parent) || index > tree.child_count(parent) {
            return None;
        }
        let node = tree.alloc(text);

        Some(Self::InsertChild {
            parent,
            index,
            node,
            origin: origin.filter(|&o| tree.contains(o)),
            parent_was_collapsed: tree.is_collapsed(parent),
        })
    }

    pub fn delete_child(
        tree: &OutlineTree,
        parent: NodeId,
        child: NodeId,
        reparent: bool,
        focus_forward: bool,
    ) -> Option<Self> {
        if !tree.is_attached(parent) {
            return None;
        }
        let index = tree.index_of(parent, child)?;
        let spliced = if reparent { tree.child_count(child) } else { 0 };

        Some(Self::DeleteChild {
            parent,
            child,
            index,
            reparent,
            focus_forward,
            spliced,
        })
    }

    pub fn move_child(
        tree: &OutlineTree,
        parent: NodeId,
        child: NodeId,
        forward: bool,
    ) -> Option<Self> {
        if !tree.is_attached(parent) {
            return None;
        }
        let index = tree.index_of(parent, child)?;
        let upper = if forward {
            (index + 1 < tree.child_count(parent)).then_some(index)?
        } else {
            index.checked_sub(1)?
        };

        Some(Self::MoveChild {
            parent,
            child,
            upper,
        })
    }

    /// 分配中间节点，需要可变借用
    pub fn promote_to_new_parent(tree: &mut OutlineTree, node: NodeId) -> Option<Self> {
        if !tree.is_attached(node) {
            return None;
        }
        let text = tree.text(node)?.to_owned();
        let intermediate = tree.alloc(text.clone());

        Some(Self::PromoteToNewParent {
            node,
            intermediate,
            text,
        })
    }

    /// 仅当根节点恰好有一个子节点时可用
    pub fn merge_root_up(tree: &OutlineTree) -> Option<Self> {
        let root = tree.root();
        let &[only_child] = tree.children(root) else {
            return None;
        };

        Some(Self::MergeRootUp {
            root,
            only_child,
            root_text: tree.text(root)?.to_owned(),
            child_text: tree.text(only_child)?.to_owned(),
        })
    }

    /// 文本未变化时不生成操作
    pub fn set_text(tree: &OutlineTree, node: NodeId, old: String, new: String) -> Option<Self> {
        if old == new || !tree.is_attached(node) {
            return None;
        }
        Some(Self::SetText { node, old, new })
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutlineOp::InsertChild { .. } => "insertChild",
            OutlineOp::DeleteChild { .. } => "deleteChild",
            OutlineOp::MoveChild { .. } => "moveChild",
            OutlineOp::PromoteToNewParent { .. } => "promoteToNewParent",
            OutlineOp::MergeRootUp { .. } => "mergeRootUp",
            OutlineOp::SetText { .. } => "setText",
        }
    }
}

impl Transaction for OutlineOp {
    type Target = OutlineTree;
    type Output = NodeId;

    fn apply(&self, tree: &mut OutlineTree) -> NodeId {
        let focus = match self {
            OutlineOp::InsertChild {
                parent,
                index,
                node,
                ..
            } => {
                tree.insert_children(*parent, *index, &[*node]);
                tree.set_collapsed(*parent, false);
                *node
            }
            OutlineOp::DeleteChild {
                parent,
                child,
                index,
                reparent,
                focus_forward,
                ..
            } => {
                let (parent, index) = (*parent, *index);
                tree.remove_children(parent, index..index + 1);

                if *reparent {
                    let moved = tree.take_children(*child);
                    tree.insert_children(parent, index, &moved);
                    match moved.len() {
                        0 => parent,
                        n => moved[(n - 1) / 2],
                    }
                } else {
                    let siblings = tree.children(parent);
                    if siblings.is_empty() {
                        parent
                    } else {
                        let mut i = index;
                        if (!*focus_forward && i > 0) || i == siblings.len() {
                            i -= 1;
                        }
                        siblings[i]
                    }
                }
            }
            OutlineOp::MoveChild {
                parent,
                child,
                upper,
            } => {
                tree.swap_children(*parent, *upper, *upper + 1);
                *child
            }
            OutlineOp::PromoteToNewParent {
                node,
                intermediate,
                text,
            } => {
                let children = tree.take_children(*node);
                tree.insert_children(*intermediate, 0, &children);
                tree.set_text(*intermediate, text.clone());
                tree.set_text(*node, String::new());
                tree.insert_children(*node, 0, &[*intermediate]);
                *node
            }
            OutlineOp::MergeRootUp {
                root,
                only_child,
                child_text,
                ..
            } => {
                tree.remove_children(*root, 0..1);
                let grandchildren = tree.take_children(*only_child);
                tree.insert_children(*root, 0, &grandchildren);
                tree.set_text(*root, child_text.clone());
                *root
            }
            OutlineOp::SetText { node, new, .. } => {
                tree.set_text(*node, new.clone());
                *node
            }
        };

        tree.request_focus(focus);
        focus
    }

    fn revert(&self, tree: &mut OutlineTree) -> NodeId {
        let focus = match self {
            OutlineOp::InsertChild {
                parent,
                index,
                origin,
                parent_was_collapsed,
                ..
            } => {
                tree.remove_children(*parent, *index..*index + 1);
                tree.set_collapsed(*parent, *parent_was_collapsed);
                origin.unwrap_or(*parent)
            }
            OutlineOp::DeleteChild {
                parent,
                child,
                index,
                reparent,
                spliced,
                ..
            } => {
                if *reparent {
                    let moved = tree.remove_children(*parent, *index..*index + *spliced);
                    tree.insert_children(*child, 0, &moved);
                }
                tree.insert_children(*parent, *index, &[*child]);
                *child
            }
            OutlineOp::MoveChild {
                parent,
                child,
                upper,
            } => {
                tree.swap_children(*parent, *upper, *upper + 1);
                *child
            }
            OutlineOp::PromoteToNewParent {
                node,
                intermediate,
                text,
            } => {
                tree.remove_children(*node, 0..1);
                let children = tree.take_children(*intermediate);
                tree.insert_children(*node, 0, &children);
                tree.set_text(*node, text.clone());
                *node
            }
            OutlineOp::MergeRootUp {
                root,
                only_child,
                root_text,
                ..
            } => {
                let grandchildren = tree.take_children(*root);
                tree.insert_children(*only_child, 0, &grandchildren);
                tree.insert_children(*root, 0, &[*only_child]);
                tree.set_text(*root, root_text.clone());
                *root
            }
            OutlineOp::SetText { node, old, .. } => {
                tree.set_text(*node, old.clone());
                *node
            }
        };

        tree.request_focus(focus);
        focus
    }

    /// 被撤销的插入/提升不会再重做，它们分配的节点可以释放
    fn discard(self, tree: &mut OutlineTree) {
        match self {
            OutlineOp::InsertChild { node, .. } => tree.release(node),
            OutlineOp::PromoteToNewParent { intermediate, .. } => tree.release(intermediate),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/edit_op.rs"]
mod tests;
