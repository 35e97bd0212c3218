//! 命令分发：以当前焦点节点为作用对象执行 Command

use super::document::{Document, Result};
use crate::core::Command;
use crate::kernel::services::ports::snapshot::SnapshotStore;
use crate::models::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// 本次命令确定的焦点；命令不可用时为 `None`
    pub focus: Option<NodeId>,
    pub state_changed: bool,
    pub quit: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self::default()
    }

    fn focused(focus: Option<NodeId>, state_changed: bool) -> Self {
        Self {
            focus,
            state_changed: state_changed && focus.is_some(),
            quit: false,
        }
    }
}

pub fn dispatch<S: SnapshotStore>(doc: &mut Document<S>, command: &Command) -> Result<DispatchResult> {
    let node = doc.focus().unwrap_or_else(|| doc.tree().root());

    let result = match command {
        Command::FocusNext => DispatchResult::focused(doc.focus_next(node, true), false),
        Command::FocusPrev => DispatchResult::focused(doc.focus_next(node, false), false),
        Command::FocusParent => DispatchResult::focused(doc.focus_parent(node), false),
        Command::FocusChild => DispatchResult::focused(doc.focus_child(node), false),
        Command::ToggleCollapsed => {
            doc.toggle_collapsed(node);
            DispatchResult::focused(Some(node), false)
        }
        Command::NewSiblingAfter => DispatchResult::focused(doc.new_sibling(node, true)?, true),
        Command::NewSiblingBefore => DispatchResult::focused(doc.new_sibling(node, false)?, true),
        Command::NewChild => DispatchResult::focused(doc.new_child(node)?, true),
        Command::NewParent => DispatchResult::focused(doc.promote_to_new_parent(node)?, true),
        Command::Delete { reparent, forward } => {
            DispatchResult::focused(doc.delete(node, *reparent, *forward)?, true)
        }
        Command::MoveUp => DispatchResult::focused(doc.move_child(node, false)?, true),
        Command::MoveDown => DispatchResult::focused(doc.move_child(node, true)?, true),
        Command::MergeRootUp => DispatchResult::focused(doc.merge_root_up()?, true),
        Command::Edit(text) => {
            doc.begin_edit(node)?;
            doc.update_draft(text.clone());
            let committed = doc.finish_edit()?;
            DispatchResult {
                focus: Some(node),
                state_changed: committed.is_some(),
                quit: false,
            }
        }
        Command::Undo => DispatchResult::focused(doc.undo()?, true),
        Command::Redo => DispatchResult::focused(doc.redo()?, true),
        Command::Save => {
            doc.save()?;
            DispatchResult::unchanged()
        }
        Command::Show => DispatchResult::unchanged(),
        Command::Quit => DispatchResult {
            quit: true,
            ..DispatchResult::default()
        },
    };

    tracing::debug!(
        command = command.name(),
        changed = result.state_changed,
        "dispatch"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/dispatch.rs"]
mod tests;
