//! 命令系统：大纲编辑的语义命令
//!
//! Command 只描述“做什么”，不关心由哪个按键或哪一行输入触发。

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // ==================== 焦点移动 ====================
    FocusNext,
    FocusPrev,
    FocusParent,
    FocusChild,
    ToggleCollapsed,

    // ==================== 结构编辑 ====================
    NewSiblingAfter,
    NewSiblingBefore,
    NewChild,
    NewParent,
    Delete { reparent: bool, forward: bool },
    MoveUp,
    MoveDown,
    MergeRootUp,

    // ==================== 文本编辑 ====================
    Edit(String),

    // ==================== 系统操作 ====================
    Undo,
    Redo,
    Save,
    Show,
    Quit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::FocusNext => "next",
            Command::FocusPrev => "prev",
            Command::FocusParent => "parent",
            Command::FocusChild => "child",
            Command::ToggleCollapsed => "toggle",
            Command::NewSiblingAfter => "sibling-after",
            Command::NewSiblingBefore => "sibling-before",
            Command::NewChild => "new-child",
            Command::NewParent => "new-parent",
            Command::Delete { .. } => "delete",
            Command::MoveUp => "move-up",
            Command::MoveDown => "move-down",
            Command::MergeRootUp => "merge-root",
            Command::Edit(_) => "edit",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Save => "save",
            Command::Show => "show",
            Command::Quit => "quit",
        }
    }

    /// 解析一行输入：`<name> [args...]`
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name {
            "next" => Command::FocusNext,
            "prev" => Command::FocusPrev,
            "parent" => Command::FocusParent,
            "child" => Command::FocusChild,
            "toggle" => Command::ToggleCollapsed,
            "sibling-after" => Command::NewSiblingAfter,
            "sibling-before" => Command::NewSiblingBefore,
            "new-child" => Command::NewChild,
            "new-parent" => Command::NewParent,
            "delete" => {
                let mut reparent = false;
                let mut forward = false;
                for flag in rest.split_whitespace() {
                    match flag {
                        "reparent" => reparent = true,
                        "forward" => forward = true,
                        _ => return None,
                    }
                }
                Command::Delete { reparent, forward }
            }
            "move-up" => Command::MoveUp,
            "move-down" => Command::MoveDown,
            "merge-root" => Command::MergeRootUp,
            "edit" => Command::Edit(rest.to_string()),
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "save" => Command::Save,
            "show" => Command::Show,
            "quit" | "exit" => Command::Quit,
            _ => return None,
        };

        if !rest.is_empty() && !command.takes_args() {
            return None;
        }
        Some(command)
    }

    fn takes_args(&self) -> bool {
        matches!(self, Command::Delete { .. } | Command::Edit(_))
    }

    /// 会写入事务日志的命令
    pub fn is_edit_command(&self) -> bool {
        matches!(
            self,
            Command::NewSiblingAfter
                | Command::NewSiblingBefore
                | Command::NewChild
                | Command::NewParent
                | Command::Delete { .. }
                | Command::MoveUp
                | Command::MoveDown
                | Command::MergeRootUp
                | Command::Edit(_)
        )
    }

    pub fn is_focus_command(&self) -> bool {
        matches!(
            self,
            Command::FocusNext
                | Command::FocusPrev
                | Command::FocusParent
                | Command::FocusChild
                | Command::ToggleCollapsed
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/command.rs"]
mod tests;
