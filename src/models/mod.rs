//! 数据模型层

pub mod edit_history;
pub mod edit_op;
pub mod outline;

pub use edit_history::{Transaction, TransactionLog};
pub use edit_op::OutlineOp;
pub use outline::{Node, NodeId, OutlineRow, OutlineTree};
