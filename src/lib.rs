//! zoutline - 大纲编辑器引擎
//!
//! 模块结构：
//! - core: 语义命令（Command）
//! - models: 数据模型（Node, OutlineTree, OutlineOp, TransactionLog）
//! - kernel: 文档控制器、命令分发、服务端口与适配器（快照存储、设置、目录）

pub mod core;
pub mod kernel;
pub mod models;
