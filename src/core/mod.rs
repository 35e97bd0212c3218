//! 核心词汇：语义命令

pub mod command;

pub use command::Command;
