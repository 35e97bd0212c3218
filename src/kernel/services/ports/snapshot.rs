//! 快照存储端口
//!
//! 引擎把快照当作不透明、完整的整体：要么读到完整文档，要么明确“不存在”。

use crate::models::Node;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug)]
pub enum SnapshotError {
    Io(io::Error),
    Encode(serde_json::Error),
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    Unavailable(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "IO error: {}", e),
            SnapshotError::Encode(e) => write!(f, "Encode snapshot failed: {}", e),
            SnapshotError::Decode { path, source } => {
                write!(f, "Decode snapshot {} failed: {}", path.display(), source)
            }
            SnapshotError::Unavailable(msg) => write!(f, "Snapshot store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Encode(e) => Some(e),
            SnapshotError::Decode { source, .. } => Some(source),
            SnapshotError::Unavailable(_) => None,
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

pub trait SnapshotStore {
    /// `Ok(None)` 表示存储中还没有文档
    fn load(&self) -> Result<Option<Node>>;

    /// 整体覆盖写入
    fn save(&self, root: &Node) -> Result<()>;

    fn describe(&self) -> String;
}
