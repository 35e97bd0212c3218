//! 快照存储实现
//!
//! - `JsonFileStore`: JSON 文件，整体覆盖（临时文件 + 原子替换）
//! - `MemoryStore`: 进程内存储，可注入写失败

use crate::kernel::services::ports::settings::SnapshotSettings;
use crate::kernel::services::ports::snapshot::{Result, SnapshotError, SnapshotStore};
use crate::models::Node;
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
    sync: bool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
            sync: true,
        }
    }

    pub fn with_settings(mut self, settings: &SnapshotSettings) -> Self {
        self.pretty = settings.pretty;
        self.sync = settings.sync;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn target_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Node>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let decode_error = |source| SnapshotError::Decode {
            path: self.path.clone(),
            source,
        };

        // 每层大纲占两层 JSON 嵌套，默认的 128 层限制不够用
        let mut de = serde_json::Deserializer::from_slice(&bytes);
        de.disable_recursion_limit();
        let root = Node::deserialize(serde_stacker::Deserializer::new(&mut de))
            .map_err(decode_error)?;
        de.end().map_err(decode_error)?;
        Ok(Some(root))
    }

    fn save(&self, root: &Node) -> Result<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(root)
        } else {
            serde_json::to_vec(root)
        }
        .map_err(SnapshotError::Encode)?;

        let dir = self.target_dir();
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        // 同目录临时文件，保证 rename 不跨文件系统
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        if self.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.path).map_err(|e| SnapshotError::Io(e.error))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 克隆后共享同一份数据，测试可以从外部观察写入
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshot: Rc<RefCell<Option<Node>>>,
    saves: Rc<Cell<usize>>,
    fail_saves: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(node: Node) -> Self {
        let store = Self::new();
        *store.snapshot.borrow_mut() = Some(node);
        store
    }

    pub fn snapshot(&self) -> Option<Node> {
        self.snapshot.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Node>> {
        Ok(self.snapshot.borrow().clone())
    }

    fn save(&self, root: &Node) -> Result<()> {
        if self.fail_saves.get() {
            return Err(SnapshotError::Unavailable("memory store rejects writes".into()));
        }
        *self.snapshot.borrow_mut() = Some(root.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/snapshot.rs"]
mod tests;
