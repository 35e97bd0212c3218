//! Service ports: traits + data contracts.

pub mod settings;
pub mod snapshot;

pub use settings::{Settings, SnapshotSettings};
pub use snapshot::{Result as SnapshotResult, SnapshotError, SnapshotStore};
