//! Service adapters: OS specific implementations (filesystem, directories).

pub mod paths;
pub mod settings;
pub mod snapshot;

pub use paths::{ensure_log_dir, get_log_dir};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
pub use snapshot::{JsonFileStore, MemoryStore};
