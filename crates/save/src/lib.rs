pub mod file_header;
pub mod save_codec;
pub mod save_error;
mod save_plugin;
pub mod save_types;
pub mod snapshot;
pub mod storage;

pub use save_codec::{decode_snapshot, encode_snapshot, export_json};
pub use save_error::SaveError;
pub use save_plugin::{
    AutosaveConfig, AutosaveTimer, LoadGameEvent, SaveGameEvent, SavePath, SavePlugin, SaveStatus,
    SaveSystems, DEFAULT_AUTOSAVE_INTERVAL_SECS,
};
pub use save_types::{SaveSnapshot, SavedPan, SavedVehicle, CURRENT_SAVE_VERSION};
pub use snapshot::{apply_snapshot, capture_snapshot, RestoreReport};
pub use storage::{
    load_snapshot, save_snapshot, FileStorage, MemoryStorage, SaveStorage, SnapshotStorage,
};
