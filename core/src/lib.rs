pub mod codec;
pub mod content;
pub mod context;
pub mod encounter;
pub mod game_data;
pub mod storage;

// Re-exports for convenience
pub use codec::{ParseError, export_snapshot, import_snapshot};
pub use content::{ContentError, ContentProvider, DirectoryContent, load_encounter_roster};
pub use context::{AppConfig, AppConfigExt, ConfigError};
pub use encounter::{
    EncounterTracker, EntityPatch, NewEntity, NewStatus, ReplaceReason, ResetMode, SignalHandler, TrackerSignal,
    ValidationError,
};
pub use game_data::*;
pub use storage::{Autosaver, EncounterPersistence, FileStore, KeyValueStore, MemoryStore, StoreError};
pub use stormclock_types as types;
