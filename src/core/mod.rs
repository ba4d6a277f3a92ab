//! Core module - storage, the project store and derived views

pub mod alerts;
pub mod config;
pub mod export;
pub mod i18n;
pub mod identity;
pub mod metrics;
pub mod storage;
pub mod store;
pub mod workspace;

pub use config::Config;
pub use i18n::{Locale, Translator};
pub use identity::{EntityId, EntityPrefix, IdParseError, ShortId};
pub use storage::{Storage, StorageError};
pub use store::{Store, StoreError};
pub use workspace::{Workspace, WorkspaceError};
