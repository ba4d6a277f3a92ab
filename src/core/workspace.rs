//! Workspace discovery and structure
//!
//! A workspace is any directory containing `.mpt/`. It holds the project
//! config and the key-value storage file the database snapshot lives in.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the workspace marker directory
pub const WORKSPACE_DIR: &str = ".mpt";

/// Represents an MPT workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .mpt/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Resolve the workspace from an explicit root, or discover it
    pub fn locate(root: Option<&Path>) -> Result<Self, WorkspaceError> {
        match root {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new workspace structure at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(WORKSPACE_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        Self::create(root)
    }

    /// Initialize even if .mpt/ exists, replacing config and storage
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let workspace = Self::create(root)?;

        let storage = workspace.storage_path();
        if storage.exists() {
            std::fs::remove_file(&storage).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        }

        Ok(workspace)
    }

    fn create(root: PathBuf) -> Result<Self, WorkspaceError> {
        let dir = root.join(WORKSPACE_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# MPT Workspace Configuration

# Interface language (ar, en)
# locale: ar

# Default output format (auto, table, json, csv, md, id)
# default_format: auto

# Phases ending within this many days appear as upcoming deadlines
# deadline_window_days: 30

# Maximum entries shown in the alerts panel
# deadline_limit: 5
# notification_limit: 6
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .mpt directory
    pub fn mpt_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Path of the workspace config file
    pub fn config_path(&self) -> PathBuf {
        self.mpt_dir().join("config.yaml")
    }

    /// Path of the key-value storage file
    pub fn storage_path(&self) -> PathBuf {
        self.mpt_dir().join("storage.json")
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not an MPT workspace (searched from {searched_from:?}). Run 'mpt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("MPT workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
