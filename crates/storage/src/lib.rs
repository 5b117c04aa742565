//! Persistence for the editing engine: edits backends, the background write
//! worker, and the editor configuration file.

mod backend;
mod file;
mod http;
mod memory;
mod writer;

pub use backend::EditsBackend;
pub use file::FileBackend;
pub use http::{FileMeta, HttpBackend, PageImageKey};
pub use memory::{BackendCall, MemoryBackend};
pub use writer::{WriteJob, WriteOutcome, WriteTicket, WriteWorker};

use directories::ProjectDirs;
use doc_model::EditorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("edits service answered {status}: {message}")]
    Http { status: u16, message: String },
    #[error("edits service unreachable: {0}")]
    Transport(String),
    #[error("write rejected: {0}")]
    Rejected(String),
    #[error("write worker has stopped")]
    WorkerStopped,
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Local data directory holding the editor config and offline edits.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u32,
    config: EditorConfig,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PdfStudio", "PdfStudio")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory used by the offline [`FileBackend`].
    pub fn edits_dir(&self) -> PathBuf {
        self.root.join("edits")
    }

    pub fn file_backend(&self) -> FileBackend {
        FileBackend::new(self.edits_dir())
    }

    pub fn load_config(&self) -> Result<EditorConfig, StorageError> {
        Self::load_config_from(&self.config_path())
    }

    /// Missing file yields defaults.
    pub fn load_config_from(path: &Path) -> Result<EditorConfig, StorageError> {
        if !path.exists() {
            return Ok(EditorConfig::default());
        }

        let bytes = fs::read(path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > CONFIG_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.version));
        }

        let limits = envelope.config.size_limits;
        if !limits.is_valid() {
            return Err(StorageError::InvalidConfig(format!(
                "size limits {}..{} x {}..{} must be finite, non-negative and ordered",
                limits.min_w, limits.max_w, limits.min_h, limits.max_h
            )));
        }

        Ok(envelope.config)
    }

    pub fn save_config(&self, config: &EditorConfig) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope = ConfigEnvelope { version: CONFIG_SCHEMA_VERSION, config: config.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.config_path(), bytes)?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }
}
