//! Configuration for StrandKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StrandError};

/// Main configuration for a StrandKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory handed to the storage engine.
    /// The engine owns the layout below it (journals, segments, manifests).
    pub data_dir: PathBuf,

    /// Which engine implementation backs the store
    pub backend: BackendKind,

    /// Name of the engine partition holding all namespaces
    pub partition: String,

    // -------------------------------------------------------------------------
    // Engine Tuning
    // -------------------------------------------------------------------------
    /// When written data is fsynced to disk
    pub sync_strategy: SyncStrategy,

    /// Block cache size handed to the engine (in bytes)
    pub cache_size_bytes: u64,
}

/// Storage engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Persistent LSM-tree engine rooted at `data_dir`
    Fjall,

    /// Volatile in-process ordered map; `data_dir` is ignored
    Memory,
}

/// Journal sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every put/delete/batch (safest, slowest)
    EveryWrite,

    /// Let the engine fsync in the background every `interval_ms`
    Periodic { interval_ms: u16 },

    /// Only fsync on explicit `persist()` and on close
    Manual,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./strandkv_data"),
            backend: BackendKind::Fjall,
            partition: "default".to_string(),
            sync_strategy: SyncStrategy::Periodic { interval_ms: 1000 },
            cache_size_bytes: 32 * 1024 * 1024, // 32 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Default config rooted at `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: path.into(),
            ..Self::default()
        }
    }

    /// Check the config before handing it to an engine
    pub fn validate(&self) -> Result<()> {
        if self.partition.is_empty() {
            return Err(StrandError::Config("partition name must not be empty".into()));
        }
        if !self
            .partition
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StrandError::Config(format!(
                "partition name {:?} may only contain ASCII letters, digits, '_' and '-'",
                self.partition
            )));
        }
        if let SyncStrategy::Periodic { interval_ms: 0 } = self.sync_strategy {
            return Err(StrandError::Config("periodic sync interval must be > 0".into()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the storage backend
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the engine partition name
    pub fn partition(mut self, name: impl Into<String>) -> Self {
        self.config.partition = name.into();
        self
    }

    /// Set the journal sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the block cache size (in bytes)
    pub fn cache_size_bytes(mut self, size: u64) -> Self {
        self.config.cache_size_bytes = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
