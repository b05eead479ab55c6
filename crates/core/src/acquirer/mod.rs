//! Asset acquisition: downloading customer design files into staging.
//!
//! Downloads land next to their final staging path with a `.part` suffix and
//! are renamed into place only after the full body has been written, so a
//! crashed or interrupted download never leaves a truncated file that looks
//! complete.

mod http;

pub use http::HttpAcquirer;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from asset acquisition.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("invalid asset reference '{0}'")]
    InvalidReference(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("asset download failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Acquirer tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquirerConfig {
    /// Download attempts per asset before giving up.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Delay between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for AcquirerConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Trait over asset acquisition, abstracting the transfer mechanism.
#[async_trait]
pub trait AssetAcquirer: Send + Sync {
    /// Fetch `reference` into `dest`, returning the final path on success.
    ///
    /// On failure no file exists at `dest`.
    async fn acquire(&self, reference: &str, dest: &Path) -> Result<PathBuf, AcquireError>;
}
