//! Mock asset acquirer for testing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::acquirer::{AcquireError, AssetAcquirer};

/// A recorded acquisition for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAcquisition {
    pub reference: String,
    pub dest: PathBuf,
    pub success: bool,
}

/// Mock implementation of the AssetAcquirer trait.
///
/// Writes a configurable payload to the destination instead of downloading,
/// and can be told to fail the next N calls to exercise retry paths.
pub struct MockAcquirer {
    payload: Arc<RwLock<Vec<u8>>>,
    fail_next: Arc<RwLock<u32>>,
    acquisitions: Arc<RwLock<Vec<RecordedAcquisition>>>,
}

impl Default for MockAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAcquirer {
    pub fn new() -> Self {
        Self {
            payload: Arc::new(RwLock::new(b"mock-asset".to_vec())),
            fail_next: Arc::new(RwLock::new(0)),
            acquisitions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the bytes written to every destination.
    pub async fn set_payload(&self, payload: Vec<u8>) {
        *self.payload.write().await = payload;
    }

    /// Fail the next `count` acquire calls before succeeding again.
    pub async fn fail_next(&self, count: u32) {
        *self.fail_next.write().await = count;
    }

    /// Get all recorded acquisitions.
    pub async fn recorded_acquisitions(&self) -> Vec<RecordedAcquisition> {
        self.acquisitions.read().await.clone()
    }

    /// Get the number of acquire calls made.
    pub async fn acquisition_count(&self) -> usize {
        self.acquisitions.read().await.len()
    }
}

#[async_trait]
impl AssetAcquirer for MockAcquirer {
    async fn acquire(&self, reference: &str, dest: &Path) -> Result<PathBuf, AcquireError> {
        let should_fail = {
            let mut remaining = self.fail_next.write().await;
            if *remaining > 0 {
                *remaining -= 1;
                true
            } else {
                false
            }
        };

        self.acquisitions.write().await.push(RecordedAcquisition {
            reference: reference.to_string(),
            dest: dest.to_path_buf(),
            success: !should_fail,
        });

        if should_fail {
            return Err(AcquireError::Download(format!(
                "simulated failure for {}",
                reference
            )));
        }

        tokio::fs::write(dest, self.payload.read().await.as_slice()).await?;
        Ok(dest.to_path_buf())
    }
}
