//! Hotfolder delivery: the handoff point to the print RIP.
//!
//! The RIP watches the hotfolder and picks up any file that appears, so a
//! document must only ever become visible there in its complete form. Within
//! one filesystem a rename gives that for free; across filesystems we copy to
//! a hidden temp name first and rename at the end.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors from hotfolder delivery.
#[derive(Debug, Error)]
pub enum HotfolderError {
    #[error("hotfolder directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("delivery failed: {0}")]
    Io(#[from] std::io::Error),
}

/// File name a composed document is delivered under.
pub fn delivery_name(order_id: u64, item_id: u64) -> String {
    format!("order{order_id}_item{item_id}.pdf")
}

/// Delivery target directory watched by the print RIP.
pub struct Hotfolder {
    dir: PathBuf,
}

impl Hotfolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Move `source` into the hotfolder under `file_name`.
    ///
    /// An existing file of the same name is replaced; redelivery after a
    /// partial cycle must not fail on its own leftovers.
    pub fn deliver(&self, source: &Path, file_name: &str) -> Result<PathBuf, HotfolderError> {
        if !self.dir.is_dir() {
            return Err(HotfolderError::DirectoryUnavailable(
                self.dir.display().to_string(),
            ));
        }

        let target = self.dir.join(file_name);

        match std::fs::rename(source, &target) {
            Ok(()) => {
                debug!(target = %target.display(), "Delivered to hotfolder");
                Ok(target)
            }
            Err(e) if is_cross_device(&e) => {
                warn!(
                    source = %source.display(),
                    target = %target.display(),
                    "Hotfolder is on a different filesystem, falling back to copy"
                );
                self.copy_then_rename(source, &target)?;
                Ok(target)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn copy_then_rename(&self, source: &Path, target: &Path) -> Result<(), HotfolderError> {
        // Hidden temp name inside the hotfolder keeps the final rename on one
        // filesystem, so the RIP never sees a partial copy.
        let temp = self.dir.join(format!(
            ".{}.incoming",
            target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "delivery".to_string())
        ));

        std::fs::copy(source, &temp)?;
        if let Err(e) = std::fs::rename(&temp, target) {
            let _ = std::fs::remove_file(&temp);
            return Err(e.into());
        }
        std::fs::remove_file(source)?;
        Ok(())
    }
}

fn is_cross_device(e: &std::io::Error) -> bool {
    // CrossesDevices is still unstable; match the raw errno (EXDEV).
    e.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_moves_file() {
        let staging = tempfile::tempdir().unwrap();
        let hot = tempfile::tempdir().unwrap();

        let source = staging.path().join("composed.pdf");
        std::fs::write(&source, b"%PDF-1.3 test").unwrap();

        let hotfolder = Hotfolder::new(hot.path());
        let delivered = hotfolder.deliver(&source, "order7_item315.pdf").unwrap();

        assert_eq!(delivered, hot.path().join("order7_item315.pdf"));
        assert!(!source.exists());
        assert_eq!(std::fs::read(&delivered).unwrap(), b"%PDF-1.3 test");
    }

    #[test]
    fn test_deliver_replaces_existing_file() {
        let staging = tempfile::tempdir().unwrap();
        let hot = tempfile::tempdir().unwrap();

        std::fs::write(hot.path().join("order7_item315.pdf"), b"stale").unwrap();

        let source = staging.path().join("composed.pdf");
        std::fs::write(&source, b"fresh").unwrap();

        let hotfolder = Hotfolder::new(hot.path());
        let delivered = hotfolder.deliver(&source, "order7_item315.pdf").unwrap();

        assert_eq!(std::fs::read(&delivered).unwrap(), b"fresh");
    }

    #[test]
    fn test_missing_hotfolder_is_reported() {
        let staging = tempfile::tempdir().unwrap();
        let source = staging.path().join("composed.pdf");
        std::fs::write(&source, b"data").unwrap();

        let hotfolder = Hotfolder::new("/nonexistent/hotfolder");
        let err = hotfolder.deliver(&source, "x.pdf").unwrap_err();
        assert!(matches!(err, HotfolderError::DirectoryUnavailable(_)));
        // Source is untouched so delivery can be retried.
        assert!(source.exists());
    }

    #[test]
    fn test_delivery_name() {
        assert_eq!(delivery_name(727, 315), "order727_item315.pdf");
    }
}
