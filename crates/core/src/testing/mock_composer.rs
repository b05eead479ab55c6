//! Mock composer for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::composer::{ComposeError, ComposeRequest, ComposedDocument, Composer};

/// Mock implementation of the Composer trait.
///
/// Writes a stub PDF to the requested output path. Errors can be scripted
/// one-shot via a queue, or every call can be made to fail retryably.
pub struct MockComposer {
    requests: Arc<Mutex<Vec<ComposeRequest>>>,
    scripted_errors: Arc<Mutex<VecDeque<ComposeError>>>,
    always_fail: Arc<AtomicBool>,
}

impl Default for MockComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockComposer {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            scripted_errors: Arc::new(Mutex::new(VecDeque::new())),
            always_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue a one-shot error for an upcoming compose call.
    pub fn push_error(&self, error: ComposeError) {
        self.scripted_errors.lock().unwrap().push_back(error);
    }

    /// Make every compose call fail with a retryable error.
    pub fn set_always_fail(&self, fail: bool) {
        self.always_fail.store(fail, Ordering::SeqCst);
    }

    /// Get all recorded compose requests.
    pub fn recorded_requests(&self) -> Vec<ComposeRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the number of compose calls made.
    pub fn compose_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Composer for MockComposer {
    fn compose(&self, request: &ComposeRequest) -> Result<ComposedDocument, ComposeError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(error) = self.scripted_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        if self.always_fail.load(Ordering::SeqCst) {
            return Err(ComposeError::Image("simulated compose failure".to_string()));
        }

        std::fs::write(&request.output, b"%PDF-1.4 mock document")?;
        Ok(ComposedDocument {
            path: request.output.clone(),
            pages: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn request(dir: &std::path::Path) -> ComposeRequest {
        ComposeRequest {
            source: dir.join("item1.png"),
            output: dir.join("item1.pdf"),
            print_id: "mavic-3".to_string(),
            dpi: 150,
            recipient: fixtures::shipping_address(),
        }
    }

    #[test]
    fn test_writes_stub_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        let composer = MockComposer::new();

        let document = composer.compose(&request(temp_dir.path())).unwrap();
        assert_eq!(document.pages, 1);
        assert!(document.path.exists());
        assert_eq!(composer.compose_count(), 1);
    }

    #[test]
    fn test_scripted_error_then_success() {
        let temp_dir = tempfile::tempdir().unwrap();
        let composer = MockComposer::new();
        composer.push_error(ComposeError::MissingTemplate {
            print_id: "mavic-3".to_string(),
        });

        let err = composer.compose(&request(temp_dir.path())).unwrap_err();
        assert!(err.is_permanent());

        assert!(composer.compose(&request(temp_dir.path())).is_ok());
        assert_eq!(composer.compose_count(), 2);
    }

    #[test]
    fn test_always_fail() {
        let temp_dir = tempfile::tempdir().unwrap();
        let composer = MockComposer::new();
        composer.set_always_fail(true);

        let err = composer.compose(&request(temp_dir.path())).unwrap_err();
        assert!(!err.is_permanent());
    }
}
