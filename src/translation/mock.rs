/*!
 * Mock translator for testing.
 *
 * - `MockTranslator::new()` - Echoes the text, or a canned translation if one was registered
 * - `MockTranslator::failing()` - Always fails with an error
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::translation::LineTranslator;

/// Mock translator recording how often it was called
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    /// Canned translations keyed by source text
    entries: HashMap<String, String>,
    /// Whether every call fails
    failing: bool,
    /// Number of translate calls
    calls: Arc<AtomicUsize>,
    /// Target language of the latest call
    last_language: Arc<Mutex<Option<String>>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a translator that always fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Register a canned translation
    pub fn with_entry(mut self, source: &str, translation: &str) -> Self {
        self.entries.insert(source.to_string(), translation.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_target_language(&self) -> Option<String> {
        self.last_language.lock().ok().and_then(|last| last.clone())
    }
}

impl LineTranslator for MockTranslator {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_language.lock() {
            *last = Some(target_language.to_string());
        }

        if self.failing {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: "mock provider unavailable".to_string(),
            });
        }

        Ok(self
            .entries
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }
}
