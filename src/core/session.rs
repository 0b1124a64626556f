// src/core/session.rs
//! The active résumé, shared between flows.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeSnapshot {
    pub file: Option<PathBuf>,
    pub text: Option<String>,
}

impl ResumeSnapshot {
    /// Extracted text, if present and non-empty.
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

/// Handle to the most recently uploaded résumé. Clones share the same state.
///
/// File and text are committed together, so a reader sees either the previous
/// pair or the new one.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<ResumeSnapshot>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored résumé with a new file/text pair.
    pub fn commit(&self, file: &Path, text: String) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = ResumeSnapshot {
            file: Some(file.to_path_buf()),
            text: Some(text),
        };
        debug!("Session committed resume {}", file.display());
    }

    pub fn snapshot(&self) -> ResumeSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn resume_file(&self) -> Option<PathBuf> {
        self.snapshot().file
    }

    pub fn resume_text(&self) -> Option<String> {
        self.snapshot().text
    }
}
