//! State stores.
//!
//! A store is the shared backend both peers write to. Saves are patches:
//! each field in the patch overwrites the stored field, last write wins.
//! There is no versioning or conflict detection beyond that.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Document, PersistError};

/// Backend that persists the shared state document.
pub trait StateStore {
    /// Merge `patch` into the stored document.
    fn save(&mut self, patch: &Document) -> Result<(), PersistError>;

    /// Load the whole stored document. Empty if nothing was saved yet.
    fn load(&self) -> Result<Document, PersistError>;
}

/// In-memory store, for tests and single-process setups.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    document: Document,
    saves: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self { document, saves: 0 }
    }

    /// The stored document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of saves applied.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl StateStore for MemoryStore {
    fn save(&mut self, patch: &Document) -> Result<(), PersistError> {
        self.document.merge(patch);
        self.saves += 1;
        debug!(fields = patch.len(), "document patch saved in memory");
        Ok(())
    }

    fn load(&self) -> Result<Document, PersistError> {
        Ok(self.document.clone())
    }
}

/// Store keeping the document as a JSON file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn save(&mut self, patch: &Document) -> Result<(), PersistError> {
        let mut document = self.load()?;
        document.merge(patch);

        let text = serde_json::to_string_pretty(&document).map_err(PersistError::Encode)?;
        std::fs::write(&self.path, text).map_err(|source| PersistError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), fields = patch.len(), "document patch saved");
        Ok(())
    }

    fn load(&self) -> Result<Document, PersistError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no saved document, starting empty");
            return Ok(Document::new());
        }

        let text = std::fs::read_to_string(&self.path).map_err(|source| PersistError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PersistError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }
}
