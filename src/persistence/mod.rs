//! Persistence for session state.
//!
//! Both peers save their state as named fields of one flat document held by
//! a shared backend. On reconnect a client loads the document and feeds its
//! fields back into the lock and the effect registry.
//!
//! - [`Document`]: the flat field map
//! - [`StateStore`]: the backend contract (`save(patch)` / `load()`)
//! - [`MemoryStore`], [`FileStore`]: backends

mod document;
mod store;

pub use document::Document;
pub use store::{FileStore, MemoryStore, StateStore};

use thiserror::Error;

/// Errors raised while saving or restoring state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize field {field}: {source}")]
    Serialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize field {field}: {source}")]
    Deserialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt document at {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
