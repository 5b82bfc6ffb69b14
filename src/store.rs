//! Document store collaborators
//!
//! The engine only needs whole-document `load` and `save` by key. Two
//! adapters are provided: an in-process map and a directory of JSON files.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::StoreError;

/// A stored document
pub type Document = Value;

/// Key/value document persistence
pub trait DocumentStore {
    /// Fetch the document under `key`, or `StoreError::NotFound`
    fn load(&self, key: &str) -> Result<Document, StoreError>;

    /// Overwrite the document under `key`
    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn load(&self, key: &str) -> Result<Document, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        (**self).save(key, document)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn load(&self, key: &str) -> Result<Document, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        (**self).save(key, document)
    }
}

/// In-memory store that hands back exactly what it was given
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one document
    pub fn with_document(key: impl Into<String>, document: Document) -> Self {
        let store = Self::new();
        store.documents().insert(key.into(), document);
        store
    }

    /// Current document under `key`, if any
    pub fn get(&self, key: &str) -> Option<Document> {
        self.documents().get(key).cloned()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<String, Document>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Document, StoreError> {
        self.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        self.documents().insert(key.to_string(), document.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per key under a root directory.
///
/// `/` in a key maps to a subdirectory, so `site/layout` lives at
/// `<root>/site/layout.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let segments: Vec<&str> = key.split('/').collect();
        let valid = segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\'));
        if !valid {
            return Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "key must be '/'-separated non-empty names".to_string(),
            });
        }

        let mut path = self.root.clone();
        for segment in &segments {
            path.push(segment);
        }
        path.set_extension("json");
        Ok(path)
    }
}

impl DocumentStore for FileStore {
    fn load(&self, key: &str) -> Result<Document, StoreError> {
        let path = self.path_for(key)?;
        let content = fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                key: key.to_string(),
            },
            _ => StoreError::Io {
                key: key.to_string(),
                source,
            },
        })?;

        serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
            key: key.to_string(),
            source,
        })
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source: std::io::Error| StoreError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(document).map_err(|source| {
            StoreError::Rejected {
                key: key.to_string(),
                reason: source.to_string(),
            }
        })?;

        // Write beside the target then rename so readers never see a partial file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(io_err)?;
        fs::rename(&staging, &path).map_err(io_err)?;

        debug!(key, path = %path.display(), "document written");
        Ok(())
    }
}
