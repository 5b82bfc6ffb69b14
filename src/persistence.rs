//! Persistence adapter between the layout model and a document store
//!
//! Loading never fails outward: a missing, unreadable or undecodable document
//! is replaced by the registry default so the editor always opens. Saving is a
//! full-document overwrite whose failure is always returned to the caller.
//! Two editors saving the same key simply overwrite each other (last write wins).

use strum::Display;
use tracing::{error, info, warn};

use crate::error::PersistenceError;
use crate::layout::Layout;
use crate::registry;
use crate::store::DocumentStore;

/// Store key of the whole-site layout document
pub const LAYOUT_KEY: &str = "site/layout";

/// Where a loaded layout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoadSource {
    /// Decoded from the stored document
    #[strum(serialize = "stored document")]
    Stored,
    /// Nothing stored yet, registry default used
    #[strum(serialize = "default layout (nothing saved yet)")]
    DefaultNotFound,
    /// Store or decode failure, registry default used
    #[strum(serialize = "default layout (stored document unavailable)")]
    DefaultAfterError,
}

impl LoadSource {
    pub fn is_default(self) -> bool {
        !matches!(self, Self::Stored)
    }
}

/// A layout together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLayout {
    pub layout: Layout,
    pub source: LoadSource,
}

impl LoadedLayout {
    fn fallback(source: LoadSource) -> Self {
        Self {
            layout: registry::default_layout(),
            source,
        }
    }
}

/// Loads and saves the layout document under one key
#[derive(Debug, Clone)]
pub struct LayoutRepository<S> {
    store: S,
    key: String,
}

impl<S: DocumentStore> LayoutRepository<S> {
    /// Repository for the site layout key
    pub fn new(store: S) -> Self {
        Self::with_key(store, LAYOUT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the layout, substituting the registry default on any failure
    pub fn load_layout(&self) -> Layout {
        self.load().layout
    }

    /// Like [`load_layout`](Self::load_layout), also reporting the source
    pub fn load(&self) -> LoadedLayout {
        let document = match self.store.load(&self.key) {
            Ok(document) => document,
            Err(err) if err.is_not_found() => {
                info!(key = %self.key, "no stored layout, using default");
                return LoadedLayout::fallback(LoadSource::DefaultNotFound);
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read layout, using default");
                return LoadedLayout::fallback(LoadSource::DefaultAfterError);
            }
        };

        match Layout::from_document(document) {
            Ok(layout) => {
                info!(key = %self.key, sections = layout.len(), "layout loaded");
                LoadedLayout {
                    layout,
                    source: LoadSource::Stored,
                }
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored layout is malformed, using default");
                LoadedLayout::fallback(LoadSource::DefaultAfterError)
            }
        }
    }

    /// Overwrite the stored document with `layout`
    pub fn save_layout(&self, layout: &Layout) -> Result<(), PersistenceError> {
        if let Some((section, key)) = layout.non_finite_value() {
            error!(key = %self.key, section, field = key, "refusing to save non-finite number");
            return Err(PersistenceError::NonFinite {
                section: section.to_string(),
                key: key.to_string(),
            });
        }
        let document = layout.to_document()?;
        match self.store.save(&self.key, &document) {
            Ok(()) => {
                info!(key = %self.key, sections = layout.len(), "layout saved");
                Ok(())
            }
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to save layout");
                Err(err.into())
            }
        }
    }
}
