//! Homepage Layout Library
//!
//! Layout configuration engine: an ordered list of typed page sections, the
//! pure mutations applied to it (reorder, toggle, per-type config edit), and
//! its load/save contract against a single persisted document.

pub mod cli;
pub mod editor;
pub mod error;
pub mod layout;
pub mod persistence;
pub mod registry;
pub mod section;
pub mod section_config;
pub mod settings;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use editor::{
    Dispatch, EditorIntent, EditorState, LayoutEditor, SaveCompletion, SaveNotice, SaveTicket,
};
pub use error::{FieldError, LayoutError, PersistenceError, StoreError};
pub use layout::Layout;
pub use persistence::{LAYOUT_KEY, LayoutRepository, LoadSource, LoadedLayout};
pub use registry::{FieldDescriptor, FieldKind};
pub use section::{ConfigMap, ConfigValue, Section};
pub use section_config::SectionConfig;
pub use settings::Settings;
pub use store::{Document, DocumentStore, FileStore, MemoryStore};
pub use types::{HeroStyle, PostStyle, SectionKind};
