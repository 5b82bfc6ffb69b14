//! Editor controller
//!
//! Owns the working copy of the layout for one editing session and turns user
//! intents into layout mutations and save requests.
//!
//! # State Flow
//!
//! ```text
//! Loading
//!     ↓  (load never fails outward)
//! Ready ──(Reorder / Toggle / EditConfig)──→ Ready
//!     ↓  RequestSave
//! Saving
//!     ↓  save settled (success, or failure reported as a notice)
//! Ready
//! ```
//!
//! Saving is split in two steps so the host decides how store I/O runs:
//! [`LayoutEditor::dispatch`] hands out a [`SaveTicket`] holding the snapshot
//! to write, and [`LayoutEditor::complete_save`] settles it. Exactly one save
//! is in flight at a time; a `RequestSave` received meanwhile is queued once
//! and re-fired when the current one settles. Mutation intents are not
//! accepted while saving. If the editor is dropped with a save in flight, the
//! host may still finish the write; its result simply has nowhere to go.

use std::sync::atomic::{AtomicU64, Ordering};
use strum::Display;
use tracing::{debug, error, info};

use crate::error::PersistenceError;
use crate::layout::Layout;
use crate::persistence::{LayoutRepository, LoadSource, LoadedLayout};
use crate::section::ConfigValue;
use crate::store::DocumentStore;

/// Ticket ids are unique across every editor in the process
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EditorState {
    /// Waiting for the initial load
    Loading,
    /// Accepting intents
    Ready,
    /// A save is in flight
    Saving,
}

/// Something the operator asked for
#[derive(Debug, Clone, PartialEq)]
pub enum EditorIntent {
    /// Drag a section from one position to another
    Reorder { from: usize, to: usize },
    /// Show or hide a section
    Toggle { id: String },
    /// Change one config field of a section
    EditConfig {
        id: String,
        key: String,
        value: ConfigValue,
    },
    /// Persist the current layout
    RequestSave,
}

impl EditorIntent {
    pub fn toggle(id: impl Into<String>) -> Self {
        Self::Toggle { id: id.into() }
    }

    pub fn edit_config(
        id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Self {
        Self::EditConfig {
            id: id.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    fn is_mutation(&self) -> bool {
        !matches!(self, Self::RequestSave)
    }
}

/// A save the host must perform and then report back
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    id: u64,
    revision: u64,
    snapshot: Layout,
}

impl SaveTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The layout to write
    pub fn snapshot(&self) -> &Layout {
        &self.snapshot
    }
}

/// What happened to an intent
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The layout changed
    Applied,
    /// The target did not exist or the value was already set
    Unchanged,
    /// The intent is not accepted in the current state
    Ignored(EditorState),
    /// A save began; perform it and call `complete_save`
    SaveStarted(SaveTicket),
    /// A save is already in flight; another will follow it
    SaveQueued,
}

/// Result of a save, shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveNotice {
    Saved,
    Failed(String),
    /// The ticket was not the one in flight
    Discarded,
}

/// Outcome of settling a save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveCompletion {
    pub notice: SaveNotice,
    /// Queued save started as this one settled
    pub next: Option<SaveTicket>,
}

/// One editing session over a layout
#[derive(Debug, Clone)]
pub struct LayoutEditor {
    state: EditorState,
    layout: Layout,
    load_source: Option<LoadSource>,

    /// Bumped on every applied mutation
    revision: u64,
    /// Revision known to match the store
    saved_revision: u64,

    in_flight: Option<u64>,
    save_queued: bool,
    last_error: Option<String>,
}

impl Default for LayoutEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEditor {
    /// A session waiting for its initial load
    pub fn new() -> Self {
        Self {
            state: EditorState::Loading,
            layout: Layout::default(),
            load_source: None,
            revision: 0,
            saved_revision: 0,
            in_flight: None,
            save_queued: false,
            last_error: None,
        }
    }

    /// Load through `repository` and enter `Ready`
    pub fn open<S: DocumentStore>(repository: &LayoutRepository<S>) -> Self {
        let mut editor = Self::new();
        editor.finish_loading(repository.load());
        editor
    }

    /// Install the loaded layout. Only meaningful while `Loading`.
    pub fn finish_loading(&mut self, loaded: LoadedLayout) {
        if self.state != EditorState::Loading {
            debug!(state = %self.state, "load result arrived outside Loading, ignoring");
            return;
        }
        info!(source = %loaded.source, sections = loaded.layout.len(), "editor ready");
        self.layout = loaded.layout;
        self.load_source = Some(loaded.source);
        self.state = EditorState::Ready;
    }

    #[inline]
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Current working copy
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// How the session's layout was obtained, once loaded
    #[inline]
    pub fn load_source(&self) -> Option<LoadSource> {
        self.load_source
    }

    /// Message of the most recent failed save, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[inline]
    pub fn is_saving(&self) -> bool {
        self.state == EditorState::Saving
    }

    /// True if the working copy differs from what was loaded or last saved
    pub fn has_unsaved_changes(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Apply one intent
    pub fn dispatch(&mut self, intent: EditorIntent) -> Dispatch {
        match self.state {
            EditorState::Loading => {
                debug!(?intent, "editor still loading, ignoring intent");
                return Dispatch::Ignored(self.state);
            }
            EditorState::Saving if intent.is_mutation() => {
                debug!(?intent, "save in flight, ignoring mutation");
                return Dispatch::Ignored(self.state);
            }
            EditorState::Saving => {
                debug!("save in flight, queueing another");
                self.save_queued = true;
                return Dispatch::SaveQueued;
            }
            EditorState::Ready => {}
        }

        let next = match intent {
            EditorIntent::Reorder { from, to } => self.layout.reorder(from, to),
            EditorIntent::Toggle { id } => self.layout.toggle_enabled(&id),
            EditorIntent::EditConfig { id, key, value } => {
                self.layout.patch_config(&id, &key, value)
            }
            EditorIntent::RequestSave => return Dispatch::SaveStarted(self.start_save()),
        };

        if next == self.layout {
            return Dispatch::Unchanged;
        }
        self.layout = next;
        self.revision += 1;
        Dispatch::Applied
    }

    fn start_save(&mut self) -> SaveTicket {
        let ticket = SaveTicket {
            id: NEXT_TICKET.fetch_add(1, Ordering::Relaxed),
            revision: self.revision,
            snapshot: self.layout.clone(),
        };
        self.in_flight = Some(ticket.id);
        self.state = EditorState::Saving;
        debug!(ticket = ticket.id, revision = ticket.revision, "save started");
        ticket
    }

    /// Settle the save for `ticket` and return to `Ready`.
    ///
    /// A failed save leaves the working copy untouched so the next
    /// `RequestSave` resubmits it.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), PersistenceError>,
    ) -> SaveCompletion {
        if self.in_flight != Some(ticket.id) {
            debug!(ticket = ticket.id, "result for a save not in flight, discarding");
            return SaveCompletion {
                notice: SaveNotice::Discarded,
                next: None,
            };
        }

        self.in_flight = None;
        self.state = EditorState::Ready;

        let notice = match result {
            Ok(()) => {
                self.saved_revision = ticket.revision;
                self.last_error = None;
                info!(ticket = ticket.id, "layout saved");
                SaveNotice::Saved
            }
            Err(err) => {
                let message = err.to_string();
                error!(ticket = ticket.id, error = %message, "layout save failed");
                self.last_error = Some(message.clone());
                SaveNotice::Failed(message)
            }
        };

        let next = if self.save_queued {
            self.save_queued = false;
            Some(self.start_save())
        } else {
            None
        };

        SaveCompletion { notice, next }
    }

    /// Run a save to completion through `repository`, including a queued
    /// follow-up. Returns the notice of the last save performed, or `None`
    /// if the editor was not ready to save.
    pub fn save_now<S: DocumentStore>(
        &mut self,
        repository: &LayoutRepository<S>,
    ) -> Option<SaveNotice> {
        let Dispatch::SaveStarted(ticket) = self.dispatch(EditorIntent::RequestSave) else {
            return None;
        };

        let mut pending = Some(ticket);
        let mut notice = None;
        while let Some(ticket) = pending.take() {
            let result = repository.save_layout(ticket.snapshot());
            let completion = self.complete_save(ticket, result);
            notice = Some(completion.notice);
            pending = completion.next;
        }
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use crate::store::MemoryStore;

    fn ready_editor() -> LayoutEditor {
        let mut editor = LayoutEditor::new();
        editor.finish_loading(LoadedLayout {
            layout: registry::default_layout(),
            source: LoadSource::DefaultNotFound,
        });
        editor
    }

    fn start(editor: &mut LayoutEditor) -> SaveTicket {
        match editor.dispatch(EditorIntent::RequestSave) {
            Dispatch::SaveStarted(ticket) => ticket,
            other => panic!("expected save to start, got {:?}", other),
        }
    }

    #[test]
    fn test_new_editor_is_loading() {
        let mut editor = LayoutEditor::new();
        assert_eq!(editor.state(), EditorState::Loading);
        assert_eq!(
            editor.dispatch(EditorIntent::toggle("hero")),
            Dispatch::Ignored(EditorState::Loading)
        );
        assert_eq!(
            editor.dispatch(EditorIntent::RequestSave),
            Dispatch::Ignored(EditorState::Loading)
        );
    }

    #[test]
    fn test_finish_loading_enters_ready() {
        let editor = ready_editor();
        assert_eq!(editor.state(), EditorState::Ready);
        assert_eq!(editor.load_source(), Some(LoadSource::DefaultNotFound));
        assert!(!editor.has_unsaved_changes());
    }

    #[test]
    fn test_second_load_is_ignored() {
        let mut editor = ready_editor();
        editor.finish_loading(LoadedLayout {
            layout: Layout::default(),
            source: LoadSource::Stored,
        });
        assert_eq!(editor.layout(), &registry::default_layout());
    }

    #[test]
    fn test_mutations_apply_and_mark_dirty() {
        let mut editor = ready_editor();
        assert_eq!(
            editor.dispatch(EditorIntent::Reorder { from: 0, to: 1 }),
            Dispatch::Applied
        );
        assert_eq!(editor.layout().ids()[1], "hero");
        assert!(editor.has_unsaved_changes());
    }

    #[test]
    fn test_noop_targets_are_unchanged() {
        let mut editor = ready_editor();
        assert_eq!(
            editor.dispatch(EditorIntent::Reorder { from: 0, to: 9 }),
            Dispatch::Unchanged
        );
        assert_eq!(
            editor.dispatch(EditorIntent::toggle("ghost")),
            Dispatch::Unchanged
        );
        assert_eq!(
            editor.dispatch(EditorIntent::edit_config("featured", "limit", 3)),
            Dispatch::Unchanged
        );
        assert!(!editor.has_unsaved_changes());
    }

    #[test]
    fn test_saving_rejects_mutations() {
        let mut editor = ready_editor();
        let ticket = start(&mut editor);
        assert!(editor.is_saving());
        assert_eq!(
            editor.dispatch(EditorIntent::toggle("hero")),
            Dispatch::Ignored(EditorState::Saving)
        );
        assert_eq!(ticket.snapshot(), editor.layout());
    }

    #[test]
    fn test_successful_save_clears_dirty() {
        let mut editor = ready_editor();
        editor.dispatch(EditorIntent::toggle("hero"));
        let ticket = start(&mut editor);
        let completion = editor.complete_save(ticket, Ok(()));

        assert_eq!(completion.notice, SaveNotice::Saved);
        assert!(completion.next.is_none());
        assert_eq!(editor.state(), EditorState::Ready);
        assert!(!editor.has_unsaved_changes());
    }

    #[test]
    fn test_failed_save_keeps_layout() {
        let mut editor = ready_editor();
        editor.dispatch(EditorIntent::toggle("hero"));
        let before = editor.layout().clone();

        let ticket = start(&mut editor);
        let err = PersistenceError::Store(crate::error::StoreError::Rejected {
            key: "site/layout".to_string(),
            reason: "offline".to_string(),
        });
        let completion = editor.complete_save(ticket, Err(err));

        assert!(matches!(completion.notice, SaveNotice::Failed(ref m) if m.contains("offline")));
        assert_eq!(editor.state(), EditorState::Ready);
        assert_eq!(editor.layout(), &before);
        assert!(editor.has_unsaved_changes());
        assert!(editor.last_error().is_some());

        // retry resubmits the same working copy
        let retry = start(&mut editor);
        assert_eq!(retry.snapshot(), &before);
        editor.complete_save(retry, Ok(()));
        assert!(editor.last_error().is_none());
    }

    #[test]
    fn test_save_request_during_save_is_queued() {
        let mut editor = ready_editor();
        let first = start(&mut editor);
        assert_eq!(editor.dispatch(EditorIntent::RequestSave), Dispatch::SaveQueued);
        assert_eq!(editor.dispatch(EditorIntent::RequestSave), Dispatch::SaveQueued);

        let completion = editor.complete_save(first, Ok(()));
        let second = completion.next.expect("queued save should start");
        assert!(editor.is_saving());

        let completion = editor.complete_save(second, Ok(()));
        assert!(completion.next.is_none());
        assert_eq!(editor.state(), EditorState::Ready);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut editor = ready_editor();
        let first = start(&mut editor);
        let stale = first.clone();
        editor.complete_save(first, Ok(()));

        let err = PersistenceError::Store(crate::error::StoreError::NotFound {
            key: "k".to_string(),
        });
        let completion = editor.complete_save(stale, Err(err));
        assert_eq!(completion.notice, SaveNotice::Discarded);
        assert!(editor.last_error().is_none());
    }

    #[test]
    fn test_ticket_from_another_editor_is_discarded() {
        let mut first = ready_editor();
        let mut second = ready_editor();
        let foreign = start(&mut first);
        let own = start(&mut second);
        assert_ne!(foreign.id(), own.id());

        let completion = second.complete_save(foreign, Ok(()));
        assert_eq!(completion.notice, SaveNotice::Discarded);
        assert!(second.is_saving());

        assert_eq!(second.complete_save(own, Ok(())).notice, SaveNotice::Saved);
    }

    #[test]
    fn test_save_now_round_trip() {
        let repo = LayoutRepository::new(MemoryStore::new());
        let mut editor = LayoutEditor::open(&repo);
        editor.dispatch(EditorIntent::edit_config("featured", "limit", 5));

        assert_eq!(editor.save_now(&repo), Some(SaveNotice::Saved));
        assert_eq!(repo.load_layout(), *editor.layout());
    }

    #[test]
    fn test_save_now_while_loading() {
        let repo = LayoutRepository::new(MemoryStore::new());
        let mut editor = LayoutEditor::new();
        assert_eq!(editor.save_now(&repo), None);
    }
}
