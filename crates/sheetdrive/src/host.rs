//! The automation host capability contract.
//!
//! Everything the library needs from the external spreadsheet engine is
//! expressed through [`AutomationHost`]. The core never touches the host's
//! native automation surface directly, so it can run against the in-memory
//! host in [`crate::testing`] as well as a live bridge adapter.

use thiserror::Error;

/// Opaque handle to a host-side document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// Opaque handle to a host-side sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId(pub u64);

/// Document templates the host can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentTemplate {
    /// A fresh document seeded with exactly one sheet.
    SingleSheet,
}

/// Flags for opening an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub read_only: bool,
    pub update_links: bool,
    /// Whether the host may pop a notification when the file is in use.
    pub notify: bool,
}

impl OpenOptions {
    /// Read-only, no link update, notifications suppressed.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            update_links: false,
            notify: false,
        }
    }
}

/// Host window states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
}

/// One sheet as enumerated by the host, in host-native order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub id: SheetId,
    pub name: String,
}

/// A 1-based cell position returned by a cell search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

/// Errors surfaced by an [`AutomationHost`] adapter.
#[derive(Debug, Error)]
pub enum HostError {
    /// Attaching to a running host instance failed (not running, or its
    /// handle could not be obtained).
    #[error("could not attach to a running automation host: {0}")]
    ConnectionFailed(String),

    /// The adapter has no live host connection.
    #[error("automation host is not running")]
    NotRunning,

    /// The host executed the call and reported a failure.
    #[error("automation host fault: {0}")]
    Fault(String),

    /// The host answered with data the adapter cannot interpret.
    #[error("unexpected response from automation host")]
    UnexpectedResponse,

    /// The transport to the host broke down.
    #[error("host transport failure: {0}")]
    Transport(String),
}

/// The capability surface the core consumes.
///
/// Methods take `&self`: adapters wrap an external process or connection and
/// serialize access internally. Every call is synchronous and blocks until
/// the host responds.
///
/// Handle discipline: the host keeps its own reference counts for every
/// object handed out. `release_*` calls drop the adapter-side reference;
/// [`AutomationHost::release_transients`] additionally drops sub-object
/// references (ranges, cells) created by earlier queries. Callers must issue
/// it before releasing a parent handle or the host process can outlive an
/// explicit [`AutomationHost::quit`].
pub trait AutomationHost {
    /// Launch a new host instance.
    fn launch(&self) -> Result<(), HostError>;

    /// Attach to an already-running host instance.
    fn attach(&self) -> Result<(), HostError>;

    /// Terminate the host instance.
    fn quit(&self) -> Result<(), HostError>;

    /// Drop the host-level handle without terminating the host.
    fn disconnect(&self) -> Result<(), HostError>;

    /// Create a new document from `template`.
    fn add_document(&self, template: DocumentTemplate) -> Result<DocumentId, HostError>;

    /// Open an existing document from a full host-native path.
    fn open_document(&self, path: &str, options: OpenOptions) -> Result<DocumentId, HostError>;

    /// Handle of the host's first open document.
    fn first_document(&self) -> Result<DocumentId, HostError>;

    /// Enumerate the sheets of a document in host-native order.
    fn sheets(&self, document: DocumentId) -> Result<Vec<SheetInfo>, HostError>;

    /// Number of sheets currently in a document.
    fn sheet_count(&self, document: DocumentId) -> Result<u32, HostError>;

    /// Insert a new sheet after the 1-based position `after`.
    fn add_sheet(&self, document: DocumentId, after: u32) -> Result<SheetId, HostError>;

    /// Rename a sheet.
    fn rename_sheet(&self, sheet: SheetId, name: &str) -> Result<(), HostError>;

    /// Search all cells of a sheet for any non-empty content, row by row.
    /// With `search_backward` the scan starts from the end, so a match is the
    /// last used cell. `None` when the sheet has no non-empty cell.
    fn find_last_used_cell(
        &self,
        sheet: SheetId,
        search_backward: bool,
    ) -> Result<Option<CellRef>, HostError>;

    /// Save a document to a full host-native path.
    fn save_document(&self, document: DocumentId, path: &str) -> Result<(), HostError>;

    /// Close a document without saving.
    fn close_document(&self, document: DocumentId) -> Result<(), HostError>;

    /// Drop the adapter-side reference to a document.
    fn release_document(&self, document: DocumentId) -> Result<(), HostError>;

    /// Drop the adapter-side reference to a sheet.
    fn release_sheet(&self, sheet: SheetId) -> Result<(), HostError>;

    /// Force-release transient sub-object references from earlier queries.
    fn release_transients(&self) -> Result<(), HostError>;

    /// Enable or disable the host's interactive alert prompts.
    fn set_display_alerts(&self, enabled: bool) -> Result<(), HostError>;

    /// Toggle gridline display on the window showing `document`.
    fn set_gridlines(&self, document: DocumentId, show: bool) -> Result<(), HostError>;

    /// Set host window visibility, full-screen flag, and state.
    fn set_window(
        &self,
        visible: bool,
        full_screen: bool,
        state: WindowState,
    ) -> Result<(), HostError>;
}
