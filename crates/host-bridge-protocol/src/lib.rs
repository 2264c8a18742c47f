//! Shared protocol types for communication between the native client and the
//! automation host bridge process.
//!
//! The protocol is JSON-over-stdio: one JSON object per line in each direction.
//! Handles (`document`, `sheet`) are indices into the bridge's handle table and
//! are opaque to the client.

use serde::{Deserialize, Serialize};

/// A command sent from the client to the bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the client can send to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Launch a new automation host instance.
    Init,

    /// Attach to an already-running host instance instead of launching one.
    /// Fails if no instance is running or its handle cannot be obtained.
    Attach,

    /// Add a new document from a template. Returns a document handle.
    AddDocument { template: DocumentTemplate },

    /// Open an existing document from a file path (host-native path).
    OpenDocument {
        path: String,
        update_links: bool,
        read_only: bool,
        notify: bool,
    },

    /// Handle of the host's first open document.
    FirstDocument,

    /// List the sheets of a document in host-native order.
    ListSheets { document: u64 },

    /// Number of sheets currently in a document.
    SheetCount { document: u64 },

    /// Insert a new sheet after the 1-based position `after`.
    /// Returns the new sheet's handle.
    AddSheet { document: u64, after: u32 },

    /// Rename a sheet.
    RenameSheet { sheet: u64, name: String },

    /// Search all cells of a sheet for any non-empty content, row by row.
    /// With `search_backward` the scan starts from the end, so the match is
    /// the last used cell. Responds with a null cell when nothing matches.
    FindLastUsedCell { sheet: u64, search_backward: bool },

    /// Save a document to a file path (host-native path).
    SaveDocument { document: u64, path: String },

    /// Close a document without saving.
    CloseDocument { document: u64 },

    /// Drop the bridge's reference to a closed document.
    ReleaseDocument { document: u64 },

    /// Drop the bridge's reference to a sheet.
    ReleaseSheet { sheet: u64 },

    /// Force-release every transient sub-object reference (ranges, cells)
    /// created by earlier queries. Must be honored before handle release or
    /// the host process can outlive an explicit quit.
    ReleaseTransients,

    /// Enable or disable the host's interactive alert prompts.
    SetDisplayAlerts { enabled: bool },

    /// Toggle gridline display on the window showing a document.
    SetGridlines { document: u64, show: bool },

    /// Set host window visibility, full-screen flag, and state.
    SetWindow {
        visible: bool,
        full_screen: bool,
        state: WindowState,
    },

    /// Quit the host and terminate the bridge process.
    Quit,
}

/// Document templates the host can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentTemplate {
    /// A document seeded with exactly one sheet.
    SingleSheet,
}

/// Host window states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
}

/// A response sent from the bridge back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Data returned in successful responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Handle to a newly created/opened document.
    DocumentHandle { document: u64 },
    /// Handle to a newly created sheet.
    SheetHandle { sheet: u64 },
    /// Sheets of a document, host-native order.
    SheetList { sheets: Vec<SheetEntry> },
    /// A count (e.g. number of sheets).
    Count { count: u32 },
    /// Result of a cell search; null when nothing matched.
    Cell { cell: Option<CellAddress> },
}

/// One sheet in a [`ResponseData::SheetList`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetEntry {
    pub sheet: u64,
    pub name: String,
}

/// A 1-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}
