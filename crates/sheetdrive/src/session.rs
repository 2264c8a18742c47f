//! Session — owns the automation host connection and the document registry.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::host::{AutomationHost, DocumentId, OpenOptions, WindowState};

/// File extensions the host recognizes when opening a document by name.
/// Anything else gets `.xlsx` appended. The match is case-sensitive.
const RECOGNIZED_EXTENSIONS: [&str; 3] = [".xlsx", ".xlsm", ".xls"];

/// Whether this session launched the host or attached to a running instance.
/// Only a launched host is terminated on dispose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostOwnership {
    Launched,
    Attached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Connected,
    Disposed,
}

/// The caller's handle to one automation host instance.
///
/// A session owns its documents exclusively; documents are created only
/// through session operations and registered under a caller-supplied name
/// before being returned. Unsaved documents have no host-assigned identity,
/// so the registry key is their sole identity and must be unique per session.
///
/// Lifecycle: a constructor returns a connected session or an error; no
/// half-connected value is observable. [`Session::dispose`] is mandatory,
/// idempotent, and cascades bottom-up (sheets, then documents, then the host
/// handle). Every other mutating operation fails with
/// [`Error::UseAfterDispose`] once the session is disposed.
pub struct Session<H: AutomationHost> {
    host: Rc<H>,
    documents: HashMap<String, Document<H>>,
    ownership: HostOwnership,
    state: SessionState,
}

impl<H: AutomationHost> Session<H> {
    /// Launch a new host instance and connect to it.
    pub fn launch(host: H) -> Result<Self> {
        host.launch()?;
        tracing::info!("launched new automation host instance");
        Ok(Self::connected(host, HostOwnership::Launched))
    }

    /// Attach to an already-running host instance.
    ///
    /// Failure (host not running, or its handle unobtainable) surfaces as
    /// [`Error::HostConnection`] and is not retried.
    pub fn attach(host: H) -> Result<Self> {
        host.attach()
            .map_err(|e| Error::HostConnection(e.to_string()))?;
        tracing::info!("attached to running automation host instance");
        Ok(Self::connected(host, HostOwnership::Attached))
    }

    fn connected(host: H, ownership: HostOwnership) -> Self {
        Self {
            host: Rc::new(host),
            documents: HashMap::new(),
            ownership,
            state: SessionState::Connected,
        }
    }

    /// The adapter this session drives.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether [`Session::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.state == SessionState::Disposed
    }

    /// Create a document containing exactly one sheet, with the document and
    /// its sole sheet sharing `name`.
    pub fn new_document_with_single_sheet(&mut self, name: &str) -> Result<&mut Document<H>> {
        self.new_document_with_single_sheet_named(name, name)
    }

    /// Create a document containing exactly one sheet named `sheet_name`,
    /// registered under `doc_name`.
    ///
    /// The registry collision check runs before the host-level create call.
    pub fn new_document_with_single_sheet_named(
        &mut self,
        doc_name: &str,
        sheet_name: &str,
    ) -> Result<&mut Document<H>> {
        self.ensure_connected()?;
        match self.documents.entry(doc_name.to_string()) {
            Entry::Occupied(entry) => Err(Error::NameCollision(entry.key().clone())),
            Entry::Vacant(slot) => {
                let document = Document::create(Rc::clone(&self.host), sheet_name)?;
                tracing::debug!(document = doc_name, sheet = sheet_name, "registered new document");
                Ok(slot.insert(document))
            }
        }
    }

    /// Open `dir + name` read-only (no link update, notifications
    /// suppressed), enumerate its sheets, and register it under the
    /// normalized name.
    ///
    /// If `name` ends with none of the recognized extensions, `.xlsx` is
    /// appended before the path is assembled.
    pub fn open_document_read_only(&mut self, dir: &str, name: &str) -> Result<&mut Document<H>> {
        self.ensure_connected()?;
        let file_name = normalize_document_name(name);
        match self.documents.entry(file_name) {
            Entry::Occupied(entry) => Err(Error::NameCollision(entry.key().clone())),
            Entry::Vacant(slot) => {
                let full_path = format!("{dir}{}", slot.key());
                let id = self.host.open_document(&full_path, OpenOptions::read_only())?;
                let document = Document::wrap(Rc::clone(&self.host), id)?;
                tracing::debug!(document = %slot.key(), "registered opened document");
                Ok(slot.insert(document))
            }
        }
    }

    /// Look up a document by registered name.
    pub fn document(&self, name: &str) -> Option<&Document<H>> {
        self.documents.get(name)
    }

    /// Look up a document by registered name, mutably.
    pub fn document_mut(&mut self, name: &str) -> Option<&mut Document<H>> {
        self.documents.get_mut(name)
    }

    /// Registered document names (registry order is unspecified).
    pub fn document_names(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    /// Number of registered documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Handle of the host's first open document.
    ///
    /// Pass-through; the returned handle is not registered and not owned by
    /// this session.
    pub fn first_document_id(&self) -> Result<DocumentId> {
        self.ensure_connected()?;
        Ok(self.host.first_document()?)
    }

    /// Show the host window: visible, not full-screen, normal state.
    pub fn make_visible(&self) -> Result<()> {
        self.ensure_connected()?;
        self.host.set_window(true, false, WindowState::Normal)?;
        Ok(())
    }

    /// Dispose every registered document (each cascades to its sheets
    /// first), terminate the host if this session launched it, and drop the
    /// host-level handle. Idempotent.
    pub fn dispose(&mut self) -> Result<()> {
        if self.state == SessionState::Disposed {
            return Ok(());
        }
        self.state = SessionState::Disposed;

        if let Err(e) = self.host.release_transients() {
            tracing::warn!(error = %e, "transient release failed before session dispose");
        }
        for (name, mut document) in self.documents.drain() {
            if let Err(e) = document.dispose() {
                tracing::warn!(document = %name, error = %e, "document dispose failed during session dispose");
            }
        }

        // An attached host belongs to someone else; only a launched one is
        // terminated.
        let quit = match self.ownership {
            HostOwnership::Launched => self.host.quit(),
            HostOwnership::Attached => Ok(()),
        };
        let disconnected = self.host.disconnect();
        tracing::info!("session disposed");
        quit?;
        disconnected?;
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        match self.state {
            SessionState::Connected => Ok(()),
            SessionState::Disposed => Err(Error::UseAfterDispose("session")),
        }
    }
}

/// Append `.xlsx` unless `name` already carries a recognized extension.
fn normalize_document_name(name: &str) -> String {
    if RECOGNIZED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        name.to_string()
    } else {
        format!("{name}.xlsx")
    }
}
