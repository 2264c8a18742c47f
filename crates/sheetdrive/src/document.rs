//! Document manager — owns one host document handle and its sheet registry.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::host::{AutomationHost, DocumentId, DocumentTemplate, HostError};
use crate::sheet::Sheet;

/// A handle to one open document and the registry of its sheets.
///
/// Instantiated only by [`crate::Session`], through
/// [`crate::Session::new_document_with_single_sheet`] or
/// [`crate::Session::open_document_read_only`].
///
/// The sheet registry is a snapshot taken at construction time; after that it
/// changes only through [`Document::add_sheet`], which updates the host and
/// the registry together. Sheet names are the sole identity at this level and
/// are unique within the document.
pub struct Document<H: AutomationHost> {
    host: Rc<H>,
    handle: Option<DocumentId>,
    sheets: HashMap<String, Sheet<H>>,
}

impl<H: AutomationHost> Document<H> {
    /// New document from the single-worksheet template. The host's
    /// auto-created first sheet is renamed to `sheet_name` and registered.
    pub(crate) fn create(host: Rc<H>, sheet_name: &str) -> Result<Self> {
        let id = host.add_document(DocumentTemplate::SingleSheet)?;
        let seeded = host
            .sheets(id)?
            .into_iter()
            .next()
            .ok_or(HostError::UnexpectedResponse)?;
        host.rename_sheet(seeded.id, sheet_name)?;

        let mut sheets = HashMap::new();
        sheets.insert(sheet_name.to_string(), Sheet::new(Rc::clone(&host), id, seeded.id));
        tracing::debug!(document = id.0, sheet = sheet_name, "created document with seed sheet");

        Ok(Self {
            host,
            handle: Some(id),
            sheets,
        })
    }

    /// Wrap a document already open in the host, registering every sheet
    /// under its current name in host-native order. No renaming occurs.
    pub(crate) fn wrap(host: Rc<H>, id: DocumentId) -> Result<Self> {
        let mut sheets = HashMap::new();
        for info in host.sheets(id)? {
            match sheets.entry(info.name) {
                Entry::Occupied(entry) => {
                    return Err(Error::NameCollision(entry.key().clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(Sheet::new(Rc::clone(&host), id, info.id));
                }
            }
        }
        tracing::debug!(document = id.0, sheets = sheets.len(), "wrapped open document");

        Ok(Self {
            host,
            handle: Some(id),
            sheets,
        })
    }

    /// Host handle of this document, if not yet released.
    pub fn id(&self) -> Option<DocumentId> {
        self.handle
    }

    /// Look up a sheet by registered name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet<H>> {
        self.sheets.get(name)
    }

    /// Look up a sheet by registered name, mutably.
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet<H>> {
        self.sheets.get_mut(name)
    }

    /// Registered sheet names (registry order is unspecified).
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Number of registered sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Append a new sheet at the end of the document, rename it, and
    /// register it under `name`.
    ///
    /// The collision check runs before any host call; on collision the
    /// registry and the host are untouched.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet<H>> {
        let id = self.handle.ok_or(Error::InvalidReference("document"))?;
        match self.sheets.entry(name.to_string()) {
            Entry::Occupied(entry) => Err(Error::NameCollision(entry.key().clone())),
            Entry::Vacant(slot) => {
                let last = self.host.sheet_count(id)?;
                let sheet_id = self.host.add_sheet(id, last)?;
                self.host.rename_sheet(sheet_id, name)?;
                tracing::debug!(document = id.0, sheet = name, "appended sheet");
                Ok(slot.insert(Sheet::new(Rc::clone(&self.host), id, sheet_id)))
            }
        }
    }

    /// Save the document under `path_and_name`.
    ///
    /// Host alert prompts (overwrite, format mismatch) are suppressed for
    /// the duration of the call and restored unconditionally, so a failed
    /// save never leaves the host's interactive state altered.
    pub fn save_as(&self, path_and_name: &str) -> Result<()> {
        let id = self.handle.ok_or(Error::InvalidReference("document"))?;
        self.host.set_display_alerts(false)?;
        let saved = self.host.save_document(id, path_and_name);
        let restored = self.host.set_display_alerts(true);
        saved?;
        restored?;
        Ok(())
    }

    /// Dispose every registered sheet, then close and release the document
    /// handle. Idempotent; never disposes the owning session.
    pub fn dispose(&mut self) -> Result<()> {
        let Some(id) = self.handle.take() else {
            return Ok(());
        };
        if let Err(e) = self.host.release_transients() {
            tracing::warn!(error = %e, "transient release failed before document dispose");
        }
        for (name, mut sheet) in self.sheets.drain() {
            if let Err(e) = sheet.dispose() {
                tracing::warn!(sheet = %name, error = %e, "sheet dispose failed during document dispose");
            }
        }
        // Attempt the release even when close fails; the handle must not
        // survive a partial dispose.
        let closed = self.host.close_document(id);
        let released = self.host.release_document(id);
        tracing::debug!(document = id.0, "closed and released document");
        closed?;
        released?;
        Ok(())
    }
}
